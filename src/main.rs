// main.rs
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use dotenv::dotenv;
use log::{error, info};
use reqwest::Client;

use product_image_gen::catalog::load_catalog;
use product_image_gen::download::HttpDownloader;
use product_image_gen::driver::run_batch;
use product_image_gen::generate::{DalleClient, GenerateConfig};

const DEFAULT_PRODUCTS_PATH: &str = "data/products.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Create logs directory if it doesn't exist
    fs::create_dir_all("logs")?;
    log4rs::init_file("log4rs.yaml", Default::default()).map_err(|e| anyhow!(e))?;

    info!("Starting product image generation");

    let api_key = env::var("OPENAI_API_KEY").context(
        "OPENAI_API_KEY not set. Ensure the OPENAI_API_KEY environment variable is set correctly",
    )?;
    let config = GenerateConfig::from_env()?;
    let catalog_path =
        env::var("PRODUCTS_JSON_PATH").unwrap_or_else(|_| DEFAULT_PRODUCTS_PATH.to_string());

    let products = match load_catalog(Path::new(&catalog_path)) {
        Ok(products) => products,
        Err(e) => {
            error!("{}", e);
            println!("Error: {}", e);
            return Err(e.into());
        }
    };

    println!(
        "Found {} products. Starting image generation...",
        products.len()
    );

    let client = Client::new();
    let generator = DalleClient::new(client.clone(), api_key, config);
    let downloader = HttpDownloader::new(client);

    let summary = run_batch(&products, &generator, &downloader).await;

    println!("\nImage generation process complete. {}", summary);
    info!("Run finished: {}", summary);

    Ok(())
}
