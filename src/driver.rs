// driver.rs
use std::fmt;
use std::path::Path;

use log::{error, info, warn};

use crate::catalog::Product;
use crate::download::Downloader;
use crate::generate::ImageGenerator;
use crate::prompt::build_prompt;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: usize,
    pub skipped_existing: usize,
    pub skipped_missing_path: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generated, {} skipped (existing), {} skipped (no path), {} failed",
            self.generated, self.skipped_existing, self.skipped_missing_path, self.failed
        )
    }
}

/// Processes products in catalog order, one at a time. Per-item failures are
/// logged and counted; they never abort the run.
pub async fn run_batch(
    products: &[Product],
    generator: &dyn ImageGenerator,
    downloader: &dyn Downloader,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for product in products {
        let image_path = match product.image_path() {
            Some(path) => path,
            None => {
                warn!(
                    "Skipping product {}: missing 'imageUrl'",
                    product.product_id
                );
                println!("Skipping product {}: missing 'imageUrl'.", product.product_id);
                summary.skipped_missing_path += 1;
                continue;
            }
        };

        // Existence of the file is the only done-marker; contents are
        // never validated.
        if Path::new(image_path).exists() {
            info!(
                "Skipping product {}: image already exists at {}",
                product.product_id, image_path
            );
            println!(
                "Skipping product {}: image already exists at {}",
                product.product_id, image_path
            );
            summary.skipped_existing += 1;
            continue;
        }

        println!(
            "\nProcessing product: {} ({})",
            product.product_id,
            product.display_name()
        );
        info!("Processing product {}", product.product_id);

        let prompt = build_prompt(product.display_name(), product.description());
        println!("  -> Prompt: {}", prompt);

        println!("  -> Requesting image...");
        let image_url = match generator.generate(&prompt).await {
            Ok(url) => url,
            Err(e) => {
                error!(
                    "Error generating image for {}: {}",
                    product.product_id, e
                );
                println!("Error generating image for {}: {}", product.product_id, e);
                summary.failed += 1;
                continue;
            }
        };
        println!("  -> Image URL: {}", image_url);

        println!("  -> Downloading image to: {}", image_path);
        match downloader.download(&image_url, Path::new(image_path)).await {
            Ok(()) => {
                println!("Successfully downloaded: {}", image_path);
                summary.generated += 1;
            }
            Err(e) => {
                error!(
                    "Error downloading image for {}: {}",
                    product.product_id, e
                );
                println!("  -> Failed to download image for {}: {}", product.product_id, e);
                summary.failed += 1;
            }
        }
    }

    info!("Batch complete: {}", summary);
    summary
}
