// catalog.rs
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

#[derive(Deserialize, Debug, Clone)]
pub struct Product {
    #[serde(rename = "productId", default = "unknown_product_id")]
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

fn unknown_product_id() -> String {
    "unknown_product".to_string()
}

impl Product {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// The catalog calls this field `imageUrl` but it holds a local
    /// filesystem path, used both for the skip check and as the
    /// download destination.
    pub fn image_path(&self) -> Option<&str> {
        match self.image_url.as_deref() {
            Some("") | None => None,
            Some(path) => Some(path),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("product data file not found at {path}: {source}")]
    NotFound {
        path: String,
        source: std::io::Error,
    },
    #[error("could not decode JSON from {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Loads the product catalog, preserving input order. Any failure here is
/// fatal for the whole run.
pub fn load_catalog(path: &Path) -> Result<Vec<Product>, CatalogError> {
    debug!("Loading product catalog from {}", path.display());

    let raw = fs::read_to_string(path).map_err(|e| CatalogError::NotFound {
        path: path.display().to_string(),
        source: e,
    })?;

    let products: Vec<Product> = serde_json::from_str(&raw).map_err(|e| CatalogError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;

    info!("Loaded {} products from {}", products.len(), path.display());
    Ok(products)
}
