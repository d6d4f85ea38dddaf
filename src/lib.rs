//! inkpost: a server-rendered blog front-end with moderated comments
//!
//! Articles and comments live in a headless content store. This crate
//! renders article pages from it, serves the two comment endpoints, and
//! models the page's optimistic comment thread.

pub mod api;
pub mod commands;
pub mod config;
pub mod content;
pub mod page;
pub mod server;
pub mod store;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self { config, base_dir })
    }

    /// Open the configured content store
    pub async fn open_store(&self) -> Result<store::SharedStore> {
        store::open(&self.config.store, &self.base_dir).await
    }
}
