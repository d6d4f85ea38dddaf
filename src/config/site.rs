//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::page::MergeStrategy;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub comments: CommentsConfig,

    /// Seconds before a rendered article page may be regenerated
    pub revalidate_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpost".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            url: "http://localhost:3000".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            comments: CommentsConfig::default(),
            revalidate_secs: 60,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `SANITY_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("SANITY_PROJECT_ID") {
            self.store.project_id = project_id;
        }
        if let Some(dataset) = lookup("SANITY_DATASET") {
            self.store.dataset = dataset;
        }
        if let Some(token) = lookup("SANITY_API_TOKEN") {
            tracing::debug!("Using write token from SANITY_API_TOKEN");
            self.store.token = Some(token);
        }
    }

    /// Revalidation window for rendered pages
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

/// Which content store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Hosted document store over HTTP
    Sanity,
    /// In-process store seeded from a JSON file
    Memory,
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Read through the CDN (queries only; writes always hit the API)
    pub use_cdn: bool,
    /// Write token; usually provided through `SANITY_API_TOKEN`
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// JSON array of documents loaded by the memory backend
    pub seed: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2023-05-03".to_string(),
            use_cdn: false,
            token: None,
            seed: Some("seed.json".to_string()),
        }
    }
}

/// Comment workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// Value forced onto `approved` for every new comment
    pub auto_approve: bool,
    /// How refetched comments are reconciled with optimistic ones
    pub merge_strategy: MergeStrategy,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            auto_approve: true,
            merge_strategy: MergeStrategy::ById,
        }
    }
}
