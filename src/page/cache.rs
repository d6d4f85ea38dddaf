//! Rendered article pages with a revalidation window
//!
//! A page younger than the window is served from memory. An older page is
//! regenerated before it is served, and a slug seen for the first time is
//! rendered on that request. Slugs the store does not know are never cached.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::store::{self, SharedStore, StoreError};
use crate::templates::TemplateRenderer;

use super::MergeStrategy;

/// Errors producing a page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("no article with slug {0:?}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("template error: {0}")]
    Render(#[from] tera::Error),
}

struct CachedPage {
    html: String,
    generated_at: Instant,
}

/// Article pages keyed by slug
pub struct PageCache {
    store: SharedStore,
    renderer: TemplateRenderer,
    merge_strategy: MergeStrategy,
    window: Duration,
    pages: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    pub fn new(
        store: SharedStore,
        renderer: TemplateRenderer,
        merge_strategy: MergeStrategy,
        window: Duration,
    ) -> Self {
        Self {
            store,
            renderer,
            merge_strategy,
            window,
            pages: RwLock::new(HashMap::new()),
        }
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Page for `slug`, regenerating it when missing or stale
    pub async fn get(&self, slug: &str) -> Result<String, PageError> {
        self.get_at(slug, Instant::now()).await
    }

    async fn get_at(&self, slug: &str, now: Instant) -> Result<String, PageError> {
        if let Some(page) = self.pages.read().await.get(slug) {
            if now.saturating_duration_since(page.generated_at) < self.window {
                return Ok(page.html.clone());
            }
            tracing::debug!("Page {} is stale, regenerating", slug);
        }
        self.regenerate(slug, now).await
    }

    async fn regenerate(&self, slug: &str, now: Instant) -> Result<String, PageError> {
        let article = match store::article_by_slug(self.store.as_ref(), slug).await? {
            Some(article) => article,
            None => {
                self.pages.write().await.remove(slug);
                return Err(PageError::NotFound(slug.to_string()));
            }
        };

        let html = self.renderer.render_article(&article, self.merge_strategy)?;
        self.pages.write().await.insert(
            slug.to_string(),
            CachedPage {
                html: html.clone(),
                generated_at: now,
            },
        );
        tracing::debug!(
            "Rendered {} with {} comments",
            slug,
            article.comments.len()
        );
        Ok(html)
    }

    /// Slugs of every article in the store
    pub async fn static_paths(&self) -> Result<Vec<String>, StoreError> {
        let summaries = store::article_summaries(self.store.as_ref()).await?;
        Ok(summaries.into_iter().map(|s| s.slug.current).collect())
    }

    /// Render every known article ahead of the first request
    pub async fn prerender(&self) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut rendered = 0;
        for slug in self.static_paths().await? {
            match self.regenerate(&slug, now).await {
                Ok(_) => rendered += 1,
                Err(e) => tracing::warn!("Failed to pre-render {}: {}", slug, e),
            }
        }
        Ok(rendered)
    }

    /// Render the article listing; never cached
    pub async fn index(&self) -> Result<String, PageError> {
        let summaries = store::article_summaries(self.store.as_ref()).await?;
        Ok(self.renderer.render_index(&summaries)?)
    }

    /// Number of cached pages
    pub async fn cached_pages(&self) -> usize {
        self.pages.read().await.len()
    }
}
