//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on: comment
//! names and bodies are visitor input.

use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::portable_text::{text_blocks, TextBlock};
use crate::content::{Article, ArticleSummary, Comment};
use crate::page::MergeStrategy;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("article.html", include_str!("site/article.html")),
            ("index.html", include_str!("site/index.html")),
            ("not_found.html", include_str!("site/not_found.html")),
        ])?;

        Ok(Self {
            tera,
            site: SiteData::from(config),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("year", &Utc::now().year());
        context
    }

    /// Render one article page with its comment form
    pub fn render_article(
        &self,
        article: &Article,
        merge_strategy: MergeStrategy,
    ) -> tera::Result<String> {
        let mut context = self.base_context();
        context.insert("article", &ArticleData::from(article));
        context.insert("merge_strategy", merge_strategy.as_str());
        self.render("article.html", &context)
    }

    /// Render the article listing
    pub fn render_index(&self, articles: &[ArticleSummary]) -> tera::Result<String> {
        let links: Vec<ArticleLink> = articles.iter().map(ArticleLink::from).collect();
        let mut context = self.base_context();
        context.insert("articles", &links);
        self.render("index.html", &context)
    }

    pub fn render_not_found(&self) -> tera::Result<String> {
        self.render("not_found.html", &self.base_context())
    }
}

/// Format a publication date like "January 15, 2024"
fn full_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%B %d, %Y").to_string())
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub published: Option<String>,
    pub blocks: Vec<TextBlock>,
    pub comments: Vec<CommentData>,
}

impl From<&Article> for ArticleData {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            author: article
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            published: full_date(article.published_at),
            blocks: text_blocks(&article.body),
            comments: article.comments.iter().map(CommentData::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentData {
    pub id: String,
    pub name: String,
    pub comment: String,
}

impl From<&Comment> for CommentData {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            name: comment.name.clone(),
            comment: comment.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleLink {
    pub title: String,
    pub slug: String,
    pub published: Option<String>,
}

impl From<&ArticleSummary> for ArticleLink {
    fn from(summary: &ArticleSummary) -> Self {
        Self {
            title: summary.title.clone(),
            slug: summary.slug.current.clone(),
            published: full_date(summary.published_at),
        }
    }
}
