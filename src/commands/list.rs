//! List site content

use anyhow::Result;

use crate::store;
use crate::Blog;

/// List articles in the content store
pub async fn articles(blog: &Blog) -> Result<()> {
    let store = blog.open_store().await?;
    let articles = store::article_summaries(store.as_ref()).await?;

    println!("Articles ({}):", articles.len());
    for article in articles {
        let date = article
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!(
            "  {} - {} [{}] ({})",
            date, article.title, article.slug.current, article.id
        );
    }

    Ok(())
}

/// List approved comments of one article
pub async fn comments(blog: &Blog, post_id: &str) -> Result<()> {
    let store = blog.open_store().await?;
    let comments = store::approved_comments(store.as_ref(), post_id).await?;

    println!("Approved comments on {} ({}):", post_id, comments.len());
    for comment in comments {
        println!("  {} <{}>: {}", comment.name, comment.email, comment.comment);
    }

    Ok(())
}
