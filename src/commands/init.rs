//! Initialize a new site

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    // Create default _config.yml
    let config_content = r#"# Site
title: Inkpost
description: ''
author: John Doe
url: http://localhost:3000

# Server
server:
  ip: localhost
  port: 3000

# Content store
## backend: sanity reads SANITY_PROJECT_ID, SANITY_DATASET and SANITY_API_TOKEN
store:
  backend: memory
  project_id: ''
  dataset: production
  api_version: '2023-05-03'
  use_cdn: false
  seed: seed.json

# Comments
comments:
  auto_approve: true
  merge_strategy: by_id

# Seconds before a rendered article may be regenerated
revalidate_secs: 60
"#;

    fs::write(target_dir.join("_config.yml"), config_content)?;

    // Create a sample dataset for the memory backend
    let now = chrono::Utc::now().to_rfc3339();
    let seed = json!([
        {
            "_id": "author-john-doe",
            "_type": "author",
            "name": "John Doe"
        },
        {
            "_id": "post-hello-world",
            "_type": "post",
            "title": "Hello World",
            "description": "Your very first post",
            "publishedAt": now,
            "slug": {"_type": "slug", "current": "hello-world"},
            "author": {"_type": "reference", "_ref": "author-john-doe"},
            "body": [
                {
                    "_type": "block",
                    "style": "normal",
                    "children": [{"_type": "span", "text": "Welcome! This is your very first post."}]
                }
            ]
        }
    ]);

    fs::write(
        target_dir.join("seed.json"),
        serde_json::to_string_pretty(&seed)?,
    )?;

    Ok(())
}
