//! Plain-text fallback for portable-text article bodies
//!
//! Only block text is extracted. Marks, annotations, and embedded images are
//! dropped.

use serde::Serialize;
use serde_json::Value;

/// One renderable paragraph or heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    /// Block style (`normal`, `h1`, `h2`, ...)
    pub style: String,
    pub text: String,
}

/// Flatten portable-text blocks into styled text runs
pub fn text_blocks(body: &[Value]) -> Vec<TextBlock> {
    body.iter().filter_map(text_block).collect()
}

fn text_block(block: &Value) -> Option<TextBlock> {
    if block.get("_type").and_then(Value::as_str) != Some("block") {
        return None;
    }

    let text: String = block
        .get("children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(|span| span.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return None;
    }

    let style = match block.get("style").and_then(Value::as_str) {
        Some(s @ ("h1" | "h2" | "h3" | "h4" | "blockquote")) => s.to_string(),
        _ => "normal".to_string(),
    };

    Some(TextBlock { style, text })
}
