//! HTTP server: article pages and the comment endpoints

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::{CommentsConfig, SiteConfig};
use crate::page::{PageCache, PageError};
use crate::store::SharedStore;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Server state shared by every handler
pub struct ServerState {
    pub store: SharedStore,
    pub comments: CommentsConfig,
    pub pages: PageCache,
}

impl ServerState {
    pub fn new(store: SharedStore, config: &SiteConfig) -> Result<Self> {
        let renderer = TemplateRenderer::new(config)?;
        let pages = PageCache::new(
            store.clone(),
            renderer,
            config.comments.merge_strategy,
            config.revalidate(),
        );
        Ok(Self {
            store,
            comments: config.comments.clone(),
            pages,
        })
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(article_handler))
        .route("/api/createComment", any(api::create_comment))
        .route("/api/getComments", any(api::get_comments))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, prerender: bool) -> Result<()> {
    let store = blog.open_store().await?;
    let state = Arc::new(ServerState::new(store, &blog.config)?);

    if prerender {
        let rendered = state.pages.prerender().await?;
        tracing::info!("Pre-rendered {} article pages", rendered);
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.pages.index().await {
        Ok(html) => Html(html).into_response(),
        Err(e) => page_error(&state, e),
    }
}

async fn article_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.pages.get(&slug).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => page_error(&state, e),
    }
}

async fn fallback_handler(State(state): State<Arc<ServerState>>) -> Response {
    not_found(&state)
}

fn page_error(state: &ServerState, error: PageError) -> Response {
    match error {
        PageError::NotFound(slug) => {
            tracing::debug!("No article for slug {}", slug);
            not_found(state)
        }
        e => {
            tracing::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.pages.renderer().render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{HttpCommentsApi, MergeStrategy, PageController, SubmitOutcome};
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_documents(vec![json!({
            "_id": "p1", "_type": "post", "title": "Hello", "slug": {"current": "hello"}
        })]))
    }

    fn state_for(store: Arc<MemoryStore>) -> Arc<ServerState> {
        Arc::new(ServerState::new(store, &SiteConfig::default()).unwrap())
    }

    fn state() -> Arc<ServerState> {
        state_for(store())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn send(method: &str, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        router(state()).oneshot(request).await.unwrap()
    }

    const VALID: &str = r#"{"_id":"p1","name":"Ann","email":"a@x.com","comment":"hi"}"#;

    #[tokio::test]
    async fn test_article_page() {
        let response = article_handler(State(state()), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("comment-form"));
    }

    #[tokio::test]
    async fn test_unknown_article_is_404() {
        let response = article_handler(State(state()), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_lists_articles() {
        let response = index_handler(State(state())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("/post/hello"));
    }

    #[tokio::test]
    async fn test_article_page_with_partial_comment() {
        let store = store();
        store
            .insert(json!({"_id": "c1", "_type": "comment", "post": {"_type": "reference", "_ref": "p1"},
                           "name": "Bob", "comment": "no email here", "approved": true}))
            .await;
        let response = article_handler(State(state_for(store)), Path("hello".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("no email here"));
    }

    #[tokio::test]
    async fn test_routes_create_comment() {
        let response = send("GET", "/api/createComment", "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = send("POST", "/api/createComment", VALID).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["comment"]["post"]["_ref"], "p1");
    }

    #[tokio::test]
    async fn test_routes_get_comments() {
        let response = send("POST", "/api/getComments?postId=p1", "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");

        let response = send("GET", "/api/getComments?postId=p1", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"comments":[]}"#);

        let response = send("GET", "/api/getComments", "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_routes_pages_and_fallback() {
        let response = send("GET", "/post/hello", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send("GET", "/post/missing", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send("GET", "/nope", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("404"));
    }

    async fn serve_on_ephemeral_port(state: Arc<ServerState>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_page_controller_against_running_server() {
        let base_url = serve_on_ephemeral_port(state()).await;
        let api = HttpCommentsApi::new(&base_url).unwrap();
        let mut controller = PageController::for_post(api, "p1", Vec::new(), MergeStrategy::ById);
        controller.mount().await;
        assert!(controller.thread().is_empty());

        let form = controller.form_mut();
        form.name = "Ann".to_string();
        form.email = "a@x.com".to_string();
        form.comment = "hi".to_string();

        assert_eq!(controller.submit().await, SubmitOutcome::Reconciled);
        let comments = controller.thread().comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[0].approved);
        assert_eq!(comments[0].comment, "hi");
        assert!(!comments[1].approved);
    }

    #[tokio::test]
    async fn test_failed_write_on_server_still_refetches() {
        let base_url = serve_on_ephemeral_port(state()).await;
        let api = HttpCommentsApi::new(&base_url).unwrap();
        // No such article, so the store rejects the post reference
        let mut controller =
            PageController::for_post(api, "ghost", Vec::new(), MergeStrategy::ById);
        let form = controller.form_mut();
        form.name = "Ann".to_string();
        form.email = "a@x.com".to_string();
        form.comment = "hi".to_string();

        assert_eq!(controller.submit().await, SubmitOutcome::Reconciled);
        assert_eq!(controller.thread().pending().count(), 1);
        assert!(controller.form().name.is_empty());
    }
}
