//! Embedded chat UI assets.
//!
//! The files under `frontend/` are compiled into the binary with
//! `include_str!`, so `larder serve` needs nothing on disk besides the
//! database and the embedding model.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

const INDEX_HTML: &str = include_str!("../../frontend/index.html");
const STYLE_CSS: &str = include_str!("../../frontend/style.css");
const APP_JS: &str = include_str!("../../frontend/app.js");

/// Routes serving the chat page and its static assets.
pub fn frontend_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index_handler))
        .route("/static/style.css", get(|| asset("text/css; charset=utf-8", STYLE_CSS)))
        .route(
            "/static/app.js",
            get(|| asset("application/javascript; charset=utf-8", APP_JS)),
        )
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn asset(content_type: &'static str, body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_path(path: &str) -> Response {
        frontend_router::<()>()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn serves_index_html() {
        let response = get_path("/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("<!DOCTYPE html>"));
        assert!(text.contains("Cooking Assistant Chatbot"));
        assert!(text.contains("Ask for a recipe"));
    }

    #[tokio::test]
    async fn serves_assets_with_content_types() {
        let css = get_path("/static/style.css").await;
        assert_eq!(css.status(), StatusCode::OK);
        assert!(css.headers()[header::CONTENT_TYPE].to_str().unwrap().contains("text/css"));

        let js = get_path("/static/app.js").await;
        assert_eq!(js.status(), StatusCode::OK);
        assert!(js.headers()[header::CONTENT_TYPE].to_str().unwrap().contains("javascript"));
        let body = js.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("/api/chat"));
    }
}
