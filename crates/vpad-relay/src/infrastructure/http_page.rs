//! The entry page and the plain-HTTP responses of the relay.
//!
//! The relay listens on a single port.  Besides the WebSocket path it answers
//! `GET /` and `GET /index.html` with the controller entry page; everything
//! else falls through to `404 Not Found`.  Routing itself lives in
//! [`super::ws_server::build_router`].
//!
//! # Page templating
//!
//! The page is loaded once at startup.  Every occurrence of
//! [`WS_PATH_PLACEHOLDER`] is replaced with the configured WebSocket path as a
//! quoted JavaScript string literal, so the page always connects to the path
//! the relay actually serves.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};

/// Built-in page served when no `--page` file is configured.
const BUILTIN_PAGE: &str = include_str!("../../assets/index.html");

/// Token replaced by the quoted WebSocket path when the page is loaded.
pub const WS_PATH_PLACEHOLDER: &str = "__VPAD_WS_PATH__";

/// Loads the page to serve at `/` and fills in `ws_path`.
///
/// # Errors
///
/// Returns an error if a configured page file cannot be read.
pub async fn load_page(path: Option<&Path>, ws_path: &str) -> anyhow::Result<String> {
    let template = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read page {}", path.display()))?,
        None => BUILTIN_PAGE.to_string(),
    };
    render_page(&template, ws_path)
}

/// Substitutes the WebSocket path into a page template.
///
/// # Errors
///
/// Returns an error if the path cannot be encoded as a string literal.
pub fn render_page(template: &str, ws_path: &str) -> anyhow::Result<String> {
    let literal = serde_json::to_string(ws_path).context("failed to encode WebSocket path")?;
    Ok(template.replace(WS_PATH_PLACEHOLDER, &literal))
}

/// The rendered entry page, shared by every request.
#[derive(Debug, Clone)]
pub struct EntryPage(pub Arc<str>);

impl From<String> for EntryPage {
    fn from(page: String) -> Self {
        Self(page.into())
    }
}

/// `GET /` and `GET /index.html`.
pub async fn serve_page(State(page): State<EntryPage>) -> impl IntoResponse {
    Html(page.0.to_string())
}

/// Fallback for every unrouted request.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found\n")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_builtin_page_connects_to_default_path() {
        let page = load_page(None, "/ws").await.unwrap();

        assert!(page.contains(r#""/ws""#));
        assert!(!page.contains(WS_PATH_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_builtin_page_follows_custom_ws_path() {
        // Act
        let page = load_page(None, "/pad/socket").await.unwrap();

        // Assert: the script targets the configured path, not the default.
        assert!(page.contains(r#"const wsPath = "/pad/socket";"#));
        assert!(!page.contains(r#""/ws""#));
    }

    #[tokio::test]
    async fn test_custom_page_file_is_templated() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<script>connect(__VPAD_WS_PATH__)</script>").unwrap();

        // Act
        let page = load_page(Some(file.path()), "/relay").await.unwrap();

        // Assert
        assert_eq!(page, r#"<script>connect("/relay")</script>"#);
    }

    #[tokio::test]
    async fn test_load_page_missing_file_is_error() {
        let result = load_page(Some(Path::new("/definitely/not/here.html")), "/ws").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_render_page_escapes_quotes() {
        let page = render_page("x = __VPAD_WS_PATH__;", "/a\"b").unwrap();
        assert_eq!(page, r#"x = "/a\"b";"#);
    }

    #[test]
    fn test_render_page_without_placeholder_is_unchanged() {
        let page = render_page("<p>static</p>", "/ws").unwrap();
        assert_eq!(page, "<p>static</p>");
    }
}
