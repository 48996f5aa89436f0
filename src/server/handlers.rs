//! HTTP request handlers for the dashboard server.
//!
//! Each handler is a thin adapter between axum and the underlying modules:
//! the sidebar cell, the content resolver, and the publish invoker.
//! Nothing here can panic on bad input; the worst a request gets back is a
//! clean not-found or error response.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use parking_lot::RwLock;

use super::types::{
    DashboardsResponse, ErrorResponse, OpenUrlRequest, RefreshResponse, StatusResponse,
    WindowInfo, DEFAULT_WINDOW_TITLE,
};
use crate::content::{self, Resolved, ViewRegistry};
use crate::pages;
use crate::publish::{self, Publisher};
use crate::sidebar;
use crate::state::SidebarCell;

/// Application state shared across all handlers.
pub struct AppState {
    /// Current rendered sidebar markup.
    pub sidebar: SidebarCell,
    /// Named views discovered at startup.
    pub views: ViewRegistry,
    /// Window last recorded via `POST /open_url`.
    pub current_window: RwLock<WindowInfo>,
    /// Root directory content is served from.
    pub content_root: PathBuf,
    /// Watched sidebar source file.
    pub sidebar_path: PathBuf,
    /// Publish script runner.
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(
        sidebar: SidebarCell,
        views: ViewRegistry,
        content_root: PathBuf,
        sidebar_path: PathBuf,
        publisher: Publisher,
    ) -> Arc<Self> {
        Arc::new(Self {
            sidebar,
            views,
            current_window: RwLock::new(WindowInfo::default()),
            content_root,
            sidebar_path,
            publisher,
        })
    }
}

// =============================================================================
// Sidebar page and refresh
// =============================================================================

/// Main page with the current sidebar embedded.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(pages::index_page(&state.sidebar.current()))
}

/// Force a re-transformation of the sidebar source.
///
/// The fresh markup is stored in the shared cell and returned to the
/// caller, so the next `GET /` and this response agree.
pub async fn refresh_sidebar(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let markup = sidebar::transform_file(&state.sidebar_path);
    state.sidebar.replace(markup.clone());
    Json(RefreshResponse::new(markup))
}

// =============================================================================
// Window state
// =============================================================================

/// Record the URL/title of the window the frontend just opened.
///
/// Always returns 200; a missing URL is reported in the status body, not
/// as an HTTP error.
pub async fn open_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenUrlRequest>,
) -> Json<StatusResponse> {
    let Some(url) = req.url.filter(|u| !u.is_empty()) else {
        return Json(StatusResponse::error("No URL provided"));
    };

    let title = req
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_WINDOW_TITLE.to_string());

    let message = format!("Updated window info for {url}");
    *state.current_window.write() = WindowInfo {
        url: Some(url),
        title: Some(title),
    };
    Json(StatusResponse::success(message))
}

/// Last recorded window, or nulls if none was recorded yet.
pub async fn get_current_window(State(state): State<Arc<AppState>>) -> Json<WindowInfo> {
    Json(state.current_window.read().clone())
}

// =============================================================================
// Publish API
// =============================================================================

/// Run the publish script for a named dashboard.
///
/// # Response
///
/// - `200 OK`: `{success, output, error?, url?}` (success may be false)
/// - `400 Bad Request`: the name failed validation
///
/// Responses carry `Cache-Control: no-store` so a browser never shows a
/// stale publish result.
pub async fn publish_dashboard(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    if !publish::is_valid_name(&name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_code(
                format!("Invalid dashboard name '{name}'"),
                "INVALID_DASHBOARD",
            )),
        )
            .into_response();
    }

    let outcome = state.publisher.publish(&name).await;
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(outcome),
    )
        .into_response()
}

/// List the dashboards available for publishing.
pub async fn dashboards(State(state): State<Arc<AppState>>) -> Json<DashboardsResponse> {
    match publish::available_dashboards(&state.content_root) {
        Ok(dashboards) => Json(DashboardsResponse {
            success: true,
            dashboards,
            error: String::new(),
        }),
        Err(err) => Json(DashboardsResponse {
            success: false,
            dashboards: Vec::new(),
            error: err.to_string(),
        }),
    }
}

// =============================================================================
// Content resolution
// =============================================================================

/// Serve everything that is not a reserved endpoint: registered views,
/// markdown pages, text pages, and raw files under the content root.
pub async fn content(State(state): State<Arc<AppState>>, Path(request): Path<String>) -> Response {
    match content::resolve(&state.content_root, &state.views, &request) {
        Resolved::View(path) => serve_html_file(&path, &request).await,
        Resolved::Markdown(path) => match tokio::fs::read_to_string(&path).await {
            Ok(source) => {
                let title = file_stem(&path);
                Html(pages::markdown_page(&title, &content::render_markdown(&source)))
                    .into_response()
            }
            Err(err) => not_found(&request, Some(err)),
        },
        Resolved::Text(path) => match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let title = file_stem(&path);
                Html(pages::text_page(&title, &text)).into_response()
            }
            Err(err) => not_found(&request, Some(err)),
        },
        Resolved::File(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let content_type =
                    content::content_type_for(path.extension().and_then(|e| e.to_str()));
                ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
            }
            Err(err) => not_found(&request, Some(err)),
        },
        Resolved::NotFound => not_found(&request, None),
    }
}

async fn serve_html_file(path: &std::path::Path, request: &str) -> Response {
    match tokio::fs::read_to_string(path).await {
        Ok(markup) => Html(markup).into_response(),
        Err(err) => not_found(request, Some(err)),
    }
}

fn file_stem(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Content")
        .to_string()
}

fn not_found(request: &str, err: Option<std::io::Error>) -> Response {
    if let Some(err) = err {
        tracing::debug!("could not serve '{}': {}", request, err);
    }
    (
        StatusCode::NOT_FOUND,
        Html(pages::not_found_page(request)),
    )
        .into_response()
}
