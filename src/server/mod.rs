//! HTTP server for the dashboard.
//!
//! Thin axum layer over the sidebar cell, content resolver, and publish
//! invoker. All state is shared through one `Arc<AppState>`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | / | Main page with the current sidebar |
//! | GET | /refresh_sidebar | Re-transform and return fresh markup |
//! | POST | /open_url | Record the window the frontend opened |
//! | GET | /get_current_window | Last recorded window (or nulls) |
//! | GET/POST | /api/publish/{name} | Run the publish script |
//! | GET | /api/dashboards | List publishable dashboards |
//! | GET | /{*path} | Views, markdown/text pages, raw files |

mod handlers;
pub mod types;

pub use handlers::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Start the HTTP server.
///
/// Binds `127.0.0.1:port` (port 0 picks a free port) and serves in a
/// background task. Returns the actual bound address and a cancellation
/// token for graceful shutdown.
pub async fn start_server(
    port: u16,
    state: Arc<AppState>,
) -> anyhow::Result<(SocketAddr, CancellationToken)> {
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("dashboard server listening on http://{}", actual_addr);

    let shutdown_token = CancellationToken::new();
    let server_shutdown = shutdown_token.clone();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
        {
            tracing::error!("server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_token))
}

/// Create the router with all routes configured.
///
/// Separated from `start_server` so handler tests can drive the router
/// directly.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/refresh_sidebar", get(handlers::refresh_sidebar))
        .route("/open_url", post(handlers::open_url))
        .route("/get_current_window", get(handlers::get_current_window))
        .route(
            "/api/publish/{name}",
            get(handlers::publish_dashboard).post(handlers::publish_dashboard),
        )
        .route("/api/dashboards", get(handlers::dashboards))
        .route("/{*path}", get(handlers::content))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ViewRegistry;
    use crate::publish::Publisher;
    use crate::state::SidebarCell;
    use std::path::PathBuf;

    fn test_state() -> Arc<AppState> {
        let root = PathBuf::from("/tmp");
        AppState::new(
            SidebarCell::new("<div class=\"sidebar-title\">T</div>".to_string()),
            ViewRegistry::default(),
            root.clone(),
            root.join("sidebar.md"),
            Publisher::new(root.join("publish_dashboard.sh"), root),
        )
    }

    #[tokio::test]
    async fn start_server_binds_to_a_free_port() {
        let (addr, shutdown) = start_server(0, test_state())
            .await
            .expect("server should start");
        assert!(addr.port() > 0);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn start_server_returns_shutdown_token() {
        let (_, shutdown) = start_server(0, test_state())
            .await
            .expect("server should start");
        assert!(!shutdown.is_cancelled());
        shutdown.cancel();
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn create_router_returns_router() {
        let _router = create_router(test_state());
    }
}
