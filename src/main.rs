//! Sidedash - local sidebar dashboard server.
//!
//! # Usage
//!
//! ```bash
//! # Serve the current directory on the default port
//! sidedash
//!
//! # Serve a project directory with a custom sidebar source
//! sidedash ~/dashboards --sidebar nav.md --port 9000
//! ```
//!
//! The sidebar is rendered from the watched markdown file before the
//! server accepts its first request, and re-rendered on every change.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use sidedash::content::ViewRegistry;
use sidedash::publish::{self, Publisher};
use sidedash::server::{self, AppState};
use sidedash::state::SidebarCell;
use sidedash::{sidebar, watcher, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("sidedash={}", log_level).parse()?),
        )
        .try_init();

    let root = args.resolve_root()?;
    let sidebar_path = root.join(&args.sidebar);
    let views_dir = root.join(&args.views);

    let views = ViewRegistry::discover(&views_dir);
    tracing::info!(
        "registered {} views from {}",
        views.len(),
        views_dir.display()
    );

    // Initial render happens before the server accepts requests.
    let cell = SidebarCell::new(sidebar::transform_file(&sidebar_path));

    // A failed watch leaves the server running on manual refreshes only.
    let _watch = match watcher::spawn(sidebar_path.clone(), cell.clone()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!("sidebar watch disabled: {}", err);
            None
        }
    };

    match publish::available_dashboards(&root) {
        Ok(dashboards) => {
            for name in &dashboards {
                tracing::info!("dashboard available: /{}/", name);
            }
        }
        Err(err) => tracing::debug!("could not list dashboards: {}", err),
    }

    let publisher = Publisher::new(args.publish_script.clone(), root.clone())
        .with_timeout(Duration::from_secs(args.publish_timeout));

    let state = AppState::new(cell, views, root, sidebar_path, publisher);
    let (addr, shutdown) = server::start_server(args.port, state).await?;
    tracing::info!("open http://{} in your browser", addr);

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    shutdown.cancel();

    Ok(())
}
