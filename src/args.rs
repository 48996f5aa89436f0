//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for the dashboard server. Everything
//! is a fixed constant with a flag override; there is no config file.

use clap::Parser;
use std::path::PathBuf;

use crate::publish;

/// Sidedash - local sidebar dashboard server
#[derive(Parser, Debug, Clone)]
#[command(name = "sidedash")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Content root served by the dashboard (default: current directory)
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "SIDEDASH_PORT")]
    pub port: u16,

    /// Sidebar markdown source, relative to the content root
    #[arg(long, default_value = "sidebar.md")]
    pub sidebar: PathBuf,

    /// Views directory, relative to the content root
    #[arg(long, default_value = "views")]
    pub views: PathBuf,

    /// Publish script executed by the publish API
    #[arg(long, default_value = "./publish_dashboard.sh")]
    pub publish_script: PathBuf,

    /// Publish timeout in seconds
    #[arg(long, default_value_t = publish::DEFAULT_TIMEOUT_SECS)]
    pub publish_timeout: u64,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the content root to an absolute path.
    ///
    /// Returns an error if the path does not exist or is not a directory.
    pub fn resolve_root(&self) -> anyhow::Result<PathBuf> {
        let canonical = self.root.canonicalize().map_err(|e| {
            anyhow::anyhow!(
                "Content root '{}' does not exist or is not accessible: {}",
                self.root.display(),
                e
            )
        })?;

        if !canonical.is_dir() {
            anyhow::bail!("Content root '{}' is not a directory", canonical.display());
        }

        Ok(canonical)
    }
}
