//! Publish invoker.
//!
//! Runs the external publish script for a named dashboard and interprets
//! its output. The script is a boundary collaborator: this module only
//! spawns it, feeds the confirmation prompt, bounds the run with a
//! timeout, and filters the combined output into something worth showing.
//! Failures of every kind come back as a structured outcome, never as an
//! error the caller has to handle.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;

use crate::error::Result;

/// Default wall-clock limit for a publish run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Output lines mentioning these terms are git plumbing noise and dropped.
const GIT_NOISE: [&str; 6] = [
    "git ",
    "github.com",
    "commit",
    "push",
    "branch",
    "repository",
];

/// Result of a publish run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishOutcome {
    pub success: bool,
    /// Filtered script output.
    pub output: String,
    /// Human-readable failure summary; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Published dashboard URL extracted from the script output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PublishOutcome {
    fn failure(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
            url: None,
        }
    }
}

/// Validate a dashboard name before it reaches the shell: non-empty, no
/// path separators, no parent references.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// List dashboards that can be published: the immediate non-hidden
/// subdirectories of the content root.
pub fn available_dashboards(root: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    Ok(names)
}

/// Runs the external publish script.
#[derive(Debug, Clone)]
pub struct Publisher {
    script: PathBuf,
    workdir: PathBuf,
    timeout: Duration,
}

impl Publisher {
    pub fn new(script: PathBuf, workdir: PathBuf) -> Self {
        Self {
            script,
            workdir,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the publish script for `name`.
    ///
    /// Spawn failures, non-zero exits, and timeouts all come back as a
    /// structured failure; a hung script is killed when the timeout
    /// expires.
    pub async fn publish(&self, name: &str) -> PublishOutcome {
        if !is_valid_name(name) {
            return PublishOutcome::failure(
                "Error: invalid dashboard name",
                "Invalid dashboard name",
            );
        }

        tracing::info!("publishing dashboard '{}'", name);

        let mut child = match Command::new(&self.script)
            .arg(name)
            .current_dir(&self.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!("publish script failed to start: {}", err);
                return PublishOutcome::failure(format!("Error: {err}"), err.to_string());
            }
        };

        // Answer any confirmation prompt so the script cannot stall on
        // interactive input.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(b"y\n").await;
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return PublishOutcome::failure(format!("Error: {err}"), err.to_string());
            }
            Err(_) => {
                let secs = self.timeout.as_secs();
                tracing::warn!("publish of '{}' timed out after {}s", name, secs);
                return PublishOutcome::failure(
                    format!("Error: publish did not finish within {secs}s"),
                    "Publish timed out",
                );
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let (filtered, url) = filter_output(&combined);

        if output.status.success() {
            tracing::info!("dashboard '{}' published", name);
            PublishOutcome {
                success: true,
                output: filtered,
                error: None,
                url,
            }
        } else {
            tracing::warn!("publish of '{}' failed: {}", name, output.status);
            PublishOutcome {
                success: false,
                output: filtered,
                error: Some("Publishing failed".to_string()),
                url,
            }
        }
    }
}

/// Strip git plumbing chatter from the script output and pull out the
/// published URL, if any.
fn filter_output(raw: &str) -> (String, Option<String>) {
    let mut kept = Vec::new();
    let mut url = None;

    for line in raw.lines() {
        if url.is_none() && line.contains("Dashboard URL:") {
            url = line
                .split_whitespace()
                .find(|token| token.starts_with("https://"))
                .map(str::to_string);
        }

        let lowered = line.to_lowercase();
        if GIT_NOISE.iter().any(|term| lowered.contains(term)) {
            continue;
        }
        if line.starts_with("Warning: You have uncommitted changes") {
            continue;
        }
        if line.is_empty() || line.starts_with("==") || line.starts_with("To ") {
            continue;
        }
        kept.push(line);
    }

    (kept.join("\n"), url)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod name_tests {
        use super::*;

        #[test]
        fn plain_names_are_valid() {
            assert!(is_valid_name("my_dashboard"));
            assert!(is_valid_name("test-dashboard-5"));
        }

        #[test]
        fn empty_and_path_like_names_are_rejected() {
            assert!(!is_valid_name(""));
            assert!(!is_valid_name("a/b"));
            assert!(!is_valid_name("a\\b"));
            assert!(!is_valid_name(".."));
            assert!(!is_valid_name("..hidden"));
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn git_chatter_is_dropped() {
            let raw = "Building dashboard\n\
                       git push origin main\n\
                       Pushed to github.com/user/repo\n\
                       On branch gh-pages\n\
                       Done";
            let (filtered, _) = filter_output(raw);
            assert_eq!(filtered, "Building dashboard\nDone");
        }

        #[test]
        fn banner_and_warning_lines_are_dropped() {
            let raw = "== Publishing ==\n\
                       Warning: You have uncommitted changes in your tree\n\
                       To publish manually, run the script\n\
                       Dashboard built";
            let (filtered, _) = filter_output(raw);
            assert_eq!(filtered, "Dashboard built");
        }

        #[test]
        fn dashboard_url_is_extracted() {
            let raw = "Dashboard URL: https://user.example.io/test_dashboard/\nDone";
            let (_, url) = filter_output(raw);
            assert_eq!(
                url.as_deref(),
                Some("https://user.example.io/test_dashboard/")
            );
        }

        #[test]
        fn missing_url_yields_none() {
            let (_, url) = filter_output("no urls here\n");
            assert!(url.is_none());
        }
    }

    #[cfg(unix)]
    mod run_tests {
        use super::*;
        use std::os::unix::fs::PermissionsExt as _;

        fn write_script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("publish_dashboard.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn successful_script_yields_success_and_url() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(
                dir.path(),
                "read answer\n\
                 echo \"Publishing $1\"\n\
                 echo \"Dashboard URL: https://example.io/$1/\"",
            );
            let outcome = Publisher::new(script, dir.path().to_path_buf())
                .publish("demo")
                .await;
            assert!(outcome.success);
            assert!(outcome.error.is_none());
            assert_eq!(outcome.url.as_deref(), Some("https://example.io/demo/"));
            assert!(outcome.output.contains("Publishing demo"));
        }

        #[tokio::test]
        async fn failing_script_yields_structured_failure() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(dir.path(), "echo \"boom\" >&2\nexit 1");
            let outcome = Publisher::new(script, dir.path().to_path_buf())
                .publish("demo")
                .await;
            assert!(!outcome.success);
            assert_eq!(outcome.error.as_deref(), Some("Publishing failed"));
            assert!(outcome.output.contains("boom"));
        }

        #[tokio::test]
        async fn hung_script_is_killed_at_the_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let script = write_script(dir.path(), "sleep 30");
            let outcome = Publisher::new(script, dir.path().to_path_buf())
                .with_timeout(Duration::from_millis(300))
                .publish("demo")
                .await;
            assert!(!outcome.success);
            assert_eq!(outcome.error.as_deref(), Some("Publish timed out"));
        }

        #[tokio::test]
        async fn missing_script_yields_structured_failure() {
            let dir = tempfile::tempdir().unwrap();
            let outcome = Publisher::new(
                dir.path().join("no_such_script.sh"),
                dir.path().to_path_buf(),
            )
            .publish("demo")
            .await;
            assert!(!outcome.success);
            assert!(outcome.error.is_some());
        }

        #[tokio::test]
        async fn invalid_name_is_rejected_without_spawning() {
            let dir = tempfile::tempdir().unwrap();
            let outcome = Publisher::new(
                dir.path().join("no_such_script.sh"),
                dir.path().to_path_buf(),
            )
            .publish("../escape")
            .await;
            assert!(!outcome.success);
            assert_eq!(outcome.error.as_deref(), Some("Invalid dashboard name"));
        }
    }

    mod dashboards_tests {
        use super::*;

        #[test]
        fn lists_non_hidden_subdirectories_sorted() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("zeta")).unwrap();
            std::fs::create_dir(dir.path().join("alpha")).unwrap();
            std::fs::create_dir(dir.path().join(".hidden")).unwrap();
            std::fs::write(dir.path().join("file.txt"), "x").unwrap();

            let names = available_dashboards(dir.path()).unwrap();
            assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
        }

        #[test]
        fn missing_root_is_an_error() {
            assert!(available_dashboards(Path::new("/nonexistent/root")).is_err());
        }
    }
}
