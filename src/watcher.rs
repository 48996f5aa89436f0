//! File watcher for the sidebar source.
//!
//! Watches the source file's parent directory (non-recursive) with the
//! `notify` crate, filters events down to the exact watched file, and
//! re-runs the sidebar transform on every qualifying change. Results land
//! in the shared [`SidebarCell`]; the processing thread serializes its own
//! transforms, so no two run concurrently against the shared value.
//!
//! ```text
//! +----------+     +-----------+     +--------------------+
//! |  notify  |---->|  channel  |---->| processing thread  |
//! |  watcher |     |  (mpsc)   |     | transform -> cell  |
//! +----------+     +-----------+     +--------------------+
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher as _};

use crate::error::Error;
use crate::sidebar;
use crate::state::SidebarCell;

/// Delay used to drain a burst of events into a single transform.
const DEBOUNCE_MS: u64 = 100;

/// Handle for a running sidebar watcher.
///
/// Dropping the handle stops the watch; the serving process keeps running
/// either way.
pub struct WatcherHandle {
    running: Arc<AtomicBool>,
    // Keeps the OS watcher registered for the lifetime of the handle.
    _watcher: notify::RecommendedWatcher,
}

impl WatcherHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// True when the event is a create/modify/remove touching the watched file.
fn is_sidebar_event(event: &Event, file_name: &OsStr) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name))
}

/// Start watching the sidebar source file.
///
/// The caller performs the initial transform before serving begins; this
/// watcher only handles subsequent changes. Removal of the file triggers a
/// transform too, which lands the fallback markup.
///
/// # Errors
///
/// Returns an error if the watch cannot be established (for instance the
/// parent directory does not exist). Callers are expected to log this and
/// continue serving without live updates.
pub fn spawn(path: PathBuf, cell: SidebarCell) -> Result<WatcherHandle, Error> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(OsStr::to_os_string)
        .ok_or_else(|| Error::Watch(format!("{} has no file name", path.display())))?;

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) if is_sidebar_event(&event, &file_name) => {
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("watch error: {}", err),
        }
    })
    .map_err(|e| Error::Watch(e.to_string()))?;

    watcher
        .watch(&parent, RecursiveMode::NonRecursive)
        .map_err(|e| Error::Watch(e.to_string()))?;

    tracing::info!("watching {} for changes", path.display());

    let running = Arc::new(AtomicBool::new(true));
    let thread_running = Arc::clone(&running);
    std::thread::spawn(move || {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while thread_running.load(Ordering::SeqCst) {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(()) => {
                    // Drain the burst so one editor save triggers one run.
                    while rx.recv_timeout(debounce).is_ok() {}
                    tracing::debug!("sidebar source changed, re-rendering");
                    cell.replace(sidebar::transform_file(&path));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    Ok(WatcherHandle {
        running,
        _watcher: watcher,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    mod event_filter_tests {
        use super::*;

        fn modify_event(path: &str) -> Event {
            Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from(path))
        }

        #[test]
        fn modify_of_watched_file_qualifies() {
            let event = modify_event("/tmp/project/sidebar.md");
            assert!(is_sidebar_event(&event, OsStr::new("sidebar.md")));
        }

        #[test]
        fn modify_of_sibling_file_is_filtered() {
            let event = modify_event("/tmp/project/other.md");
            assert!(!is_sidebar_event(&event, OsStr::new("sidebar.md")));
        }

        #[test]
        fn create_and_remove_qualify() {
            let create = Event::new(EventKind::Create(CreateKind::File))
                .add_path(PathBuf::from("/tmp/p/sidebar.md"));
            let remove = Event::new(EventKind::Remove(RemoveKind::File))
                .add_path(PathBuf::from("/tmp/p/sidebar.md"));
            assert!(is_sidebar_event(&create, OsStr::new("sidebar.md")));
            assert!(is_sidebar_event(&remove, OsStr::new("sidebar.md")));
        }

        #[test]
        fn access_events_are_filtered() {
            let event = Event::new(EventKind::Access(notify::event::AccessKind::Any))
                .add_path(PathBuf::from("/tmp/p/sidebar.md"));
            assert!(!is_sidebar_event(&event, OsStr::new("sidebar.md")));
        }
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn rejects_path_without_file_name() {
            let cell = SidebarCell::new(String::new());
            assert!(spawn(PathBuf::from("/"), cell).is_err());
        }

        #[test]
        fn write_to_watched_file_replaces_cell() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("sidebar.md");
            std::fs::write(&path, "# Before\n").unwrap();

            let cell = SidebarCell::new(sidebar::transform_file(&path));
            let handle = spawn(path.clone(), cell.clone()).unwrap();
            assert!(handle.is_running());

            // Give the watcher a moment to register before writing.
            std::thread::sleep(Duration::from_millis(250));
            std::fs::write(&path, "# After\n## Fresh Section\n").unwrap();

            let deadline = std::time::Instant::now() + Duration::from_secs(10);
            loop {
                if cell.current().contains("Fresh Section") {
                    break;
                }
                assert!(
                    std::time::Instant::now() < deadline,
                    "watcher never applied the change"
                );
                std::thread::sleep(Duration::from_millis(50));
            }

            handle.stop();
            assert!(!handle.is_running());
        }
    }
}
