//! Content resolution.
//!
//! Maps a request path to something servable: a registered view, a
//! markdown page, a preformatted text page, or a raw file under the
//! content root. Parent-directory traversal is rejected on the request
//! string before any filesystem access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pulldown_cmark::{html, Options, Parser};

/// Registry of named views discovered at startup.
///
/// Maps a file stem (`sample`) to the view file that renders it. Built
/// once before serving begins and immutable afterwards; files added to the
/// views directory at runtime are not picked up.
#[derive(Debug, Default, Clone)]
pub struct ViewRegistry {
    views: HashMap<String, PathBuf>,
}

impl ViewRegistry {
    /// Scan a directory for view files. A missing or unreadable directory
    /// yields an empty registry rather than an error.
    pub fn discover(dir: &Path) -> Self {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(read) => read
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            Err(err) => {
                tracing::debug!("views directory {} not scanned: {}", dir.display(), err);
                Vec::new()
            }
        };
        // Deterministic on duplicate stems: the lexicographically first
        // file wins.
        entries.sort();

        let mut views = HashMap::new();
        for path in entries {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                views.entry(stem.to_string()).or_insert(path);
            }
        }
        Self { views }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.views.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A registered view file, served as HTML.
    View(PathBuf),
    /// A markdown file, rendered inside the document shell.
    Markdown(PathBuf),
    /// A plain-text file, served escaped and preformatted.
    Text(PathBuf),
    /// Any other existing file, served raw with an inferred content type.
    File(PathBuf),
    /// Nothing matched, or the path was rejected.
    NotFound,
}

/// True when any path segment is a parent-directory reference.
pub fn is_traversal(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Resolve a request path against the content root and the view registry.
///
/// A literal file always wins; the registry is only consulted when no file
/// exists at the requested path.
pub fn resolve(root: &Path, registry: &ViewRegistry, request: &str) -> Resolved {
    if is_traversal(request) {
        return Resolved::NotFound;
    }
    let relative = request.trim_start_matches('/');
    if relative.is_empty() {
        return Resolved::NotFound;
    }

    let candidate = root.join(relative);
    if candidate.is_file() {
        return match candidate.extension().and_then(|e| e.to_str()) {
            Some("md") => Resolved::Markdown(candidate),
            Some("txt") => Resolved::Text(candidate),
            _ => Resolved::File(candidate),
        };
    }

    let stem = Path::new(relative).file_stem().and_then(|s| s.to_str());
    if let Some(view) = stem.and_then(|s| registry.get(s)) {
        return Resolved::View(view.to_path_buf());
    }

    Resolved::NotFound
}

/// Render markdown source to bare HTML (no document shell).
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(source, options));
    out
}

/// Infer a content type from a file extension.
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
