//! Markdown-to-sidebar transformation.
//!
//! Converts the watched markdown document into sidebar-ready markup: the
//! first level-1 heading becomes the title block, every level-2 heading
//! starts a named section (with a divider between sections, never before
//! the first), and every link is annotated with its external/internal
//! classification.
//!
//! The transform operates on the parsed event stream, never on rendered
//! HTML text. Each link and heading is rewritten in place by position, so
//! a document containing two identical list items cannot be corrupted the
//! way textual search-and-replace would corrupt it.

use std::path::Path;

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::pages::escape_html;

/// Title used when the document has no level-1 heading.
pub const DEFAULT_TITLE: &str = "Dashboard";

/// Divider inserted between sections.
pub const DIVIDER: &str = "<hr class=\"sidebar-divider\">\n";

const SECTION_OPEN: &str = "<div class=\"section-title\">";
const SECTION_CLOSE: &str = "</div>\n";

/// Classify a link target.
///
/// External iff the target starts with the literal scheme prefix
/// `http://` or `https://` (case-sensitive). Everything else (relative
/// paths, in-process routes, anchors, other schemes) is internal. The
/// classification depends only on the target string, never on context.
pub fn is_external(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Transform markdown source into sidebar markup.
///
/// Never fails: the parser accepts arbitrary text and renders best-effort.
/// Transforming the same source twice yields byte-identical output.
pub fn transform(source: &str) -> String {
    let mut title: Vec<Event> = Vec::new();
    let mut body: Vec<Event> = Vec::new();
    let mut in_title = false;
    let mut have_title = false;
    let mut seen_section = false;

    for event in Parser::new_ext(source, parser_options()) {
        // Links are rewritten first so the annotation applies uniformly,
        // wherever the link appears.
        let event = match event {
            Event::Start(Tag::Link {
                dest_url,
                title: link_title,
                ..
            }) => Event::InlineHtml(link_open_tag(&dest_url, &link_title).into()),
            Event::End(TagEnd::Link) => Event::InlineHtml("</a>".into()),
            other => other,
        };

        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if !have_title => {
                in_title = true;
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_title => {
                in_title = false;
                have_title = true;
            }
            Event::Start(Tag::Heading {
                level: HeadingLevel::H2,
                ..
            }) => {
                if seen_section {
                    body.push(Event::Html(DIVIDER.into()));
                }
                seen_section = true;
                body.push(Event::Html(SECTION_OPEN.into()));
            }
            Event::End(TagEnd::Heading(HeadingLevel::H2)) => {
                body.push(Event::Html(SECTION_CLOSE.into()));
            }
            event if in_title => title.push(event),
            event => body.push(event),
        }
    }

    let mut out = String::new();
    out.push_str("<div class=\"sidebar-title\">");
    if title.is_empty() {
        out.push_str(DEFAULT_TITLE);
    } else {
        html::push_html(&mut out, title.into_iter());
    }
    out.push_str("</div>\n");
    html::push_html(&mut out, body.into_iter());
    out
}

/// Transform the sidebar source file.
///
/// Any read failure (missing file, permissions, not UTF-8) falls back to
/// the fixed placeholder markup rather than an error.
pub fn transform_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => transform(&source),
        Err(err) => {
            tracing::debug!("sidebar source {} unreadable: {}", path.display(), err);
            fallback_markup()
        }
    }
}

/// Markup served when no sidebar source exists.
pub fn fallback_markup() -> String {
    format!(
        "<div class=\"sidebar-title\">{DEFAULT_TITLE}</div>\n\
         <p>No sidebar content yet. Create the sidebar markdown file to populate this pane.</p>\n"
    )
}

fn link_open_tag(dest: &str, title: &str) -> String {
    let external = is_external(dest);
    let mut tag = String::with_capacity(dest.len() + 48);
    tag.push_str("<a href=\"");
    tag.push_str(&escape_html(dest));
    tag.push('"');
    if !title.is_empty() {
        tag.push_str(" title=\"");
        tag.push_str(&escape_html(title));
        tag.push('"');
    }
    tag.push_str(" data-external=\"");
    tag.push_str(if external { "true" } else { "false" });
    tag.push('"');
    if external {
        tag.push_str(" class=\"external-link\"");
    }
    tag.push('>');
    tag
}
