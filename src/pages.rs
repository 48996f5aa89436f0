//! HTML page assembly.
//!
//! Fixed document shells for everything the server renders: the main
//! sidebar page, markdown and plain-text content pages, and the not-found
//! page. Shells are plain templates with `{{placeholder}}` tokens; no
//! templating language is involved.

/// Escape text for safe inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Dashboard</title>
<style>
  * { box-sizing: border-box; }
  body { margin: 0; font-family: -apple-system, "Segoe UI", Arial, sans-serif; display: flex; height: 100vh; }
  .sidebar { width: 250px; min-width: 250px; background: #2c3e50; color: #ecf0f1; padding: 16px; overflow-y: auto; }
  .sidebar a { color: #74b9ff; text-decoration: none; display: block; padding: 4px 0; }
  .sidebar a:hover { text-decoration: underline; }
  .sidebar a.external-link::after { content: " \2197"; font-size: 0.8em; }
  .sidebar ul { list-style: none; margin: 0; padding: 0; }
  .sidebar-title { font-size: 1.3em; font-weight: bold; margin-bottom: 12px; }
  .section-title { font-size: 0.85em; text-transform: uppercase; letter-spacing: 0.05em; color: #95a5a6; margin: 12px 0 4px; }
  .sidebar-divider { border: none; border-top: 1px solid #44607b; margin: 12px 0; }
  .content { flex: 1; display: flex; flex-direction: column; }
  #content-frame { flex: 1; border: none; width: 100%; }
  #status-bar { height: 24px; line-height: 24px; padding: 0 8px; background: #ecf0f1; color: #2c3e50; font-size: 0.8em; border-top: 1px solid #bdc3c7; }
</style>
</head>
<body>
  <nav class="sidebar">
{{sidebar}}
  </nav>
  <main class="content">
    <iframe id="content-frame" name="content" src="about:blank"></iframe>
    <div id="status-bar">Ready</div>
  </main>
  <script>
    document.addEventListener('DOMContentLoaded', () => {
      const frame = document.getElementById('content-frame');
      const status = document.getElementById('status-bar');
      document.querySelectorAll('.sidebar a').forEach((link) => {
        link.addEventListener('click', (event) => {
          event.preventDefault();
          if (link.getAttribute('data-external') === 'true') {
            window.open(link.href, link.textContent);
            fetch('/open_url', {
              method: 'POST',
              headers: { 'Content-Type': 'application/json' },
              body: JSON.stringify({ url: link.href, title: link.textContent }),
            }).catch(() => {});
            status.textContent = 'Opened: ' + link.textContent;
          } else {
            frame.src = link.href;
            status.textContent = 'Loaded: ' + link.textContent;
          }
        });
      });
    });
  </script>
</body>
</html>
"#;

const DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
  body { max-width: 800px; margin: 0 auto; padding: 24px; font-family: -apple-system, "Segoe UI", Arial, sans-serif; color: #2c3e50; }
  h1, h2, h3 { color: #2c3e50; }
  pre { background: #f8f9fa; padding: 15px; border-radius: 5px; overflow-x: auto; white-space: pre-wrap; }
  code { background: #f8f9fa; padding: 1px 4px; border-radius: 3px; }
  table { border-collapse: collapse; }
  td, th { border: 1px solid #bdc3c7; padding: 4px 8px; }
  blockquote { border-left: 3px solid #bdc3c7; margin-left: 0; padding-left: 12px; color: #7f8c8d; }
</style>
</head>
<body>
{{content}}
</body>
</html>
"#;

/// Main page with the current sidebar markup embedded.
pub fn index_page(sidebar_markup: &str) -> String {
    INDEX_TEMPLATE.replace("{{sidebar}}", sidebar_markup)
}

/// Rendered markdown wrapped in the styled document shell.
pub fn markdown_page(title: &str, body_html: &str) -> String {
    DOCUMENT_TEMPLATE
        .replace("{{title}}", &escape_html(title))
        .replace("{{content}}", body_html)
}

/// Plain text wrapped in a monospace preformatted shell. The caller passes
/// the raw text; escaping happens here.
pub fn text_page(title: &str, text: &str) -> String {
    let pre = format!("<pre>{}</pre>", escape_html(text));
    DOCUMENT_TEMPLATE
        .replace("{{title}}", &escape_html(title))
        .replace("{{content}}", &pre)
}

/// Not-found page for unresolved request paths.
pub fn not_found_page(request_path: &str) -> String {
    let body = format!("<h1>Content not found: {}</h1>", escape_html(request_path));
    DOCUMENT_TEMPLATE
        .replace("{{title}}", "Not Found")
        .replace("{{content}}", &body)
}
