//! Standalone HTML page around a rendered tree
//!
//! The rendered document is static markup; the inline script below is the
//! browser-side counterpart of `toggle::activate` so the served page stays
//! interactive without any other assets.

use std::io::{self, Write};

use crate::dom::{escape_html, Document};

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, 'Helvetica Neue', Arial, sans-serif; color: #1d1d1f; margin: 2rem; }
    .directory-tree-item { margin-left: 1.25rem; line-height: 1.8; }
    .directory-tree-container > .directory-tree-item { margin-left: 0; }
    .directory-tree-toggle, .directory-tree-spacer { display: inline-block; width: 1rem; }
    .directory-tree-toggle { cursor: pointer; }
    .directory-tree-toggle::before { content: '▸'; color: #86868b; }
    .directory-tree-toggle.expanded::before { content: '▾'; }
    .directory-tree-name-wrapper { cursor: pointer; }
    .directory-tree-count { color: #86868b; font-size: 0.85em; margin-left: 0.35rem; }
    .directory-tree-children { display: none; }
    .directory-tree-children.expanded { display: block; }
    .directory-tree-empty { margin-left: 2.25rem; color: #86868b; font-size: 0.85em; }
    .directory-tree-item.file a { color: #007aff; text-decoration: none; }
    .directory-tree-file-meta { font-size: 0.8em; color: #86868b; }
    .directory-tree-file-meta span + span { margin-left: 0.75rem; }
    .directory-tree-loading { color: #999; text-align: center; padding: 20px; }
    .directory-tree-error { color: #f56c6c; padding: 20px; text-align: center; background: #fef0f0; border-radius: 4px; }
    .directory-tree-error-reason, .directory-tree-error-hint { font-size: 12px; color: #999; }
"#;

const SCRIPT: &str = r#"
document.addEventListener('click', function (e) {
  if (e.target.closest('a')) return;
  var item = e.target.closest('.directory-tree-item');
  if (!item) return;
  var inner = e.target.closest('.directory-tree-children');
  if (inner && item.contains(inner)) return;
  var toggle = item.querySelector(':scope > .directory-tree-toggle');
  var children = item.querySelector(':scope > .directory-tree-children');
  if (!toggle || !children) return;
  toggle.classList.toggle('expanded');
  children.classList.toggle('expanded', toggle.classList.contains('expanded'));
});
"#;

/// Write a complete page containing every child of the document root.
pub fn write<W: Write>(writer: &mut W, doc: &Document, title: &str) -> io::Result<()> {
    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
{body}
<script>{script}</script>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        body = doc.inner_html(doc.root()),
        script = SCRIPT,
    )
}

/// The page as a string.
pub fn to_string(doc: &Document, title: &str) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write(&mut out, doc, title);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wraps_body() {
        let mut doc = Document::new();
        let c = doc.append_element(doc.root(), "div", "directory-tree-container");
        doc.set_attr(c, "id", "directory-tree-container");
        let html = to_string(&doc, "Docs & Notes");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(html.contains("<title>Docs &amp; Notes</title>"));
        assert!(html.contains(r#"<div class="directory-tree-container" id="directory-tree-container"></div>"#));
        assert!(!html.contains("<body><body>"));
    }

    #[test]
    fn test_page_is_interactive() {
        let html = to_string(&Document::new(), "t");
        assert!(html.contains(".directory-tree-children.expanded { display: block; }"));
        assert!(html.contains("addEventListener('click'"));
    }
}
