//! Recursive tree renderer
//!
//! Turns a [`TreeNode`] into nested elements under a container:
//!
//! ```text
//! div.directory-tree-item.directory[data-level][data-path]
//!   span.directory-tree-toggle(.expanded)   | span.directory-tree-spacer
//!   span.directory-tree-name-wrapper
//!     span.directory-tree-name
//!     span.directory-tree-count              "(n)", only when n > 0
//!   div.directory-tree-children(.expanded)   | div.directory-tree-empty
//!     ...subdirectories, then files
//! ```
//!
//! Directories at level 0 and 1 start expanded, deeper ones collapsed.

use crate::config::DisplayConfig;
use crate::date::format_date;
use crate::dom::{Document, NodeId};
use crate::model::{file_count, FileLeaf, TreeNode};

pub const ITEM: &str = "directory-tree-item";
pub const TOGGLE: &str = "directory-tree-toggle";
pub const SPACER: &str = "directory-tree-spacer";
pub const NAME_WRAPPER: &str = "directory-tree-name-wrapper";
pub const NAME: &str = "directory-tree-name";
pub const COUNT: &str = "directory-tree-count";
pub const CHILDREN: &str = "directory-tree-children";
pub const EMPTY: &str = "directory-tree-empty";
pub const FILE_META: &str = "directory-tree-file-meta";
pub const EXPANDED: &str = "expanded";

/// Directories whose level is below this start expanded.
pub const DEFAULT_EXPANDED_LEVELS: usize = 2;

/// Replace the container's content with a freshly rendered tree.
///
/// Returns the root item. Calling this again rebuilds from scratch, so any
/// toggled state is reset to the default expansion.
pub fn render_tree(
    doc: &mut Document,
    container: NodeId,
    root: &TreeNode,
    display: &DisplayConfig,
) -> NodeId {
    doc.clear(container);
    let item = render(doc, container, root, 0, display);
    log::debug!("rendered tree '{}' ({} files)", root.name, file_count(root));
    item
}

/// Materialize `node` and its descendants beneath `container` at `level`.
pub fn render(
    doc: &mut Document,
    container: NodeId,
    node: &TreeNode,
    level: usize,
    display: &DisplayConfig,
) -> NodeId {
    render_at(doc, container, node, level, "", display)
}

fn render_at(
    doc: &mut Document,
    container: NodeId,
    node: &TreeNode,
    level: usize,
    parent_path: &str,
    display: &DisplayConfig,
) -> NodeId {
    if !node.is_directory() {
        return render_file(doc, container, &node.as_leaf(), display);
    }

    let path = if parent_path.is_empty() {
        node.name.clone()
    } else {
        format!("{}/{}", parent_path, node.name)
    };

    let item = doc.create_element("div", &format!("{} directory", ITEM));
    doc.set_attr(item, "data-level", level.to_string());
    doc.set_attr(item, "data-path", path.as_str());

    let has_children = node.has_children();
    let count = file_count(node);
    let expanded = level < DEFAULT_EXPANDED_LEVELS;

    if has_children {
        let toggle = doc.append_element(item, "span", TOGGLE);
        if expanded {
            doc.add_class(toggle, EXPANDED);
        }
    } else {
        // Keeps the label aligned with siblings that have a toggle
        doc.append_element(item, "span", SPACER);
    }

    let wrapper = doc.append_element(item, "span", NAME_WRAPPER);
    let name = doc.append_element(wrapper, "span", NAME);
    doc.set_text(name, node.name.as_str());
    if count > 0 {
        let badge = doc.append_element(wrapper, "span", COUNT);
        doc.set_text(badge, format!("({})", count));
    }

    doc.append_child(container, item);

    if has_children {
        let children = doc.append_element(item, "div", CHILDREN);
        if expanded {
            doc.add_class(children, EXPANDED);
        }
        for child in &node.children {
            render_at(doc, children, child, level + 1, &path, display);
        }
        for file in &node.files {
            render_file(doc, children, file, display);
        }
    } else {
        let empty = doc.append_element(item, "div", EMPTY);
        doc.set_text(empty, display.empty_text.as_str());
    }

    item
}

/// Render one file leaf: a link, then an optional date/description line.
pub fn render_file(
    doc: &mut Document,
    container: NodeId,
    file: &FileLeaf,
    display: &DisplayConfig,
) -> NodeId {
    let item = doc.create_element("div", &format!("{} file", ITEM));

    let link = doc.append_element(item, "a", NAME);
    doc.set_text(link, file.label());
    doc.set_attr(link, "href", file.href());
    doc.set_attr(link, "title", file.tooltip());

    let date = file.date_text();
    let description = file.description_text();
    if date.is_some() || description.is_some() {
        let meta = doc.append_element(item, "div", FILE_META);
        if let Some(raw) = date {
            let span = doc.append_element(meta, "span", "");
            doc.set_text(span, format!("📅 {}", format_date(raw, &display.date_format)));
        }
        if let Some(description) = description {
            let span = doc.append_element(meta, "span", "");
            doc.set_text(span, format!("📝 {}", description));
        }
    }

    doc.append_child(container, item);
    item
}

/// Directory item addressed by its slash-joined path from the root.
pub fn find_directory(doc: &Document, scope: NodeId, path: &str) -> Option<NodeId> {
    doc.query_all(scope, ITEM)
        .into_iter()
        .find(|item| doc.attr(*item, "data-path") == Some(path))
}

/// Count shown in a directory item's badge, if any.
pub fn displayed_count(doc: &Document, item: NodeId) -> Option<usize> {
    let wrapper = doc.child_with_class(item, NAME_WRAPPER)?;
    let badge = doc.child_with_class(wrapper, COUNT)?;
    doc.text(badge)?
        .trim_start_matches('(')
        .trim_end_matches(')')
        .parse()
        .ok()
}
