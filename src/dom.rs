//! Owned element tree
//!
//! A small arena of elements with explicit parent/child links. It stands in
//! for the page: the renderer builds into it, the toggle logic mutates its
//! classes, and `to_html` serializes it for the server and `render` command.

use std::fmt::Write;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    /// Attributes other than `class`, in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Text content, written before any child elements.
    pub text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed element tree. Detached elements stay in the arena but are
/// unreachable from the root, so they never serialize or match queries.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// New document with an empty `body` root.
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_string(),
            classes: Vec::new(),
            attrs: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element. `class` is split on whitespace.
    pub fn create_element(&mut self, tag: &str, class: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: tag.to_string(),
            classes: class.split_whitespace().map(str::to_string).collect(),
            attrs: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Create an element and append it in one step.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, class: &str) -> NodeId {
        let id = self.create_element(tag, class);
        self.append_child(parent, id);
        id
    }

    /// Detach every child and drop the element's own text.
    pub fn clear(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[id.0].text = None;
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.0].text = Some(text.into());
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    /// Concatenated text of the element and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = &self.nodes[id.0].text {
            out.push_str(text);
        }
        for child in &self.nodes[id.0].children {
            self.collect_text(*child, out);
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attrs = &mut self.nodes[id.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes[id.0].classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            self.nodes[id.0].classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.nodes[id.0].classes.retain(|c| c != class);
    }

    /// Whether `id` is still reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last() == Some(self.root)
    }

    /// `id` itself, then each ancestor up to its topmost parent.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.parent(*n))
    }

    /// Nearest element (starting at `id` itself) carrying `class`.
    pub fn closest(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.ancestors(id).find(|n| self.has_class(*n, class))
    }

    /// Nearest element (starting at `id` itself) with tag `tag`.
    pub fn closest_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(id).find(|n| self.nodes[n.0].tag == tag)
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// First descendant of `id` carrying `class`, in document order.
    pub fn query(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    /// Every descendant of `id` carrying `class`, in document order.
    pub fn query_all(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// Direct child of `id` carrying `class`.
    pub fn child_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.has_class(*c, class))
    }

    /// Attached element whose `id` attribute equals `element_id`.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|n| self.attr(*n, "id") == Some(element_id))
    }

    /// Serialize `id` and its subtree as HTML.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serialize only the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = &self.nodes[id.0].text {
            out.push_str(&escape_html(text));
        }
        for child in self.children(id) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let el = &self.nodes[id.0];
        out.push('<');
        out.push_str(&el.tag);
        if !el.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_html(&el.classes.join(" ")));
        }
        for (name, value) in &el.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
        }
        out.push('>');
        if let Some(text) = &el.text {
            out.push_str(&escape_html(text));
        }
        for child in &el.children {
            self.write_html(*child, out);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_query() {
        let mut doc = Document::new();
        let root = doc.root();
        let list = doc.append_element(root, "div", "list open");
        let item = doc.append_element(list, "span", "item");
        doc.set_text(item, "one");

        assert_eq!(doc.parent(item), Some(list));
        assert_eq!(doc.query(root, "item"), Some(item));
        assert!(doc.has_class(list, "open"));
        assert_eq!(doc.closest(item, "list"), Some(list));
        assert_eq!(doc.text_content(root), "one");
    }

    #[test]
    fn test_class_add_remove_is_idempotent() {
        let mut doc = Document::new();
        let el = doc.append_element(doc.root(), "span", "toggle");
        doc.add_class(el, "expanded");
        doc.add_class(el, "expanded");
        assert_eq!(doc.element(el).classes, vec!["toggle", "expanded"]);
        doc.remove_class(el, "expanded");
        assert!(!doc.has_class(el, "expanded"));
    }

    #[test]
    fn test_clear_detaches_children() {
        let mut doc = Document::new();
        let container = doc.append_element(doc.root(), "div", "");
        doc.set_attr(container, "id", "box");
        let child = doc.append_element(container, "p", "");
        doc.set_text(container, "loading");

        doc.clear(container);
        assert!(doc.children(container).is_empty());
        assert!(doc.text(container).is_none());
        assert!(!doc.is_attached(child));
        assert!(doc.is_attached(container));
        assert_eq!(doc.get_element_by_id("box"), Some(container));
    }

    #[test]
    fn test_reparent_moves_child() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.root(), "div", "a");
        let b = doc.append_element(doc.root(), "div", "b");
        let c = doc.append_element(a, "div", "c");
        doc.append_child(b, c);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[c]);
    }

    #[test]
    fn test_set_attr_replaces_value() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.root(), "a", "");
        doc.set_attr(a, "href", "#");
        doc.set_attr(a, "href", "/x/");
        assert_eq!(doc.attr(a, "href"), Some("/x/"));
        assert_eq!(doc.element(a).attrs.len(), 1);
    }

    #[test]
    fn test_to_html_escapes() {
        let mut doc = Document::new();
        let a = doc.append_element(doc.root(), "a", "link");
        doc.set_attr(a, "title", "say \"hi\"");
        doc.set_text(a, "<b> & co");
        assert_eq!(
            doc.to_html(a),
            r#"<a class="link" title="say &quot;hi&quot;">&lt;b&gt; &amp; co</a>"#
        );
    }

    #[test]
    fn test_descendants_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "div", "x");
        let a1 = doc.append_element(a, "div", "x");
        let b = doc.append_element(root, "div", "x");
        assert_eq!(doc.query_all(root, "x"), vec![a, a1, b]);
    }
}
