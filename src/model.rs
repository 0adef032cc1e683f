//! Tree document model
//!
//! The shape delivered by the site generator as `directory-tree.json`.
//! Read-only here: nothing in this crate mutates a loaded tree.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LoadError;

/// Node discriminator, the `type` field of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// A directory (or, rarely, a file) in the tree document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Subdirectories in display order. Only meaningful on directories.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Direct file leaves in display order. Only meaningful on directories.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileLeaf>,
}

/// A file entry listed under a directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileLeaf {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Link target used when a file has no url.
pub const PLACEHOLDER_HREF: &str = "#";

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Empty strings count as absent, the same as a missing field.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl TreeNode {
    /// Decode and validate a tree document.
    ///
    /// Anything that is not a JSON object of the node shape, or whose root has
    /// an empty `name`, is a format error.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let node: TreeNode = serde_json::from_str(json)?;
        node.validate()?;
        Ok(node)
    }

    /// Minimal shape check on a decoded root.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.name.is_empty() {
            return Err(LoadError::Format("root node has no name".to_string()));
        }
        Ok(())
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_files(mut self, files: Vec<FileLeaf>) -> Self {
        self.files = files;
        self
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// True when there is anything to expand: subdirectories or files.
    pub fn has_children(&self) -> bool {
        self.is_directory() && (!self.children.is_empty() || !self.files.is_empty())
    }

    /// Directory, file and depth totals for the whole tree.
    pub fn summary(&self) -> TreeSummary {
        let mut summary = TreeSummary::default();
        accumulate(self, 0, &mut summary);
        summary
    }

    /// View of a `file`-typed node as a leaf, for rendering it in place.
    pub fn as_leaf(&self) -> FileLeaf {
        FileLeaf {
            name: self.name.clone(),
            ..FileLeaf::default()
        }
    }
}

fn accumulate(node: &TreeNode, depth: usize, summary: &mut TreeSummary) {
    if !node.is_directory() {
        summary.files += 1;
        summary.max_depth = summary.max_depth.max(depth);
        return;
    }
    summary.directories += 1;
    summary.files += node.files.len();
    summary.max_depth = summary.max_depth.max(depth);
    for child in &node.children {
        accumulate(child, depth + 1, summary);
    }
}

/// Aggregate number of file leaves beneath a directory: its own files plus
/// the aggregate of every subdirectory. Zero for an empty directory and for
/// `file`-typed nodes.
pub fn file_count(node: &TreeNode) -> usize {
    if !node.is_directory() {
        return 0;
    }
    node.files.len() + node.children.iter().map(file_count).sum::<usize>()
}

/// Totals reported by `sitetree check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub directories: usize,
    pub files: usize,
    pub max_depth: usize,
}

impl FileLeaf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Display text: `title`, falling back to `name`.
    pub fn label(&self) -> &str {
        present(&self.title).unwrap_or(self.name.as_str())
    }

    /// Link target: `url`, falling back to a non-navigating placeholder.
    pub fn href(&self) -> &str {
        present(&self.url).unwrap_or(PLACEHOLDER_HREF)
    }

    /// Hover text: `description`, then `title`, then `name`.
    pub fn tooltip(&self) -> &str {
        present(&self.description)
            .or_else(|| present(&self.title))
            .unwrap_or(self.name.as_str())
    }

    pub fn date_text(&self) -> Option<&str> {
        present(&self.date)
    }

    pub fn description_text(&self) -> Option<&str> {
        present(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::directory("root")
            .with_children(vec![
                TreeNode::directory("a").with_files(vec![
                    FileLeaf::new("f1.md"),
                    FileLeaf::new("f2.md"),
                ]),
                TreeNode::directory("b").with_children(vec![
                    TreeNode::directory("c").with_files(vec![FileLeaf::new("f3.md")]),
                    TreeNode::directory("empty"),
                ]),
            ])
            .with_files(vec![FileLeaf::new("readme.md")])
    }

    #[test]
    fn test_from_json_minimal() {
        let node = TreeNode::from_json(r#"{"name":"root","type":"directory"}"#).unwrap();
        assert_eq!(node.name, "root");
        assert!(node.children.is_empty());
        assert!(node.files.is_empty());
        assert!(!node.has_children());
    }

    #[test]
    fn test_from_json_full_document() {
        let json = r#"{
            "name": "root",
            "type": "directory",
            "children": [
                {"name": "a", "type": "directory", "files": [{"name": "f1.md", "title": "F1"}]}
            ],
            "files": []
        }"#;
        let node = TreeNode::from_json(json).unwrap();
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].files[0].label(), "F1");
    }

    #[test]
    fn test_from_json_null_collections() {
        let node =
            TreeNode::from_json(r#"{"name":"r","type":"directory","children":null,"files":null}"#)
                .unwrap();
        assert!(!node.has_children());
    }

    #[test]
    fn test_from_json_rejects_missing_name() {
        let err = TreeNode::from_json(r#"{"type":"directory"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Format(_)));
    }

    #[test]
    fn test_from_json_rejects_empty_name() {
        let err = TreeNode::from_json(r#"{"name":"","type":"directory"}"#).unwrap_err();
        assert_eq!(
            err,
            LoadError::Format("root node has no name".to_string())
        );
    }

    #[test]
    fn test_from_json_accepts_blank_name() {
        let node = TreeNode::from_json(r#"{"name":" ","type":"directory"}"#).unwrap();
        assert_eq!(node.name, " ");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            TreeNode::from_json("[1, 2, 3]"),
            Err(LoadError::Format(_))
        ));
        assert!(matches!(
            TreeNode::from_json("<html>404</html>"),
            Err(LoadError::Format(_))
        ));
    }

    #[test]
    fn test_file_count_is_recursive() {
        let tree = sample();
        assert_eq!(file_count(&tree), 4);
        assert_eq!(file_count(&tree.children[0]), 2);
        assert_eq!(file_count(&tree.children[1]), 1);
        assert_eq!(file_count(&tree.children[1].children[1]), 0);
    }

    #[test]
    fn test_has_children() {
        let tree = sample();
        assert!(tree.has_children());
        assert!(tree.children[0].has_children());
        assert!(!tree.children[1].children[1].has_children());
    }

    #[test]
    fn test_file_typed_node_has_no_content() {
        let node: TreeNode = serde_json::from_str(
            r#"{"name":"x","type":"file","files":[{"name":"ignored"}]}"#,
        )
        .unwrap();
        assert!(!node.has_children());
        assert_eq!(file_count(&node), 0);
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary.directories, 5);
        assert_eq!(summary.files, 4);
        assert_eq!(summary.max_depth, 2);
    }

    #[test]
    fn test_leaf_fallbacks() {
        let leaf = FileLeaf::new("notes.md");
        assert_eq!(leaf.label(), "notes.md");
        assert_eq!(leaf.href(), "#");
        assert_eq!(leaf.tooltip(), "notes.md");
        assert!(leaf.date_text().is_none());

        let leaf = leaf.title("Notes").url("/posts/notes/");
        assert_eq!(leaf.label(), "Notes");
        assert_eq!(leaf.href(), "/posts/notes/");
        assert_eq!(leaf.tooltip(), "Notes");

        let leaf = leaf.description("Weekly notes");
        assert_eq!(leaf.tooltip(), "Weekly notes");
    }

    #[test]
    fn test_leaf_empty_strings_fall_back() {
        let leaf = FileLeaf::new("a.md").title("").url("").description("");
        assert_eq!(leaf.label(), "a.md");
        assert_eq!(leaf.href(), "#");
        assert_eq!(leaf.tooltip(), "a.md");
        assert!(leaf.description_text().is_none());
    }
}
