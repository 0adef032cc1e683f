//! sitetree - directory-tree widget for static sites
//!
//! Loads the site's `directory-tree.json`, renders it into a nested element
//! tree with aggregate file counts, and drives the expand/collapse toggles.
//!
//! # Overview
//!
//! | Stage | Module |
//! |-------|--------|
//! | Decode and validate the document | [`model`] |
//! | Fetch it over HTTP or from disk, show loading/error states | [`loader`] |
//! | Build the nested markup | [`render`] into a [`dom::Document`] |
//! | Expand/collapse on activation | [`toggle`] |
//! | Find the container, remount after navigation | [`mount`] |
//!
//! # Quick Start
//!
//! ```
//! use sitetree::{render_tree, toggle, DisplayConfig, Document, TreeNode};
//!
//! let tree = TreeNode::from_json(
//!     r#"{"name":"root","type":"directory","files":[{"name":"a.md","url":"/a/"}]}"#,
//! ).unwrap();
//!
//! let mut doc = Document::new();
//! let container = doc.append_element(doc.root(), "div", "");
//! let root = render_tree(&mut doc, container, &tree, &DisplayConfig::default());
//!
//! assert_eq!(toggle::state(&doc, root), Some(toggle::Expansion::Expanded));
//! toggle::toggle(&mut doc, root);
//! assert_eq!(toggle::state(&doc, root), Some(toggle::Expansion::Collapsed));
//! println!("{}", doc.to_html(container));
//! ```

pub mod config;
pub mod date;
pub mod dom;
pub mod error;
pub mod loader;
pub mod model;
pub mod mount;
pub mod page;
pub mod render;
pub mod serve;
pub mod toggle;
pub mod tui;

pub use config::{Config, DisplayConfig};
pub use dom::{Document, NodeId};
pub use error::{Error, LoadError};
pub use loader::{load_into, Source};
pub use model::{file_count, FileLeaf, NodeKind, TreeNode, TreeSummary};
pub use mount::{mount, MountOutcome, Page, PageHost, SoftNavigation};
pub use render::{render, render_tree};
