//! Tree data loader
//!
//! One fetch per load: no retries. Whatever goes wrong ends up as a
//! [`LoadError`] and, through [`load_into`], as an error panel in place of
//! the tree.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DisplayConfig;
use crate::dom::{Document, NodeId};
use crate::error::LoadError;
use crate::model::TreeNode;
use crate::render::render_tree;

pub const LOADING: &str = "directory-tree-loading";
pub const ERROR_PANEL: &str = "directory-tree-error";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the tree document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(String),
    File(PathBuf),
}

impl Source {
    /// Interpret a configured location.
    ///
    /// Absolute URLs are fetched as given. Anything else is joined onto
    /// `base` when there is one, and read from disk when there is not.
    ///
    /// Without a base, a site-relative path such as `/directory-tree.json`
    /// is read relative to the current directory (the site root). An
    /// absolute path that exists on disk is kept as is.
    pub fn resolve(location: &str, base: Option<&str>) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Source::Http(location.to_string());
        }
        match base {
            Some(base) => Source::Http(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                location.trim_start_matches('/')
            )),
            None => {
                let path = Path::new(location);
                if path.is_absolute() && !path.exists() {
                    Source::File(PathBuf::from(location.trim_start_matches('/')))
                } else {
                    Source::File(path.to_path_buf())
                }
            }
        }
    }

    /// Retrieve the raw document body.
    pub fn fetch(&self) -> Result<String, LoadError> {
        match self {
            Source::Http(url) => fetch_http(url),
            Source::File(path) => std::fs::read_to_string(path)
                .map_err(|e| LoadError::Transport(format!("{}: {}", path.display(), e))),
        }
    }

    /// Fetch and validate the tree.
    pub fn load(&self) -> Result<TreeNode, LoadError> {
        log::debug!("loading directory tree from {}", self);
        let body = self.fetch()?;
        TreeNode::from_json(&body)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Http(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn fetch_http(url: &str) -> Result<String, LoadError> {
    let agent = ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build();
    let response = match agent
        .get(url)
        .set("User-Agent", &format!("sitetree/{}", env!("CARGO_PKG_VERSION")))
        .set("Accept", "application/json")
        .call()
    {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => return Err(LoadError::Status(code)),
        Err(ureq::Error::Transport(t)) => return Err(LoadError::Transport(t.to_string())),
    };
    log::debug!("directory tree response status: {}", response.status());
    response
        .into_string()
        .map_err(|e| LoadError::Transport(e.to_string()))
}

/// Show the loading placeholder, load, then render or show the error panel.
///
/// On success returns the root item; on failure the container holds only the
/// error panel.
pub fn load_into(
    doc: &mut Document,
    container: NodeId,
    source: &Source,
    display: &DisplayConfig,
) -> Result<NodeId, LoadError> {
    show_loading(doc, container, display);
    match source.load() {
        Ok(tree) => Ok(render_tree(doc, container, &tree, display)),
        Err(err) => {
            log::error!("failed to load directory tree from {}: {}", source, err);
            show_error(doc, container, &err, display);
            Err(err)
        }
    }
}

pub fn show_loading(doc: &mut Document, container: NodeId, display: &DisplayConfig) {
    doc.clear(container);
    let p = doc.append_element(container, "p", LOADING);
    doc.set_text(p, display.loading_text.as_str());
}

/// Replace the container's content with an error panel naming the reason.
pub fn show_error(doc: &mut Document, container: NodeId, err: &LoadError, display: &DisplayConfig) {
    doc.clear(container);
    let panel = doc.append_element(container, "div", ERROR_PANEL);
    let heading = doc.append_element(panel, "p", "directory-tree-error-title");
    doc.set_text(heading, display.error_heading.as_str());
    let reason = doc.append_element(panel, "p", "directory-tree-error-reason");
    doc.set_text(reason, format!("Error: {}", err));
    let hint = doc.append_element(panel, "p", "directory-tree-error-hint");
    doc.set_text(hint, display.error_hint.as_str());
}
