//! Application state for the terminal browser
//!
//! The browser is another host page: it mounts the tree into its own
//! document and drives the same toggle state machine the web page uses.

use std::time::Instant;

use crate::config::Config;
use crate::dom::{Document, NodeId};
use crate::loader::{Source, ERROR_PANEL};
use crate::mount::{mount, MountOutcome, Page, PageHost};
use crate::render::{self, CHILDREN, FILE_META, ITEM, NAME};
use crate::toggle::{self, Activation, Expansion};

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub item: NodeId,
    pub depth: usize,
    /// `data-path` of directory rows
    pub path: Option<String>,
    pub kind: RowKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Directory {
        name: String,
        count: Option<usize>,
        /// `None` for directories with nothing in them
        state: Option<Expansion>,
    },
    File {
        label: String,
        href: String,
        meta: Option<String>,
    },
}

pub struct App {
    page: Page,
    source: Source,
    config: Config,
    pub outcome: MountOutcome,
    pub selected: usize,
    pub scroll_offset: usize,
    pub viewport_height: u16,
    pub status: Option<String>,
    pub last_reload: Option<Instant>,
}

impl App {
    pub fn new(source: Source, config: Config) -> Self {
        let mut page = Page::with_container(&config.mount.container_id);
        let outcome = mount(&mut page, &source, &config);
        Self {
            page,
            source,
            config,
            outcome,
            selected: 0,
            scroll_offset: 0,
            viewport_height: 0,
            status: None,
            last_reload: None,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn document(&self) -> &Document {
        self.page.document()
    }

    fn container(&self) -> Option<NodeId> {
        self.document()
            .get_element_by_id(&self.config.mount.container_id)
    }

    /// Remount from scratch. Expansion state goes back to the defaults; the
    /// selected directory stays selected if it is still visible.
    pub fn reload(&mut self) {
        let selected_path = self.selected_row().and_then(|r| r.path);
        self.outcome = mount(&mut self.page, &self.source, &self.config);
        let rows = self.rows();
        self.selected = selected_path
            .and_then(|path| rows.iter().position(|r| r.path.as_ref() == Some(&path)))
            .unwrap_or_else(|| self.selected.min(rows.len().saturating_sub(1)));
        self.last_reload = Some(Instant::now());
        self.status = Some(match &self.outcome {
            MountOutcome::Rendered(_) => "Reloaded".to_string(),
            MountOutcome::Failed(e) => format!("Reload failed: {}", e),
            MountOutcome::ContainerMissing => "Container missing".to_string(),
        });
    }

    /// Whether the reload indicator should still be shown.
    pub fn recently_reloaded(&self) -> bool {
        self.last_reload
            .map(|t| t.elapsed().as_secs() < 2)
            .unwrap_or(false)
    }

    /// Lines of the error panel, when the last mount failed.
    pub fn error_lines(&self) -> Vec<String> {
        let doc = self.document();
        let Some(panel) = self.container().and_then(|c| doc.query(c, ERROR_PANEL)) else {
            return Vec::new();
        };
        doc.children(panel)
            .iter()
            .map(|p| doc.text_content(*p))
            .collect()
    }

    /// Items not hidden by a collapsed ancestor, in document order.
    pub fn rows(&self) -> Vec<Row> {
        let doc = self.document();
        let Some(container) = self.container() else {
            return Vec::new();
        };
        doc.query_all(container, ITEM)
            .into_iter()
            .filter(|item| toggle::is_visible(doc, *item))
            .map(|item| {
                let depth = doc
                    .ancestors(item)
                    .skip(1)
                    .filter(|n| doc.has_class(*n, CHILDREN))
                    .count();
                Row {
                    item,
                    depth,
                    path: doc.attr(item, "data-path").map(str::to_string),
                    kind: row_kind(doc, item),
                }
            })
            .collect()
    }

    pub fn selected_row(&self) -> Option<Row> {
        self.rows().into_iter().nth(self.selected)
    }

    /// Activate the selected row, as a click on it would.
    pub fn activate_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let target = match row.kind {
            RowKind::File { .. } => self
                .document()
                .child_with_class(row.item, NAME)
                .unwrap_or(row.item),
            RowKind::Directory { .. } => row.item,
        };
        match toggle::activate(self.page.document_mut(), target) {
            Activation::Navigate(href) => self.status = Some(format!("→ {}", href)),
            Activation::Toggled { .. } | Activation::Ignored => {}
        }
    }

    /// Expand the selected directory; no-op when already open.
    pub fn expand_selected(&mut self) {
        if let Some(row) = self.selected_row() {
            toggle::set_state(self.page.document_mut(), row.item, Expansion::Expanded);
        }
    }

    /// Collapse the selected directory, or jump to the parent directory when
    /// there is nothing to collapse.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if let RowKind::Directory {
            state: Some(Expansion::Expanded),
            ..
        } = row.kind
        {
            toggle::set_state(self.page.document_mut(), row.item, Expansion::Collapsed);
            return;
        }
        let parent = self
            .document()
            .parent(row.item)
            .and_then(|p| self.document().closest(p, ITEM));
        if let Some(parent) = parent {
            if let Some(index) = self.rows().iter().position(|r| r.item == parent) {
                self.selected = index;
            }
        }
    }

    pub fn expand_all(&mut self) {
        if let Some(c) = self.container() {
            toggle::expand_all(self.page.document_mut(), c);
        }
    }

    pub fn collapse_all(&mut self) {
        if let Some(c) = self.container() {
            toggle::collapse_all(self.page.document_mut(), c);
        }
        self.selected = 0;
    }

    // === Navigation ===

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.rows().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.selected = self.selected.saturating_sub(self.page_size());
    }

    pub fn page_down(&mut self) {
        let last = self.rows().len().saturating_sub(1);
        self.selected = (self.selected + self.page_size()).min(last);
    }

    pub fn jump_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_to_bottom(&mut self) {
        self.selected = self.rows().len().saturating_sub(1);
    }

    fn page_size(&self) -> usize {
        (self.viewport_height as usize).max(1)
    }

    /// Keep the selection inside the visible window.
    pub fn update_scroll(&mut self, visible: usize) {
        if visible == 0 {
            self.scroll_offset = 0;
        } else if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible {
            self.scroll_offset = self.selected + 1 - visible;
        }
    }

    pub fn resize(&mut self, _width: u16, height: u16) {
        self.viewport_height = height.saturating_sub(4);
    }
}

fn row_kind(doc: &Document, item: NodeId) -> RowKind {
    if let Some(link) = doc.child_with_class(item, NAME).filter(|l| doc.element(*l).tag == "a") {
        let meta = doc
            .child_with_class(item, FILE_META)
            .map(|m| {
                doc.children(m)
                    .iter()
                    .map(|s| doc.text_content(*s))
                    .collect::<Vec<_>>()
                    .join("  ")
            });
        return RowKind::File {
            label: doc.text_content(link),
            href: doc.attr(link, "href").unwrap_or_default().to_string(),
            meta,
        };
    }
    let name = doc
        .child_with_class(item, render::NAME_WRAPPER)
        .and_then(|w| doc.child_with_class(w, NAME))
        .map(|n| doc.text_content(n))
        .unwrap_or_default();
    RowKind::Directory {
        name,
        count: render::displayed_count(doc, item),
        state: toggle::state(doc, item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    fn app_with(json: &str) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory-tree.json");
        std::fs::write(&path, json).unwrap();
        let app = App::new(Source::File(path), Config::default());
        (dir, app)
    }

    const TREE: &str = r#"{
        "name": "root", "type": "directory",
        "children": [
            {"name": "a", "type": "directory", "children": [
                {"name": "deep", "type": "directory", "files": [{"name": "d.md"}]}
            ]},
            {"name": "b", "type": "directory", "files": [{"name": "b.md", "url": "/b/", "date": "2024-02-01"}]}
        ]
    }"#;

    fn labels(app: &App) -> Vec<String> {
        app.rows()
            .into_iter()
            .map(|r| match r.kind {
                RowKind::Directory { name, .. } => name,
                RowKind::File { label, .. } => label,
            })
            .collect()
    }

    #[test]
    fn test_rows_follow_default_expansion() {
        let (_dir, app) = app_with(TREE);
        assert!(matches!(app.outcome, MountOutcome::Rendered(_)));
        assert_eq!(labels(&app), vec!["root", "a", "deep", "b", "b.md"]);
        let depths: Vec<_> = app.rows().iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1, 2]);
    }

    #[test]
    fn test_activate_expands_collapsed_directory() {
        let (_dir, mut app) = app_with(TREE);
        app.selected = 2;
        app.activate_selected();
        assert_eq!(labels(&app), vec!["root", "a", "deep", "d.md", "b", "b.md"]);
    }

    #[test]
    fn test_activate_file_navigates() {
        let (_dir, mut app) = app_with(TREE);
        app.jump_to_bottom();
        let before = labels(&app);
        app.activate_selected();
        assert_eq!(app.status.as_deref(), Some("→ /b/"));
        assert_eq!(labels(&app), before);
    }

    #[test]
    fn test_file_row_meta() {
        let (_dir, app) = app_with(TREE);
        let last = app.rows().pop().unwrap();
        assert_eq!(
            last.kind,
            RowKind::File {
                label: "b.md".to_string(),
                href: "/b/".to_string(),
                meta: Some("📅 2024/02/01".to_string()),
            }
        );
    }

    #[test]
    fn test_collapse_then_jump_to_parent() {
        let (_dir, mut app) = app_with(TREE);
        app.selected = 1;
        app.collapse_selected();
        assert_eq!(labels(&app), vec!["root", "a", "b", "b.md"]);
        app.collapse_selected();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let (_dir, mut app) = app_with(TREE);
        app.expand_all();
        assert_eq!(app.rows().len(), 6);
        app.collapse_all();
        assert_eq!(labels(&app), vec!["root"]);
    }

    #[test]
    fn test_reload_resets_state() {
        let (_dir, mut app) = app_with(TREE);
        app.collapse_all();
        app.reload();
        assert_eq!(app.rows().len(), 5);
        assert_eq!(app.status.as_deref(), Some("Reloaded"));
        assert!(app.recently_reloaded());
    }

    #[test]
    fn test_rows_carry_directory_paths() {
        let (_dir, app) = app_with(TREE);
        let paths: Vec<_> = app.rows().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                Some("root".to_string()),
                Some("root/a".to_string()),
                Some("root/a/deep".to_string()),
                Some("root/b".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_reload_keeps_selected_directory() {
        let (dir, mut app) = app_with(TREE);
        app.selected = 1;
        assert_eq!(app.selected_row().unwrap().path.as_deref(), Some("root/a"));

        // A new sibling ahead of "a" pushes it down one row
        std::fs::write(
            dir.path().join("directory-tree.json"),
            r#"{"name":"root","type":"directory","children":[
                {"name":"new","type":"directory"},
                {"name":"a","type":"directory"},
                {"name":"b","type":"directory","files":[{"name":"b.md"}]}
            ]}"#,
        )
        .unwrap();
        app.reload();
        assert_eq!(app.selected, 2);
        assert_eq!(app.selected_row().unwrap().path.as_deref(), Some("root/a"));
    }

    #[test]
    fn test_failed_load_has_error_lines() {
        let (_dir, app) = app_with("{ broken");
        assert!(matches!(app.outcome, MountOutcome::Failed(LoadError::Format(_))));
        assert!(app.rows().is_empty());
        let lines = app.error_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Error: directory tree data format error"));
    }

    #[test]
    fn test_navigation_bounds() {
        let (_dir, mut app) = app_with(TREE);
        app.move_up();
        assert_eq!(app.selected, 0);
        for _ in 0..10 {
            app.move_down();
        }
        assert_eq!(app.selected, 4);
        app.viewport_height = 2;
        app.page_up();
        assert_eq!(app.selected, 2);
        app.update_scroll(2);
        assert_eq!(app.scroll_offset, 1);
        app.jump_to_bottom();
        app.update_scroll(2);
        assert_eq!(app.scroll_offset, 3);
    }
}
