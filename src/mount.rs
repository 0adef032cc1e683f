//! Mount lifecycle
//!
//! `mount` is the single entry point that finds the container, loads the
//! document and renders it. It always rebuilds the container from scratch, so
//! it is called once at startup and again after every soft navigation.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Config;
use crate::dom::{Document, NodeId};
use crate::error::{LoadError, Result};
use crate::loader::{load_into, Source};

/// The page the tree is mounted into.
pub trait PageHost {
    fn document(&self) -> &Document;
    fn document_mut(&mut self) -> &mut Document;

    /// Pause between container lookups. Hosts whose page is still being
    /// built get the chance to make progress here.
    fn wait(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// A standalone page: `body > div#<container_id>`.
#[derive(Debug, Clone)]
pub struct Page {
    doc: Document,
}

impl Page {
    pub fn with_container(container_id: &str) -> Self {
        let mut doc = Document::new();
        let container = doc.append_element(doc.root(), "div", "directory-tree-container");
        doc.set_attr(container, "id", container_id);
        Self { doc }
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

impl PageHost for Page {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }
}

/// Bounded container lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.mount.retry_attempts.max(1),
            delay: config.mount.retry_delay(),
        }
    }
}

/// How a mount attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Rendered(NodeId),
    /// The load failed; the container shows the error panel.
    Failed(LoadError),
    /// The container never appeared; nothing was rendered.
    ContainerMissing,
}

/// Poll for the element with `id`, waiting between attempts.
pub fn wait_for_container<H: PageHost + ?Sized>(
    host: &mut H,
    id: &str,
    policy: RetryPolicy,
) -> Option<NodeId> {
    for attempt in 1..=policy.attempts {
        if let Some(container) = host.document().get_element_by_id(id) {
            return Some(container);
        }
        if attempt < policy.attempts {
            log::debug!("container #{} not found (attempt {}), waiting", id, attempt);
            host.wait(policy.delay);
        }
    }
    None
}

/// Find the container, then load and render the tree into it.
pub fn mount<H: PageHost + ?Sized>(host: &mut H, source: &Source, config: &Config) -> MountOutcome {
    let id = config.mount.container_id.as_str();
    let policy = RetryPolicy::from_config(config);
    let Some(container) = wait_for_container(host, id, policy) else {
        log::warn!(
            "container #{} never appeared after {} attempts; directory tree not rendered",
            id,
            policy.attempts
        );
        return MountOutcome::ContainerMissing;
    };
    match load_into(host.document_mut(), container, source, &config.display) {
        Ok(root) => MountOutcome::Rendered(root),
        Err(err) => MountOutcome::Failed(err),
    }
}

/// Signal that the page transitioned and the tree should be mounted again.
///
/// Backed by a watch on the tree document: whenever the file is written or
/// replaced, one transition is reported.
pub struct SoftNavigation {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<()>,
}

impl SoftNavigation {
    /// Watch `path`. The parent directory is watched so editors that replace
    /// the file by rename are still noticed.
    pub fn watch(path: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let target: PathBuf = path.file_name().map(PathBuf::from).unwrap_or_default();
        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(PathBuf::from).as_ref() == Some(&target));
                    if relevant && ours {
                        let _ = tx.send(());
                    }
                }
            },
            notify::Config::default(),
        )?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events without blocking. True if any transition happened.
    pub fn poll(&self) -> bool {
        let mut seen = false;
        while self.rx.try_recv().is_ok() {
            seen = true;
        }
        seen
    }

    /// Block until the next transition. False once the watcher is gone.
    pub fn wait(&self) -> bool {
        let ok = self.rx.recv().is_ok();
        // Writes usually arrive as a burst of events; settle before reporting.
        std::thread::sleep(Duration::from_millis(50));
        self.poll();
        ok
    }
}

/// Mount once, then again for every transition `nav` reports, calling
/// `on_mount` after each. Without a signal the tree is mounted exactly once.
pub fn run<H, F>(
    host: &mut H,
    source: &Source,
    config: &Config,
    nav: Option<&SoftNavigation>,
    mut on_mount: F,
) where
    H: PageHost + ?Sized,
    F: FnMut(&H, &MountOutcome) -> bool,
{
    loop {
        let outcome = mount(host, source, config);
        if !on_mount(host, &outcome) {
            return;
        }
        match nav {
            Some(nav) if nav.wait() => log::debug!("tree document changed, remounting"),
            _ => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ERROR_PANEL;
    use crate::render::{ITEM, TOGGLE};
    use crate::toggle;

    /// A page whose container is only added after a few lookups.
    struct SlowPage {
        doc: Document,
        waits_left: u32,
        waited: u32,
    }

    impl PageHost for SlowPage {
        fn document(&self) -> &Document {
            &self.doc
        }
        fn document_mut(&mut self) -> &mut Document {
            &mut self.doc
        }
        fn wait(&mut self, _delay: Duration) {
            self.waited += 1;
            if self.waits_left == 0 {
                return;
            }
            self.waits_left -= 1;
            if self.waits_left == 0 {
                let root = self.doc.root();
                let c = self.doc.append_element(root, "div", "");
                self.doc.set_attr(c, "id", "directory-tree-container");
            }
        }
    }

    fn tree_file(dir: &tempfile::TempDir, json: &str) -> Source {
        let path = dir.path().join("directory-tree.json");
        std::fs::write(&path, json).unwrap();
        Source::File(path)
    }

    fn quick_config() -> Config {
        let mut config = Config::default();
        config.mount.retry_attempts = 5;
        config.mount.retry_delay_ms = 0;
        config
    }

    #[test]
    fn test_mount_renders_into_page() {
        let dir = tempfile::tempdir().unwrap();
        let source = tree_file(&dir, r#"{"name":"root","type":"directory"}"#);
        let config = quick_config();
        let mut page = Page::with_container(&config.mount.container_id);
        let outcome = mount(&mut page, &source, &config);
        assert!(matches!(outcome, MountOutcome::Rendered(_)));
        let doc = page.into_document();
        assert_eq!(doc.query_all(doc.root(), ITEM).len(), 1);
    }

    #[test]
    fn test_mount_waits_for_late_container() {
        let dir = tempfile::tempdir().unwrap();
        let source = tree_file(&dir, r#"{"name":"root","type":"directory"}"#);
        let mut page = SlowPage {
            doc: Document::new(),
            waits_left: 3,
            waited: 0,
        };
        let outcome = mount(&mut page, &source, &quick_config());
        assert!(matches!(outcome, MountOutcome::Rendered(_)));
        assert_eq!(page.waited, 3);
    }

    #[test]
    fn test_mount_gives_up_silently() {
        let dir = tempfile::tempdir().unwrap();
        let source = tree_file(&dir, r#"{"name":"root","type":"directory"}"#);
        let mut page = SlowPage {
            doc: Document::new(),
            waits_left: 100,
            waited: 0,
        };
        let outcome = mount(&mut page, &source, &quick_config());
        assert_eq!(outcome, MountOutcome::ContainerMissing);
        assert_eq!(page.waited, 4);
        assert!(page.doc.children(page.doc.root()).is_empty());
    }

    #[test]
    fn test_zero_attempts_still_looks_once() {
        let mut config = quick_config();
        config.mount.retry_attempts = 0;
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.attempts, 1);

        let mut page = SlowPage {
            doc: Document::new(),
            waits_left: 100,
            waited: 0,
        };
        assert!(wait_for_container(&mut page, "directory-tree-container", policy).is_none());
        assert_eq!(page.waited, 0);
    }

    #[test]
    fn test_mount_failure_shows_panel() {
        let dir = tempfile::tempdir().unwrap();
        let source = tree_file(&dir, "not json");
        let config = quick_config();
        let mut page = Page::with_container(&config.mount.container_id);
        let outcome = mount(&mut page, &source, &config);
        assert!(matches!(outcome, MountOutcome::Failed(LoadError::Format(_))));
        let doc = page.document();
        assert!(doc.query(doc.root(), ERROR_PANEL).is_some());
    }

    #[test]
    fn test_remount_resets_toggle_state() {
        let dir = tempfile::tempdir().unwrap();
        let source = tree_file(
            &dir,
            r#"{"name":"root","type":"directory","files":[{"name":"a.md"}]}"#,
        );
        let config = quick_config();
        let mut page = Page::with_container(&config.mount.container_id);
        let MountOutcome::Rendered(root) = mount(&mut page, &source, &config) else {
            panic!("expected render");
        };
        toggle::toggle(page.document_mut(), root);
        assert_eq!(
            toggle::state(page.document(), root),
            Some(toggle::Expansion::Collapsed)
        );

        let MountOutcome::Rendered(root) = mount(&mut page, &source, &config) else {
            panic!("expected render");
        };
        let doc = page.document();
        assert_eq!(toggle::state(doc, root), Some(toggle::Expansion::Expanded));
        assert_eq!(doc.query_all(doc.root(), TOGGLE).len(), 1);
    }

    #[test]
    fn test_run_without_navigation_mounts_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = tree_file(&dir, r#"{"name":"root","type":"directory"}"#);
        let config = quick_config();
        let mut page = Page::with_container(&config.mount.container_id);
        let mut mounts = 0;
        run(&mut page, &source, &config, None, |_, _| {
            mounts += 1;
            true
        });
        assert_eq!(mounts, 1);
    }

    #[test]
    fn test_soft_navigation_reports_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory-tree.json");
        std::fs::write(&path, "{}").unwrap();
        let nav = SoftNavigation::watch(&path).unwrap();
        std::fs::write(&path, r#"{"name":"x","type":"directory"}"#).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let mut seen = false;
        while !seen && std::time::Instant::now() < deadline {
            seen = nav.poll();
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(seen);
    }
}
