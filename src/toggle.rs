//! Expand/collapse state machine
//!
//! Activation is resolved the way a click bubbles through the page: the
//! nearest enclosing anchor wins and navigates; otherwise the nearest item
//! decides. Only the row of a directory that has content toggles, and only
//! that directory's own toggle and children container change.

use crate::dom::{Document, NodeId};
use crate::render::{CHILDREN, EXPANDED, ITEM, TOGGLE};

/// Visual state of one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Collapsed,
    Expanded,
}

impl Expansion {
    pub fn flipped(self) -> Self {
        match self {
            Expansion::Collapsed => Expansion::Expanded,
            Expansion::Expanded => Expansion::Collapsed,
        }
    }
}

/// What activating an element did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A link was activated; toggle logic did not run.
    Navigate(String),
    /// A directory changed state.
    Toggled { item: NodeId, state: Expansion },
    /// Nothing toggleable under the target.
    Ignored,
}

/// Current state of a directory item, `None` if it has no toggle.
pub fn state(doc: &Document, item: NodeId) -> Option<Expansion> {
    let toggle = doc.child_with_class(item, TOGGLE)?;
    Some(if doc.has_class(toggle, EXPANDED) {
        Expansion::Expanded
    } else {
        Expansion::Collapsed
    })
}

/// Activate `target` as if the user clicked it.
pub fn activate(doc: &mut Document, target: NodeId) -> Activation {
    if let Some(link) = doc.closest_tag(target, "a") {
        let href = doc.attr(link, "href").unwrap_or_default().to_string();
        return Activation::Navigate(href);
    }

    let Some(item) = doc.closest(target, ITEM) else {
        return Activation::Ignored;
    };

    // A click inside the children container belongs to a nested item, which
    // `closest` already found; reaching here from one means the target was an
    // inert part of the container itself.
    if doc.ancestors(target).take_while(|n| *n != item).any(|n| doc.has_class(n, CHILDREN)) {
        return Activation::Ignored;
    }

    match toggle(doc, item) {
        Some(state) => Activation::Toggled { item, state },
        None => Activation::Ignored,
    }
}

/// Flip a directory's toggle and children container together.
///
/// Returns the new state, or `None` when the item has nothing to expand.
pub fn toggle(doc: &mut Document, item: NodeId) -> Option<Expansion> {
    let next = state(doc, item)?.flipped();
    set_state(doc, item, next);
    Some(next)
}

/// Force a directory into `target` state. No-op for items without a toggle.
pub fn set_state(doc: &mut Document, item: NodeId, target: Expansion) {
    let Some(toggle) = doc.child_with_class(item, TOGGLE) else {
        return;
    };
    let Some(children) = doc.child_with_class(item, CHILDREN) else {
        return;
    };
    match target {
        Expansion::Expanded => {
            doc.add_class(toggle, EXPANDED);
            doc.add_class(children, EXPANDED);
        }
        Expansion::Collapsed => {
            doc.remove_class(toggle, EXPANDED);
            doc.remove_class(children, EXPANDED);
        }
    }
}

/// Set every directory under `scope` to `target`.
pub fn set_all(doc: &mut Document, scope: NodeId, target: Expansion) {
    for item in doc.query_all(scope, ITEM) {
        set_state(doc, item, target);
    }
}

pub fn expand_all(doc: &mut Document, scope: NodeId) {
    set_all(doc, scope, Expansion::Expanded);
}

pub fn collapse_all(doc: &mut Document, scope: NodeId) {
    set_all(doc, scope, Expansion::Collapsed);
}

/// True when every directory between `id` and the document root is expanded,
/// i.e. the element is visible.
pub fn is_visible(doc: &Document, id: NodeId) -> bool {
    doc.ancestors(id)
        .skip(1)
        .filter(|n| doc.has_class(*n, CHILDREN))
        .all(|n| doc.has_class(n, EXPANDED))
}
