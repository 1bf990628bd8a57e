//! DOM collaborator
//!
//! The controller never touches a browser directly. Everything it needs from
//! the page goes through the [`Dom`] trait: element queries, attribute and
//! property reads, class toggling, focus, listener registration and alerts.

pub mod memory;

pub use memory::{Document, ElementSpec};

/// Opaque handle to an element owned by a [`Dom`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub usize);

/// DOM events the controller cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Input,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Submit => "submit",
            EventKind::Input => "input",
        }
    }
}

/// An event delivered by the host to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: ElementId,
    default_prevented: bool,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
        }
    }

    pub fn click(target: ElementId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn submit(target: ElementId) -> Self {
        Self::new(EventKind::Submit, target)
    }

    pub fn input(target: ElementId) -> Self {
        Self::new(EventKind::Input, target)
    }

    /// Suppress the browser's default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Access to the page hosting a form
///
/// Implementations use interior mutability; every method takes `&self`.
pub trait Dom: Send + Sync {
    /// All element descendants of `root` in document order, `root` excluded
    fn descendants(&self, root: ElementId) -> Vec<ElementId>;

    /// Lowercase tag name
    fn tag_name(&self, element: ElementId) -> Option<String>;

    fn attr(&self, element: ElementId, name: &str) -> Option<String>;

    /// Concatenated text content of the element and its descendants
    fn text(&self, element: ElementId) -> String;

    /// Current control value. For a `<select>` this is the value of its
    /// selected `<option>`.
    fn value(&self, element: ElementId) -> String;

    fn is_checked(&self, element: ElementId) -> bool;

    fn is_required(&self, element: ElementId) -> bool;

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&self, element: ElementId, class: &str);

    fn remove_class(&self, element: ElementId, class: &str);

    fn focus(&self, element: ElementId);

    /// Register interest in `kind` events on `target`.
    /// Hosts only forward events that were registered here.
    fn listen(&self, target: ElementId, kind: EventKind);

    /// Drop a registration made through [`Dom::listen`]
    fn unlisten(&self, target: ElementId, kind: EventKind);

    /// Blocking user-facing alert
    fn alert(&self, message: &str);

    /// Restore initial values and checked states of every control in `form`
    fn reset(&self, form: ElementId);
}
