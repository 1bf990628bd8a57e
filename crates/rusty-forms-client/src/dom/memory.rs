// File: rusty-forms-client/src/dom/memory.rs
// Purpose: In-memory document implementing the Dom trait (tests and headless hosts)

use super::{Dom, ElementId, EventKind};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Declarative description of an element to append to a [`Document`]
///
/// `value`, `checked` and `required` attributes seed the matching control
/// properties, the way a parser would.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn form() -> Self {
        Self::new("form")
    }

    /// `<input type=... name=...>`
    pub fn input(kind: &str, name: &str) -> Self {
        Self::new("input").attr("type", kind).attr("name", name)
    }

    pub fn label(text: &str) -> Self {
        Self::new("label").text(text)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn value(self, value: &str) -> Self {
        self.attr("value", value)
    }

    pub fn required(self) -> Self {
        self.attr("required", "")
    }

    pub fn checked(self) -> Self {
        self.attr("checked", "")
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    value: String,
    default_value: String,
    checked: bool,
    default_checked: bool,
    required: bool,
}

impl Node {
    fn is_toggle(&self) -> bool {
        matches!(
            self.attrs.get("type").map(String::as_str),
            Some("checkbox") | Some("radio")
        )
    }
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
    listeners: Vec<(ElementId, EventKind)>,
    focused: Option<ElementId>,
    alerts: Vec<String>,
}

impl Tree {
    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn collect_descendants(&self, id: ElementId, out: &mut Vec<ElementId>) {
        if let Some(node) = self.node(id) {
            for &child in &node.children {
                out.push(child);
                self.collect_descendants(child, out);
            }
        }
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        if let Some(node) = self.node(id) {
            out.push_str(&node.text);
            for &child in &node.children {
                self.collect_text(child, out);
            }
        }
    }

    fn selected_option_value(&self, select: ElementId) -> String {
        let mut descendants = Vec::new();
        self.collect_descendants(select, &mut descendants);
        let options: Vec<ElementId> = descendants
            .into_iter()
            .filter(|&id| self.node(id).map_or(false, |n| n.tag == "option"))
            .collect();

        let chosen = options
            .iter()
            .copied()
            .find(|&id| self.node(id).map_or(false, |n| n.attrs.contains_key("selected")))
            .or_else(|| options.first().copied());

        let Some(option) = chosen else {
            return String::new();
        };
        if let Some(value) = self.node(option).and_then(|n| n.attrs.get("value")) {
            return value.clone();
        }
        let mut text = String::new();
        self.collect_text(option, &mut text);
        text.trim().to_string()
    }
}

/// A minimal element tree
///
/// The document starts with a single `<body>` root.
///
/// A `<select>` reports an explicitly set value (its `value` attribute or
/// [`Document::set_value`]) first. Otherwise it reports its first `<option>`
/// carrying `selected`, or its first `<option>`, using the option's `value`
/// attribute or its text. Option clicks and `multiple` are not modelled.
#[derive(Debug)]
pub struct Document {
    tree: RwLock<Tree>,
}

impl Document {
    pub fn new() -> Self {
        let doc = Self {
            tree: RwLock::new(Tree::default()),
        };
        doc.create(None, ElementSpec::new("body"));
        doc
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Append a new element as the last child of `parent`
    pub fn append(&self, parent: ElementId, spec: ElementSpec) -> ElementId {
        self.create(Some(parent), spec)
    }

    fn create(&self, parent: Option<ElementId>, spec: ElementSpec) -> ElementId {
        let mut tree = self.write();
        let id = ElementId(tree.nodes.len());

        let classes = spec
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let is_toggle = matches!(
            spec.attrs.get("type").map(String::as_str),
            Some("checkbox") | Some("radio")
        );
        let value = match spec.attrs.get("value") {
            Some(v) => v.clone(),
            None if is_toggle => "on".to_string(),
            None => String::new(),
        };
        let checked = spec.attrs.contains_key("checked");
        let required = spec.attrs.contains_key("required");

        tree.nodes.push(Node {
            parent,
            children: Vec::new(),
            tag: spec.tag,
            attrs: spec.attrs,
            classes,
            text: spec.text,
            default_value: value.clone(),
            value,
            default_checked: checked,
            checked,
            required,
        });
        if let Some(parent) = parent {
            if let Some(node) = tree.node_mut(parent) {
                node.children.push(id);
            }
        }
        id
    }

    /// Simulate the user typing into a control
    pub fn set_value(&self, element: ElementId, value: &str) {
        if let Some(node) = self.write().node_mut(element) {
            node.value = value.to_string();
        }
    }

    /// Simulate the user toggling a checkbox or radio
    pub fn set_checked(&self, element: ElementId, checked: bool) {
        if let Some(node) = self.write().node_mut(element) {
            node.checked = checked;
        }
    }

    pub fn set_attr(&self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.write().node_mut(element) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.read().node(element).and_then(|n| n.parent)
    }

    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.read()
            .node(element)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    /// Element that last received focus
    pub fn focused(&self) -> Option<ElementId> {
        self.read().focused
    }

    /// Every alert raised so far, oldest first
    pub fn alerts(&self) -> Vec<String> {
        self.read().alerts.clone()
    }

    /// Registered `(target, event)` listeners
    pub fn listeners(&self) -> Vec<(ElementId, EventKind)> {
        self.read().listeners.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for Document {
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.read().collect_descendants(root, &mut out);
        out
    }

    fn tag_name(&self, element: ElementId) -> Option<String> {
        self.read().node(element).map(|n| n.tag.clone())
    }

    fn attr(&self, element: ElementId, name: &str) -> Option<String> {
        self.read()
            .node(element)
            .and_then(|n| n.attrs.get(name).cloned())
    }

    fn text(&self, element: ElementId) -> String {
        let mut out = String::new();
        self.read().collect_text(element, &mut out);
        out
    }

    fn value(&self, element: ElementId) -> String {
        let tree = self.read();
        match tree.node(element) {
            Some(n) if n.tag == "select" && n.value.is_empty() => tree.selected_option_value(element),
            Some(n) => n.value.clone(),
            None => String::new(),
        }
    }

    fn is_checked(&self, element: ElementId) -> bool {
        self.read().node(element).map_or(false, |n| n.checked)
    }

    fn is_required(&self, element: ElementId) -> bool {
        self.read().node(element).map_or(false, |n| n.required)
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.read()
            .node(element)
            .map_or(false, |n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&self, element: ElementId, class: &str) {
        if let Some(node) = self.write().node_mut(element) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        if let Some(node) = self.write().node_mut(element) {
            node.classes.retain(|c| c != class);
        }
    }

    fn focus(&self, element: ElementId) {
        self.write().focused = Some(element);
    }

    fn listen(&self, target: ElementId, kind: EventKind) {
        self.write().listeners.push((target, kind));
    }

    fn unlisten(&self, target: ElementId, kind: EventKind) {
        let mut tree = self.write();
        if let Some(pos) = tree.listeners.iter().position(|&l| l == (target, kind)) {
            tree.listeners.remove(pos);
        }
    }

    fn alert(&self, message: &str) {
        self.write().alerts.push(message.to_string());
    }

    fn reset(&self, form: ElementId) {
        let mut tree = self.write();
        let mut controls = Vec::new();
        tree.collect_descendants(form, &mut controls);
        for id in controls {
            if let Some(node) = tree.node_mut(id) {
                node.value = node.default_value.clone();
                if node.is_toggle() {
                    node.checked = node.default_checked;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendants_in_document_order() {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());
        let fieldset = doc.append(form, ElementSpec::new("fieldset"));
        let a = doc.append(fieldset, ElementSpec::input("text", "a"));
        let b = doc.append(form, ElementSpec::input("text", "b"));

        assert_eq!(doc.descendants(form), vec![fieldset, a, b]);
        assert_eq!(doc.parent(a), Some(fieldset));
    }

    #[test]
    fn test_spec_attributes_seed_properties() {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());
        let check = doc.append(form, ElementSpec::input("checkbox", "agree").checked().required());
        let text = doc.append(form, ElementSpec::input("text", "name").value("Jane").class("wide big"));

        assert!(doc.is_checked(check));
        assert!(doc.is_required(check));
        assert_eq!(doc.value(check), "on");
        assert_eq!(doc.value(text), "Jane");
        assert!(doc.has_class(text, "big"));
    }

    #[test]
    fn test_class_toggling_is_idempotent() {
        let doc = Document::new();
        let el = doc.append(doc.root(), ElementSpec::new("div"));
        doc.add_class(el, "error");
        doc.add_class(el, "error");
        assert_eq!(doc.classes(el), vec!["error".to_string()]);
        doc.remove_class(el, "error");
        assert!(!doc.has_class(el, "error"));
    }

    #[test]
    fn test_text_includes_children() {
        let doc = Document::new();
        let label = doc.append(doc.root(), ElementSpec::label("Your "));
        doc.append(label, ElementSpec::new("b").text("email"));
        assert_eq!(doc.text(label), "Your email");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());
        let text = doc.append(form, ElementSpec::input("text", "name").value("initial"));
        let check = doc.append(form, ElementSpec::input("checkbox", "agree"));

        doc.set_value(text, "changed");
        doc.set_checked(check, true);
        doc.reset(form);

        assert_eq!(doc.value(text), "initial");
        assert!(!doc.is_checked(check));
    }

    #[test]
    fn test_focus_alert_and_listeners_are_recorded() {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());
        doc.focus(form);
        doc.alert("hello");
        doc.listen(form, EventKind::Submit);

        assert_eq!(doc.focused(), Some(form));
        assert_eq!(doc.alerts(), vec!["hello".to_string()]);
        assert_eq!(doc.listeners(), vec![(form, EventKind::Submit)]);
    }

    #[test]
    fn test_unlisten_drops_one_registration() {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());
        let email = doc.append(form, ElementSpec::input("email", "email"));
        doc.listen(form, EventKind::Submit);
        doc.listen(email, EventKind::Input);

        doc.unlisten(email, EventKind::Input);
        doc.unlisten(email, EventKind::Click);

        assert_eq!(doc.listeners(), vec![(form, EventKind::Submit)]);
    }

    #[test]
    fn test_select_value_follows_selected_option() {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());

        let topic = doc.append(form, ElementSpec::new("select").attr("name", "topic"));
        doc.append(topic, ElementSpec::new("option").attr("value", "sales").text("Sales"));
        doc.append(
            topic,
            ElementSpec::new("option")
                .attr("value", "support")
                .attr("selected", "")
                .text("Support"),
        );
        assert_eq!(doc.value(topic), "support");

        let size = doc.append(form, ElementSpec::new("select").attr("name", "size"));
        doc.append(size, ElementSpec::new("option").text(" Large "));
        doc.append(size, ElementSpec::new("option").text("Small"));
        assert_eq!(doc.value(size), "Large");

        doc.set_value(size, "Small");
        assert_eq!(doc.value(size), "Small");

        let empty = doc.append(form, ElementSpec::new("select").attr("name", "none"));
        assert_eq!(doc.value(empty), "");
    }
}
