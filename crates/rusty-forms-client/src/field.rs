// File: rusty-forms-client/src/field.rs
// Purpose: Field records and the per-submission collection pass

use crate::dom::{Dom, ElementId};
use crate::error::FormError;
use crate::Payload;
use serde_json::{json, Value};
use std::collections::HashMap;

/// One collected form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub name: String,
    pub element: ElementId,
    pub value: String,
    /// The `type` attribute; `None` for select, textarea and untyped inputs
    pub kind: Option<String>,
    pub required: bool,
    /// Human-readable label sent along with the value
    pub subject: String,
    pub valid: bool,
}

impl FieldRecord {
    /// Build a record for `element`, resolving its subject within `form`
    pub fn read(dom: &dyn Dom, form: ElementId, element: ElementId) -> Result<Self, FormError> {
        let name = dom
            .attr(element, "name")
            .filter(|n| !n.is_empty())
            .ok_or(FormError::MissingName { element })?;
        let subject = resolve_subject(dom, form, element, &name);

        Ok(Self {
            subject,
            element,
            value: dom.value(element),
            kind: dom.attr(element, "type"),
            required: dom.is_required(element),
            valid: true,
            name,
        })
    }

    /// Checkbox or radio
    pub fn is_toggle(&self) -> bool {
        matches!(self.kind.as_deref(), Some("checkbox") | Some("radio"))
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Whether `element` takes part in a submission
///
/// Matches every input except submit, checkbox and radio, plus checked
/// inputs, selects, textareas, and any required input.
pub fn is_collectable(dom: &dyn Dom, element: ElementId) -> bool {
    match dom.tag_name(element).as_deref() {
        Some("select") | Some("textarea") => true,
        Some("input") => {
            let plain = !matches!(
                dom.attr(element, "type").as_deref(),
                Some("submit") | Some("checkbox") | Some("radio")
            );
            plain || dom.is_checked(element) || dom.is_required(element)
        }
        _ => false,
    }
}

/// Label for a field, first non-empty of:
/// `[data-subject-for=name]` text, `label[for=id]` text, placeholder, name
pub fn resolve_subject(dom: &dyn Dom, form: ElementId, element: ElementId, name: &str) -> String {
    let within = dom.descendants(form);

    let explicit: String = within
        .iter()
        .filter(|&&el| dom.attr(el, "data-subject-for").as_deref() == Some(name))
        .map(|&el| dom.text(el))
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }

    if let Some(id) = dom.attr(element, "id") {
        let labelled: String = within
            .iter()
            .filter(|&&el| {
                dom.tag_name(el).as_deref() == Some("label")
                    && dom.attr(el, "for").as_deref() == Some(id.as_str())
            })
            .map(|&el| dom.text(el))
            .collect();
        if !labelled.is_empty() {
            return labelled;
        }
    }

    match dom.attr(element, "placeholder") {
        Some(placeholder) if !placeholder.is_empty() => placeholder,
        _ => name.to_string(),
    }
}

/// State of a single submission attempt
///
/// Rebuilt from scratch on every collection pass; nothing carries over
/// between attempts, including input subscriptions.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    fields: Vec<FieldRecord>,
    payload: Payload,
    watched: HashMap<ElementId, usize>,
}

impl Submission {
    /// Collect every relevant control of `form`
    ///
    /// The payload is `base` with its `fields` entry replaced by the
    /// collected `{name: {subject, value}}` mapping.
    pub fn collect(dom: &dyn Dom, form: ElementId, base: &Payload) -> Result<Self, FormError> {
        let mut fields = Vec::new();
        let mut entries = Payload::new();

        for element in dom.descendants(form) {
            if !is_collectable(dom, element) {
                continue;
            }
            let record = FieldRecord::read(dom, form, element)?;
            merge_entry(&mut entries, &record);
            fields.push(record);
        }

        let mut payload = base.clone();
        payload.insert("fields".to_string(), Value::Object(entries));

        Ok(Self {
            fields,
            payload,
            watched: HashMap::new(),
        })
    }

    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldRecord> {
        self.fields.get(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FieldRecord> {
        self.fields.get_mut(index)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Watch input on the record at `index`, replacing any previous
    /// subscription for the same element.
    /// Returns the element when it was not watched before.
    pub fn watch(&mut self, index: usize) -> Option<ElementId> {
        let element = self.fields.get(index)?.element;
        self.watched.insert(element, index).is_none().then_some(element)
    }

    /// Record index subscribed to input on `element`
    pub fn watched(&self, element: ElementId) -> Option<usize> {
        self.watched.get(&element).copied()
    }

    pub fn watch_count(&self) -> usize {
        self.watched.len()
    }

    /// Elements with a live input subscription
    pub fn watched_elements(&self) -> Vec<ElementId> {
        let mut elements: Vec<ElementId> = self.watched.keys().copied().collect();
        elements.sort();
        elements
    }
}

// Same-name fields share one payload entry. A later value is appended only
// when the existing value is non-empty.
fn merge_entry(entries: &mut Payload, record: &FieldRecord) {
    if !entries.contains_key(&record.name) {
        entries.insert(
            record.name.clone(),
            json!({ "subject": record.subject, "value": record.value }),
        );
        return;
    }

    if let Some(Value::Object(entry)) = entries.get_mut(&record.name) {
        let existing = entry
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !existing.is_empty() {
            let joined = format!("{}, {}", existing, record.value);
            entry.insert("value".to_string(), Value::String(joined));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, ElementSpec};
    use pretty_assertions::assert_eq;

    fn form_doc() -> (Document, ElementId) {
        let doc = Document::new();
        let form = doc.append(doc.root(), ElementSpec::form());
        (doc, form)
    }

    #[test]
    fn test_selector_rules() {
        let (doc, form) = form_doc();
        let text = doc.append(form, ElementSpec::input("text", "a"));
        let untyped = doc.append(form, ElementSpec::new("input").attr("name", "b"));
        let submit = doc.append(form, ElementSpec::input("submit", "go"));
        let required_submit = doc.append(form, ElementSpec::input("submit", "go2").required());
        let unchecked = doc.append(form, ElementSpec::input("checkbox", "c"));
        let checked = doc.append(form, ElementSpec::input("radio", "d").checked());
        let required_box = doc.append(form, ElementSpec::input("checkbox", "e").required());
        let select = doc.append(form, ElementSpec::new("select").attr("name", "f"));
        let area = doc.append(form, ElementSpec::new("textarea").attr("name", "g"));
        let div = doc.append(form, ElementSpec::new("div"));

        assert!(is_collectable(&doc, text));
        assert!(is_collectable(&doc, untyped));
        assert!(!is_collectable(&doc, submit));
        assert!(is_collectable(&doc, required_submit));
        assert!(!is_collectable(&doc, unchecked));
        assert!(is_collectable(&doc, checked));
        assert!(is_collectable(&doc, required_box));
        assert!(is_collectable(&doc, select));
        assert!(is_collectable(&doc, area));
        assert!(!is_collectable(&doc, div));
    }

    #[test]
    fn test_subject_resolution_order() {
        let (doc, form) = form_doc();
        doc.append(form, ElementSpec::new("span").attr("data-subject-for", "email").text("E-mail"));
        doc.append(form, ElementSpec::label("Phone number").attr("for", "tel-id"));
        let email = doc.append(form, ElementSpec::input("email", "email").id("email-id"));
        let tel = doc.append(form, ElementSpec::input("tel", "tel").id("tel-id"));
        let city = doc.append(form, ElementSpec::input("text", "city").attr("placeholder", "Your city"));
        let zip = doc.append(form, ElementSpec::input("text", "zip"));

        assert_eq!(resolve_subject(&doc, form, email, "email"), "E-mail");
        assert_eq!(resolve_subject(&doc, form, tel, "tel"), "Phone number");
        assert_eq!(resolve_subject(&doc, form, city, "city"), "Your city");
        assert_eq!(resolve_subject(&doc, form, zip, "zip"), "zip");
    }

    #[test]
    fn test_empty_label_falls_through() {
        let (doc, form) = form_doc();
        doc.append(form, ElementSpec::new("span").attr("data-subject-for", "zip"));
        let zip = doc.append(form, ElementSpec::input("text", "zip").attr("placeholder", "ZIP"));
        assert_eq!(resolve_subject(&doc, form, zip, "zip"), "ZIP");
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let (doc, form) = form_doc();
        doc.append(form, ElementSpec::input("text", "ok"));
        let nameless = doc.append(form, ElementSpec::new("input").attr("type", "text"));

        let err = Submission::collect(&doc, form, &Payload::new()).unwrap_err();
        assert!(matches!(err, FormError::MissingName { element } if element == nameless));
    }

    #[test]
    fn test_collect_builds_payload_over_base() {
        let (doc, form) = form_doc();
        doc.append(form, ElementSpec::input("email", "email").value("a@b.com").required());
        doc.append(form, ElementSpec::new("textarea").attr("name", "message"));

        let mut base = Payload::new();
        base.insert("action".to_string(), json!("contact"));
        base.insert("fields".to_string(), json!({"stale": {"subject": "x", "value": "y"}}));

        let submission = Submission::collect(&doc, form, &base).unwrap();
        assert_eq!(submission.len(), 2);
        assert_eq!(
            Value::Object(submission.payload().clone()),
            json!({
                "action": "contact",
                "fields": {
                    "email": {"subject": "email", "value": "a@b.com"},
                    "message": {"subject": "message", "value": ""}
                }
            })
        );

        let email = submission.field(0).unwrap();
        assert_eq!(email.kind.as_deref(), Some("email"));
        assert!(email.required);
        assert!(email.valid);
    }

    #[test]
    fn test_same_name_values_are_joined() {
        let (doc, form) = form_doc();
        doc.append(form, ElementSpec::input("checkbox", "interest").value("sports").checked());
        doc.append(form, ElementSpec::input("checkbox", "interest").value("cooking"));
        doc.append(form, ElementSpec::input("checkbox", "interest").value("music").checked());

        let submission = Submission::collect(&doc, form, &Payload::new()).unwrap();
        assert_eq!(submission.len(), 2);
        assert_eq!(submission.payload()["fields"]["interest"]["value"], json!("sports, music"));
    }

    #[test]
    fn test_empty_first_value_is_not_joined() {
        let (doc, form) = form_doc();
        doc.append(form, ElementSpec::input("text", "alias"));
        doc.append(form, ElementSpec::input("text", "alias").value("second"));

        let submission = Submission::collect(&doc, form, &Payload::new()).unwrap();
        assert_eq!(submission.len(), 2);
        assert_eq!(submission.payload()["fields"]["alias"]["value"], json!(""));
    }

    #[test]
    fn test_watch_replaces_existing_subscription() {
        let (doc, form) = form_doc();
        let el = doc.append(form, ElementSpec::input("text", "a"));
        let mut submission = Submission::collect(&doc, form, &Payload::new()).unwrap();

        assert_eq!(submission.watch(0), Some(el));
        assert_eq!(submission.watch(0), None);
        assert_eq!(submission.watch(7), None);

        assert_eq!(submission.watch_count(), 1);
        assert_eq!(submission.watched(el), Some(0));
        assert_eq!(submission.watched_elements(), vec![el]);
    }
}
