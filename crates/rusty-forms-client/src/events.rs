// File: rusty-forms-client/src/events.rs
// Purpose: Typed notifications emitted by the form controller

use crate::dom::ElementId;
use crate::Payload;
use std::sync::{Arc, PoisonError, RwLock};

/// Snapshot carried by `field_status_changed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatus {
    pub element: ElementId,
    pub name: String,
    pub required: bool,
    pub valid: bool,
}

/// Receiver for form notifications
///
/// Every slot defaults to a no-op, so observers only implement what they
/// care about.
pub trait FormObserver: Send + Sync {
    /// Fired right before the request goes out
    fn before_ajax(&self, _payload: &Payload) {}

    /// Fired with the raw response body of a successful request
    fn sent(&self, _response: &str) {}

    /// Fired after every request, successful or not
    fn after_ajax(&self) {}

    /// Fired when a field enters or leaves the error state
    fn field_status_changed(&self, _status: &FieldStatus) {}

    /// Fired after a delay once the server reported success
    fn reset(&self) {}
}

type PayloadFn = Box<dyn Fn(&Payload) + Send + Sync>;
type ResponseFn = Box<dyn Fn(&str) + Send + Sync>;
type StatusFn = Box<dyn Fn(&FieldStatus) + Send + Sync>;
type SignalFn = Box<dyn Fn() + Send + Sync>;

/// Closure-based observer, one optional slot per notification
///
/// ```
/// use rusty_forms_client::FormCallbacks;
///
/// let callbacks = FormCallbacks::new()
///     .on_reset(|| println!("form cleared"))
///     .on_sent(|body| println!("server said {}", body));
/// ```
#[derive(Default)]
pub struct FormCallbacks {
    before_ajax: Option<PayloadFn>,
    sent: Option<ResponseFn>,
    after_ajax: Option<SignalFn>,
    field_status_changed: Option<StatusFn>,
    reset: Option<SignalFn>,
}

impl FormCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_ajax(mut self, f: impl Fn(&Payload) + Send + Sync + 'static) -> Self {
        self.before_ajax = Some(Box::new(f));
        self
    }

    pub fn on_sent(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sent = Some(Box::new(f));
        self
    }

    pub fn on_after_ajax(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.after_ajax = Some(Box::new(f));
        self
    }

    pub fn on_field_status_changed(
        mut self,
        f: impl Fn(&FieldStatus) + Send + Sync + 'static,
    ) -> Self {
        self.field_status_changed = Some(Box::new(f));
        self
    }

    pub fn on_reset(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.reset = Some(Box::new(f));
        self
    }
}

impl FormObserver for FormCallbacks {
    fn before_ajax(&self, payload: &Payload) {
        if let Some(f) = &self.before_ajax {
            f(payload);
        }
    }

    fn sent(&self, response: &str) {
        if let Some(f) = &self.sent {
            f(response);
        }
    }

    fn after_ajax(&self) {
        if let Some(f) = &self.after_ajax {
            f();
        }
    }

    fn field_status_changed(&self, status: &FieldStatus) {
        if let Some(f) = &self.field_status_changed {
            f(status);
        }
    }

    fn reset(&self) {
        if let Some(f) = &self.reset {
            f();
        }
    }
}

/// Registered observers of one form
///
/// Notifications go out in registration order. The list is snapshotted
/// before each emit, so an observer may register others while handling.
#[derive(Default)]
pub struct ObserverSet {
    observers: RwLock<Vec<Arc<dyn FormObserver>>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn FormObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn FormObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn before_ajax(&self, payload: &Payload) {
        for observer in self.snapshot() {
            observer.before_ajax(payload);
        }
    }

    pub fn sent(&self, response: &str) {
        for observer in self.snapshot() {
            observer.sent(response);
        }
    }

    pub fn after_ajax(&self) {
        for observer in self.snapshot() {
            observer.after_ajax();
        }
    }

    pub fn field_status_changed(&self, status: &FieldStatus) {
        for observer in self.snapshot() {
            observer.field_status_changed(status);
        }
    }

    pub fn reset(&self) {
        for observer in self.snapshot() {
            observer.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_callbacks_fire_only_filled_slots() {
        let resets = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let counter = resets.clone();
        let sink = seen.clone();
        let callbacks = FormCallbacks::new()
            .on_reset(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .on_sent(move |body| sink.lock().unwrap().push(body.to_string()));

        let set = ObserverSet::new();
        set.register(Arc::new(callbacks));
        set.sent("{\"success\":true}");
        set.reset();
        set.after_ajax();
        set.before_ajax(&Payload::new());

        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["{\"success\":true}".to_string()]);
    }

    #[test]
    fn test_observers_notified_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let set = ObserverSet::new();
        for tag in ["first", "second"] {
            let order = order.clone();
            set.register(Arc::new(FormCallbacks::new().on_field_status_changed(
                move |status| order.lock().unwrap().push((tag, status.valid)),
            )));
        }

        set.field_status_changed(&FieldStatus {
            element: ElementId(1),
            name: "email".to_string(),
            required: true,
            valid: false,
        });

        assert_eq!(set.len(), 2);
        assert_eq!(*order.lock().unwrap(), vec![("first", false), ("second", false)]);
    }
}
