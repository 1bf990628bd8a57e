// File: rusty-forms-client/src/controller.rs
// Purpose: Form controller - collect, validate, sync error UI, submit

use crate::config::FormOptions;
use crate::dom::{Dom, DomEvent, ElementId, EventKind};
use crate::error::{FormError, TransportError};
use crate::events::{FieldStatus, FormObserver, ObserverSet};
use crate::field::{FieldRecord, Submission};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::transport::Transport;
use crate::validators::ValidatorSet;
use crate::Payload;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Class marking a field in error state
pub const ERROR_CLASS: &str = "error";

/// Class marking the loading target while a request is in flight
pub const LOADING_CLASS: &str = "loading";

/// Delay between a successful response and the reset notification
pub const RESET_DELAY: Duration = Duration::from_millis(1000);

/// Which event starts a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Click on any submit trigger (custom UI mode)
    TriggerClick(Vec<ElementId>),
    /// The form's own submit event
    FormSubmit(ElementId),
}

impl Binding {
    pub fn matches(&self, event: &DomEvent) -> bool {
        match self {
            Binding::TriggerClick(triggers) => {
                event.kind == EventKind::Click && triggers.contains(&event.target)
            }
            Binding::FormSubmit(form) => event.kind == EventKind::Submit && event.target == *form,
        }
    }
}

/// Result of one submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request is already in flight; nothing was collected or sent
    Busy,
    /// At least one field is in error; focus moved to the first one
    Invalid { focused: ElementId },
    /// The request went out
    Sent(SendOutcome),
}

/// Result of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The server answered; `reset_scheduled` when it reported success
    Delivered { reset_scheduled: bool },
    /// Transport failure, already shown to the user
    Failed(TransportError),
}

/// Effect of checking one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    /// Field is (still) in error; marker applied and input watched
    Errored,
    /// Field left the error state; marker removed
    Cleared,
    /// Field passes and was not marked
    Unchanged,
}

/// What [`FormController::dispatch`] did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Submit(SubmitOutcome),
    Input(FieldCheck),
    Ignored,
}

/// Builder for [`FormController`]
pub struct FormControllerBuilder {
    form: ElementId,
    dom: Arc<dyn Dom>,
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    options: FormOptions,
    extra_validators: Vec<(String, Regex)>,
    loading_target: Option<ElementId>,
    observers: Vec<Arc<dyn FormObserver>>,
}

impl FormControllerBuilder {
    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a compiled validator; applied after the option overrides
    pub fn validator(mut self, key: impl Into<String>, pattern: Regex) -> Self {
        self.extra_validators.push((key.into(), pattern));
        self
    }

    /// Element receiving the loading marker instead of the submit triggers
    pub fn loading_target(mut self, target: ElementId) -> Self {
        self.loading_target = Some(target);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn FormObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Merge validators, find submit triggers and bind the submit listener
    pub fn build(self) -> Result<FormController, FormError> {
        let mut validators = ValidatorSet::with_overrides(&self.options.validators)?;
        for (key, pattern) in self.extra_validators {
            validators.insert(key, pattern);
        }

        let dom = self.dom;
        let form = self.form;
        let submit_triggers: Vec<ElementId> = dom
            .descendants(form)
            .into_iter()
            .filter(|&el| dom.attr(el, "type").as_deref() == Some("submit"))
            .collect();

        let loading_targets = match self.loading_target {
            Some(target) => vec![target],
            None => submit_triggers.clone(),
        };

        let binding = if self.options.custom_ui {
            if submit_triggers.is_empty() {
                tracing::warn!("Custom UI form {:?} has no submit trigger; it will never submit", form);
            }
            for &trigger in &submit_triggers {
                dom.listen(trigger, EventKind::Click);
            }
            Binding::TriggerClick(submit_triggers.clone())
        } else {
            dom.listen(form, EventKind::Submit);
            Binding::FormSubmit(form)
        };

        let observers = Arc::new(ObserverSet::new());
        for observer in self.observers {
            observers.register(observer);
        }

        tracing::debug!(
            "Form {:?} bound via {:?} with {} validators",
            form,
            binding,
            validators.len()
        );

        Ok(FormController {
            form,
            submit_triggers,
            loading_targets,
            binding,
            url: self.options.url,
            static_payload: self.options.ajax_data,
            validators,
            test_mode: self.options.test_mode,
            dom,
            transport: self.transport,
            scheduler: self.scheduler,
            observers,
            gate: Mutex::new(()),
            submission: RwLock::new(Submission::default()),
        })
    }
}

/// Drives one HTML form: collects its fields, validates them, keeps the
/// error UI in sync and posts the payload.
///
/// Every operation takes `&self`, so a host can share the controller (for
/// example behind an `Arc`) and deliver a second submit while a request is
/// still in flight. That submit is rejected with [`SubmitOutcome::Busy`].
pub struct FormController {
    form: ElementId,
    submit_triggers: Vec<ElementId>,
    loading_targets: Vec<ElementId>,
    binding: Binding,
    url: String,
    static_payload: Payload,
    validators: ValidatorSet,
    test_mode: bool,
    dom: Arc<dyn Dom>,
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    observers: Arc<ObserverSet>,
    // Held from the loading check until the marker is set; never across an await.
    gate: Mutex<()>,
    submission: RwLock<Submission>,
}

impl FormController {
    pub fn builder(
        form: ElementId,
        dom: Arc<dyn Dom>,
        transport: Arc<dyn Transport>,
    ) -> FormControllerBuilder {
        FormControllerBuilder {
            form,
            dom,
            transport,
            scheduler: Arc::new(TokioScheduler),
            options: FormOptions::default(),
            extra_validators: Vec::new(),
            loading_target: None,
            observers: Vec::new(),
        }
    }

    pub fn form(&self) -> ElementId {
        self.form
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn submit_triggers(&self) -> &[ElementId] {
        &self.submit_triggers
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Records of the latest collection pass
    pub fn fields(&self) -> Vec<FieldRecord> {
        self.state().fields().to_vec()
    }

    /// Payload of the latest collection pass
    pub fn payload(&self) -> Payload {
        self.state().payload().clone()
    }

    /// Elements currently subscribed to input events
    pub fn watched_inputs(&self) -> Vec<ElementId> {
        self.state().watched_elements()
    }

    pub fn subscribe(&self, observer: Arc<dyn FormObserver>) {
        self.observers.register(observer);
    }

    /// A request is in flight
    pub fn is_loading(&self) -> bool {
        self.loading_targets
            .iter()
            .any(|&el| self.dom.has_class(el, LOADING_CLASS))
    }

    /// Route a host event to the matching handler
    pub async fn dispatch(&self, event: &mut DomEvent) -> Result<Dispatch, FormError> {
        if self.binding.matches(event) {
            return Ok(Dispatch::Submit(self.handle_submit(event).await?));
        }
        if event.kind == EventKind::Input {
            if let Some(check) = self.handle_input(event.target) {
                return Ok(Dispatch::Input(check));
            }
        }
        Ok(Dispatch::Ignored)
    }

    /// Submission pipeline: collect, validate and check, then send or
    /// focus the first field in error
    ///
    /// Everything up to and including setting the loading marker runs
    /// before the first await.
    pub async fn handle_submit(&self, event: &mut DomEvent) -> Result<SubmitOutcome, FormError> {
        event.prevent_default();

        let payload = {
            let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

            if self.is_loading() {
                tracing::debug!("Form {:?} is already sending; submit ignored", self.form);
                return Ok(SubmitOutcome::Busy);
            }

            self.collect_fields()?;

            if !self.check_fields() {
                let focused = self.first_errored().unwrap_or(self.form);
                self.dom.focus(focused);
                tracing::debug!("Form {:?} has invalid fields; focused {:?}", self.form, focused);
                return Ok(SubmitOutcome::Invalid { focused });
            }

            self.begin_request()
        };

        Ok(SubmitOutcome::Sent(self.finish_request(payload).await))
    }

    /// Rebuild per-submission state from the current DOM.
    /// Input subscriptions of the previous attempt are released first.
    pub fn collect_fields(&self) -> Result<(), FormError> {
        // A failed pass must not leave the previous attempt's records behind.
        let stale = std::mem::take(&mut *self.state_mut());
        for element in stale.watched_elements() {
            self.dom.unlisten(element, EventKind::Input);
        }

        let submission = Submission::collect(self.dom.as_ref(), self.form, &self.static_payload)?;
        tracing::debug!("Collected {} fields from form {:?}", submission.len(), self.form);
        *self.state_mut() = submission;
        Ok(())
    }

    /// Validate and check every collected field.
    /// True when no element of the form carries the error marker afterwards.
    pub fn check_fields(&self) -> bool {
        let count = self.state().len();
        for index in 0..count {
            self.validate_input(index);
            self.check_input(index);
        }
        self.first_errored().is_none()
    }

    fn first_errored(&self) -> Option<ElementId> {
        self.dom
            .descendants(self.form)
            .into_iter()
            .find(|&el| self.dom.has_class(el, ERROR_CLASS))
    }

    /// Apply pattern and required-toggle checks to the record at `index`.
    /// Only ever clears `valid`; never sets it.
    pub fn validate_input(&self, index: usize) {
        let mut state = self.state_mut();
        let Some(record) = state.field_mut(index) else {
            return;
        };

        let by_type = self.validators.for_type(record.kind.as_deref());
        let by_name = self.validators.for_name(&record.name);

        if !record.value.is_empty() {
            if let Some(pattern) = by_type {
                if !pattern.is_match(&record.value) {
                    record.valid = false;
                }
            }
        }

        if let Some(pattern) = by_name {
            if !pattern.is_match(&record.value) {
                record.valid = false;
            }
        }

        if record.is_toggle() && record.required && !self.dom.is_checked(record.element) {
            record.valid = false;
        }
    }

    /// Sync the error marker of the record at `index` with its state.
    /// A field entering error state gets one input listener per attempt.
    pub fn check_input(&self, index: usize) -> FieldCheck {
        let (status, errored) = {
            let state = self.state();
            let Some(record) = state.field(index) else {
                return FieldCheck::Unchanged;
            };
            let status = FieldStatus {
                element: record.element,
                name: record.name.clone(),
                required: record.required,
                valid: record.valid,
            };
            (status, (record.required && record.is_empty()) || !record.valid)
        };

        if errored {
            self.dom.add_class(status.element, ERROR_CLASS);
            self.observers.field_status_changed(&status);
            let newly_watched = self.state_mut().watch(index);
            if let Some(element) = newly_watched {
                self.dom.listen(element, EventKind::Input);
            }
            return FieldCheck::Errored;
        }

        if self.dom.has_class(status.element, ERROR_CLASS) {
            self.dom.remove_class(status.element, ERROR_CLASS);
            self.observers.field_status_changed(&status);
            return FieldCheck::Cleared;
        }

        FieldCheck::Unchanged
    }

    /// Re-check a watched field after the user edited it.
    /// `None` when `element` is not watched in the current submission.
    pub fn handle_input(&self, element: ElementId) -> Option<FieldCheck> {
        let index = self.state().watched(element)?;
        let value = self.dom.value(element);
        if let Some(record) = self.state_mut().field_mut(index) {
            record.value = value;
            record.valid = true;
        }
        self.validate_input(index);
        Some(self.check_input(index))
    }

    /// Post the collected payload
    ///
    /// The loading marker is set for the duration of the request and is
    /// always removed before `after_ajax` fires. Unlike
    /// [`FormController::handle_submit`] this does not consult the marker.
    pub async fn send_ajax(&self) -> SendOutcome {
        let payload = self.begin_request();
        self.finish_request(payload).await
    }

    fn begin_request(&self) -> Payload {
        let payload = self.payload();
        self.log_diagnostic("Outgoing payload", &Value::Object(payload.clone()).to_string());

        self.observers.before_ajax(&payload);
        self.set_loading(true);
        payload
    }

    async fn finish_request(&self, payload: Payload) -> SendOutcome {
        let outcome = match self.transport.post(&self.url, &payload).await {
            Ok(response) => {
                self.log_diagnostic("Response", &response);
                self.observers.sent(&response);

                let reset_scheduled = is_success_response(&response);
                if reset_scheduled {
                    self.schedule_reset();
                }
                SendOutcome::Delivered { reset_scheduled }
            }
            Err(err) => {
                tracing::warn!("Posting form {:?} to {} failed: {}", self.form, self.url, err);
                self.dom.alert(&err.alert_text());
                SendOutcome::Failed(err)
            }
        };

        self.set_loading(false);
        self.observers.after_ajax();
        outcome
    }

    fn state(&self) -> RwLockReadGuard<'_, Submission> {
        self.submission.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, Submission> {
        self.submission.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_loading(&self, loading: bool) {
        for &target in &self.loading_targets {
            if loading {
                self.dom.add_class(target, LOADING_CLASS);
            } else {
                self.dom.remove_class(target, LOADING_CLASS);
            }
        }
    }

    fn schedule_reset(&self) {
        let observers = self.observers.clone();
        let dom = self.dom.clone();
        let form = self.form;
        self.scheduler.schedule(
            RESET_DELAY,
            Box::new(move || {
                tracing::debug!("Resetting form {:?}", form);
                observers.reset();
                dom.reset(form);
            }),
        );
    }

    fn log_diagnostic(&self, what: &str, body: &str) {
        if self.test_mode {
            tracing::info!("{}: {}", what, body);
        } else {
            tracing::debug!("{}: {}", what, body);
        }
    }
}

/// A response signals success when it is a JSON object whose `success`
/// member is boolean `true`. Anything unparseable is simply not a success.
pub fn is_success_response(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("success").and_then(Value::as_bool))
        .unwrap_or(false)
}
