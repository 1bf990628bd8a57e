//! Rusty Forms Client
//!
//! Binds to an HTML form, collects its fields, applies regex validation,
//! toggles error styling and posts the data to a server endpoint.
//!
//! The page itself is reached through collaborator traits so the same
//! controller runs against a browser binding or the in-memory [`Document`]:
//!
//! - [`Dom`] - element queries, classes, focus, listeners, alerts
//! - [`Transport`] - HTTP POST
//! - [`Scheduler`] - delayed tasks
//! - [`FormObserver`] - notifications (`before_ajax`, `sent`, `after_ajax`,
//!   `field_status_changed`, `reset`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_forms_client::{Document, DomEvent, ElementSpec, FormController, FormOptions};
//! # use rusty_forms_client::{Payload, Transport, TransportError};
//! # use std::sync::Arc;
//! # struct Echo;
//! # #[async_trait::async_trait]
//! # impl Transport for Echo {
//! #     async fn post(&self, _: &str, _: &Payload) -> Result<String, TransportError> {
//! #         Ok(r#"{"success": true}"#.to_string())
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let doc = Arc::new(Document::new());
//!     let form = doc.append(doc.root(), ElementSpec::form());
//!     doc.append(form, ElementSpec::input("email", "email").required().value("a@b.com"));
//!     doc.append(form, ElementSpec::input("submit", "send"));
//!
//!     let controller = FormController::builder(form, doc.clone(), Arc::new(Echo))
//!         .options(FormOptions::new("/api/contact"))
//!         .build()?;
//!
//!     let outcome = controller.handle_submit(&mut DomEvent::submit(form)).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod events;
pub mod field;
pub mod scheduler;
pub mod transport;
pub mod validators;

/// Request body: the static payload plus collected `fields`
pub type Payload = serde_json::Map<String, serde_json::Value>;

pub use config::FormOptions;
pub use controller::{
    is_success_response, Binding, Dispatch, FieldCheck, FormController, FormControllerBuilder,
    SendOutcome, SubmitOutcome, ERROR_CLASS, LOADING_CLASS, RESET_DELAY,
};
pub use dom::{Document, Dom, DomEvent, ElementId, ElementSpec, EventKind};
pub use error::{FormError, TransportError};
pub use events::{FieldStatus, FormCallbacks, FormObserver, ObserverSet};
pub use field::{FieldRecord, Submission};
pub use scheduler::{ManualScheduler, Scheduler, Task, TokioScheduler};
pub use transport::{encode_form_body, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;
