pub mod alert;
pub mod http_probe;
pub mod monitor;
pub mod notifier;
pub mod whois_probe;

pub use crate::domain::model::{DomainSnapshot, HttpStatus, NotificationOutcome};
pub use crate::domain::ports::{Mailer, StateStore, StatusProbe, WhoisLookup};
pub use crate::utils::error::Result;
