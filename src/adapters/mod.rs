// Adapters layer: concrete implementations of the domain ports (subprocess whois, SMTP, state file).

pub mod mail;
pub mod storage;
pub mod whois;

pub use mail::SmtpMailer;
pub use storage::{FileStateStore, PersistedState};
pub use whois::CommandWhoisLookup;
