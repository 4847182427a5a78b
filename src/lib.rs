pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{CommandWhoisLookup, FileStateStore, SmtpMailer};
pub use crate::config::MonitorConfig;
pub use crate::core::{
    http_probe::HttpProbe, monitor::DomainMonitor, notifier::ChangeNotifier,
    whois_probe::WhoisProbe,
};
pub use crate::utils::error::{MonitorError, Result};
