use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("WHOIS lookup unavailable: {message}")]
    WhoisUnavailable { message: String },

    #[error("Mail delivery failed: {message}")]
    MailError { message: String },

    #[error("Failed to read state file {path}: {source}")]
    StateReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file {path}: {message}")]
    StateWriteError { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Probe,
    Notification,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MonitorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MonitorError::ConfigError { .. }
            | MonitorError::MissingConfigError { .. }
            | MonitorError::InvalidConfigValueError { .. }
            | MonitorError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            MonitorError::HttpError(_) => ErrorCategory::Network,
            MonitorError::WhoisUnavailable { .. } => ErrorCategory::Probe,
            MonitorError::MailError { .. } => ErrorCategory::Notification,
            MonitorError::IoError(_)
            | MonitorError::StateReadError { .. }
            | MonitorError::StateWriteError { .. } => ErrorCategory::Storage,
            MonitorError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 探測失敗只代表「未知」，不會中止流程
            MonitorError::WhoisUnavailable { .. } => ErrorSeverity::Low,
            // 下次排程會重送
            MonitorError::MailError { .. } => ErrorSeverity::Medium,
            MonitorError::HttpError(_) => ErrorSeverity::Medium,
            MonitorError::ConfigError { .. }
            | MonitorError::MissingConfigError { .. }
            | MonitorError::InvalidConfigValueError { .. }
            | MonitorError::ConfigValidationError { .. } => ErrorSeverity::High,
            MonitorError::SerializationError(_) => ErrorSeverity::High,
            // 狀態無法寫入會導致重複告警
            MonitorError::IoError(_)
            | MonitorError::StateReadError { .. }
            | MonitorError::StateWriteError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MonitorError::HttpError(_) => {
                "Check TLS roots and proxy settings on this host".to_string()
            }
            MonitorError::IoError(_) => "Check file permissions and free disk space".to_string(),
            MonitorError::SerializationError(_) => {
                "Re-run without --json and report the failure".to_string()
            }
            MonitorError::ConfigError { .. } | MonitorError::ConfigValidationError { .. } => {
                "Review domain-monitor.toml against the documented sections".to_string()
            }
            MonitorError::MissingConfigError { field } => format!(
                "Set '{}' in the config file or through its DOMAIN_MONITOR_* variable",
                field
            ),
            MonitorError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}'", field)
            }
            MonitorError::WhoisUnavailable { .. } => {
                "Make sure the whois client is installed and the registry is reachable".to_string()
            }
            MonitorError::MailError { .. } => {
                "Verify SMTP host, port, security mode and credentials".to_string()
            }
            MonitorError::StateReadError { path, .. } | MonitorError::StateWriteError { path, .. } => {
                format!("Check that {} is readable and writable by this user", path)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Probe => format!("Probe problem: {}", self),
            ErrorCategory::Notification => format!("Could not send the alert: {}", self),
            ErrorCategory::Storage => format!("Could not access the state file: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
