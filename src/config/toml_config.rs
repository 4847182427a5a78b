use crate::utils::error::{MonitorError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub domain: DomainConfig,
    #[serde(default)]
    pub whois: WhoisConfig,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub name: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisConfig {
    #[serde(default = "default_whois_command")]
    pub command: String,
    /// 放在網域名稱之前的額外參數
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_whois_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub normalize_dates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// 隱式 TLS（通常是 465 埠）
    Tls,
    StartTls,
    /// 明文，只用於本機 relay
    None,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_smtp_security")]
    pub security: SmtpSecurity,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: Vec<String>,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_seconds: u64,
}

// 避免把密碼寫進 debug 日誌
impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_whois_command() -> String {
    "whois".to_string()
}

fn default_whois_timeout() -> u64 {
    30
}

fn default_smtp_port() -> u16 {
    465
}

fn default_smtp_security() -> SmtpSecurity {
    SmtpSecurity::Tls
}

fn default_smtp_timeout() -> u64 {
    30
}

pub(crate) fn default_state_path() -> String {
    "domain-monitor.state".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            command: default_whois_command(),
            args: Vec::new(),
            timeout_seconds: default_whois_timeout(),
            normalize_dates: true,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl MonitorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MonitorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MonitorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 設定檔存在就讀檔，否則完全由環境變數組成；最後再套用環境變數覆寫
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)?
        } else {
            tracing::debug!(
                "No config file at {}, reading configuration from environment",
                path.display()
            );
            Self::from_env()?
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${SMTP_PASSWORD})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.domain.http_timeout_seconds)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois.timeout_seconds)
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp.timeout_seconds)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format == "json"
    }
}

impl Validate for MonitorConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        // 監控目標
        validate_domain_name("domain.name", &self.domain.name)?;
        validate_scheme("domain.scheme", &self.domain.scheme)?;
        validate_range("domain.http_timeout_seconds", self.domain.http_timeout_seconds, 1, 300)?;

        // WHOIS
        validate_non_empty_string("whois.command", &self.whois.command)?;
        validate_range("whois.timeout_seconds", self.whois.timeout_seconds, 1, 300)?;

        // SMTP
        validate_non_empty_string("smtp.host", &self.smtp.host)?;
        validate_range("smtp.port", self.smtp.port, 1, u16::MAX)?;
        validate_range("smtp.timeout_seconds", self.smtp.timeout_seconds, 1, 300)?;
        validate_mailbox("smtp.from", &self.smtp.from)?;
        if self.smtp.to.is_empty() {
            return Err(MonitorError::MissingConfigError {
                field: "smtp.to".to_string(),
            });
        }
        for recipient in &self.smtp.to {
            validate_mailbox("smtp.to", recipient)?;
        }
        if self.smtp.username.is_some() != self.smtp.password.is_some() {
            return Err(MonitorError::ConfigValidationError {
                field: "smtp.username".to_string(),
                message: "username and password must be set together".to_string(),
            });
        }

        validate_path("state.path", &self.state.path)?;

        validate_one_of(
            "logging.level",
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
        )?;
        validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[domain]
name = "example.com"

[smtp]
host = "smtp.example.com"
from = "monitor@example.com"
to = ["ops@example.com"]
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = MonitorConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.domain.name, "example.com");
        assert_eq!(config.domain.scheme, "https");
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert!(config.domain.follow_redirects);
        assert_eq!(config.whois.command, "whois");
        assert!(config.whois.args.is_empty());
        assert!(config.whois.normalize_dates);
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.security, SmtpSecurity::Tls);
        assert_eq!(config.state.path, "domain-monitor.state");
        assert_eq!(config.logging.level, "info");
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[domain]
name = "example.org"
scheme = "http"
http_timeout_seconds = 5
follow_redirects = false

[whois]
command = "/usr/bin/whois"
args = ["-h", "whois.verisign-grs.com"]
timeout_seconds = 15
normalize_dates = false

[smtp]
host = "mail.example.org"
port = 587
security = "starttls"
username = "monitor"
password = "hunter2"
from = "Domain Monitor <monitor@example.org>"
to = ["ops@example.org", "oncall@example.org"]
timeout_seconds = 20

[state]
path = "/var/lib/domain-monitor/example.org.state"

[logging]
level = "debug"
format = "json"
"#;
        let config = MonitorConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.domain.scheme, "http");
        assert!(!config.domain.follow_redirects);
        assert_eq!(config.whois.args, vec!["-h", "whois.verisign-grs.com"]);
        assert_eq!(config.whois_timeout(), Duration::from_secs(15));
        assert_eq!(config.smtp.security, SmtpSecurity::StartTls);
        assert_eq!(config.smtp.to.len(), 2);
        assert_eq!(config.smtp_timeout(), Duration::from_secs(20));
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_placeholders_are_substituted() {
        std::env::set_var("DOMAIN_MONITOR_TEST_SMTP_SECRET", "s3cret");
        let toml_content = r#"
[domain]
name = "example.com"

[smtp]
host = "smtp.example.com"
username = "monitor"
password = "${DOMAIN_MONITOR_TEST_SMTP_SECRET}"
from = "monitor@example.com"
to = ["ops@example.com"]
"#;
        let config = MonitorConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.smtp.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_unknown_placeholder_is_left_verbatim() {
        let toml_content = MINIMAL.replace("smtp.example.com", "${DOMAIN_MONITOR_TEST_UNSET_HOST}");
        let config = MonitorConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.smtp.host, "${DOMAIN_MONITOR_TEST_UNSET_HOST}");
    }

    #[test]
    fn test_password_is_redacted_in_debug_output() {
        let mut config = MonitorConfig::from_toml_str(MINIMAL).unwrap();
        config.smtp.username = Some("monitor".to_string());
        config.smtp.password = Some("hunter2".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = MonitorConfig::from_toml_str("[domain\nname=").unwrap_err();
        assert!(matches!(err, MonitorError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let base = MonitorConfig::from_toml_str(MINIMAL).unwrap();

        let mut config = base.clone();
        config.domain.name = "https://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.smtp.to.clear();
        assert!(matches!(
            config.validate(),
            Err(MonitorError::MissingConfigError { .. })
        ));

        let mut config = base.clone();
        config.smtp.username = Some("monitor".to_string());
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.whois.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.logging.format = "pretty".to_string();
        assert!(config.validate().is_err());

        let mut config = base;
        config.smtp.from = "nobody".to_string();
        assert!(config.validate().is_err());
    }
}
