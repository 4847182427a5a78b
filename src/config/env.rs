use crate::config::toml_config::{
    default_state_path, DomainConfig, LoggingConfig, MonitorConfig, SmtpConfig, SmtpSecurity,
    StateConfig, WhoisConfig,
};
use crate::utils::error::{MonitorError, Result};
use std::env;

pub const DOMAIN: &str = "DOMAIN_MONITOR_DOMAIN";
pub const SMTP_HOST: &str = "DOMAIN_MONITOR_SMTP_HOST";
pub const SMTP_PORT: &str = "DOMAIN_MONITOR_SMTP_PORT";
pub const SMTP_USERNAME: &str = "DOMAIN_MONITOR_SMTP_USERNAME";
pub const SMTP_PASSWORD: &str = "DOMAIN_MONITOR_SMTP_PASSWORD";
pub const EMAIL_FROM: &str = "DOMAIN_MONITOR_EMAIL_FROM";
pub const EMAIL_TO: &str = "DOMAIN_MONITOR_EMAIL_TO";
pub const STATE_PATH: &str = "DOMAIN_MONITOR_STATE_PATH";

fn require<F>(lookup: &F, name: &str, field: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| MonitorError::MissingConfigError {
        field: format!("{} ({})", field, name),
    })
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| MonitorError::InvalidConfigValueError {
            field: SMTP_PORT.to_string(),
            value: value.to_string(),
            reason: "Port must be a number between 1 and 65535".to_string(),
        })
}

fn split_recipients(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl MonitorConfig {
    /// 沒有設定檔時，完全由環境變數建立配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(SMTP_PORT) {
            Some(port) => parse_port(&port)?,
            None => 465,
        };

        Ok(Self {
            domain: DomainConfig {
                name: require(&lookup, DOMAIN, "domain.name")?,
                scheme: "https".to_string(),
                http_timeout_seconds: 10,
                follow_redirects: true,
            },
            whois: WhoisConfig::default(),
            smtp: SmtpConfig {
                host: require(&lookup, SMTP_HOST, "smtp.host")?,
                port,
                security: SmtpSecurity::Tls,
                username: lookup(SMTP_USERNAME),
                password: lookup(SMTP_PASSWORD),
                from: require(&lookup, EMAIL_FROM, "smtp.from")?,
                to: split_recipients(&require(&lookup, EMAIL_TO, "smtp.to")?),
                timeout_seconds: 30,
            },
            state: StateConfig {
                path: lookup(STATE_PATH).unwrap_or_else(default_state_path),
            },
            logging: LoggingConfig::default(),
        })
    }

    /// 環境變數優先於設定檔（密碼等機密通常放這裡）
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(process_env)
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup(DOMAIN) {
            self.domain.name = domain;
        }
        if let Some(host) = lookup(SMTP_HOST) {
            self.smtp.host = host;
        }
        if let Some(port) = lookup(SMTP_PORT) {
            self.smtp.port = parse_port(&port)?;
        }
        if let Some(username) = lookup(SMTP_USERNAME) {
            self.smtp.username = Some(username);
        }
        if let Some(password) = lookup(SMTP_PASSWORD) {
            self.smtp.password = Some(password);
        }
        if let Some(from) = lookup(EMAIL_FROM) {
            self.smtp.from = from;
        }
        if let Some(to) = lookup(EMAIL_TO) {
            self.smtp.to = split_recipients(&to);
        }
        if let Some(path) = lookup(STATE_PATH) {
            self.state.path = path;
        }
        Ok(())
    }
}
