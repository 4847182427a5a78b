use crate::utils::error::{MonitorError, Result};
use lettre::message::Mailbox;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 檢查是否為純主機名稱（不含 scheme、路徑或空白）
pub fn validate_domain_name(field_name: &str, domain: &str) -> Result<()> {
    let invalid = |reason: &str| MonitorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: domain.to_string(),
        reason: reason.to_string(),
    };

    if domain.trim().is_empty() {
        return Err(invalid("Domain cannot be empty"));
    }
    if domain.contains("://") {
        return Err(invalid("Domain must not include a scheme"));
    }
    if domain.chars().any(|c| c.is_whitespace() || c == '/' || c == '?' || c == '#') {
        return Err(invalid("Domain must be a bare host name"));
    }

    match Url::parse(&format!("https://{}/", domain)) {
        Ok(url) if url.host_str().is_some() => Ok(()),
        Ok(_) => Err(invalid("Domain has no host part")),
        Err(e) => Err(invalid(&format!("Invalid domain: {}", e))),
    }
}

pub fn validate_scheme(field_name: &str, scheme: &str) -> Result<()> {
    match scheme {
        "http" | "https" => Ok(()),
        other => Err(MonitorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: other.to_string(),
            reason: "Unsupported URL scheme, expected http or https".to_string(),
        }),
    }
}

pub fn validate_mailbox(field_name: &str, address: &str) -> Result<()> {
    address
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|e| MonitorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: address.to_string(),
            reason: format!("Invalid email address: {}", e),
        })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MonitorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MonitorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MonitorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(MonitorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Expected one of: {}", allowed.join(", ")),
    })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MonitorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
