use crate::config::MonitorConfig;
use crate::domain::ports::WhoisLookup;
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// 呼叫系統的 whois 指令（或任何「網域進、文字出」的程式）
#[derive(Debug, Clone)]
pub struct CommandWhoisLookup {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandWhoisLookup {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.whois.command.clone(),
            config.whois.args.clone(),
            config.whois_timeout(),
        )
    }
}

#[async_trait]
impl WhoisLookup for CommandWhoisLookup {
    async fn lookup(&self, domain: &str) -> Result<String> {
        tracing::debug!("Running {} {:?} {}", self.program, self.args, domain);

        let output = timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&self.args)
                .arg(domain)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| MonitorError::WhoisUnavailable {
            message: format!("{} timed out after {:?}", self.program, self.timeout),
        })?
        .map_err(|e| MonitorError::WhoisUnavailable {
            message: format!("failed to run {}: {}", self.program, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("Error running whois: {}", stderr.trim());
            return Err(MonitorError::WhoisUnavailable {
                message: format!("{} exited with {}", self.program, output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn script(body: &str, timeout: Duration) -> CommandWhoisLookup {
        // sh -c '<body>' sh <domain>：網域會成為 $1
        CommandWhoisLookup::new(
            "sh",
            vec!["-c".to_string(), body.to_string(), "sh".to_string()],
            timeout,
        )
    }

    #[tokio::test]
    async fn test_stdout_is_returned() {
        let lookup = script(
            r#"printf 'Domain Name: %s\nUpdated Date: 2024-06-01T00:00:00Z\n' "$1""#,
            Duration::from_secs(5),
        );

        let raw = lookup.lookup("example.com").await.unwrap();
        assert!(raw.contains("Domain Name: example.com"));
        assert!(raw.contains("Updated Date: 2024-06-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_unavailable() {
        let lookup = script("echo 'connect: Connection refused' >&2; exit 2", Duration::from_secs(5));
        assert!(matches!(
            lookup.lookup("example.com").await,
            Err(MonitorError::WhoisUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let lookup = CommandWhoisLookup::new(
            "definitely-not-a-whois-client",
            vec![],
            Duration::from_secs(5),
        );
        let err = lookup.lookup("example.com").await.unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out() {
        let lookup = script("sleep 5", Duration::from_millis(200));
        let err = lookup.lookup("example.com").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
