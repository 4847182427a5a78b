use crate::config::{MonitorConfig, SmtpSecurity};
use crate::domain::model::AlertMessage;
use crate::domain::ports::Mailer;
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

fn mail_error(e: impl std::fmt::Display) -> MonitorError {
    MonitorError::MailError {
        message: e.to_string(),
    }
}

fn parse_mailbox(field: &str, address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| MonitorError::InvalidConfigValueError {
            field: field.to_string(),
            value: address.to_string(),
            reason: format!("Invalid email address: {}", e),
        })
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpMailer {
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let smtp = &config.smtp;

        let builder = match smtp.security {
            SmtpSecurity::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host).map_err(mail_error)?
            }
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                    .map_err(mail_error)?
            }
            SmtpSecurity::None => {
                tracing::warn!("⚠️ SMTP security is disabled, credentials are sent in clear text");
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp.host.as_str())
            }
        };

        let mut builder = builder
            .port(smtp.port)
            .timeout(Some(config.smtp_timeout()));
        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let to = smtp
            .to
            .iter()
            .map(|address| parse_mailbox("smtp.to", address))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox("smtp.from", &smtp.from)?,
            to,
        })
    }

    pub fn build_message(&self, alert: &AlertMessage) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(alert.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        builder.body(alert.body.clone()).map_err(mail_error)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, alert: &AlertMessage) -> Result<()> {
        let message = self.build_message(alert)?;
        tracing::debug!("Sending email to {} recipient(s)", self.to.len());
        self.transport.send(message).await.map_err(mail_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(port: u16) -> MonitorConfig {
        MonitorConfig::from_toml_str(&format!(
            r#"
[domain]
name = "example.com"

[smtp]
host = "127.0.0.1"
port = {}
security = "none"
from = "Domain Monitor <monitor@example.com>"
to = ["ops@example.com", "oncall@example.com"]
timeout_seconds = 2
"#,
            port
        ))
        .unwrap()
    }

    fn alert() -> AlertMessage {
        AlertMessage {
            subject: "example.com changed".to_string(),
            body: "HTTP status changed:\n  Previous: 200\n  Current:  503".to_string(),
        }
    }

    #[test]
    fn test_message_headers_and_body() {
        let mailer = SmtpMailer::from_config(&config_for(2525)).unwrap();
        let message = mailer.build_message(&alert()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("Subject: example.com changed"));
        assert!(formatted.contains("monitor@example.com"));
        assert!(formatted.contains("ops@example.com"));
        assert!(formatted.contains("oncall@example.com"));
        assert!(formatted.contains("HTTP status changed:"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_mail_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mailer = SmtpMailer::from_config(&config_for(port)).unwrap();

        assert!(matches!(
            mailer.send(&alert()).await,
            Err(MonitorError::MailError { .. })
        ));
    }
}
