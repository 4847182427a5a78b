use crate::config::MonitorConfig;
use crate::domain::model::HttpStatus;
use crate::domain::ports::StatusProbe;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

const USER_AGENT: &str = concat!("domain-monitor/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

pub struct HttpProbe {
    client: Client,
    scheme: String,
}

impl HttpProbe {
    pub fn new(scheme: &str, timeout: Duration, follow_redirects: bool) -> Result<Self> {
        let policy = if follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        let client = Client::builder()
            .timeout(timeout)
            .redirect(policy)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            scheme: scheme.to_string(),
        })
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Self::new(
            &config.domain.scheme,
            config.http_timeout(),
            config.domain.follow_redirects,
        )
    }

    pub fn url_for(&self, domain: &str) -> String {
        format!("{}://{}/", self.scheme, domain)
    }
}

fn failure_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_redirect() {
        "redirect"
    } else {
        "request"
    }
}

#[async_trait]
impl StatusProbe for HttpProbe {
    /// 傳輸層錯誤（DNS、連線、逾時、TLS）一律回傳 `HttpStatus::Unreachable`
    async fn fetch_http_status(&self, domain: &str) -> HttpStatus {
        let url = self.url_for(domain);
        tracing::debug!("Performing HTTP GET for URL: {}", url);

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!("HTTP GET succeeded with status code: {}", status);
                HttpStatus::Code(status.as_u16())
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ HTTP request to {} failed ({}): {}",
                    url,
                    failure_kind(&e),
                    e
                );
                HttpStatus::Unreachable
            }
        }
    }
}
