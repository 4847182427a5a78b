use crate::domain::model::{AlertMessage, DomainSnapshot, HttpStatus};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 外部 WHOIS 查詢：輸入網域，回傳原始文字
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<String>;
}

#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn fetch_http_status(&self, domain: &str) -> HttpStatus;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, alert: &AlertMessage) -> Result<()>;
}

pub trait StateStore: Send + Sync {
    /// 檔案不存在時回傳 `Ok(None)`
    fn load(&self) -> impl std::future::Future<Output = Result<Option<DomainSnapshot>>> + Send;
    fn save(
        &self,
        snapshot: &DomainSnapshot,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
