use crate::core::notifier::ChangeNotifier;
use crate::core::whois_probe::WhoisProbe;
use crate::domain::model::{AlertMessage, DomainSnapshot, RunReport};
use crate::domain::ports::{Mailer, StateStore, StatusProbe, WhoisLookup};
use crate::utils::error::Result;
use chrono::Utc;

/// 一次執行：WHOIS 探測 → HTTP 探測 → 比對並通知，依序進行
pub struct DomainMonitor<L, P, S, M>
where
    L: WhoisLookup,
    P: StatusProbe,
    S: StateStore,
    M: Mailer,
{
    domain: String,
    whois: WhoisProbe<L>,
    http: P,
    notifier: ChangeNotifier<S, M>,
}

impl<L, P, S, M> DomainMonitor<L, P, S, M>
where
    L: WhoisLookup,
    P: StatusProbe,
    S: StateStore,
    M: Mailer,
{
    pub fn new(
        domain: impl Into<String>,
        whois: WhoisProbe<L>,
        http: P,
        notifier: ChangeNotifier<S, M>,
    ) -> Self {
        Self {
            domain: domain.into(),
            whois,
            http,
            notifier,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub async fn snapshot(&self) -> DomainSnapshot {
        let whois_updated_date = self.whois.fetch_whois_updated_date(&self.domain).await;
        let http_status = self.http.fetch_http_status(&self.domain).await;
        DomainSnapshot::new(whois_updated_date, http_status)
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting check for domain: {}", self.domain);

        let snapshot = self.snapshot().await;
        tracing::info!(
            "Snapshot for {}: whois updated date = {}, http status = {}",
            self.domain,
            snapshot.whois_display(),
            snapshot.http_status
        );

        let outcome = self
            .notifier
            .evaluate_and_notify(&self.domain, &snapshot)
            .await?;
        tracing::info!("✅ Check complete for {}: {:?}", self.domain, outcome);

        Ok(RunReport {
            domain: self.domain.clone(),
            snapshot,
            outcome,
            checked_at: Utc::now(),
        })
    }

    /// 探測並回傳將會寄出的通知，不寄信也不寫入狀態
    pub async fn dry_run(&self) -> Result<(DomainSnapshot, Option<AlertMessage>)> {
        tracing::info!("🔍 Dry run for domain: {}", self.domain);
        let snapshot = self.snapshot().await;
        let alert = self.notifier.preview(&self.domain, &snapshot).await?;
        Ok((snapshot, alert))
    }
}
