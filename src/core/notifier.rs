use crate::core::alert::compose_alert;
use crate::domain::model::{AlertMessage, ChangeSet, DomainSnapshot, NotificationOutcome};
use crate::domain::ports::{Mailer, StateStore};
use crate::utils::error::Result;
use chrono::Utc;

/// 比對上次記錄與目前快照，有差異時寄信，寄送成功後才寫入新狀態
pub struct ChangeNotifier<S: StateStore, M: Mailer> {
    store: S,
    mailer: M,
}

impl<S: StateStore, M: Mailer> ChangeNotifier<S, M> {
    pub fn new(store: S, mailer: M) -> Self {
        Self { store, mailer }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 只比對、組信，不寄送也不寫檔（給 --dry-run 用）
    pub async fn preview(
        &self,
        domain: &str,
        current: &DomainSnapshot,
    ) -> Result<Option<AlertMessage>> {
        let prior = self.store.load().await?;
        let changes = ChangeSet::between(prior.as_ref(), current);
        if changes.is_empty() {
            return Ok(None);
        }
        Ok(Some(compose_alert(domain, &changes, current, Utc::now())))
    }

    pub async fn evaluate_and_notify(
        &self,
        domain: &str,
        current: &DomainSnapshot,
    ) -> Result<NotificationOutcome> {
        let prior = self.store.load().await?;
        if prior.is_none() {
            tracing::info!("No previous state for {}, recording baseline", domain);
        }

        let changes = ChangeSet::between(prior.as_ref(), current);
        if changes.is_empty() {
            tracing::info!(
                "No change for {} (whois: {}, http: {})",
                domain,
                current.whois_display(),
                current.http_status
            );
            return Ok(NotificationOutcome::Unchanged);
        }

        let changed_fields = changes.fields();
        for change in &changes.changes {
            tracing::info!(
                "🔔 {} {}: {} -> {}",
                domain,
                change.field.label(),
                change.previous.as_deref().unwrap_or("-"),
                change.current
            );
        }

        let alert = compose_alert(domain, &changes, current, Utc::now());
        tracing::debug!("Sending alert with subject: {}", alert.subject);

        if let Err(e) = self.mailer.send(&alert).await {
            // 不寫入狀態，下次執行會偵測到相同差異並重送
            tracing::error!("❌ Failed to send alert for {}: {}", domain, e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            return Ok(NotificationOutcome::DeliveryFailed {
                changed_fields,
                error: e.to_string(),
            });
        }
        tracing::info!("📧 Notification email sent: {}", alert.subject);

        self.store.save(current).await?;
        tracing::debug!("Persisted new state for {}", domain);

        Ok(NotificationOutcome::Notified { changed_fields })
    }
}
