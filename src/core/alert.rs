use crate::domain::model::{AlertMessage, ChangeSet, DomainSnapshot, SnapshotField};
use chrono::{DateTime, Utc};

const NO_PREVIOUS: &str = "(no previous record)";

fn current_value(snapshot: &DomainSnapshot, field: SnapshotField) -> String {
    match field {
        SnapshotField::WhoisUpdatedDate => snapshot.whois_display().to_string(),
        SnapshotField::HttpStatus => snapshot.http_status.to_string(),
    }
}

/// 組合通知信：變更的欄位列出前後值，未變更的欄位只列目前值
pub fn compose_alert(
    domain: &str,
    changes: &ChangeSet,
    current: &DomainSnapshot,
    checked_at: DateTime<Utc>,
) -> AlertMessage {
    let subject = if changes.first_run {
        format!("{} monitoring baseline recorded", domain)
    } else {
        format!("{} changed", domain)
    };

    let mut sections = Vec::new();
    for field in [SnapshotField::WhoisUpdatedDate, SnapshotField::HttpStatus] {
        match changes.get(field) {
            Some(change) => sections.push(format!(
                "{} changed:\n  Previous: {}\n  Current:  {}",
                field.label(),
                change.previous.as_deref().unwrap_or(NO_PREVIOUS),
                change.current
            )),
            None => sections.push(format!(
                "{} unchanged: {}",
                field.label(),
                current_value(current, field)
            )),
        }
    }
    sections.push(format!(
        "Checked {} at {}",
        domain,
        checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    AlertMessage {
        subject,
        body: sections.join("\n\n"),
    }
}
