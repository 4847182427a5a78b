use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const UNREACHABLE: &str = "unreachable";
const UNKNOWN: &str = "unknown";

/// HTTP 探測結果：狀態碼，或請求失敗的標記
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpStatus {
    Code(u16),
    Unreachable,
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpStatus::Code(code) => write!(f, "{}", code),
            HttpStatus::Unreachable => f.write_str(UNREACHABLE),
        }
    }
}

impl FromStr for HttpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(UNREACHABLE) {
            return Ok(HttpStatus::Unreachable);
        }
        s.parse::<u16>()
            .map(HttpStatus::Code)
            .map_err(|_| format!("invalid HTTP status '{}'", s))
    }
}

impl TryFrom<String> for HttpStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpStatus> for String {
    fn from(status: HttpStatus) -> Self {
        status.to_string()
    }
}

/// 單次檢查的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    /// `None` 表示 WHOIS 查詢失敗或找不到欄位
    pub whois_updated_date: Option<String>,
    pub http_status: HttpStatus,
}

impl DomainSnapshot {
    pub fn new(whois_updated_date: Option<String>, http_status: HttpStatus) -> Self {
        Self {
            whois_updated_date,
            http_status,
        }
    }

    pub fn whois_display(&self) -> &str {
        self.whois_updated_date.as_deref().unwrap_or(UNKNOWN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    WhoisUpdatedDate,
    HttpStatus,
}

impl SnapshotField {
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotField::WhoisUpdatedDate => "Whois Updated Date",
            SnapshotField::HttpStatus => "HTTP status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: SnapshotField,
    /// `None` 表示首次執行，沒有先前記錄
    pub previous: Option<String>,
    pub current: String,
}

/// 先前狀態與目前快照的差異
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub first_run: bool,
    pub changes: Vec<FieldChange>,
}

impl ChangeSet {
    /// 比較兩個欄位；兩者任一改變即視為需要通知。沒有先前狀態時兩個欄位都算改變。
    pub fn between(prior: Option<&DomainSnapshot>, current: &DomainSnapshot) -> Self {
        let Some(prior) = prior else {
            return Self {
                first_run: true,
                changes: vec![
                    FieldChange {
                        field: SnapshotField::WhoisUpdatedDate,
                        previous: None,
                        current: current.whois_display().to_string(),
                    },
                    FieldChange {
                        field: SnapshotField::HttpStatus,
                        previous: None,
                        current: current.http_status.to_string(),
                    },
                ],
            };
        };

        let mut changes = Vec::new();
        if prior.whois_updated_date != current.whois_updated_date {
            changes.push(FieldChange {
                field: SnapshotField::WhoisUpdatedDate,
                previous: Some(prior.whois_display().to_string()),
                current: current.whois_display().to_string(),
            });
        }
        if prior.http_status != current.http_status {
            changes.push(FieldChange {
                field: SnapshotField::HttpStatus,
                previous: Some(prior.http_status.to_string()),
                current: current.http_status.to_string(),
            });
        }

        Self {
            first_run: false,
            changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self) -> Vec<SnapshotField> {
        self.changes.iter().map(|c| c.field).collect()
    }

    pub fn get(&self, field: SnapshotField) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// 沒有變化：不寄信、不改寫狀態檔
    Unchanged,
    /// 已寄出並寫入新狀態
    Notified { changed_fields: Vec<SnapshotField> },
    /// 寄送失敗；狀態檔維持原樣，下次執行會再偵測到同樣的差異
    DeliveryFailed {
        changed_fields: Vec<SnapshotField>,
        error: String,
    },
}

impl NotificationOutcome {
    pub fn alerted(&self) -> bool {
        matches!(self, NotificationOutcome::Notified { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub domain: String,
    pub snapshot: DomainSnapshot,
    pub outcome: NotificationOutcome,
    pub checked_at: DateTime<Utc>,
}
