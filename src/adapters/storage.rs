use crate::domain::model::{DomainSnapshot, HttpStatus};
use crate::domain::ports::StateStore;
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 狀態檔內容（TOML）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whois_updated_date: Option<String>,
    pub http_status: HttpStatus,
    pub recorded_at: DateTime<Utc>,
}

impl PersistedState {
    pub fn snapshot(&self) -> DomainSnapshot {
        DomainSnapshot::new(self.whois_updated_date.clone(), self.http_status)
    }
}

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// 讀取完整的狀態記錄（含記錄時間）
    pub async fn read_record(&self) -> Result<Option<PersistedState>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MonitorError::StateReadError {
                    path: self.display_path(),
                    source: e,
                })
            }
        };

        match toml::from_str::<PersistedState>(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // 無法解析就當作沒有先前狀態，下一次告警會重建基準
                tracing::warn!(
                    "⚠️ Ignoring unreadable state file {}: {}",
                    self.display_path(),
                    e
                );
                Ok(None)
            }
        }
    }
}

impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<DomainSnapshot>> {
        Ok(self.read_record().await?.map(|record| record.snapshot()))
    }

    async fn save(&self, snapshot: &DomainSnapshot) -> Result<()> {
        let record = PersistedState {
            whois_updated_date: snapshot.whois_updated_date.clone(),
            http_status: snapshot.http_status,
            recorded_at: Utc::now(),
        };
        let write_error = |message: String| MonitorError::StateWriteError {
            path: self.display_path(),
            message,
        };

        let content = toml::to_string(&record).map_err(|e| write_error(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(e.to_string()))?;
        }

        // 先寫暫存檔再 rename，避免中途失敗留下半個檔案
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| write_error(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| write_error(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_missing_file_is_no_prior_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("absent.state"));
        assert_eq!(assert_ok!(store.load().await), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("nested/dir/example.state"));
        let snapshot = DomainSnapshot::new(
            Some("2024-06-01T00:00:00Z".to_string()),
            HttpStatus::Code(200),
        );

        assert_ok!(store.save(&snapshot).await);

        assert_eq!(store.load().await.unwrap(), Some(snapshot));
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("whois_updated_date = \"2024-06-01T00:00:00Z\""));
        assert!(content.contains("http_status = \"200\""));
        assert!(content.contains("recorded_at"));
    }

    #[tokio::test]
    async fn test_unknown_and_unreachable_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("example.state"));
        let snapshot = DomainSnapshot::new(None, HttpStatus::Unreachable);

        store.save(&snapshot).await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(!content.contains("whois_updated_date"));
        assert!(content.contains("http_status = \"unreachable\""));
        assert_eq!(store.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_treated_as_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.state");
        std::fs::write(&path, "2023-01-01\n200\n").unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_failure_is_surfaced() {
        let dir = TempDir::new().unwrap();
        // 目錄無法當成檔案讀取
        let store = FileStateStore::new(dir.path());
        assert!(matches!(
            store.load().await,
            Err(MonitorError::StateReadError { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_failure_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let store = FileStateStore::new(blocker.join("example.state"));
        let snapshot = DomainSnapshot::new(None, HttpStatus::Code(200));
        assert!(matches!(
            store.save(&snapshot).await,
            Err(MonitorError::StateWriteError { .. })
        ));
    }
}
