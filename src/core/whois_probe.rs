use crate::domain::ports::WhoisLookup;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn updated_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // 同一行內必須有值；空白的欄位交給下一個符合的行
    PATTERN.get_or_init(|| {
        Regex::new(r"(?im)updated date:[ \t]*(\S[^\r\n]*)").expect("updated date pattern is valid")
    })
}

/// 從 WHOIS 原始輸出取出第一個非空的 "Updated Date:" 值
pub fn extract_updated_date(raw: &str) -> Option<String> {
    updated_date_pattern()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// 將可辨識的日期格式統一成 UTC，其餘原樣保留
///
/// 不同的 WHOIS 伺服器會回傳 `2024-06-01T00:00:00Z`、`2024-06-01T00:00:00+00:00`、
/// `2024-06-01 00:00:00` 等寫法，統一後才不會因格式不同而誤報變更。
pub fn normalize_updated_date(value: &str) -> String {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ").to_string();
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return naive.and_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    value.to_string()
}

pub struct WhoisProbe<L: WhoisLookup> {
    lookup: L,
    normalize_dates: bool,
}

impl<L: WhoisLookup> WhoisProbe<L> {
    pub fn new(lookup: L, normalize_dates: bool) -> Self {
        Self {
            lookup,
            normalize_dates,
        }
    }

    /// 查詢失敗或找不到欄位時回傳 `None`（視為未知，不是致命錯誤）
    pub async fn fetch_whois_updated_date(&self, domain: &str) -> Option<String> {
        tracing::debug!("Retrieving whois record for domain: {}", domain);

        let raw = match self.lookup.lookup(domain).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("⚠️ Whois lookup for {} failed: {}", domain, e);
                return None;
            }
        };
        tracing::debug!("Raw whois output for {}:\n{}", domain, raw);

        match extract_updated_date(&raw) {
            Some(value) => {
                let value = if self.normalize_dates {
                    normalize_updated_date(&value)
                } else {
                    value
                };
                tracing::debug!("Found updated date: {}", value);
                Some(value)
            }
            None => {
                tracing::warn!("⚠️ Updated Date not found in whois output for {}", domain);
                None
            }
        }
    }
}
