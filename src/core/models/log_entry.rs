use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Free-form structured context attached to a log entry.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Severity of a log entry, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unknown log level '{other}' (expected debug, info, warn or error)"
            )),
        }
    }
}

/// A single diagnostic event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl LogEntry {
    /// Build an entry stamped with the current time, truncated to milliseconds
    /// so that it survives a trip through the exported text form unchanged.
    pub fn now(level: LogLevel, message: impl Into<String>, metadata: Option<Metadata>) -> Self {
        Self {
            timestamp: Utc::now().trunc_subsecs(3),
            level,
            message: message.into(),
            metadata,
        }
    }

    /// The console line for this entry:
    /// `[<timestamp>] <LEVEL>: <message> | Metadata: <json>`.
    pub fn console_line(&self) -> String {
        let meta = self
            .metadata
            .as_ref()
            .and_then(|m| serde_json::to_string(m).ok())
            .map(|json| format!(" | Metadata: {json}"))
            .unwrap_or_default();
        format!(
            "[{}] {}: {}{}",
            iso_millis::format(&self.timestamp),
            self.level,
            self.message,
            meta
        )
    }
}

/// Sortable ISO-8601 form with millisecond precision: `2026-03-01T08:15:30.250Z`.
pub mod iso_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_entry(metadata: Option<Metadata>) -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 15, 30).unwrap()
                + chrono::Duration::milliseconds(250),
            level: LogLevel::Warn,
            message: "slow response".into(),
            metadata,
        }
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn console_line_without_metadata() {
        let entry = fixed_entry(None);
        assert_eq!(
            entry.console_line(),
            "[2026-03-01T08:15:30.250Z] WARN: slow response"
        );
    }

    #[test]
    fn console_line_with_metadata() {
        let mut meta = Metadata::new();
        meta.insert("status".into(), json!(504));
        let entry = fixed_entry(Some(meta));
        assert_eq!(
            entry.console_line(),
            "[2026-03-01T08:15:30.250Z] WARN: slow response | Metadata: {\"status\":504}"
        );
    }

    #[test]
    fn serialized_timestamp_is_iso_millis() {
        let json = serde_json::to_value(fixed_entry(None)).unwrap();
        assert_eq!(json["timestamp"], "2026-03-01T08:15:30.250Z");
        assert_eq!(json["level"], "WARN");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn now_truncates_to_milliseconds() {
        let entry = LogEntry::now(LogLevel::Info, "x", None);
        assert_eq!(entry.timestamp.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
