//! Validated payload shapes for log and event records.

use serde_json::Value;
use std::fmt;

/// Closed set of log severities. Stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Case-insensitive parse; `None` for anything outside the closed set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for inserting a log record, already validated.
#[derive(Debug, Clone)]
pub struct NewLog {
    pub level: LogLevel,
    pub category: Option<String>,
    pub message: String,
    pub tags: Option<Vec<String>>,
}

/// Partial update for a log record. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct LogPatch {
    pub level: Option<LogLevel>,
    pub category: Option<Option<String>>,
    pub message: Option<String>,
    pub tags: Option<Option<Vec<String>>>,
}

/// Payload for inserting an event record, already validated.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: String,
    pub event_status: Option<String>,
    pub metadata: Option<Value>,
}

/// Partial update for an event record. The nested option on `event_status`
/// distinguishes "leave unchanged" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub event_type: Option<String>,
    pub event_status: Option<Option<String>>,
    pub metadata: Option<Value>,
}

const EVENT_TYPE_MAX_LEN: usize = 255;
const EVENT_STATUS_MAX_LEN: usize = 50;

fn is_record_token(s: &str, max_len: usize) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty()
        && s.len() <= max_len
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ' ' | '.'))
}

/// Event types are free-form but bounded: non-blank, at most 255 characters,
/// alphanumeric plus underscore, hyphen, space, and dot.
#[must_use]
pub fn is_valid_event_type(event_type: &str) -> bool {
    is_record_token(event_type, EVENT_TYPE_MAX_LEN)
}

/// Event statuses follow the same character class as types, capped at 50.
#[must_use]
pub fn is_valid_event_status(status: &str) -> bool {
    is_record_token(status, EVENT_STATUS_MAX_LEN)
}

/// Clearing a status is always allowed, and any value-to-value move is
/// permitted as long as the new value passes the creation-time format check.
/// No transition graph is enforced; `current` stays in the signature as the
/// seam where one would go.
#[must_use]
pub fn is_valid_status_transition(current: Option<&str>, next: Option<&str>) -> bool {
    let _ = current;
    match next {
        None => true,
        Some(new_status) => is_valid_event_status(new_status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("CRITICAL"), Some(LogLevel::Critical));
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("trace"), None);
        assert_eq!(LogLevel::parse(""), None);
    }

    #[test]
    fn test_event_type_format() {
        assert!(is_valid_event_type("user.signup"));
        assert!(is_valid_event_type("deploy finished"));
        assert!(is_valid_event_type("build-42_done"));
        assert!(!is_valid_event_type(""));
        assert!(!is_valid_event_type("   "));
        assert!(!is_valid_event_type("bad;type"));
        assert!(!is_valid_event_type(&"x".repeat(256)));
    }

    #[test]
    fn test_event_status_format() {
        assert!(is_valid_event_status("shipped"));
        assert!(!is_valid_event_status("bad;status"));
        assert!(!is_valid_event_status(&"s".repeat(51)));
    }

    #[test]
    fn test_status_transition_rules() {
        // No current status: any well-formed status may be set.
        assert!(is_valid_status_transition(None, Some("shipped")));
        assert!(!is_valid_status_transition(None, Some("bad;status")));
        // Clearing always allowed.
        assert!(is_valid_status_transition(Some("shipped"), None));
        // Value-to-value only needs the format check.
        assert!(is_valid_status_transition(Some("shipped"), Some("returned")));
        assert!(!is_valid_status_transition(
            Some("shipped"),
            Some("bad;status")
        ));
    }
}
