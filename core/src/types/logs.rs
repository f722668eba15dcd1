use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock::timestamp;

/// Outcome of a door-access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatus {
    Granted,
    Denied,
    Unauthorized,
    FingerprintNotRecognized,
    /// A status this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl AccessStatus {
    pub fn is_granted(&self) -> bool {
        *self == AccessStatus::Granted
    }
}

/// Severity attached to a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// One door-access attempt. Unrecognized attempts carry no worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_id: Option<i32>,
    #[serde(default)]
    pub access_granted: bool,
    pub status: AccessStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(with = "timestamp")]
    pub access_time: NaiveDateTime,
}

impl AccessLog {
    pub fn is_recognized(&self) -> bool {
        self.worker_id.is_some()
    }
}

/// A system-flagged security event, such as repeated failed attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityLog {
    pub id: i64,
    pub event_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_attempt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_count: Option<u32>,
    pub severity: Severity,
    #[serde(with = "timestamp")]
    pub event_time: NaiveDateTime,
}
