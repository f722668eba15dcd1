use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock::timestamp;

/// Lifecycle status of a worker record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    Active,
    Inactive,
    Suspended,
    Terminated,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Active => "ACTIVE",
            WorkerStatus::Inactive => "INACTIVE",
            WorkerStatus::Suspended => "SUSPENDED",
            WorkerStatus::Terminated => "TERMINATED",
        }
    }
}

/// A person with biometric/RFID access, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    pub document_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Slot in the fingerprint sensor's template storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_id: Option<u16>,
    #[serde(default)]
    pub rfid_tags: Vec<String>,
    #[serde(default)]
    pub has_restricted_area_access: bool,
    pub status: WorkerStatus,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

impl Worker {
    /// `fullName` from the server, or first and last name joined when the
    /// server left it empty.
    pub fn display_name(&self) -> String {
        if self.full_name.trim().is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            self.full_name.clone()
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.rfid_tags.iter().any(|t| t == tag)
    }

    pub fn is_active(&self) -> bool {
        self.status == WorkerStatus::Active
    }
}

/// Registration payload. Submitting it may block server-side while the
/// fingerprint sensor waits for enrollment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorker {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_restricted_area_access: Option<bool>,
}

/// Partial update. Only the fields present in the JSON are applied; omitted
/// fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_restricted_area_access: Option<bool>,
}

impl UpdateWorker {
    pub fn is_empty(&self) -> bool {
        *self == UpdateWorker::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignFingerprint {
    pub fingerprint_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRfid {
    pub rfid_tag: String,
}
