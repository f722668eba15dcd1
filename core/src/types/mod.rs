//! Domain DTOs for the access-control API.
//!
//! # Design
//! These mirror the backend's camelCase JSON but are defined independently
//! from the mock-server crate; integration tests catch schema drift. Request
//! payloads skip unset optional fields so a partial update sends only the
//! keys the caller provided.

pub mod attendance;
pub mod logs;
pub mod system;
pub mod worker;

pub use attendance::{Attendance, AttendanceStatus};
pub use logs::{AccessLog, AccessStatus, SecurityLog, Severity};
pub use system::{EnableSimulation, SystemConfig, UpdateSystemConfig};
pub use worker::{
    AssignFingerprint, AssignRfid, CreateWorker, UpdateWorker, Worker, WorkerStatus,
};

use serde::{Deserialize, Serialize};

/// Direction a list is ordered in, sent as the `sort` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}
