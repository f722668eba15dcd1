use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::clock::{timestamp, timestamp_opt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    CheckedIn,
    CheckedOut,
    Absent,
    OnLeave,
}

/// One work session of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub worker_id: i64,
    #[serde(default)]
    pub worker_full_name: String,
    /// Tag presented at check-in.
    #[serde(default)]
    pub rfid_tag: String,
    pub attendance_date: NaiveDate,
    #[serde(with = "timestamp")]
    pub check_in_time: NaiveDateTime,
    #[serde(default, with = "timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worked_duration: Option<String>,
    #[serde(default)]
    pub is_late: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateness_duration: Option<String>,
    pub status: AttendanceStatus,
}

impl Attendance {
    pub fn is_closed(&self) -> bool {
        self.check_out_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_session_has_no_check_out() {
        let raw = r#"{
            "id": 1, "workerId": 7, "workerFullName": "Juan Pérez",
            "rfidTag": "A1B2C3D4", "attendanceDate": "2025-01-10",
            "checkInTime": "2025-01-10T08:12:00", "isLate": true,
            "latenessDuration": "PT12M", "status": "CHECKED_IN"
        }"#;
        let record: Attendance = serde_json::from_str(raw).unwrap();
        assert!(!record.is_closed());
        assert!(record.is_late);
        assert_eq!(record.status, AttendanceStatus::CheckedIn);
        assert_eq!(record.lateness_duration.as_deref(), Some("PT12M"));
    }

    #[test]
    fn null_check_out_is_accepted() {
        let raw = r#"{
            "id": 2, "workerId": 7, "attendanceDate": "2025-01-10",
            "checkInTime": "2025-01-10T08:00:00", "checkOutTime": null,
            "status": "CHECKED_IN"
        }"#;
        let record: Attendance = serde_json::from_str(raw).unwrap();
        assert_eq!(record.check_out_time, None);
        assert!(!record.is_late);
    }
}
