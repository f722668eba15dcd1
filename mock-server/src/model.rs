use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    Active,
    Inactive,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub document_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_id: Option<u16>,
    pub rfid_tags: Vec<String>,
    pub has_restricted_area_access: bool,
    pub status: WorkerStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorker {
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub has_restricted_area_access: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorker {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub has_restricted_area_access: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignFingerprint {
    pub fingerprint_id: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfidTag {
    pub rfid_tag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub worker_id: i64,
    pub worker_full_name: String,
    pub rfid_tag: String,
    pub attendance_date: NaiveDate,
    pub check_in_time: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<NaiveDateTime>,
    pub is_late: bool,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_full_name: Option<String>,
    pub fingerprint_id: i32,
    pub access_granted: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    pub access_time: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityLog {
    pub id: i64,
    pub event_type: String,
    pub description: String,
    pub severity: String,
    pub event_time: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub id: i64,
    pub work_start_time: NaiveTime,
    pub work_end_time: NaiveTime,
    pub late_threshold_minutes: u32,
    pub max_failed_access_attempts: u32,
    pub alert_cooldown_minutes: u32,
    pub simulation_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_date_time: Option<NaiveDateTime>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            id: 1,
            work_start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            work_end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            late_threshold_minutes: 15,
            max_failed_access_attempts: 3,
            alert_cooldown_minutes: 5,
            simulation_mode: false,
            simulated_date_time: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSystemConfig {
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
    pub late_threshold_minutes: Option<u32>,
    pub max_failed_access_attempts: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableSimulation {
    pub simulation_mode: bool,
    pub simulated_date_time: String,
}

/// Everything the server knows. One lock guards the lot.
#[derive(Debug, Default)]
pub struct Store {
    pub workers: BTreeMap<i64, Worker>,
    pub next_worker_id: i64,
    pub unassigned_tags: Vec<String>,
    pub attendance: Vec<Attendance>,
    pub access_logs: Vec<AccessLog>,
    pub security_logs: Vec<SecurityLog>,
    pub config: Option<SystemConfig>,
}

impl Store {
    /// No workers, no config, two scanned tags waiting to be assigned.
    pub fn empty() -> Self {
        Self {
            next_worker_id: 1,
            unassigned_tags: vec!["RFID-0001".to_string(), "RFID-0002".to_string()],
            ..Self::default()
        }
    }

    /// Two workers with a morning of activity on `day`.
    pub fn sample(day: NaiveDate) -> Self {
        let mut store = Self::empty();
        let at = |h: u32, m: u32| day.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default());

        let ana = store.insert_worker(
            CreateWorker {
                first_name: "Ana".to_string(),
                last_name: "Quispe".to_string(),
                document_number: "45678912".to_string(),
                email: Some("ana.quispe@example.com".to_string()),
                phone_number: None,
                has_restricted_area_access: true,
            },
            at(6, 0) - Duration::days(30),
        );
        let luis = store.insert_worker(
            CreateWorker {
                first_name: "Luis".to_string(),
                last_name: "Ramírez".to_string(),
                document_number: "41234567".to_string(),
                email: None,
                phone_number: Some("999111222".to_string()),
                has_restricted_area_access: false,
            },
            at(6, 0) - Duration::days(20),
        );
        for (worker, tag) in [(ana.id, "RFID-A100"), (luis.id, "RFID-L200")] {
            if let Some(w) = store.workers.get_mut(&worker) {
                w.rfid_tags.push(tag.to_string());
            }
        }

        store.attendance = vec![
            Attendance {
                id: 1,
                worker_id: ana.id,
                worker_full_name: ana.full_name.clone(),
                rfid_tag: "RFID-A100".to_string(),
                attendance_date: day,
                check_in_time: at(7, 52),
                check_out_time: Some(at(17, 5)),
                is_late: false,
                status: "CHECKED_OUT".to_string(),
            },
            Attendance {
                id: 2,
                worker_id: luis.id,
                worker_full_name: luis.full_name.clone(),
                rfid_tag: "RFID-L200".to_string(),
                attendance_date: day,
                check_in_time: at(8, 31),
                check_out_time: None,
                is_late: true,
                status: "CHECKED_IN".to_string(),
            },
        ];

        store.access_logs = vec![
            AccessLog {
                id: 1,
                worker_id: Some(ana.id),
                worker_full_name: Some(ana.full_name.clone()),
                fingerprint_id: 1,
                access_granted: true,
                status: "GRANTED".to_string(),
                denial_reason: None,
                access_time: at(9, 10),
            },
            AccessLog {
                id: 2,
                worker_id: Some(luis.id),
                worker_full_name: Some(luis.full_name.clone()),
                fingerprint_id: 2,
                access_granted: false,
                status: "DENIED".to_string(),
                denial_reason: Some("No restricted area access".to_string()),
                access_time: at(9, 45),
            },
            AccessLog {
                id: 3,
                worker_id: None,
                worker_full_name: None,
                fingerprint_id: -1,
                access_granted: false,
                status: "FINGERPRINT_NOT_RECOGNIZED".to_string(),
                denial_reason: None,
                access_time: at(10, 2),
            },
        ];

        store.security_logs = vec![
            SecurityLog {
                id: 1,
                event_type: "UNKNOWN_FINGERPRINT".to_string(),
                description: "Unrecognized fingerprint at restricted door".to_string(),
                severity: "MEDIUM".to_string(),
                event_time: at(10, 2),
            },
            SecurityLog {
                id: 2,
                event_type: "REPEATED_FAILED_ATTEMPTS".to_string(),
                description: "3 failed attempts in a row".to_string(),
                severity: "CRITICAL".to_string(),
                event_time: at(10, 4),
            },
        ];

        store
    }

    pub fn insert_worker(&mut self, input: CreateWorker, now: NaiveDateTime) -> Worker {
        let id = self.next_worker_id.max(1);
        self.next_worker_id = id + 1;
        let worker = Worker {
            id,
            full_name: format!("{} {}", input.first_name, input.last_name),
            first_name: input.first_name,
            last_name: input.last_name,
            document_number: input.document_number,
            email: input.email,
            phone_number: input.phone_number,
            fingerprint_id: Some(self.free_fingerprint_slot()),
            rfid_tags: Vec::new(),
            has_restricted_area_access: input.has_restricted_area_access,
            status: WorkerStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.workers.insert(id, worker.clone());
        worker
    }

    /// Lowest sensor slot no worker holds. Slots start at 1.
    pub fn free_fingerprint_slot(&self) -> u16 {
        (1..=u16::MAX)
            .find(|slot| {
                !self
                    .workers
                    .values()
                    .any(|w| w.fingerprint_id == Some(*slot))
            })
            .unwrap_or(u16::MAX)
    }

    pub fn tag_owner(&self, tag: &str) -> Option<i64> {
        self.workers
            .values()
            .find(|w| w.rfid_tags.iter().any(|t| t == tag))
            .map(|w| w.id)
    }
}
