use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::timestamp_opt;

/// The singleton system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    #[serde(default)]
    pub id: i64,
    pub work_start_time: NaiveTime,
    pub work_end_time: NaiveTime,
    pub late_threshold_minutes: u32,
    pub max_failed_access_attempts: u32,
    pub alert_cooldown_minutes: u32,
    #[serde(default)]
    pub simulation_mode: bool,
    /// Clock override used by the backend while simulation mode is on.
    #[serde(default, with = "timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub simulated_date_time: Option<NaiveDateTime>,
}

/// Partial patch of the configuration. Times serialize as `HH:MM:SS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSystemConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_threshold_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_failed_access_attempts: Option<u32>,
}

/// Body of the simulation-enable call; flag and override travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableSimulation {
    pub simulation_mode: bool,
    pub simulated_date_time: String,
}
