//! In-memory stand-in for the access-control backend's `/api/v1` surface.
//!
//! Successful reads and mutations answer `{"data": ...}`; failures answer
//! `{"success": false, "message": ...}` with a 4xx status, the same shapes
//! the client parses.

pub mod model;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

use model::{
    AccessLog, AssignFingerprint, Attendance, CreateWorker, EnableSimulation, RfidTag, SecurityLog,
    Store, SystemConfig, UpdateSystemConfig, UpdateWorker, Worker, WorkerStatus,
};

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

type ApiResult<T> = Result<Json<Envelope<T>>, Failure>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope { data }))
}

pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }

    fn conflict(message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.to_string(),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = json!({"success": false, "message": self.message});
        (self.status, Json(body)).into_response()
    }
}

/// Router with sample data around today's date.
pub fn app() -> Router {
    app_with(Store::sample(Local::now().date_naive()))
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/workers", get(list_workers).post(create_worker))
        .route(
            "/workers/{id}",
            get(get_worker).put(update_worker).delete(delete_worker),
        )
        .route("/workers/{id}/activate", post(activate_worker))
        .route("/workers/{id}/deactivate", post(deactivate_worker))
        .route("/workers/{id}/grant-access", post(grant_access))
        .route("/workers/{id}/revoke-access", post(revoke_access))
        .route("/workers/{id}/fingerprint", post(assign_fingerprint))
        .route("/workers/rfid/unassigned", get(unassigned_tags))
        .route(
            "/workers/{id}/rfid-tags",
            post(assign_rfid).delete(remove_rfid),
        )
        .route("/attendance/history", get(attendance_history))
        .route("/attendance/worker/{id}", get(worker_attendance))
        .route("/attendance/date/{date}", get(attendance_by_date))
        .route("/attendance/date/{date}/late", get(late_attendance_by_date))
        .route("/access-audit/time-range", get(access_audit))
        .route("/access/time-range", get(access_time_range))
        .route("/access/denied", get(denied_access))
        .route("/access/worker/{id}", get(worker_access_logs))
        .route("/security/logs", get(security_logs))
        .route("/security/critical", get(critical_security))
        .route("/system/config", get(get_config).put(update_config))
        .route("/system/config/initialize", post(initialize_config))
        .route("/system/config/simulation/enable", post(enable_simulation))
        .route("/system/config/simulation/disable", post(disable_simulation))
        .route("/firebase/admin/diagnose", get(diagnose))
        .route("/firebase/admin/command/clear", post(clear_command))
        .route("/firebase/admin/command/format", post(format_sensor))
        .with_state(db);
    Router::new().nest("/api/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

const WORKER_NOT_FOUND: &str = "Worker not found";

// --- workers ---

async fn list_workers(State(db): State<Db>) -> ApiResult<Vec<Worker>> {
    ok(db.read().await.workers.values().cloned().collect())
}

async fn get_worker(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Worker> {
    let store = db.read().await;
    let worker = store
        .workers
        .get(&id)
        .cloned()
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    ok(worker)
}

async fn create_worker(
    State(db): State<Db>,
    Json(input): Json<CreateWorker>,
) -> Result<(StatusCode, Json<Envelope<Worker>>), Failure> {
    let mut store = db.write().await;
    if store
        .workers
        .values()
        .any(|w| w.document_number == input.document_number)
    {
        return Err(Failure::conflict(
            "A worker with this document number already exists",
        ));
    }
    let worker = store.insert_worker(input, now());
    info!(id = worker.id, fingerprint = ?worker.fingerprint_id, "worker created");
    Ok((StatusCode::CREATED, Json(Envelope { data: worker })))
}

async fn update_worker(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateWorker>,
) -> ApiResult<Worker> {
    let mut store = db.write().await;
    let worker = store
        .workers
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    if let Some(first_name) = input.first_name {
        worker.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        worker.last_name = last_name;
    }
    if let Some(email) = input.email {
        worker.email = (!email.is_empty()).then_some(email);
    }
    if let Some(phone) = input.phone_number {
        worker.phone_number = (!phone.is_empty()).then_some(phone);
    }
    if let Some(access) = input.has_restricted_area_access {
        worker.has_restricted_area_access = access;
    }
    worker.full_name = format!("{} {}", worker.first_name, worker.last_name);
    worker.updated_at = now();
    info!(id, "worker updated");
    ok(worker.clone())
}

async fn delete_worker(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let worker = store
        .workers
        .remove(&id)
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    store.unassigned_tags.extend(worker.rfid_tags);
    info!(id, "worker deleted");
    Ok(Json(json!({"success": true, "message": "Worker deleted"})))
}

/// Apply `change` and log `event`; nothing is logged for an unknown id.
async fn modify_worker(
    db: &Db,
    id: i64,
    event: &str,
    change: impl FnOnce(&mut Worker),
) -> ApiResult<Worker> {
    let mut store = db.write().await;
    let worker = store
        .workers
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    change(worker);
    worker.updated_at = now();
    info!(id, "{event}");
    ok(worker.clone())
}

async fn activate_worker(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Worker> {
    modify_worker(&db, id, "worker activated", |w| w.status = WorkerStatus::Active).await
}

async fn deactivate_worker(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Worker> {
    modify_worker(&db, id, "worker deactivated", |w| {
        w.status = WorkerStatus::Inactive
    })
    .await
}

async fn grant_access(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Worker> {
    modify_worker(&db, id, "restricted access granted", |w| {
        w.has_restricted_area_access = true
    })
    .await
}

async fn revoke_access(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Worker> {
    modify_worker(&db, id, "restricted access revoked", |w| {
        w.has_restricted_area_access = false
    })
    .await
}

async fn assign_fingerprint(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<AssignFingerprint>,
) -> ApiResult<Worker> {
    let mut store = db.write().await;
    let taken = store
        .workers
        .values()
        .any(|w| w.id != id && w.fingerprint_id == Some(input.fingerprint_id));
    if taken {
        return Err(Failure::conflict(
            "Fingerprint ID already assigned to another worker",
        ));
    }
    let worker = store
        .workers
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    worker.fingerprint_id = Some(input.fingerprint_id);
    worker.updated_at = now();
    info!(id, slot = input.fingerprint_id, "fingerprint assigned");
    ok(worker.clone())
}

async fn unassigned_tags(State(db): State<Db>) -> ApiResult<Vec<String>> {
    ok(db.read().await.unassigned_tags.clone())
}

async fn assign_rfid(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<RfidTag>,
) -> ApiResult<Worker> {
    let mut store = db.write().await;
    if !store.workers.contains_key(&id) {
        return Err(Failure::not_found(WORKER_NOT_FOUND));
    }
    match store.tag_owner(&input.rfid_tag) {
        Some(owner) if owner != id => {
            return Err(Failure::conflict(
                "RFID tag already assigned to another worker",
            ))
        }
        Some(_) => return Err(Failure::conflict("RFID tag already assigned to this worker")),
        None => {}
    }
    store.unassigned_tags.retain(|t| *t != input.rfid_tag);
    let worker = store
        .workers
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    worker.rfid_tags.push(input.rfid_tag.clone());
    worker.updated_at = now();
    info!(id, tag = %input.rfid_tag, "rfid tag assigned");
    ok(worker.clone())
}

async fn remove_rfid(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<RfidTag>,
) -> ApiResult<Worker> {
    let mut store = db.write().await;
    let worker = store
        .workers
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found(WORKER_NOT_FOUND))?;
    let before = worker.rfid_tags.len();
    worker.rfid_tags.retain(|t| *t != query.rfid_tag);
    if worker.rfid_tags.len() == before {
        return Err(Failure::not_found("RFID tag not assigned to this worker"));
    }
    worker.updated_at = now();
    let worker = worker.clone();
    store.unassigned_tags.push(query.rfid_tag.clone());
    info!(id, tag = %query.rfid_tag, "rfid tag removed");
    ok(worker)
}

// --- reports ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: Option<String>,
    sort: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeWindow {
    start_time: String,
    end_time: String,
    status: Option<String>,
    severity: Option<String>,
    sort: Option<String>,
}

impl TimeWindow {
    /// Boundaries arrive with the caller's offset; records are stored in
    /// local wall-clock time, so the offset is dropped.
    fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime), Failure> {
        let parse = |raw: &str| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.naive_local())
                .or_else(|_| raw.parse::<NaiveDateTime>())
                .map_err(|_| Failure::bad_request("Invalid time range"))
        };
        Ok((parse(&self.start_time)?, parse(&self.end_time)?))
    }
}

fn sort_by<T>(items: &mut [T], sort: Option<&str>, key: impl Fn(&T) -> NaiveDateTime) {
    if sort == Some("ASC") {
        items.sort_by_key(|item| key(item));
    } else {
        items.sort_by(|a, b| key(b).cmp(&key(a)));
    }
}

async fn attendance_history(
    State(db): State<Db>,
    Query(q): Query<DateWindow>,
) -> ApiResult<Vec<Attendance>> {
    let store = db.read().await;
    let mut rows: Vec<Attendance> = store
        .attendance
        .iter()
        .filter(|a| a.attendance_date >= q.start_date && a.attendance_date <= q.end_date)
        .filter(|a| match q.status.as_deref() {
            Some("LATE") => a.is_late,
            Some("ON_TIME") => !a.is_late,
            _ => true,
        })
        .cloned()
        .collect();
    sort_by(&mut rows, q.sort.as_deref(), |a| a.check_in_time);
    ok(rows)
}

async fn worker_attendance(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(q): Query<DateWindow>,
) -> ApiResult<Vec<Attendance>> {
    let store = db.read().await;
    ok(store
        .attendance
        .iter()
        .filter(|a| a.worker_id == id)
        .filter(|a| a.attendance_date >= q.start_date && a.attendance_date <= q.end_date)
        .cloned()
        .collect())
}

async fn attendance_by_date(
    State(db): State<Db>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Vec<Attendance>> {
    let store = db.read().await;
    ok(store
        .attendance
        .iter()
        .filter(|a| a.attendance_date == date)
        .cloned()
        .collect())
}

async fn late_attendance_by_date(
    State(db): State<Db>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Vec<Attendance>> {
    let store = db.read().await;
    ok(store
        .attendance
        .iter()
        .filter(|a| a.attendance_date == date && a.is_late)
        .cloned()
        .collect())
}

fn access_in(store: &Store, start: NaiveDateTime, end: NaiveDateTime) -> Vec<AccessLog> {
    store
        .access_logs
        .iter()
        .filter(|l| l.access_time >= start && l.access_time <= end)
        .cloned()
        .collect()
}

async fn access_audit(
    State(db): State<Db>,
    Query(q): Query<TimeWindow>,
) -> ApiResult<Vec<AccessLog>> {
    let (start, end) = q.bounds()?;
    let store = db.read().await;
    let mut rows: Vec<AccessLog> = access_in(&store, start, end)
        .into_iter()
        .filter(|l| match q.status.as_deref() {
            Some("GRANTED") => l.status == "GRANTED",
            Some("DENIED") => l.status != "GRANTED",
            _ => true,
        })
        .collect();
    sort_by(&mut rows, q.sort.as_deref(), |l| l.access_time);
    ok(rows)
}

async fn access_time_range(
    State(db): State<Db>,
    Query(q): Query<TimeWindow>,
) -> ApiResult<Vec<AccessLog>> {
    let (start, end) = q.bounds()?;
    ok(access_in(&*db.read().await, start, end))
}

#[derive(Deserialize)]
struct Hours {
    hours: Option<i64>,
}

async fn denied_access(
    State(db): State<Db>,
    Query(q): Query<Hours>,
) -> ApiResult<Vec<AccessLog>> {
    let end = now();
    let start = end - chrono::Duration::hours(q.hours.unwrap_or(24));
    let rows = access_in(&*db.read().await, start, end)
        .into_iter()
        .filter(|l| !l.access_granted)
        .collect();
    ok(rows)
}

async fn worker_access_logs(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Vec<AccessLog>> {
    let store = db.read().await;
    ok(store
        .access_logs
        .iter()
        .filter(|l| l.worker_id == Some(id))
        .cloned()
        .collect())
}

async fn security_logs(
    State(db): State<Db>,
    Query(q): Query<TimeWindow>,
) -> ApiResult<Vec<SecurityLog>> {
    let (start, end) = q.bounds()?;
    let store = db.read().await;
    let mut rows: Vec<SecurityLog> = store
        .security_logs
        .iter()
        .filter(|l| l.event_time >= start && l.event_time <= end)
        .filter(|l| match q.severity.as_deref() {
            None | Some("ALL") => true,
            Some(severity) => l.severity == severity,
        })
        .cloned()
        .collect();
    sort_by(&mut rows, q.sort.as_deref(), |l| l.event_time);
    ok(rows)
}

async fn critical_security(State(db): State<Db>) -> ApiResult<Vec<SecurityLog>> {
    let store = db.read().await;
    ok(store
        .security_logs
        .iter()
        .filter(|l| l.severity == "CRITICAL")
        .cloned()
        .collect())
}

// --- system ---

const CONFIG_NOT_FOUND: &str = "System configuration not found";

async fn get_config(State(db): State<Db>) -> ApiResult<SystemConfig> {
    let store = db.read().await;
    let config = store
        .config
        .clone()
        .ok_or_else(|| Failure::not_found(CONFIG_NOT_FOUND))?;
    ok(config)
}

async fn initialize_config(
    State(db): State<Db>,
) -> Result<(StatusCode, Json<Envelope<SystemConfig>>), Failure> {
    let mut store = db.write().await;
    if store.config.is_some() {
        return Err(Failure::conflict("System configuration already initialized"));
    }
    let config = SystemConfig::default();
    store.config = Some(config.clone());
    info!("system configuration initialized");
    Ok((StatusCode::CREATED, Json(Envelope { data: config })))
}

async fn modify_config(
    db: &Db,
    change: impl FnOnce(&mut SystemConfig),
) -> ApiResult<SystemConfig> {
    let mut store = db.write().await;
    let config = store
        .config
        .as_mut()
        .ok_or_else(|| Failure::not_found(CONFIG_NOT_FOUND))?;
    change(config);
    ok(config.clone())
}

async fn update_config(
    State(db): State<Db>,
    Json(patch): Json<UpdateSystemConfig>,
) -> ApiResult<SystemConfig> {
    info!("system configuration updated");
    modify_config(&db, |c| {
        if let Some(start) = patch.work_start_time {
            c.work_start_time = start;
        }
        if let Some(end) = patch.work_end_time {
            c.work_end_time = end;
        }
        if let Some(minutes) = patch.late_threshold_minutes {
            c.late_threshold_minutes = minutes;
        }
        if let Some(attempts) = patch.max_failed_access_attempts {
            c.max_failed_access_attempts = attempts;
        }
    })
    .await
}

async fn enable_simulation(
    State(db): State<Db>,
    Json(input): Json<EnableSimulation>,
) -> ApiResult<SystemConfig> {
    let at: NaiveDateTime = input
        .simulated_date_time
        .parse()
        .map_err(|_| Failure::bad_request("Invalid simulated date time"))?;
    info!(%at, "simulation enabled");
    modify_config(&db, |c| {
        c.simulation_mode = input.simulation_mode;
        c.simulated_date_time = Some(at);
    })
    .await
}

async fn disable_simulation(State(db): State<Db>) -> ApiResult<SystemConfig> {
    info!("simulation disabled");
    modify_config(&db, |c| {
        c.simulation_mode = false;
        c.simulated_date_time = None;
    })
    .await
}

// --- sensor maintenance ---

async fn diagnose(State(db): State<Db>) -> ApiResult<Value> {
    let store = db.read().await;
    let enrolled = store
        .workers
        .values()
        .filter(|w| w.fingerprint_id.is_some())
        .count();
    ok(json!({"sensorOnline": true, "enrolledTemplates": enrolled}))
}

async fn clear_command() -> Json<Value> {
    info!("pending sensor command cleared");
    Json(json!({"success": true, "message": "Command cleared"}))
}

async fn format_sensor(State(db): State<Db>) -> Json<Value> {
    let mut store = db.write().await;
    for worker in store.workers.values_mut() {
        worker.fingerprint_id = None;
    }
    info!("sensor formatted");
    Json(json!({"success": true, "message": "Sensor formatted"}))
}
