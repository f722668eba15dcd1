//! C-ABI wrapper around `access-core`.
//!
//! # Overview
//! Exposes the worker, report and system-configuration operations through
//! `extern "C"` functions so the native mobile shell can build requests,
//! run them on its own HTTP stack, and parse the responses without linking
//! Rust's networking or serde.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `acs_build_*` / `acs_parse_*` mirror the core services 1:1. Structured
//!   inputs (worker forms, report queries, config patches) arrive as JSON C
//!   strings in the same camelCase shape the backend uses.
//! - A single `FfiResult` envelope carries a JSON payload tagged by
//!   `FfiDataTag`, or an error code and a displayable message.
//! - Build functions return null on null arguments or invalid input; call
//!   `acs_validate_worker` first to get per-field messages for forms.
//! - The caller owns all returned pointers and must release them with the
//!   matching `acs_free_*` function.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use access_core::clock::{format_local_datetime, DateRange};
use access_core::timeline::attendance_timeline;
use access_core::{
    ApiClient, ApiError, Attendance, ClientConfig, ConfigState, Confirmation, CreateWorker,
    DestructiveAction, HttpRequest, HttpResponse, UpdateSystemConfig, UpdateWorker,
};
use chrono::{NaiveDate, NaiveDateTime};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url` with default headers.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `acs_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn acs_client_new(base_url: *const c_char) -> *mut FfiApiClient {
    catch_unwind(|| match unsafe { read_str(base_url) } {
        Some(url) => Box::into_raw(Box::new(FfiApiClient {
            inner: ApiClient::new(url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from a JSON configuration document
/// (`{"baseUrl": ..., "skipTunnelWarning": ..., "extraHeaders": [...]}`).
///
/// Returns null if `config_json` is null or does not parse.
#[unsafe(no_mangle)]
pub extern "C" fn acs_client_from_json(config_json: *const c_char) -> *mut FfiApiClient {
    catch_unwind(|| {
        let Some(raw) = (unsafe { read_str(config_json) }) else {
            return std::ptr::null_mut();
        };
        match ClientConfig::from_json(raw) {
            Ok(config) => Box::into_raw(Box::new(FfiApiClient {
                inner: ApiClient::from_config(&config),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `acs_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn acs_client_free(client: *mut FfiApiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// Run `build` against the client behind `client`, converting the outcome.
fn build_with<F>(client: *const FfiApiClient, build: F) -> *mut FfiHttpRequest
where
    F: FnOnce(&ApiClient) -> Option<HttpRequest>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Some(req) => FfiHttpRequest::from_core(req),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Deserialize a caller JSON string. `None` on null, non-UTF-8 or bad JSON.
fn from_json<T: serde::de::DeserializeOwned>(raw: *const c_char) -> Option<T> {
    let raw = unsafe { read_str(raw) }?;
    serde_json::from_str(raw).ok()
}

fn confirmation(confirmed: bool, action: DestructiveAction) -> Option<Confirmation> {
    confirmed.then(|| Confirmation::granted(action))
}

/// Run `parse` on the response behind `response`.
fn parse_with<F>(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
    name: &str,
    parse: F,
) -> *mut FfiResult
where
    F: FnOnce(&ApiClient, HttpResponse) -> Result<*mut FfiResult, ApiError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response }.to_core();
        parse(&client.inner, resp).unwrap_or_else(FfiResult::from_error)
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {name}")))
}

// ---------------------------------------------------------------------------
// Workers: build
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_list_workers(client: *const FfiApiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_list()))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_get_worker(client: *const FfiApiClient, id: i64) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_get(id)))
}

/// Build a worker registration from a `CreateWorker` JSON object.
///
/// Returns null if the JSON does not parse or the form fails validation.
/// The server answers only after the fingerprint enrollment finishes, so
/// the caller should allow at least 40 seconds for this request.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_create_worker(
    client: *const FfiApiClient,
    worker_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input: CreateWorker = from_json(worker_json)?;
        c.workers().build_create(&input).ok()
    })
}

/// Build a partial update; only keys present in `patch_json` are sent.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_update_worker(
    client: *const FfiApiClient,
    id: i64,
    patch_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input: UpdateWorker = from_json(patch_json)?;
        c.workers().build_update(id, &input).ok()
    })
}

/// Build a worker deletion. Returns null unless `confirmed` is true.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_delete_worker(
    client: *const FfiApiClient,
    id: i64,
    confirmed: bool,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let confirmation = confirmation(confirmed, DestructiveAction::DeleteWorker)?;
        c.workers().build_delete(id, confirmation).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_activate_worker(
    client: *const FfiApiClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_activate(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_deactivate_worker(
    client: *const FfiApiClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_deactivate(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_grant_access(client: *const FfiApiClient, id: i64) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_grant_access(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_revoke_access(
    client: *const FfiApiClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_revoke_access(id)))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_assign_fingerprint(
    client: *const FfiApiClient,
    id: i64,
    fingerprint_id: u16,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        c.workers().build_assign_fingerprint(id, fingerprint_id).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_unassigned_tags(client: *const FfiApiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.workers().build_unassigned_tags()))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_assign_rfid(
    client: *const FfiApiClient,
    worker_id: i64,
    tag: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let tag = unsafe { read_str(tag) }?;
        c.workers().build_assign_rfid(worker_id, tag).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_remove_rfid(
    client: *const FfiApiClient,
    worker_id: i64,
    tag: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let tag = unsafe { read_str(tag) }?;
        Some(c.workers().build_remove_rfid(worker_id, tag))
    })
}

// ---------------------------------------------------------------------------
// Reports: build
// ---------------------------------------------------------------------------

/// `query_json`: `{"startDate","endDate","status"?,"sort"?}` with dates as
/// `YYYY-MM-DD`, status `ALL|LATE|ON_TIME`, sort `ASC|DESC`.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_attendance_history(
    client: *const FfiApiClient,
    query_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input: AttendanceHistoryInput = from_json(query_json)?;
        let query = input.into_query().ok()?;
        Some(c.reports().build_attendance_history(&query))
    })
}

/// Dates as `YYYY-MM-DD`, both inclusive.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_worker_attendance(
    client: *const FfiApiClient,
    worker_id: i64,
    start_date: *const c_char,
    end_date: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let start: NaiveDate = unsafe { read_str(start_date) }?.parse().ok()?;
        let end: NaiveDate = unsafe { read_str(end_date) }?.parse().ok()?;
        Some(c.reports().build_worker_attendance(worker_id, DateRange::new(start, end)))
    })
}

/// `query_json`: `{"startTime","endTime","status"?,"sort"?}` with
/// offset-bearing instants, status `ALL|GRANTED|DENIED`.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_access_audit(
    client: *const FfiApiClient,
    query_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input: AccessAuditInput = from_json(query_json)?;
        let query = input.into_query().ok()?;
        Some(c.reports().build_access_audit(&query))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_worker_access_logs(
    client: *const FfiApiClient,
    worker_id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.reports().build_worker_access_logs(worker_id)))
}

/// `query_json`: `{"startTime","endTime","severity"?,"sort"?}`, severity
/// `ALL|LOW|MEDIUM|HIGH|CRITICAL`.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_security_logs(
    client: *const FfiApiClient,
    query_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input: SecurityLogInput = from_json(query_json)?;
        let query = input.into_query().ok()?;
        Some(c.reports().build_security_logs(&query))
    })
}

// ---------------------------------------------------------------------------
// System configuration and maintenance: build
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_get_config(client: *const FfiApiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.config().build_get()))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_initialize_config(client: *const FfiApiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.config().build_initialize()))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_update_config(
    client: *const FfiApiClient,
    patch_json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let patch: UpdateSystemConfig = from_json(patch_json)?;
        c.config().build_update(&patch).ok()
    })
}

/// `simulated` as `YYYY-MM-DDTHH:MM:SS` (no offset).
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_enable_simulation(
    client: *const FfiApiClient,
    simulated: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let at: NaiveDateTime = unsafe { read_str(simulated) }?.parse().ok()?;
        c.config().build_enable_simulation(at).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_disable_simulation(client: *const FfiApiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.config().build_disable_simulation()))
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_build_diagnose(client: *const FfiApiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.config().build_diagnose()))
}

/// Returns null unless `confirmed` is true.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_clear_command(
    client: *const FfiApiClient,
    confirmed: bool,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let confirmation = confirmation(confirmed, DestructiveAction::ClearCommand)?;
        c.config().build_clear_command(confirmation).ok()
    })
}

/// Returns null unless `confirmed` is true. Erases every enrolled
/// fingerprint on the sensor.
#[unsafe(no_mangle)]
pub extern "C" fn acs_build_format_sensor(
    client: *const FfiApiClient,
    confirmed: bool,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let confirmation = confirmation(confirmed, DestructiveAction::FormatSensor)?;
        c.config().build_format_sensor(confirmation).ok()
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Single worker (`data_tag = Worker`). Used for get, create, update and
/// every per-worker action.
#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_worker(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_worker", |c, r| {
        let worker = c.workers().parse_worker(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::Worker, &worker))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_workers(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_workers", |c, r| {
        let workers = c.workers().parse_workers(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::WorkerList, &workers))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_tags(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_tags", |c, r| {
        let tags = c.workers().parse_tags(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::TagList, &tags))
    })
}

/// Status check only (`data_tag = None`), e.g. for worker deletion.
#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_empty(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_empty", |c, r| {
        c.workers().parse_deleted(r)?;
        Ok(FfiResult::ok_empty())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_attendance(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_attendance", |c, r| {
        let rows = c.reports().parse_attendance(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::AttendanceList, &rows))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_access_logs(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_access_logs", |c, r| {
        let rows = c.reports().parse_access_logs(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::AccessLogList, &rows))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_security_logs(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_security_logs", |c, r| {
        let rows = c.reports().parse_security_logs(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::SecurityLogList, &rows))
    })
}

/// Answer to `acs_build_get_config`. A 404 yields `Uninitialized`, not
/// `NotFound`.
#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_config_state(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_config_state", |c, r| {
        Ok(match c.config().parse_get(r)? {
            ConfigState::Configured(config) => FfiResult::ok_json(FfiDataTag::Config, &config),
            ConfigState::Uninitialized => FfiResult::uninitialized(),
        })
    })
}

/// Answer to initialize, update and both simulation toggles.
#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_config(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_config", |c, r| {
        let config = c.config().parse_config(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::Config, &config))
    })
}

/// Whole response body as JSON (`data_tag = Raw`), for maintenance calls.
#[unsafe(no_mangle)]
pub extern "C" fn acs_parse_raw(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with(client, response, "acs_parse_raw", |c, r| {
        let value = c.config().parse_maintenance(r)?;
        Ok(FfiResult::ok_json(FfiDataTag::Raw, &value))
    })
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Check a worker form without building a request.
///
/// `is_update` selects the partial-update rules. Returns `Ok` with no data,
/// `Validation` with a JSON array of `{field, message}`, or `InvalidInput`
/// when the JSON itself does not parse.
#[unsafe(no_mangle)]
pub extern "C" fn acs_validate_worker(form_json: *const c_char, is_update: bool) -> *mut FfiResult {
    catch_unwind(|| {
        let Some(raw) = (unsafe { read_str(form_json) }) else {
            return FfiResult::null_arg("form_json");
        };
        let checked = if is_update {
            serde_json::from_str::<UpdateWorker>(raw).map(|w| w.validate())
        } else {
            serde_json::from_str::<CreateWorker>(raw).map(|w| w.validate())
        };
        match checked {
            Ok(Ok(())) => FfiResult::ok_empty(),
            Ok(Err(errors)) => FfiResult::validation(&errors),
            Err(e) => FfiResult::invalid_input(format!("invalid worker form: {e}")),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in acs_validate_worker"))
}

/// Split attendance sessions (a JSON array as returned in
/// `acs_parse_attendance` data) into entry/exit rows sorted by `sort`
/// (`ASC` or `DESC`; null means `DESC`).
#[unsafe(no_mangle)]
pub extern "C" fn acs_attendance_timeline(
    attendance_json: *const c_char,
    sort: *const c_char,
) -> *mut FfiResult {
    catch_unwind(|| {
        let Some(raw) = (unsafe { read_str(attendance_json) }) else {
            return FfiResult::null_arg("attendance_json");
        };
        let order = match parse_sort(unsafe { read_str(sort) }) {
            Ok(order) => order,
            Err(msg) => return FfiResult::invalid_input(msg),
        };
        let sessions: Vec<Attendance> = match serde_json::from_str(raw) {
            Ok(sessions) => sessions,
            Err(e) => return FfiResult::invalid_input(format!("invalid attendance list: {e}")),
        };
        let events = attendance_timeline(&sessions, order);
        let rows: Vec<TimelineRow<'_>> = events
            .iter()
            .map(|e| TimelineRow {
                key: e.key.to_string(),
                kind: e.kind().as_str(),
                timestamp: format_local_datetime(e.timestamp),
                is_late: e.is_late(),
                session: &e.session,
            })
            .collect();
        FfiResult::ok_json(FfiDataTag::Timeline, &rows)
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in acs_attendance_timeline"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `acs_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn acs_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.url);
            free_c_string(req.body);
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                unsafe {
                    free_c_string(h.key);
                    free_c_string(h.value);
                }
            }
        }
    });
}

/// Free an `FfiResult` returned by any `acs_parse_*` or helper function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn acs_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.error_message);
            free_c_string(result.data);
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn acs_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    const BASE: &str = "http://localhost:8080/api/v1";

    fn new_client() -> *mut FfiApiClient {
        let url = CString::new(BASE).unwrap();
        acs_client_new(url.as_ptr())
    }

    fn text(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    fn data_json(result: *mut FfiResult) -> serde_json::Value {
        let r = unsafe { &*result };
        serde_json::from_str(&text(r.data)).unwrap()
    }

    fn parse(
        f: extern "C" fn(*const FfiApiClient, *const FfiHttpResponse) -> *mut FfiResult,
        status: u16,
        body: &str,
    ) -> *mut FfiResult {
        let client = new_client();
        let body = CString::new(body).unwrap();
        let response = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        let result = f(client, &response);
        acs_client_free(client);
        result
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        acs_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(acs_client_new(std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        acs_client_free(std::ptr::null_mut());
    }

    #[test]
    fn client_from_json_applies_extra_headers() {
        let raw = CString::new(
            r#"{"baseUrl":"https://demo.example.com/api/v1/","extraHeaders":[["x-device","kiosk"]]}"#,
        )
        .unwrap();
        let client = acs_client_from_json(raw.as_ptr());
        assert!(!client.is_null());
        let req = acs_build_list_workers(client);
        let req_ref = unsafe { &*req };
        assert_eq!(text(req_ref.url), "https://demo.example.com/api/v1/workers");
        assert_eq!(req_ref.headers_len, 3);
        acs_free_request(req);
        acs_client_free(client);

        let bad = CString::new("{not json").unwrap();
        assert!(acs_client_from_json(bad.as_ptr()).is_null());
    }

    #[test]
    fn build_list_workers_returns_correct_request() {
        let client = new_client();
        let req = acs_build_list_workers(client);
        assert!(!req.is_null());
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(text(req_ref.url), format!("{BASE}/workers"));
        assert!(req_ref.body.is_null());
        assert_eq!(req_ref.headers_len, 2);
        let headers =
            unsafe { std::slice::from_raw_parts(req_ref.headers, req_ref.headers_len as usize) };
        assert_eq!(text(headers[1].key), "ngrok-skip-browser-warning");
        assert_eq!(text(headers[1].value), "true");
        acs_free_request(req);
        acs_client_free(client);
    }

    #[test]
    fn build_with_null_client_returns_null() {
        assert!(acs_build_list_workers(std::ptr::null()).is_null());
        assert!(acs_build_get_config(std::ptr::null()).is_null());
    }

    #[test]
    fn build_create_worker_posts_sanitized_json() {
        let client = new_client();
        let form = CString::new(
            r#"{"firstName":"Ana","lastName":"Quispe","documentNumber":"45678912","email":"  "}"#,
        )
        .unwrap();
        let req = acs_build_create_worker(client, form.as_ptr());
        assert!(!req.is_null());
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        let body: serde_json::Value = serde_json::from_str(&text(req_ref.body)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"firstName":"Ana","lastName":"Quispe","documentNumber":"45678912"})
        );
        acs_free_request(req);
        acs_client_free(client);
    }

    #[test]
    fn build_create_worker_invalid_form_returns_null() {
        let client = new_client();
        let form =
            CString::new(r#"{"firstName":"A","lastName":"Quispe","documentNumber":"123"}"#).unwrap();
        assert!(acs_build_create_worker(client, form.as_ptr()).is_null());
        let garbage = CString::new("[]").unwrap();
        assert!(acs_build_create_worker(client, garbage.as_ptr()).is_null());
        acs_client_free(client);
    }

    #[test]
    fn destructive_builds_require_confirmation() {
        let client = new_client();
        assert!(acs_build_delete_worker(client, 3, false).is_null());
        assert!(acs_build_format_sensor(client, false).is_null());
        assert!(acs_build_clear_command(client, false).is_null());

        let req = acs_build_delete_worker(client, 3, true);
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Delete));
        assert_eq!(text(req_ref.url), format!("{BASE}/workers/3"));
        acs_free_request(req);

        let req = acs_build_format_sensor(client, true);
        assert_eq!(
            text(unsafe { &*req }.url),
            format!("{BASE}/firebase/admin/command/format")
        );
        acs_free_request(req);
        acs_client_free(client);
    }

    #[test]
    fn build_assign_fingerprint_checks_slot() {
        let client = new_client();
        let req = acs_build_assign_fingerprint(client, 5, 127);
        assert!(!req.is_null());
        acs_free_request(req);
        assert!(acs_build_assign_fingerprint(client, 5, 128).is_null());
        acs_client_free(client);
    }

    #[test]
    fn build_remove_rfid_encodes_query() {
        let client = new_client();
        let tag = CString::new("A1 B2").unwrap();
        let req = acs_build_remove_rfid(client, 4, tag.as_ptr());
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Delete));
        assert_eq!(text(req_ref.url), format!("{BASE}/workers/4/rfid-tags?rfidTag=A1+B2"));
        acs_free_request(req);
        assert!(acs_build_remove_rfid(client, 4, std::ptr::null()).is_null());
        acs_client_free(client);
    }

    #[test]
    fn build_report_queries_from_json() {
        let client = new_client();
        let q = CString::new(
            r#"{"startDate":"2025-03-02","endDate":"2025-03-08","status":"LATE","sort":"ASC"}"#,
        )
        .unwrap();
        let req = acs_build_attendance_history(client, q.as_ptr());
        assert_eq!(
            text(unsafe { &*req }.url),
            format!("{BASE}/attendance/history?startDate=2025-03-02&endDate=2025-03-08&status=LATE&sort=ASC")
        );
        acs_free_request(req);

        let q = CString::new(
            r#"{"startTime":"2025-03-08T00:00:00-05:00","endTime":"2025-03-08T23:59:59-05:00","severity":"CRITICAL"}"#,
        )
        .unwrap();
        let req = acs_build_security_logs(client, q.as_ptr());
        assert!(text(unsafe { &*req }.url).ends_with("severity=CRITICAL&sort=DESC"));
        acs_free_request(req);

        let bad = CString::new(
            r#"{"startTime":"2025-03-08T00:00:00-05:00","endTime":"2025-03-08T23:59:59-05:00","status":"MAYBE"}"#,
        )
        .unwrap();
        assert!(acs_build_access_audit(client, bad.as_ptr()).is_null());
        acs_client_free(client);
    }

    #[test]
    fn build_enable_simulation_parses_naive_datetime() {
        let client = new_client();
        let at = CString::new("2025-01-10T07:55:00").unwrap();
        let req = acs_build_enable_simulation(client, at.as_ptr());
        let body: serde_json::Value = serde_json::from_str(&text(unsafe { &*req }.body)).unwrap();
        assert_eq!(body["simulatedDateTime"], "2025-01-10T07:55:00");
        assert_eq!(body["simulationMode"], true);
        acs_free_request(req);
        acs_client_free(client);
    }

    #[test]
    fn parse_worker_success() {
        let result = parse(
            acs_parse_worker,
            200,
            r#"{"data":{"id":7,"firstName":"Ana","lastName":"Quispe","documentNumber":"45678912","status":"ACTIVE","createdAt":"2025-03-08T09:00:00","updatedAt":"2025-03-08T09:00:00"}}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Worker);
        assert!(r.error_message.is_null());
        let worker = data_json(result);
        assert_eq!(worker["id"], 7);
        assert_eq!(worker["documentNumber"], "45678912");
        acs_free_result(result);
    }

    #[test]
    fn parse_error_carries_server_message() {
        let result = parse(
            acs_parse_worker,
            409,
            r#"{"success":false,"message":"RFID tag already assigned to another worker"}"#,
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 409);
        assert_eq!(
            text(r.error_message),
            "RFID tag already assigned to another worker"
        );
        assert!(r.data.is_null());
        acs_free_result(result);
    }

    #[test]
    fn parse_config_state_404_is_uninitialized() {
        let result = parse(acs_parse_config_state, 404, "");
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Uninitialized);
        acs_free_result(result);

        let result = parse(acs_parse_config, 404, r#"{"message":"System configuration not found"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NotFound);
        assert_eq!(text(r.error_message), "System configuration not found");
        acs_free_result(result);
    }

    #[test]
    fn parse_empty_and_raw() {
        let result = parse(acs_parse_empty, 200, r#"{"success":true}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::None);
        assert!(r.data.is_null());
        acs_free_result(result);

        let result = parse(acs_parse_raw, 200, r#"{"data":{"sensorOnline":true}}"#);
        assert_eq!(data_json(result)["data"]["sensorOnline"], true);
        acs_free_result(result);
    }

    #[test]
    fn parse_null_args_report_null_arg() {
        let result = acs_parse_tags(std::ptr::null(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(text(r.error_message), "null argument: client");
        acs_free_result(result);
    }

    #[test]
    fn validate_worker_lists_field_errors() {
        let form =
            CString::new(r#"{"firstName":"Ana  María","lastName":"Q","documentNumber":"1234 5678"}"#)
                .unwrap();
        let result = acs_validate_worker(form.as_ptr(), false);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Validation);
        assert_eq!(r.data_tag, FfiDataTag::ValidationErrors);
        let fields: Vec<String> = data_json(result)
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["firstName", "lastName", "documentNumber"]);
        acs_free_result(result);

        let patch = CString::new(r#"{"email":"ana@example.com"}"#).unwrap();
        let result = acs_validate_worker(patch.as_ptr(), true);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        acs_free_result(result);
    }

    #[test]
    fn attendance_timeline_splits_and_sorts() {
        let sessions = CString::new(
            r#"[{"id":1,"workerId":1,"attendanceDate":"2025-03-08","checkInTime":"2025-03-08T07:52:00","checkOutTime":"2025-03-08T17:05:00","isLate":false,"status":"CHECKED_OUT"},
                {"id":2,"workerId":2,"attendanceDate":"2025-03-08","checkInTime":"2025-03-08T08:31:00","isLate":true,"status":"CHECKED_IN"}]"#,
        )
        .unwrap();
        let asc = CString::new("ASC").unwrap();
        let result = acs_attendance_timeline(sessions.as_ptr(), asc.as_ptr());
        let rows = data_json(result);
        let keys: Vec<&str> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["1-entry", "2-entry", "1-exit"]);
        assert_eq!(rows[1]["isLate"], true);
        assert_eq!(rows[2]["timestamp"], "2025-03-08T17:05:00");
        acs_free_result(result);

        let sideways = CString::new("UP").unwrap();
        let result = acs_attendance_timeline(sessions.as_ptr(), sideways.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidInput);
        acs_free_result(result);
    }

    #[test]
    fn free_functions_accept_null() {
        acs_free_request(std::ptr::null_mut());
        acs_free_result(std::ptr::null_mut());
        acs_free_string(std::ptr::null_mut());
    }
}
