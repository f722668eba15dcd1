//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use access_core::clock::{DateRange, TimeRange};
use access_core::{
    AccessAuditQuery, AccessFilter, ApiClient, ApiError, AttendanceFilter, AttendanceHistoryQuery,
    ConfigState, CreateWorker, HttpMethod, HttpRequest, HttpResponse, SecurityLogQuery, Severity,
    SeverityFilter, SortOrder, SystemConfig, UpdateSystemConfig, UpdateWorker, Worker,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn client() -> ApiClient {
    ApiClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Compare method, URL, body and (when listed) headers.
fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(
        req.method,
        parse_method(expected["method"].as_str().unwrap()),
        "{name}: method"
    );
    assert_eq!(
        req.url,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: url"
    );

    if let Some(headers) = expected["headers"].as_array() {
        let expected_headers: Vec<(String, String)> = headers
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match req.body.as_deref() {
        Some(body) => {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body, expected["body"], "{name}: body");
        }
        None => assert!(
            expected["body"].is_null(),
            "{name}: expected a body, request has none"
        ),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// `expected_error` as `{status, message}`.
fn check_http_error(name: &str, err: &ApiError, expected: &Value) {
    assert_eq!(
        err.status().map(u64::from),
        expected["status"].as_u64(),
        "{name}: status"
    );
    assert_eq!(
        err.server_message(),
        expected["message"].as_str(),
        "{name}: server message"
    );
}

fn instant(raw: &Value) -> DateTime<chrono::FixedOffset> {
    DateTime::parse_from_rfc3339(raw.as_str().unwrap()).unwrap()
}

fn date(raw: &Value) -> NaiveDate {
    raw.as_str().unwrap().parse().unwrap()
}

fn sort(raw: &Value) -> SortOrder {
    serde_json::from_value(raw.clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

#[test]
fn worker_test_vectors() {
    let c = client();
    let workers = c.workers();
    for case in load(include_str!("../../test-vectors/workers.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["op"].as_str().unwrap();
        let id = case["id"].as_i64().unwrap_or_default();

        let req = match op {
            "create" => {
                let input: CreateWorker = serde_json::from_value(case["input"].clone()).unwrap();
                workers.build_create(&input).unwrap()
            }
            "update" => {
                let input: UpdateWorker = serde_json::from_value(case["input"].clone()).unwrap();
                workers.build_update(id, &input).unwrap()
            }
            "remove_rfid" => workers.build_remove_rfid(id, case["tag"].as_str().unwrap()),
            "unassigned_tags" => workers.build_unassigned_tags(),
            other => panic!("{name}: unknown op {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        if op == "unassigned_tags" {
            let tags = workers.parse_tags(response).unwrap();
            let expected: Vec<String> =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(tags, expected, "{name}: parsed result");
            continue;
        }

        let result = workers.parse_worker(response);
        if case.get("expected_error").is_some() {
            check_http_error(name, &result.unwrap_err(), &case["expected_error"]);
        } else {
            let expected: Worker = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn report_test_vectors() {
    let c = client();
    let reports = c.reports();
    for case in load(include_str!("../../test-vectors/reports.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["op"].as_str().unwrap();
        let input = &case["input"];

        let req = match op {
            "attendance_history" => reports.build_attendance_history(&AttendanceHistoryQuery {
                range: DateRange::new(date(&input["startDate"]), date(&input["endDate"])),
                status: match input["status"].as_str().unwrap() {
                    "LATE" => AttendanceFilter::Late,
                    "ON_TIME" => AttendanceFilter::OnTime,
                    _ => AttendanceFilter::All,
                },
                sort: sort(&input["sort"]),
            }),
            "access_audit" => reports.build_access_audit(&AccessAuditQuery {
                range: TimeRange::new(instant(&input["startTime"]), instant(&input["endTime"])),
                status: match input["status"].as_str().unwrap() {
                    "GRANTED" => AccessFilter::Granted,
                    "DENIED" => AccessFilter::Denied,
                    _ => AccessFilter::All,
                },
                sort: sort(&input["sort"]),
            }),
            "security_logs" => reports.build_security_logs(&SecurityLogQuery {
                range: TimeRange::new(instant(&input["startTime"]), instant(&input["endTime"])),
                severity: match input["severity"].as_str().unwrap() {
                    "ALL" => SeverityFilter::All,
                    other => SeverityFilter::Only(
                        serde_json::from_value::<Severity>(Value::from(other)).unwrap(),
                    ),
                },
                sort: sort(&input["sort"]),
            }),
            other => panic!("{name}: unknown op {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        let ids: Result<Vec<i64>, ApiError> = match op {
            "attendance_history" => reports
                .parse_attendance(response)
                .map(|rows| rows.iter().map(|r| r.id).collect()),
            "access_audit" => reports
                .parse_access_logs(response)
                .map(|rows| rows.iter().map(|r| r.id).collect()),
            _ => reports
                .parse_security_logs(response)
                .map(|rows| rows.iter().map(|r| r.id).collect()),
        };

        match case["expected_error"].as_str() {
            Some("deserialization") => assert!(
                matches!(ids, Err(ApiError::Deserialization(_))),
                "{name}: expected deserialization error, got {ids:?}"
            ),
            _ => {
                let expected: Vec<i64> =
                    serde_json::from_value(case["expected_ids"].clone()).unwrap();
                assert_eq!(ids.unwrap(), expected, "{name}: parsed ids");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

#[test]
fn config_test_vectors() {
    let c = client();
    let config = c.config();
    for case in load(include_str!("../../test-vectors/config.json")) {
        let name = case["name"].as_str().unwrap();
        let op = case["op"].as_str().unwrap();

        let req = match op {
            "get" => config.build_get(),
            "update" => {
                let patch: UpdateSystemConfig =
                    serde_json::from_value(case["input"].clone()).unwrap();
                config.build_update(&patch).unwrap()
            }
            "enable_simulation" => {
                let at: NaiveDateTime = case["input"].as_str().unwrap().parse().unwrap();
                config.build_enable_simulation(at).unwrap()
            }
            other => panic!("{name}: unknown op {other}"),
        };
        check_request(name, &req, &case["expected_request"]);

        let response = simulated(&case);
        if op != "get" {
            let expected: SystemConfig =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(config.parse_config(response).unwrap(), expected, "{name}: parsed result");
            continue;
        }

        let state = config.parse_get(response);
        if let Some(expected_error) = case.get("expected_error") {
            check_http_error(name, &state.unwrap_err(), expected_error);
        } else if case["expected_result"] == "uninitialized" {
            assert_eq!(state.unwrap(), ConfigState::Uninitialized, "{name}: state");
        } else {
            let expected: SystemConfig =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(state.unwrap(), ConfigState::Configured(expected), "{name}: state");
        }
    }
}
