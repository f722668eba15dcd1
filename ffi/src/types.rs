//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror the core `HttpRequest` field by field, with C strings and
//! raw arrays. Parsed payloads cross the boundary as one JSON C string inside
//! `FfiResult`, tagged by `FfiDataTag`, so the native shell decodes them with
//! its own JSON library instead of walking nested C structs. Conversion
//! helpers live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use access_core::clock::{DateRange, TimeRange};
use access_core::http::HttpMethod;
use access_core::{
    AccessAuditQuery, AccessFilter, ApiClient, ApiError, AttendanceFilter, AttendanceHistoryQuery,
    SecurityLogQuery, SeverityFilter, SortOrder, ValidationErrors,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Opaque handle to an `ApiClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiApiClient {
    pub(crate) inner: ApiClient,
}

/// Copy `s` into a heap C string. Interior NULs are dropped rather than
/// failing the whole call.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Borrow a caller-owned C string. `None` for null or non-UTF-8 input.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned slice.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `acs_build_*` functions. The native shell executes it and passes
/// the response back through the matching `acs_parse_*`. `body` is null for
/// body-less requests.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: access_core::HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The caller constructs this after executing a request and passes a pointer
/// to an `acs_parse_*` function. The FFI layer reads but does not free these
/// fields; a null `body` is read as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> access_core::HttpResponse {
        let body = unsafe { read_str(self.body) }.unwrap_or_default();
        access_core::HttpResponse::new(self.status, body)
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    Transport = 7,
    /// `data` holds a JSON array of `{field, message}` objects.
    Validation = 8,
    Unconfirmed = 9,
    /// The system configuration does not exist yet. Not a failure: the
    /// settings screen offers initialization.
    Uninitialized = 10,
    InvalidInput = 11,
}

/// What the JSON in `FfiResult::data` describes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Worker = 1,
    WorkerList = 2,
    TagList = 3,
    AttendanceList = 4,
    AccessLogList = 5,
    SecurityLogList = 6,
    Config = 7,
    Raw = 8,
    Timeline = 9,
    ValidationErrors = 10,
}

/// Result envelope for every parse operation.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data` is a
/// JSON C string (tagged by `data_tag`), or null for `FfiDataTag::None`.
/// On failure `error_code` gives the category and `error_message` is the
/// text to show the user: the server's message verbatim when it sent one.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_char,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: Option<String>,
        http_status: u16,
        data_tag: FfiDataTag,
        data: Option<String>,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: error_message.map_or(std::ptr::null_mut(), to_c_string),
            http_status,
            data_tag,
            data: data.map_or(std::ptr::null_mut(), to_c_string),
        }))
    }

    /// Success carrying `value` serialized as JSON.
    pub(crate) fn ok_json<T: Serialize>(tag: FfiDataTag, value: &T) -> *mut Self {
        match serde_json::to_string(value) {
            Ok(json) => Self::boxed(FfiErrorCode::Ok, None, 0, tag, Some(json)),
            Err(e) => Self::from_error(ApiError::Serialization(e.to_string())),
        }
    }

    /// Success with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, 0, FfiDataTag::None, None)
    }

    pub(crate) fn uninitialized() -> *mut Self {
        Self::boxed(FfiErrorCode::Uninitialized, None, 404, FfiDataTag::None, None)
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::NotFound { .. } => (FfiErrorCode::NotFound, 404),
            ApiError::Http { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::Deserialization(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::Serialization(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Validation(errors) => return Self::validation(errors),
            ApiError::Unconfirmed(_) => (FfiErrorCode::Unconfirmed, 0),
            ApiError::InvalidWindow { .. } => (FfiErrorCode::InvalidInput, 0),
        };
        let message = err.user_message(&err.to_string());
        Self::boxed(error_code, Some(message), http_status, FfiDataTag::None, None)
    }

    pub(crate) fn validation(errors: &ValidationErrors) -> *mut Self {
        let fields: Vec<FieldError> = errors
            .0
            .iter()
            .map(|e| FieldError {
                field: e.field.as_str(),
                message: e.to_string(),
            })
            .collect();
        let data = serde_json::to_string(&fields).ok();
        Self::boxed(
            FfiErrorCode::Validation,
            Some(errors.to_string()),
            0,
            FfiDataTag::ValidationErrors,
            data,
        )
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = format!("null argument: {name}");
        Self::boxed(FfiErrorCode::NullArg, Some(msg), 0, FfiDataTag::None, None)
    }

    pub(crate) fn invalid_input(msg: String) -> *mut Self {
        Self::boxed(FfiErrorCode::InvalidInput, Some(msg), 0, FfiDataTag::None, None)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg.to_string()), 0, FfiDataTag::None, None)
    }
}

/// Release a pointer produced by `to_c_string`.
///
/// # Safety
/// `ptr` must be null or come from `to_c_string` and not be freed twice.
pub(crate) unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

#[derive(Serialize)]
struct FieldError {
    field: &'static str,
    message: String,
}

/// One attendance timeline row as handed to the native list.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimelineRow<'a> {
    pub key: String,
    pub kind: &'static str,
    pub timestamp: String,
    pub is_late: bool,
    pub session: &'a access_core::Attendance,
}

// ---------------------------------------------------------------------------
// JSON query inputs
// ---------------------------------------------------------------------------

fn instant(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("invalid instant {raw:?}: {e}"))
}

pub(crate) fn parse_sort(raw: Option<&str>) -> Result<SortOrder, String> {
    match raw {
        None => Ok(SortOrder::default()),
        Some(s) => SortOrder::from_param(s).ok_or_else(|| format!("invalid sort {s:?}")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttendanceHistoryInput {
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: Option<String>,
    sort: Option<String>,
}

impl AttendanceHistoryInput {
    pub(crate) fn into_query(self) -> Result<AttendanceHistoryQuery, String> {
        let status = match self.status.as_deref() {
            None => AttendanceFilter::All,
            Some(s) => AttendanceFilter::from_param(s).ok_or_else(|| format!("invalid status {s:?}"))?,
        };
        Ok(AttendanceHistoryQuery {
            range: DateRange::new(self.start_date, self.end_date),
            status,
            sort: parse_sort(self.sort.as_deref())?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessAuditInput {
    start_time: String,
    end_time: String,
    status: Option<String>,
    sort: Option<String>,
}

impl AccessAuditInput {
    pub(crate) fn into_query(self) -> Result<AccessAuditQuery, String> {
        let status = match self.status.as_deref() {
            None => AccessFilter::All,
            Some(s) => AccessFilter::from_param(s).ok_or_else(|| format!("invalid status {s:?}"))?,
        };
        Ok(AccessAuditQuery {
            range: TimeRange::new(instant(&self.start_time)?, instant(&self.end_time)?),
            status,
            sort: parse_sort(self.sort.as_deref())?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SecurityLogInput {
    start_time: String,
    end_time: String,
    severity: Option<String>,
    sort: Option<String>,
}

impl SecurityLogInput {
    pub(crate) fn into_query(self) -> Result<SecurityLogQuery, String> {
        let severity = match self.severity.as_deref() {
            None => SeverityFilter::All,
            Some(s) => {
                SeverityFilter::from_param(s).ok_or_else(|| format!("invalid severity {s:?}"))?
            }
        };
        Ok(SecurityLogQuery {
            range: TimeRange::new(instant(&self.start_time)?, instant(&self.end_time)?),
            severity,
            sort: parse_sort(self.sort.as_deref())?,
        })
    }
}
