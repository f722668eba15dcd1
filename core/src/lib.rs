//! Data-access layer for the access-control administration client.
//!
//! # Overview
//! Typed access to the `/api/v1` surface of the access-control backend:
//! the worker registry (including fingerprint slots and RFID tags),
//! attendance/access/security reports, and the singleton system
//! configuration. Requests are built and responses parsed without touching
//! the network (host-does-IO pattern); `transport::BlockingTransport` runs
//! the round-trip for Rust callers.
//!
//! # Design
//! - `ApiClient` is stateless: base URL plus default headers.
//! - `client.workers()`, `client.reports()` and `client.config()` expose the
//!   three services. Each operation is a `build_*` / `parse_*` pair.
//! - Envelopes (`{"data": ...}`) are unwrapped by the parsers; server error
//!   messages travel inside `ApiError`.
//! - Form validation, timeline splitting and the report view model are
//!   pure functions over the DTOs.

pub mod client;
pub mod clock;
pub mod config;
pub mod confirm;
pub mod error;
pub mod http;
pub mod reports;
pub mod system;
pub mod timeline;
pub mod transport;
pub mod types;
pub mod validation;
pub mod view;
pub mod workers;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use confirm::{Confirmation, DestructiveAction};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use reports::{
    AccessAuditQuery, AccessFilter, AttendanceFilter, AttendanceHistoryQuery, ReportService,
    SecurityLogQuery, SeverityFilter,
};
pub use system::{ConfigService, ConfigState};
pub use timeline::{AttendanceEvent, EventKey, EventKind, Timestamped};
pub use transport::Transport;
#[cfg(feature = "blocking")]
pub use transport::BlockingTransport;
pub use types::{
    AccessLog, AccessStatus, Attendance, AttendanceStatus, CreateWorker, SecurityLog, Severity,
    SortOrder, SystemConfig, UpdateSystemConfig, UpdateWorker, Worker, WorkerStatus,
};
pub use validation::{ValidationError, ValidationErrors};
pub use view::{ReportFilter, ReportKind, ReportRows, ReportView};
pub use workers::WorkerService;
