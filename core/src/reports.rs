//! Read-only report queries: attendance, door access, security events.
//!
//! # Design
//! The canonical queries take a window, a filter and a sort order and send
//! all three on every call. The older single-purpose endpoints (one day of
//! attendance, last-N-hours denials, critical events) are kept as deprecated
//! builders for backends that have not moved on. Results are full lists;
//! there is no pagination.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::client::ApiClient;
use crate::clock::{format_date, DateRange, TimeRange};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{AccessLog, AccessStatus, Attendance, SecurityLog, Severity, SortOrder};

/// Rolling window the report screens query by default.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_DENIED_HOURS: u32 = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttendanceFilter {
    #[default]
    All,
    Late,
    OnTime,
}

impl AttendanceFilter {
    pub fn as_param(&self) -> &'static str {
        match self {
            AttendanceFilter::All => "ALL",
            AttendanceFilter::Late => "LATE",
            AttendanceFilter::OnTime => "ON_TIME",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "ALL" => Some(AttendanceFilter::All),
            "LATE" => Some(AttendanceFilter::Late),
            "ON_TIME" => Some(AttendanceFilter::OnTime),
            _ => None,
        }
    }

    pub fn matches(&self, record: &Attendance) -> bool {
        match self {
            AttendanceFilter::All => true,
            AttendanceFilter::Late => record.is_late,
            AttendanceFilter::OnTime => !record.is_late,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessFilter {
    #[default]
    All,
    Granted,
    /// Every outcome other than `GRANTED`.
    Denied,
}

impl AccessFilter {
    pub fn as_param(&self) -> &'static str {
        match self {
            AccessFilter::All => "ALL",
            AccessFilter::Granted => "GRANTED",
            AccessFilter::Denied => "DENIED",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "ALL" => Some(AccessFilter::All),
            "GRANTED" => Some(AccessFilter::Granted),
            "DENIED" => Some(AccessFilter::Denied),
            _ => None,
        }
    }

    pub fn matches(&self, log: &AccessLog) -> bool {
        match self {
            AccessFilter::All => true,
            AccessFilter::Granted => log.status == AccessStatus::Granted,
            AccessFilter::Denied => log.status != AccessStatus::Granted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    pub fn as_param(&self) -> &'static str {
        match self {
            SeverityFilter::All => "ALL",
            SeverityFilter::Only(severity) => severity.as_str(),
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        if value == "ALL" {
            return Some(SeverityFilter::All);
        }
        Severity::from_param(value).map(SeverityFilter::Only)
    }

    pub fn matches(&self, log: &SecurityLog) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Only(severity) => log.severity == *severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceHistoryQuery {
    pub range: DateRange,
    pub status: AttendanceFilter,
    pub sort: SortOrder,
}

impl AttendanceHistoryQuery {
    /// The last `DEFAULT_WINDOW_DAYS` calendar days, everything, newest first.
    pub fn trailing_window(today: NaiveDate) -> Option<Self> {
        Some(Self {
            range: DateRange::trailing_days(today, DEFAULT_WINDOW_DAYS)?,
            status: AttendanceFilter::All,
            sort: SortOrder::Desc,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessAuditQuery {
    pub range: TimeRange,
    pub status: AccessFilter,
    pub sort: SortOrder,
}

impl AccessAuditQuery {
    pub fn trailing_window(now: DateTime<FixedOffset>) -> Option<Self> {
        Some(Self {
            range: TimeRange::trailing_days(now, DEFAULT_WINDOW_DAYS)?,
            status: AccessFilter::All,
            sort: SortOrder::Desc,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityLogQuery {
    pub range: TimeRange,
    pub severity: SeverityFilter,
    pub sort: SortOrder,
}

impl SecurityLogQuery {
    pub fn trailing_window(now: DateTime<FixedOffset>) -> Option<Self> {
        Some(Self {
            range: TimeRange::trailing_days(now, DEFAULT_WINDOW_DAYS)?,
            severity: SeverityFilter::All,
            sort: SortOrder::Desc,
        })
    }
}

pub struct ReportService<'a> {
    client: &'a ApiClient,
}

impl<'a> ReportService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn build_attendance_history(&self, query: &AttendanceHistoryQuery) -> HttpRequest {
        self.client.get(
            "/attendance/history",
            &[
                ("startDate", query.range.start_param()),
                ("endDate", query.range.end_param()),
                ("status", query.status.as_param().to_string()),
                ("sort", query.sort.as_param().to_string()),
            ],
        )
    }

    pub fn build_worker_attendance(&self, worker_id: i64, range: DateRange) -> HttpRequest {
        self.client.get(
            &format!("/attendance/worker/{worker_id}"),
            &[("startDate", range.start_param()), ("endDate", range.end_param())],
        )
    }

    pub fn build_access_audit(&self, query: &AccessAuditQuery) -> HttpRequest {
        self.client.get(
            "/access-audit/time-range",
            &[
                ("startTime", query.range.start_param()),
                ("endTime", query.range.end_param()),
                ("status", query.status.as_param().to_string()),
                ("sort", query.sort.as_param().to_string()),
            ],
        )
    }

    pub fn build_worker_access_logs(&self, worker_id: i64) -> HttpRequest {
        self.client.get(&format!("/access/worker/{worker_id}"), &[])
    }

    pub fn build_security_logs(&self, query: &SecurityLogQuery) -> HttpRequest {
        self.client.get(
            "/security/logs",
            &[
                ("startTime", query.range.start_param()),
                ("endTime", query.range.end_param()),
                ("severity", query.severity.as_param().to_string()),
                ("sort", query.sort.as_param().to_string()),
            ],
        )
    }

    #[deprecated(note = "use build_attendance_history with a single-day range")]
    pub fn build_attendance_by_date(&self, date: NaiveDate) -> HttpRequest {
        self.client
            .get(&format!("/attendance/date/{}", format_date(date)), &[])
    }

    #[deprecated(note = "use build_attendance_history with AttendanceFilter::Late")]
    pub fn build_late_attendance_by_date(&self, date: NaiveDate) -> HttpRequest {
        self.client
            .get(&format!("/attendance/date/{}/late", format_date(date)), &[])
    }

    #[deprecated(note = "use build_access_audit")]
    pub fn build_access_time_range(&self, range: TimeRange) -> HttpRequest {
        self.client.get(
            "/access/time-range",
            &[("startTime", range.start_param()), ("endTime", range.end_param())],
        )
    }

    #[deprecated(note = "use build_access_audit with AccessFilter::Denied")]
    pub fn build_denied_access(&self, hours: u32) -> HttpRequest {
        self.client
            .get("/access/denied", &[("hours", hours.to_string())])
    }

    #[deprecated(note = "use build_security_logs with SeverityFilter::Only(Severity::Critical)")]
    pub fn build_critical_security(&self) -> HttpRequest {
        self.client.get("/security/critical", &[])
    }

    pub fn parse_attendance(&self, response: HttpResponse) -> Result<Vec<Attendance>, ApiError> {
        self.client.parse_data(response)
    }

    pub fn parse_access_logs(&self, response: HttpResponse) -> Result<Vec<AccessLog>, ApiError> {
        self.client.parse_data(response)
    }

    pub fn parse_security_logs(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<SecurityLog>, ApiError> {
        self.client.parse_data(response)
    }
}
