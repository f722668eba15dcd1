//! Per-screen state for the reports screen.
//!
//! `ReportView` lives as long as the screen does. It turns the selected tab,
//! filter and sort order into one canonical query and reshapes the answer
//! into rows ready to render.

use chrono::{DateTime, FixedOffset};

use crate::client::ApiClient;
use crate::clock::{DateRange, TimeRange};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::reports::{
    AccessAuditQuery, AccessFilter, AttendanceFilter, AttendanceHistoryQuery, SecurityLogQuery,
    SeverityFilter, DEFAULT_WINDOW_DAYS,
};
use crate::timeline::{attendance_timeline, sort_by_time, AttendanceEvent};
use crate::types::{AccessLog, SecurityLog, SortOrder};

/// Longest window the reports screen offers.
pub const MAX_WINDOW_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportKind {
    #[default]
    Attendance,
    Access,
    Security,
}

/// Filter for whichever report is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    Attendance(AttendanceFilter),
    Access(AccessFilter),
    Security(SeverityFilter),
}

impl ReportFilter {
    pub fn all_for(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Attendance => ReportFilter::Attendance(AttendanceFilter::All),
            ReportKind::Access => ReportFilter::Access(AccessFilter::All),
            ReportKind::Security => ReportFilter::Security(SeverityFilter::All),
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ReportFilter::Attendance(_) => ReportKind::Attendance,
            ReportFilter::Access(_) => ReportKind::Access,
            ReportFilter::Security(_) => ReportKind::Security,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRows {
    Attendance(Vec<AttendanceEvent>),
    Access(Vec<AccessLog>),
    Security(Vec<SecurityLog>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::Attendance(rows) => rows.len(),
            ReportRows::Access(rows) => rows.len(),
            ReportRows::Security(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    filter: ReportFilter,
    sort: SortOrder,
    window_days: i64,
}

impl Default for ReportView {
    fn default() -> Self {
        Self {
            filter: ReportFilter::all_for(ReportKind::default()),
            sort: SortOrder::Desc,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl ReportView {
    pub fn kind(&self) -> ReportKind {
        self.filter.kind()
    }

    pub fn filter(&self) -> ReportFilter {
        self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Switching tabs resets the filter to "all".
    pub fn select_kind(&mut self, kind: ReportKind) {
        if kind != self.kind() {
            self.filter = ReportFilter::all_for(kind);
        }
    }

    /// Sets the filter, switching tabs if it belongs to another report.
    pub fn set_filter(&mut self, filter: ReportFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Clamped to `1..=MAX_WINDOW_DAYS`.
    pub fn set_window_days(&mut self, days: i64) {
        self.window_days = days.clamp(1, MAX_WINDOW_DAYS);
    }

    pub fn build_request(
        &self,
        client: &ApiClient,
        now: DateTime<FixedOffset>,
    ) -> Result<HttpRequest, ApiError> {
        let reports = client.reports();
        let days = self.window_days;
        let out_of_range = || ApiError::InvalidWindow { days };
        let req = match self.filter {
            ReportFilter::Attendance(status) => {
                reports.build_attendance_history(&AttendanceHistoryQuery {
                    range: DateRange::trailing_days(now.date_naive(), days)
                        .ok_or_else(out_of_range)?,
                    status,
                    sort: self.sort,
                })
            }
            ReportFilter::Access(status) => reports.build_access_audit(&AccessAuditQuery {
                range: TimeRange::trailing_days(now, days).ok_or_else(out_of_range)?,
                status,
                sort: self.sort,
            }),
            ReportFilter::Security(severity) => reports.build_security_logs(&SecurityLogQuery {
                range: TimeRange::trailing_days(now, days).ok_or_else(out_of_range)?,
                severity,
                sort: self.sort,
            }),
        };
        Ok(req)
    }

    /// Parse the answer to `build_request`. The filter is re-applied locally
    /// and every list is re-sorted, so rows stay consistent even if the
    /// server ignored a parameter.
    pub fn parse_rows(&self, client: &ApiClient, response: HttpResponse) -> Result<ReportRows, ApiError> {
        let reports = client.reports();
        let rows = match self.filter {
            ReportFilter::Attendance(status) => {
                let mut sessions = reports.parse_attendance(response)?;
                sessions.retain(|s| status.matches(s));
                ReportRows::Attendance(attendance_timeline(&sessions, self.sort))
            }
            ReportFilter::Access(status) => {
                let mut logs = reports.parse_access_logs(response)?;
                logs.retain(|l| status.matches(l));
                sort_by_time(&mut logs, self.sort);
                ReportRows::Access(logs)
            }
            ReportFilter::Security(severity) => {
                let mut logs = reports.parse_security_logs(response)?;
                logs.retain(|l| severity.matches(l));
                sort_by_time(&mut logs, self.sort);
                ReportRows::Security(logs)
            }
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use chrono::{NaiveDate, TimeZone};

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/api/v1")
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 8, 18, 30, 0)
            .unwrap()
    }

    #[test]
    fn default_view_queries_attendance_history() {
        let view = ReportView::default();
        let req = view.build_request(&client(), now()).unwrap();
        assert!(req.url.contains("/attendance/history?startDate=2025-03-02&endDate=2025-03-08"));
        assert!(req.url.ends_with("status=ALL&sort=DESC"));
    }

    #[test]
    fn switching_kind_resets_filter() {
        let mut view = ReportView::default();
        view.set_filter(ReportFilter::Attendance(AttendanceFilter::Late));
        view.select_kind(ReportKind::Attendance);
        assert_eq!(view.filter(), ReportFilter::Attendance(AttendanceFilter::Late));
        view.select_kind(ReportKind::Security);
        assert_eq!(view.filter(), ReportFilter::Security(SeverityFilter::All));
        assert_eq!(view.kind(), ReportKind::Security);
    }

    #[test]
    fn security_view_queries_with_severity() {
        let mut view = ReportView::default();
        view.set_filter(ReportFilter::Security(SeverityFilter::Only(Severity::Critical)));
        view.set_sort(SortOrder::Asc);
        let req = view.build_request(&client(), now()).unwrap();
        assert!(req.url.contains("/security/logs?"));
        assert!(req.url.ends_with("severity=CRITICAL&sort=ASC"));
    }

    #[test]
    fn window_is_at_least_one_day() {
        let mut view = ReportView::default();
        view.set_window_days(0);
        assert_eq!(view.window_days(), 1);
        let req = view.build_request(&client(), now()).unwrap();
        assert!(req.url.contains("startDate=2025-03-08&endDate=2025-03-08"));
    }

    #[test]
    fn window_is_capped() {
        let mut view = ReportView::default();
        view.set_window_days(i64::MAX);
        assert_eq!(view.window_days(), MAX_WINDOW_DAYS);
        let req = view.build_request(&client(), now()).unwrap();
        assert!(req.url.contains("startDate=2024-03-08&endDate=2025-03-08"));

        view.select_kind(ReportKind::Access);
        assert!(view.build_request(&client(), now()).is_ok());
    }

    #[test]
    fn window_before_earliest_date_is_an_error() {
        let earliest = NaiveDate::MIN
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .fixed_offset();
        let mut view = ReportView::default();
        let err = view.build_request(&client(), earliest).unwrap_err();
        assert!(matches!(err, ApiError::InvalidWindow { days: 7 }));

        view.select_kind(ReportKind::Security);
        let err = view.build_request(&client(), earliest).unwrap_err();
        assert!(matches!(err, ApiError::InvalidWindow { days: 7 }));
    }

    #[test]
    fn attendance_rows_are_split_filtered_and_sorted() {
        let mut view = ReportView::default();
        view.set_filter(ReportFilter::Attendance(AttendanceFilter::Late));
        let body = r#"{"data":[
            {"id":1,"workerId":1,"attendanceDate":"2025-03-08","checkInTime":"2025-03-08T08:20:00",
             "checkOutTime":"2025-03-08T17:00:00","isLate":true,"status":"CHECKED_OUT"},
            {"id":2,"workerId":2,"attendanceDate":"2025-03-08","checkInTime":"2025-03-08T07:55:00",
             "isLate":false,"status":"CHECKED_IN"}
        ]}"#;
        let rows = view.parse_rows(&client(), HttpResponse::new(200, body)).unwrap();
        let ReportRows::Attendance(events) = rows else {
            panic!("expected attendance rows");
        };
        let keys: Vec<String> = events.iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["1-exit", "1-entry"]);
    }

    #[test]
    fn access_rows_sorted_ascending() {
        let mut view = ReportView::default();
        view.select_kind(ReportKind::Access);
        view.set_sort(SortOrder::Asc);
        let body = r#"{"data":[
            {"id":1,"status":"GRANTED","accessTime":"2025-03-08T09:00:00"},
            {"id":2,"status":"DENIED","accessTime":"2025-03-08T08:00:00"}
        ]}"#;
        let rows = view.parse_rows(&client(), HttpResponse::new(200, body)).unwrap();
        match rows {
            ReportRows::Access(logs) => {
                assert_eq!(logs.iter().map(|l| l.id).collect::<Vec<_>>(), vec![2, 1])
            }
            other => panic!("unexpected rows: {other:?}"),
        }
    }

    #[test]
    fn failed_fetch_propagates() {
        let view = ReportView::default();
        let err = view
            .parse_rows(&client(), HttpResponse::new(503, ""))
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
