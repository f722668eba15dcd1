//! Display-side reshaping of report lists.
//!
//! An attendance session with a check-out is shown as two rows, entry and
//! exit, each carrying the whole session. The rows have no identity on the
//! server; `EventKey` (session id + kind) is their list key.

use std::fmt;

use chrono::NaiveDateTime;

use crate::types::{AccessLog, Attendance, SecurityLog, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Entry,
    Exit,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Entry => "entry",
            EventKind::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub session_id: i64,
    pub kind: EventKind,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.session_id, self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEvent {
    pub key: EventKey,
    pub timestamp: NaiveDateTime,
    pub session: Attendance,
}

impl AttendanceEvent {
    pub fn kind(&self) -> EventKind {
        self.key.kind
    }

    pub fn is_late(&self) -> bool {
        self.session.is_late
    }
}

/// Anything a report list can be ordered by.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

impl Timestamped for AttendanceEvent {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl Timestamped for Attendance {
    fn timestamp(&self) -> NaiveDateTime {
        self.check_in_time
    }
}

impl Timestamped for AccessLog {
    fn timestamp(&self) -> NaiveDateTime {
        self.access_time
    }
}

impl Timestamped for SecurityLog {
    fn timestamp(&self) -> NaiveDateTime {
        self.event_time
    }
}

/// One entry event per session, plus an exit event when checked out.
pub fn split_sessions(sessions: &[Attendance]) -> Vec<AttendanceEvent> {
    let mut events = Vec::with_capacity(sessions.len() * 2);
    for session in sessions {
        events.push(AttendanceEvent {
            key: EventKey {
                session_id: session.id,
                kind: EventKind::Entry,
            },
            timestamp: session.check_in_time,
            session: session.clone(),
        });
        if let Some(check_out) = session.check_out_time {
            events.push(AttendanceEvent {
                key: EventKey {
                    session_id: session.id,
                    kind: EventKind::Exit,
                },
                timestamp: check_out,
                session: session.clone(),
            });
        }
    }
    events
}

/// Stable sort; ties keep their incoming order.
pub fn sort_by_time<T: Timestamped>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::Asc => items.sort_by_key(|item| item.timestamp()),
        SortOrder::Desc => items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
    }
}

/// `split_sessions` followed by `sort_by_time`.
pub fn attendance_timeline(sessions: &[Attendance], order: SortOrder) -> Vec<AttendanceEvent> {
    let mut events = split_sessions(sessions);
    sort_by_time(&mut events, order);
    events
}
