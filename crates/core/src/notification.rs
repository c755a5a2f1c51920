//! Notification feed entries.
//!
//! For ordinary notifications `timestamp` is the creation time. For
//! reminders it is the target reminder time, which is usually in the future.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::ids::{generate_id, PREFIX_NOTIFICATION, PREFIX_REMINDER};
use crate::types::{now_millis, EpochMillis};

/// Date format used when rendering a reminder date into a message.
pub const REMINDER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Kind of a notification, serialized as its lowercase name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Hearing reminder; `timestamp` holds the reminder target time.
    Reminder,
    /// Case status update.
    Update,
    /// General information.
    #[default]
    Info,
}

/// Kinds a plain notice may take.
///
/// Reminders carry a target time and a case link, so they are only built by
/// [`Notification::reminder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Update,
    #[default]
    Info,
}

impl From<NoticeKind> for NotificationKind {
    fn from(kind: NoticeKind) -> Self {
        match kind {
            NoticeKind::Update => NotificationKind::Update,
            NoticeKind::Info => NotificationKind::Info,
        }
    }
}

/// A single entry in the notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: EpochMillis,
    #[serde(default)]
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Saved case a reminder belongs to. Not present on older entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
}

impl Notification {
    /// Create an unread notification stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NoticeKind,
    ) -> Self {
        Self {
            id: generate_id(PREFIX_NOTIFICATION),
            title: title.into(),
            message: message.into(),
            timestamp: now_millis(),
            read: false,
            kind: kind.into(),
            case_id: None,
        }
    }

    /// Create an unread hearing reminder that targets `remind_at`.
    pub fn reminder<Tz>(
        case_id: impl Into<String>,
        case_number: &str,
        remind_at: &DateTime<Tz>,
        court_name: &str,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let date = remind_at.format(REMINDER_DATE_FORMAT);
        Self {
            id: generate_id(PREFIX_REMINDER),
            title: format!("Reminder: Case {case_number}"),
            message: format!(
                "You have a hearing for case {case_number} at {court_name} on {date}."
            ),
            timestamp: remind_at.timestamp_millis(),
            read: false,
            kind: NotificationKind::Reminder,
            case_id: Some(case_id.into()),
        }
    }

    /// Whether this is a reminder.
    pub fn is_reminder(&self) -> bool {
        self.kind == NotificationKind::Reminder
    }

    /// Mark as read. Returns `true` if the flag changed.
    ///
    /// `read` only moves from `false` to `true`.
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }

    /// Whether an unread reminder falls in `(now, now + horizon]`.
    pub fn is_due_within(&self, now: EpochMillis, horizon_ms: i64) -> bool {
        self.is_reminder()
            && !self.read
            && self.timestamp > now
            && self.timestamp - now <= horizon_ms
    }
}
