//! Hearing-date parsing and reminder-time computation.

use chrono::{DateTime, Days, Local, NaiveDate};

use crate::error::CoreError;

/// Input format for hearing and reminder dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default number of days before a hearing that its reminder targets.
pub const DEFAULT_REMINDER_LEAD_DAYS: u64 = 1;

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!(
            "Invalid date '{text}'. Please use YYYY-MM-DD format"
        ))
    })
}

/// Local midnight at the start of `date`.
///
/// When a DST transition skips midnight the earliest valid instant of the
/// day is used.
pub fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>, CoreError> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(Local).earliest())
        .or_else(|| {
            date.and_hms_opt(1, 0, 0)
                .and_then(|dt| dt.and_local_timezone(Local).earliest())
        })
        .ok_or_else(|| CoreError::Internal(format!("No local midnight for {date}")))
}

/// Reminder time for a hearing: local midnight `lead_days` before it.
///
/// Returns `Ok(None)` when `hearing_date` is not a `YYYY-MM-DD` date, which
/// lookups produce for unknown dates (`"N/A"`, `"Unknown"`).
pub fn reminder_for_hearing(
    hearing_date: &str,
    lead_days: u64,
) -> Result<Option<DateTime<Local>>, CoreError> {
    let Ok(date) = parse_date(hearing_date) else {
        return Ok(None);
    };
    let target = date
        .checked_sub_days(Days::new(lead_days))
        .ok_or_else(|| CoreError::Validation(format!("Hearing date {date} is out of range")))?;
    local_midnight(target).map(Some)
}
