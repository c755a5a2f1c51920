//! Saved court-case records and their DTOs.
//!
//! Field names serialize in camelCase so the persisted `saved_cases` array
//! keeps the shape the dashboard has always written.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Case data as returned by a lookup and accepted by `save_case`.
///
/// This is a [`CaseRecord`] minus the fields generated at save time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetails {
    pub case_number: String,
    pub court_name: String,
    /// Open set in practice (`Pending`, `Disposed`, ...), so kept as a string.
    pub status: String,
    pub filing_date: String,
    pub petitioner: String,
    pub respondent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_hearing_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hearing_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_name: Option<String>,
}

/// A case persisted in the local case list.
///
/// `id` and `saved_at` are assigned once by the repository and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,
    #[serde(flatten)]
    pub details: CaseDetails,
    pub saved_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,
}

/// Partial update for a saved case.
///
/// `None` leaves a field untouched; `Some` overwrites it. Identity fields
/// (`id`, `saved_at`) are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePatch {
    pub case_number: Option<String>,
    pub court_name: Option<String>,
    pub status: Option<String>,
    pub filing_date: Option<String>,
    pub petitioner: Option<String>,
    pub respondent: Option<String>,
    pub last_hearing_date: Option<String>,
    pub next_hearing_date: Option<String>,
    pub purpose: Option<String>,
    pub judge_name: Option<String>,
    pub reminder_date: Option<String>,
}

impl CasePatch {
    /// Shallow-merge the supplied fields over `record`.
    pub fn apply_to(self, record: &mut CaseRecord) {
        let d = &mut record.details;

        if let Some(v) = self.case_number {
            d.case_number = v;
        }
        if let Some(v) = self.court_name {
            d.court_name = v;
        }
        if let Some(v) = self.status {
            d.status = v;
        }
        if let Some(v) = self.filing_date {
            d.filing_date = v;
        }
        if let Some(v) = self.petitioner {
            d.petitioner = v;
        }
        if let Some(v) = self.respondent {
            d.respondent = v;
        }
        if self.last_hearing_date.is_some() {
            d.last_hearing_date = self.last_hearing_date;
        }
        if self.next_hearing_date.is_some() {
            d.next_hearing_date = self.next_hearing_date;
        }
        if self.purpose.is_some() {
            d.purpose = self.purpose;
        }
        if self.judge_name.is_some() {
            d.judge_name = self.judge_name;
        }
        if self.reminder_date.is_some() {
            record.reminder_date = self.reminder_date;
        }
    }
}
