//! Composition root for the dashboard.
//!
//! [`Dashboard`] owns one instance of each component and implements the
//! page-level workflows that combine them: saving a found case together with
//! its hearing reminder, deleting with a confirmation notice, setting a
//! reminder by date, and the login sentinel.

use std::sync::Arc;

use ecourts_core::case::{CaseDetails, CasePatch, CaseRecord};
use ecourts_core::error::CoreError;
use ecourts_core::hearing::{self, DATE_FORMAT};
use ecourts_core::lookup::{CaseLookup, CaseQuery};
use ecourts_core::notification::Notification;
use ecourts_db::repositories::CaseRepo;
use ecourts_db::store::{keys, KeyValueStore};
use ecourts_events::{NotificationCenter, Permission, PlatformNotifier};

/// Value of the login sentinel while logged in.
const LOGGED_IN: &str = "true";

/// Result of saving a case from a lookup.
#[derive(Debug, Clone)]
pub struct SavedCase {
    pub record: CaseRecord,
    /// Reminder registered for the next hearing, if it had a usable date.
    pub reminder_id: Option<String>,
}

/// Application services wired together.
pub struct Dashboard {
    store: Arc<dyn KeyValueStore>,
    cases: Arc<CaseRepo>,
    notifications: Arc<NotificationCenter>,
    lookup: Arc<dyn CaseLookup>,
    reminder_lead_days: u64,
}

impl Dashboard {
    /// Build every component over `store`, restoring persisted state.
    pub async fn new(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn PlatformNotifier>,
        lookup: Arc<dyn CaseLookup>,
        reminder_lead_days: u64,
    ) -> Self {
        let cases = Arc::new(CaseRepo::new(store.clone()));
        let notifications = Arc::new(NotificationCenter::load(store.clone(), notifier).await);

        Self {
            store,
            cases,
            notifications,
            lookup,
            reminder_lead_days,
        }
    }

    pub fn case_repo(&self) -> &Arc<CaseRepo> {
        &self.cases
    }

    pub fn notification_center(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Validate `query` and fetch the case from the lookup service.
    pub async fn search(&self, query: &CaseQuery) -> Result<CaseDetails, CoreError> {
        query.validate()?;
        let details = self.lookup.lookup(query).await?;
        tracing::info!(key = %query.key(), case_number = %details.case_number, "Case found");
        Ok(details)
    }

    // -----------------------------------------------------------------------
    // Saved cases
    // -----------------------------------------------------------------------

    pub async fn cases(&self) -> Vec<CaseRecord> {
        self.cases.list_cases().await
    }

    /// Save a found case, remind about its next hearing, and post a notice.
    ///
    /// The reminder targets local midnight `reminder_lead_days` before the
    /// next hearing. Cases without a `YYYY-MM-DD` next hearing get no
    /// reminder.
    pub async fn save_case(&self, details: CaseDetails) -> SavedCase {
        let mut record = self.cases.save_case(details).await;

        let reminder_at = record
            .details
            .next_hearing_date
            .as_deref()
            .map(|date| hearing::reminder_for_hearing(date, self.reminder_lead_days));

        let reminder_id = match reminder_at {
            Some(Ok(Some(at))) => {
                let id = self
                    .notifications
                    .add_reminder(
                        &record.id,
                        &record.details.case_number,
                        &at,
                        &record.details.court_name,
                    )
                    .await;
                let reminder_date = at.format(DATE_FORMAT).to_string();
                self.cases
                    .update_case(
                        &record.id,
                        CasePatch {
                            reminder_date: Some(reminder_date.clone()),
                            ..Default::default()
                        },
                    )
                    .await;
                record.reminder_date = Some(reminder_date);
                Some(id)
            }
            Some(Err(e)) => {
                tracing::warn!(case_id = %record.id, error = %e, "Could not schedule hearing reminder");
                None
            }
            Some(Ok(None)) | None => None,
        };

        self.notifications
            .add_notification(
                "Case Saved",
                &format!("Case {} has been saved to your cases", record.details.case_number),
            )
            .await;

        SavedCase {
            record,
            reminder_id,
        }
    }

    /// Delete a saved case and post a notice. Returns `false` if unknown.
    pub async fn delete_case(&self, id: &str) -> bool {
        if !self.cases.delete_case(id).await {
            return false;
        }

        self.notifications
            .add_notification(
                "Case Deleted",
                "The case has been removed from your saved cases",
            )
            .await;
        true
    }

    /// Register a reminder for a saved case at local midnight of
    /// `date_text` (`YYYY-MM-DD`). Returns the reminder id.
    pub async fn set_reminder(&self, case_id: &str, date_text: &str) -> Result<String, CoreError> {
        let date = hearing::parse_date(date_text)?;
        let case = self
            .cases
            .get_case(case_id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: "Case",
                id: case_id.to_string(),
            })?;
        let at = hearing::local_midnight(date)?;

        let id = self
            .notifications
            .add_reminder(
                &case.id,
                &case.details.case_number,
                &at,
                &case.details.court_name,
            )
            .await;

        let date_text = date.format(DATE_FORMAT).to_string();
        self.cases
            .update_case(
                &case.id,
                CasePatch {
                    reminder_date: Some(date_text.clone()),
                    ..Default::default()
                },
            )
            .await;

        self.notifications
            .add_notification(
                "Reminder Set",
                &format!(
                    "A reminder has been set for {} on {date_text}",
                    case.details.case_number
                ),
            )
            .await;

        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.notifications().await
    }

    pub async fn unread_count(&self) -> usize {
        self.notifications.unread_count().await
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Record the login, ask for platform permission if undecided, and post
    /// a welcome notice.
    pub async fn login(&self) {
        if let Err(e) = self.store.set(keys::IS_LOGGED_IN, LOGGED_IN).await {
            tracing::error!(error = %e, "Failed to persist login");
        }

        let notifier = self.notifications.notifier();
        if notifier.permission() == Permission::Default {
            let answer = notifier.request_permission();
            tracing::debug!(?answer, "Platform notification permission requested");
        }

        self.notifications
            .add_notification(
                "Welcome back",
                "You have successfully logged in to eCourts Tracker",
            )
            .await;
    }

    pub async fn logout(&self) {
        if let Err(e) = self.store.remove(keys::IS_LOGGED_IN).await {
            tracing::error!(error = %e, "Failed to clear login");
        }
    }

    /// Whether the login sentinel is set. Unreadable storage counts as
    /// logged out.
    pub async fn is_logged_in(&self) -> bool {
        match self.store.get(keys::IS_LOGGED_IN).await {
            Ok(value) => value.as_deref() == Some(LOGGED_IN),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read login state");
                false
            }
        }
    }
}
