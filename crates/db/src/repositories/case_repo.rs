//! Repository for the saved case list (`saved_cases` key).

use std::sync::Arc;

use chrono::Utc;
use ecourts_core::case::{CaseDetails, CasePatch, CaseRecord};
use ecourts_core::ids::{generate_id, PREFIX_CASE};
use tokio::sync::Mutex;

use crate::store::{keys, load_list, persist_list, KeyValueStore};

/// Ordered collection of saved cases.
///
/// Every mutation reads the full list, changes it, and rewrites it. Storage
/// failures never reach the caller: reads degrade to an empty list and
/// failed writes are logged.
pub struct CaseRepo {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl CaseRepo {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// All saved cases in insertion order.
    pub async fn list_cases(&self) -> Vec<CaseRecord> {
        load_list(self.store.as_ref(), keys::SAVED_CASES).await
    }

    /// Find a saved case by id.
    pub async fn get_case(&self, id: &str) -> Option<CaseRecord> {
        self.list_cases().await.into_iter().find(|c| c.id == id)
    }

    /// Append a new case with a generated id and save time.
    pub async fn save_case(&self, details: CaseDetails) -> CaseRecord {
        let _guard = self.write_lock.lock().await;
        let mut cases = self.list_cases().await;

        let record = CaseRecord {
            id: generate_id(PREFIX_CASE),
            details,
            saved_at: Utc::now(),
            reminder_date: None,
        };
        cases.push(record.clone());
        self.persist(&cases).await;

        tracing::debug!(case_id = %record.id, case_number = %record.details.case_number, "Case saved");
        record
    }

    /// Merge `patch` into the case with `id`.
    ///
    /// Returns `false` if no such case exists.
    pub async fn update_case(&self, id: &str, patch: CasePatch) -> bool {
        let _guard = self.write_lock.lock().await;
        let mut cases = self.list_cases().await;

        let Some(record) = cases.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        patch.apply_to(record);
        self.persist(&cases).await;
        true
    }

    /// Remove the case with `id`.
    ///
    /// Returns `false` if no such case exists.
    pub async fn delete_case(&self, id: &str) -> bool {
        let _guard = self.write_lock.lock().await;
        let mut cases = self.list_cases().await;

        let Some(index) = cases.iter().position(|c| c.id == id) else {
            return false;
        };
        cases.remove(index);
        self.persist(&cases).await;

        tracing::debug!(case_id = id, "Case deleted");
        true
    }

    async fn persist(&self, cases: &[CaseRecord]) {
        persist_list(self.store.as_ref(), keys::SAVED_CASES, cases).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::store::MemoryStore;

    fn details(case_number: &str) -> CaseDetails {
        CaseDetails {
            case_number: case_number.into(),
            court_name: "District Court Saket".into(),
            status: "Pending".into(),
            filing_date: "2023-02-01".into(),
            petitioner: "A. Kumar".into(),
            respondent: "State".into(),
            next_hearing_date: Some("2025-06-20".into()),
            ..Default::default()
        }
    }

    fn repo() -> (Arc<MemoryStore>, CaseRepo) {
        let store = Arc::new(MemoryStore::new());
        let repo = CaseRepo::new(store.clone());
        (store, repo)
    }

    // -----------------------------------------------------------------------
    // list / save
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn empty_storage_lists_nothing() {
        let (_, repo) = repo();
        assert!(repo.list_cases().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_storage_lists_nothing() {
        let (store, repo) = repo();
        store.set(keys::SAVED_CASES, "[{\"broken\":").await.unwrap();

        assert!(repo.list_cases().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_list_contains_exactly_the_input() {
        let (_, repo) = repo();
        let input = details("C-1");

        let saved = repo.save_case(input.clone()).await;
        let cases = repo.list_cases().await;

        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0], saved);
        assert_eq!(cases[0].details, input);
        assert!(cases[0].id.starts_with("case-"));
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let (_, repo) = repo();
        for n in ["C-3", "C-1", "C-2"] {
            repo.save_case(details(n)).await;
        }

        let numbers: Vec<String> = repo
            .list_cases()
            .await
            .into_iter()
            .map(|c| c.details.case_number)
            .collect();
        assert_eq!(numbers, ["C-3", "C-1", "C-2"]);
    }

    #[tokio::test]
    async fn rapid_saves_get_distinct_ids() {
        let (_, repo) = repo();
        let mut ids = HashSet::new();
        for i in 0..50 {
            ids.insert(repo.save_case(details(&format!("C-{i}"))).await.id);
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(repo.list_cases().await.len(), 50);
    }

    #[tokio::test]
    async fn failed_write_is_swallowed_and_not_visible() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let repo = CaseRepo::new(store);

        let saved = repo.save_case(details("C-1")).await;

        assert!(saved.id.starts_with("case-"), "caller still gets a record");
        assert!(repo.list_cases().await.is_empty(), "re-read shows the write failed");
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn update_merges_fields() {
        let (_, repo) = repo();
        let saved = repo.save_case(details("C-1")).await;

        let updated = repo
            .update_case(
                &saved.id,
                CasePatch {
                    status: Some("Disposed".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(updated);
        let case = repo.get_case(&saved.id).await.unwrap();
        assert_eq!(case.details.status, "Disposed");
        assert_eq!(case.details.case_number, "C-1");
        assert_eq!(case.saved_at, saved.saved_at);
    }

    #[tokio::test]
    async fn update_missing_id_returns_false_and_changes_nothing() {
        let (_, repo) = repo();
        repo.save_case(details("C-1")).await;
        let before = repo.list_cases().await;

        let updated = repo
            .update_case(
                "nonexistent",
                CasePatch {
                    status: Some("Disposed".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(!updated);
        assert_eq!(repo.list_cases().await, before);
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_twice_returns_true_then_false() {
        let (_, repo) = repo();
        let keep = repo.save_case(details("C-1")).await;
        let gone = repo.save_case(details("C-2")).await;

        assert!(repo.delete_case(&gone.id).await);
        assert!(!repo.delete_case(&gone.id).await);

        let cases = repo.list_cases().await;
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, keep.id);
    }

    #[tokio::test]
    async fn concurrent_saves_are_not_lost() {
        let (_, repo) = repo();
        let repo = Arc::new(repo);

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.save_case(details(&format!("C-{i}"))).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(repo.list_cases().await.len(), 10);
    }
}
