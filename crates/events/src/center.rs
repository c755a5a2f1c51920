//! Notification feed with persistence and subscriber fan-out.
//!
//! [`NotificationCenter`] owns the in-memory feed, mirrors it to the
//! `notifications` storage key after every change, and pushes the full feed
//! to every subscriber. It is designed to be shared via
//! `Arc<NotificationCenter>`.
//!
//! All mutations, their persistence, and the fan-out that follows run under
//! one lock, so subscribers observe feed states in mutation order.
//! Subscriber callbacks run while that lock is held and must not block.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use ecourts_core::notification::{NoticeKind, Notification};
use ecourts_core::types::EpochMillis;
use ecourts_db::store::{keys, load_list, persist_list, KeyValueStore};
use tokio::sync::Mutex;

use crate::platform::{self, PlatformNotifier};
use crate::registry::{SubscriberRegistry, SubscriptionId};

struct CenterState {
    feed: Vec<Notification>,
    subscribers: SubscriberRegistry,
}

/// In-memory notification feed backed by durable storage.
pub struct NotificationCenter {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn PlatformNotifier>,
    state: Mutex<CenterState>,
}

impl NotificationCenter {
    /// Create a center, restoring the feed from storage.
    ///
    /// Missing or corrupt stored data starts an empty feed.
    pub async fn load(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn PlatformNotifier>) -> Self {
        let feed: Vec<Notification> = load_list(store.as_ref(), keys::NOTIFICATIONS).await;
        tracing::debug!(count = feed.len(), "Notification feed restored");

        Self {
            store,
            notifier,
            state: Mutex::new(CenterState {
                feed,
                subscribers: SubscriberRegistry::new(),
            }),
        }
    }

    /// The platform surface this center displays alerts on.
    pub fn notifier(&self) -> &Arc<dyn PlatformNotifier> {
        &self.notifier
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// A copy of the feed in insertion order.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.feed.clone()
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self) -> usize {
        self.state.lock().await.feed.iter().filter(|n| !n.read).count()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add an `info` notification. See [`add_notification_of_kind`].
    ///
    /// [`add_notification_of_kind`]: Self::add_notification_of_kind
    pub async fn add_notification(&self, title: &str, message: &str) -> String {
        self.add_notification_of_kind(title, message, NoticeKind::Info)
            .await
    }

    /// Add a notice stamped with the current time, then try to show it on
    /// the platform surface. Returns the new id.
    ///
    /// Reminders go through [`add_reminder`](Self::add_reminder).
    pub async fn add_notification_of_kind(
        &self,
        title: &str,
        message: &str,
        kind: NoticeKind,
    ) -> String {
        let notification = Notification::new(title, message, kind);
        let id = notification.id.clone();

        self.push(notification).await;
        platform::surface(self.notifier.as_ref(), title, message);

        id
    }

    /// Add a hearing reminder targeting `remind_at`. Returns the new id.
    ///
    /// The reminder's timestamp is `remind_at`, not the call time. Nothing is
    /// shown immediately; the reminder sweep surfaces it once it is close.
    pub async fn add_reminder<Tz>(
        &self,
        case_id: &str,
        case_number: &str,
        remind_at: &DateTime<Tz>,
        court_name: &str,
    ) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let reminder = Notification::reminder(case_id, case_number, remind_at, court_name);
        let id = reminder.id.clone();

        tracing::debug!(
            reminder_id = %id,
            case_id,
            timestamp = reminder.timestamp,
            "Reminder added"
        );
        self.push(reminder).await;

        id
    }

    /// Mark one notification as read. Returns `false` if `id` is unknown.
    pub async fn mark_as_read(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;

        let Some(notification) = state.feed.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        notification.mark_read();

        self.commit(&state).await;
        true
    }

    /// Mark every notification as read. Returns how many were unread.
    pub async fn mark_all_as_read(&self) -> usize {
        let mut state = self.state.lock().await;

        let changed = state
            .feed
            .iter_mut()
            .map(Notification::mark_read)
            .filter(|changed| *changed)
            .count();

        self.commit(&state).await;
        changed
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register `subscriber` and immediately call it once with the current
    /// feed.
    ///
    /// The callback runs while the center's lock is held, both for this
    /// replay and for every later change. Calling back into the center from
    /// the callback deadlocks. Keep callbacks short and hand the feed to a
    /// channel or task for anything slow.
    pub async fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&[Notification]) + Send + Sync + 'static,
    {
        let mut state = self.state.lock().await;

        subscriber(state.feed.as_slice());
        state.subscribers.insert(Arc::new(subscriber))
    }

    /// Stop delivering to `id`. Returns `false` if it was not subscribed.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.lock().await.subscribers.remove(id)
    }

    pub async fn subscriber_count(&self) -> usize {
        self.state.lock().await.subscribers.len()
    }

    // -----------------------------------------------------------------------
    // Reminder sweep
    // -----------------------------------------------------------------------

    /// Surface every unread reminder due in `(now, now + horizon]`.
    ///
    /// Reminders are not marked read and nothing is remembered between
    /// calls, so a reminder is surfaced again on every sweep while it stays
    /// unread inside the window. Returns how many alerts were displayed.
    pub async fn sweep_due_reminders(&self, now: EpochMillis, horizon: Duration) -> usize {
        let horizon_ms = i64::try_from(horizon.as_millis()).unwrap_or(i64::MAX);

        let due: Vec<(String, String)> = {
            let state = self.state.lock().await;
            state
                .feed
                .iter()
                .filter(|n| n.is_due_within(now, horizon_ms))
                .map(|n| (n.title.clone(), n.message.clone()))
                .collect()
        };

        due.iter()
            .filter(|(title, message)| platform::surface(self.notifier.as_ref(), title, message))
            .count()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn push(&self, notification: Notification) {
        let mut state = self.state.lock().await;
        state.feed.push(notification);
        self.commit(&state).await;
    }

    /// Persist the feed and fan it out to subscribers.
    async fn commit(&self, state: &CenterState) {
        persist_list(self.store.as_ref(), keys::NOTIFICATIONS, &state.feed).await;
        state.subscribers.notify_all(&state.feed);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use chrono::{Local, NaiveDate, Utc};
    use ecourts_core::notification::NotificationKind;
    use ecourts_core::types::now_millis;
    use ecourts_db::store::MemoryStore;

    use super::*;
    use crate::platform::{MemoryNotifier, Permission};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    struct Harness {
        store: Arc<MemoryStore>,
        notifier: Arc<MemoryNotifier>,
        center: NotificationCenter,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(MemoryNotifier::new(Permission::Granted));
        let center = NotificationCenter::load(store.clone(), notifier.clone()).await;
        Harness { store, notifier, center }
    }

    /// Collects the length of every feed snapshot a subscriber receives.
    fn recorder() -> (Arc<StdMutex<Vec<usize>>>, impl Fn(&[Notification]) + Send + Sync) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |feed: &[Notification]| sink.lock().unwrap().push(feed.len()))
    }

    // -----------------------------------------------------------------------
    // Feed and unread count
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unread_count_follows_read_transitions() {
        let h = harness().await;

        let first = h.center.add_notification("a", "b").await;
        h.center.add_notification("c", "d").await;
        assert_eq!(h.center.unread_count().await, 2);

        assert!(h.center.mark_as_read(&first).await);
        assert_eq!(h.center.unread_count().await, 1);

        assert_eq!(h.center.mark_all_as_read().await, 1);
        assert_eq!(h.center.unread_count().await, 0);
    }

    #[tokio::test]
    async fn feed_keeps_insertion_order_and_is_a_copy() {
        let h = harness().await;
        h.center.add_notification("first", "1").await;
        h.center.add_notification("second", "2").await;

        let mut copy = h.center.notifications().await;
        assert_eq!(copy[0].title, "first");
        assert_eq!(copy[1].title, "second");

        copy[0].read = true;
        copy.clear();
        assert_eq!(h.center.unread_count().await, 2);
    }

    #[tokio::test]
    async fn mark_unknown_id_returns_false() {
        let h = harness().await;
        h.center.add_notification("a", "b").await;

        assert!(!h.center.mark_as_read("nope").await);
        assert_eq!(h.center.unread_count().await, 1);
    }

    #[tokio::test]
    async fn read_never_reverts() {
        let h = harness().await;
        let id = h.center.add_notification("a", "b").await;

        h.center.mark_as_read(&id).await;
        h.center.mark_as_read(&id).await;
        h.center.mark_all_as_read().await;

        assert!(h.center.notifications().await[0].read);
    }

    #[tokio::test]
    async fn add_notification_surfaces_on_platform() {
        let h = harness().await;
        h.center.add_notification("Case Saved", "Case C-1 has been saved").await;

        let shown = h.notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Case Saved");
    }

    #[tokio::test]
    async fn update_notice_is_stamped_now_and_shown() {
        let h = harness().await;
        let before = now_millis();

        let id = h
            .center
            .add_notification_of_kind("Status", "Case C-1 is now Disposed", NoticeKind::Update)
            .await;

        let feed = h.center.notifications().await;
        let notice = feed.iter().find(|n| n.id == id).unwrap();
        assert_eq!(notice.kind, NotificationKind::Update);
        assert!(notice.timestamp >= before);
        assert!(notice.case_id.is_none());
        assert_eq!(h.notifier.shown().len(), 1);
        assert_eq!(h.center.sweep_due_reminders(now_millis(), DAY).await, 0);
    }

    #[tokio::test]
    async fn denied_platform_does_not_block_adding() {
        let store = Arc::new(MemoryStore::new());
        let center = NotificationCenter::load(
            store,
            Arc::new(MemoryNotifier::new(Permission::Denied)),
        )
        .await;

        center.add_notification("a", "b").await;
        assert_eq!(center.notifications().await.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Reminders
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn reminder_timestamp_is_target_not_call_time() {
        let h = harness().await;
        let at = NaiveDate::from_ymd_opt(2035, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap();

        let id = h.center.add_reminder("case-1", "C-1", &at, "District Court").await;

        let feed = h.center.notifications().await;
        let reminder = feed.iter().find(|n| n.id == id).unwrap();
        assert_eq!(reminder.kind, NotificationKind::Reminder);
        assert_eq!(reminder.timestamp, at.timestamp_millis());
        assert!(reminder.message.contains("C-1"));
        assert!(reminder.message.contains("District Court"));
    }

    #[tokio::test]
    async fn adding_reminder_does_not_surface_immediately() {
        let h = harness().await;
        let soon = Utc::now() + chrono::Duration::hours(1);

        h.center.add_reminder("case-1", "C-1", &soon, "District Court").await;

        assert!(h.notifier.shown().is_empty());
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn feed_is_restored_from_storage() {
        let h = harness().await;
        let id = h.center.add_notification("a", "b").await;
        h.center.mark_as_read(&id).await;

        let reloaded =
            NotificationCenter::load(h.store.clone(), Arc::new(MemoryNotifier::new(Permission::Denied)))
                .await;
        let feed = reloaded.notifications().await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, id);
        assert!(feed[0].read);
    }

    #[tokio::test]
    async fn corrupt_storage_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::NOTIFICATIONS, "not json").await.unwrap();

        let center =
            NotificationCenter::load(store, Arc::new(MemoryNotifier::new(Permission::Granted))).await;
        assert!(center.notifications().await.is_empty());
    }

    #[tokio::test]
    async fn failed_persist_keeps_in_memory_feed() {
        let store = Arc::new(MemoryStore::with_quota(32));
        let center =
            NotificationCenter::load(store.clone(), Arc::new(MemoryNotifier::new(Permission::Granted)))
                .await;

        center.add_notification("a title long enough", "and a message that overflows").await;

        assert_eq!(center.notifications().await.len(), 1);
        assert_eq!(store.get(keys::NOTIFICATIONS).await.unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn late_subscriber_is_replayed_current_feed() {
        let h = harness().await;
        h.center.add_notification("a", "b").await;
        h.center.add_notification("c", "d").await;

        let (seen, subscriber) = recorder();
        h.center.subscribe(subscriber).await;

        assert_eq!(*seen.lock().unwrap(), [2]);
    }

    #[tokio::test]
    async fn every_mutation_fans_out() {
        let h = harness().await;
        let (seen, subscriber) = recorder();
        h.center.subscribe(subscriber).await;

        let id = h.center.add_notification("a", "b").await;
        h.center.add_reminder("case-1", "C-1", &Utc::now(), "X").await;
        h.center.mark_as_read(&id).await;
        h.center.mark_all_as_read().await;

        assert_eq!(*seen.lock().unwrap(), [0, 1, 2, 2, 2]);
    }

    #[tokio::test]
    async fn subscribers_run_in_registration_order() {
        let h = harness().await;
        let order = Arc::new(StdMutex::new(Vec::new()));

        for name in ["first", "second"] {
            let order = order.clone();
            h.center
                .subscribe(move |_: &[Notification]| order.lock().unwrap().push(name))
                .await;
        }
        order.lock().unwrap().clear();

        h.center.add_notification("a", "b").await;
        assert_eq!(*order.lock().unwrap(), ["first", "second"]);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery_and_is_idempotent() {
        let h = harness().await;
        let (seen, subscriber) = recorder();
        let id = h.center.subscribe(subscriber).await;

        assert!(h.center.unsubscribe(id).await);
        assert!(!h.center.unsubscribe(id).await);
        h.center.add_notification("a", "b").await;

        assert_eq!(*seen.lock().unwrap(), [0]);
        assert_eq!(h.center.subscriber_count().await, 0);
    }

    // -----------------------------------------------------------------------
    // Sweep
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn sweep_surfaces_unread_reminders_inside_horizon() {
        let h = harness().await;
        let now = Utc::now();

        h.center
            .add_reminder("c1", "DUE", &(now + chrono::Duration::hours(3)), "X")
            .await;
        h.center
            .add_reminder("c2", "LATER", &(now + chrono::Duration::hours(30)), "X")
            .await;
        h.center
            .add_reminder("c3", "PAST", &(now - chrono::Duration::hours(1)), "X")
            .await;

        let surfaced = h.center.sweep_due_reminders(now.timestamp_millis(), DAY).await;

        assert_eq!(surfaced, 1);
        let shown = h.notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Reminder: Case DUE");
    }

    #[tokio::test]
    async fn sweep_window_excludes_now_and_includes_horizon_end() {
        let h = harness().await;
        let now = Utc::now();

        h.center.add_reminder("c1", "NOW", &now, "X").await;
        h.center
            .add_reminder("c2", "EXACT24", &(now + chrono::Duration::hours(24)), "X")
            .await;
        h.center
            .add_reminder(
                "c3",
                "JUST_AFTER",
                &(now + chrono::Duration::hours(24) + chrono::Duration::milliseconds(1)),
                "X",
            )
            .await;

        let surfaced = h.center.sweep_due_reminders(now.timestamp_millis(), DAY).await;

        assert_eq!(surfaced, 1);
        let shown = h.notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Reminder: Case EXACT24");
    }

    #[tokio::test]
    async fn sweep_skips_read_reminders_and_plain_notifications() {
        let h = harness().await;
        let now = Utc::now();
        let id = h
            .center
            .add_reminder("c1", "C-1", &(now + chrono::Duration::hours(3)), "X")
            .await;
        h.center.mark_as_read(&id).await;
        h.notifier.drain();

        assert_eq!(h.center.sweep_due_reminders(now_millis(), DAY).await, 0);
        assert!(h.notifier.shown().is_empty());
    }

    /// Repeated sweeps surface the same unread reminder every time. This
    /// mirrors the dashboard's long-standing behaviour; whether the repeat
    /// alerts are wanted is still an open product question.
    #[tokio::test]
    async fn sweep_repeats_unread_reminder_each_tick() {
        let h = harness().await;
        let now = Utc::now();
        h.center
            .add_reminder("c1", "C-1", &(now + chrono::Duration::hours(3)), "X")
            .await;

        let t = now.timestamp_millis();
        assert_eq!(h.center.sweep_due_reminders(t, DAY).await, 1);
        assert_eq!(h.center.sweep_due_reminders(t + 60_000, DAY).await, 1);
        assert_eq!(h.center.sweep_due_reminders(t + 120_000, DAY).await, 1);

        assert_eq!(h.notifier.shown().len(), 3);
        assert_eq!(h.center.unread_count().await, 1, "sweeping does not mark read");
    }

    #[tokio::test]
    async fn sweep_with_denied_platform_surfaces_nothing() {
        let store = Arc::new(MemoryStore::new());
        let center =
            NotificationCenter::load(store, Arc::new(MemoryNotifier::new(Permission::Denied))).await;
        let now = Utc::now();
        center
            .add_reminder("c1", "C-1", &(now + chrono::Duration::hours(3)), "X")
            .await;

        assert_eq!(center.sweep_due_reminders(now.timestamp_millis(), DAY).await, 0);
    }
}
