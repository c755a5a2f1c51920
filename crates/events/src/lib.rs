//! eCourts tracker notification infrastructure.
//!
//! - [`NotificationCenter`]: persisted notification feed with subscriber
//!   fan-out.
//! - [`SubscriberRegistry`]: token-keyed callbacks in registration order.
//! - [`PlatformNotifier`]: best-effort platform alert surface.
//! - [`ReminderSweep`]: periodic re-surfacing of due hearing reminders.

pub mod center;
pub mod platform;
pub mod registry;
pub mod sweep;

pub use center::NotificationCenter;
pub use platform::{DisabledNotifier, LogNotifier, MemoryNotifier, Permission, PlatformNotifier};
pub use registry::{SubscriberRegistry, SubscriptionId};
pub use sweep::{ReminderSweep, SweepConfig};
