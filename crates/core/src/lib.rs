//! eCourts tracker domain crate.
//!
//! Holds the saved-case and notification types, identifier generation,
//! hearing-date handling and the case lookup contract. Has no internal
//! dependencies so the storage, notification and application crates can all
//! build on it.

pub mod case;
pub mod error;
pub mod hearing;
pub mod ids;
pub mod lookup;
pub mod notification;
pub mod types;
