//! Identifier generation for saved cases and notifications.
//!
//! Identifiers have the shape `{prefix}-{epoch_millis}-{suffix}` where the
//! suffix is [`SUFFIX_LENGTH`] random lowercase alphanumerics. The time
//! component keeps identifiers roughly sortable; the suffix keeps calls made
//! within the same millisecond distinct.

use rand::Rng;

use crate::types::now_millis;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random characters appended to every identifier.
pub const SUFFIX_LENGTH: usize = 9;

/// Prefix for saved case identifiers.
pub const PREFIX_CASE: &str = "case";

/// Prefix for ordinary notification identifiers.
pub const PREFIX_NOTIFICATION: &str = "notification";

/// Prefix for reminder identifiers.
pub const PREFIX_REMINDER: &str = "reminder";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a fresh identifier with the given prefix.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SUFFIX_LENGTH)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{prefix}-{}-{suffix}", now_millis())
}
