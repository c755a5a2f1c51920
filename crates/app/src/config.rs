use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ecourts_core::hearing::DEFAULT_REMINDER_LEAD_DAYS;
use ecourts_events::SweepConfig;

/// Default storage location for the key-value store.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://ecourts.db?mode=rwc";

/// Application configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local single-user install.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite URL for the key-value store.
    pub database_url: String,
    /// Reminder sweep interval and horizon.
    pub sweep: SweepConfig,
    /// Days before a next hearing that its automatic reminder targets.
    pub reminder_lead_days: u64,
    /// Optional JSON fixture file for the case lookup.
    pub lookup_fixtures: Option<PathBuf>,
    /// Whether alerts are surfaced through the platform notifier.
    pub platform_notifications: bool,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                        |
    /// |--------------------------------|--------------------------------|
    /// | `DATABASE_URL`                 | `sqlite://ecourts.db?mode=rwc` |
    /// | `REMINDER_SWEEP_INTERVAL_SECS` | `60`                           |
    /// | `REMINDER_HORIZON_HOURS`       | `24`                           |
    /// | `REMINDER_LEAD_DAYS`           | `1`                            |
    /// | `LOOKUP_FIXTURES`              | unset                          |
    /// | `PLATFORM_NOTIFICATIONS`       | `true`                         |
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = SweepConfig::default();

        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let interval_secs = parse_or(
            &var,
            "REMINDER_SWEEP_INTERVAL_SECS",
            defaults.interval.as_secs(),
        );
        let horizon_hours = parse_or(
            &var,
            "REMINDER_HORIZON_HOURS",
            defaults.horizon.as_secs() / 3600,
        );
        let horizon = match horizon_hours.checked_mul(3600) {
            Some(secs) => Duration::from_secs(secs),
            None => {
                tracing::warn!(
                    name = "REMINDER_HORIZON_HOURS",
                    value = horizon_hours,
                    "Value out of range, using default"
                );
                defaults.horizon
            }
        };
        let reminder_lead_days = parse_or(&var, "REMINDER_LEAD_DAYS", DEFAULT_REMINDER_LEAD_DAYS);

        let lookup_fixtures = var("LOOKUP_FIXTURES")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let platform_notifications = parse_or(&var, "PLATFORM_NOTIFICATIONS", true);

        Self {
            database_url,
            sweep: SweepConfig {
                interval: Duration::from_secs(interval_secs.max(1)),
                horizon,
            },
            reminder_lead_days,
            lookup_fixtures,
            platform_notifications,
        }
    }
}

/// Parse `name`, falling back to `default` when unset or malformed.
fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match var(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %raw, %default, "Invalid value, using default");
            default
        }),
    }
}
