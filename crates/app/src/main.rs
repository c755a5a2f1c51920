//! `ecourts-app` -- local case store and reminder daemon.
//!
//! Opens the key-value store, restores saved cases and notifications, and
//! runs the reminder sweep until interrupted. Configuration is read from the
//! environment (see [`AppConfig::from_env`]).

use std::sync::Arc;

use anyhow::Context;
use ecourts_app::{AppConfig, Dashboard};
use ecourts_core::lookup::StaticCaseLookup;
use ecourts_db::SqliteStore;
use ecourts_events::{DisabledNotifier, LogNotifier, PlatformNotifier, ReminderSweep};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ecourts_app=info,ecourts_events=info,ecourts_db=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let pool = ecourts_db::create_pool(&config.database_url)
        .await
        .context("Failed to open storage")?;
    ecourts_db::health_check(&pool)
        .await
        .context("Storage health check failed")?;
    ecourts_db::run_migrations(&pool)
        .await
        .context("Failed to run storage migrations")?;
    tracing::info!(database_url = %config.database_url, "Storage ready");

    let lookup = match &config.lookup_fixtures {
        Some(path) => StaticCaseLookup::from_json_file(path)?,
        None => StaticCaseLookup::new(),
    };
    tracing::info!(fixtures = lookup.len(), "Case lookup ready");

    let notifier: Arc<dyn PlatformNotifier> = if config.platform_notifications {
        Arc::new(LogNotifier)
    } else {
        tracing::info!("Platform notifications disabled");
        Arc::new(DisabledNotifier)
    };

    let dashboard = Dashboard::new(
        Arc::new(SqliteStore::new(pool)),
        notifier,
        Arc::new(lookup),
        config.reminder_lead_days,
    )
    .await;

    tracing::info!(
        saved_cases = dashboard.cases().await.len(),
        unread = dashboard.unread_count().await,
        "Dashboard state restored"
    );

    let mut sweep = ReminderSweep::new(dashboard.notification_center().clone(), config.sweep);
    sweep.start();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    sweep.stop().await;
    Ok(())
}
