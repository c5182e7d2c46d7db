// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recobra serve` and `recobra cadence` command implementations.
//!
//! Wires the configured adapters (WhatsApp Cloud API channel, Pix payment
//! provider, SMTP notifier) around the storage layer and either starts the
//! HTTP gateway or runs a single cadence pass.

use std::sync::Arc;

use tracing::{info, warn};

use recobra_cadence::CadenceScheduler;
use recobra_config::RecobraConfig;
use recobra_core::error::RecobraError;
use recobra_core::traits::{MessagingChannel, OwnerNotifier, PaymentProvider};
use recobra_gateway::{start_server, AppState};
use recobra_notify::{DisabledNotifier, SmtpNotifier};
use recobra_storage::database::Database;
use recobra_whatsapp::CloudApiChannel;

/// Runs the `recobra serve` command.
///
/// Blocks until the gateway shuts down (ctrl-c or SIGTERM), then closes
/// the database.
pub async fn run_serve(config: RecobraConfig) -> Result<(), RecobraError> {
    info!("starting recobra serve");

    let db = open_database(&config).await?;
    let channel = build_channel(&config)?;
    let payments: Arc<dyn PaymentProvider> = recobra_payments::create_provider(&config.payments)?;

    let notifier: Arc<dyn OwnerNotifier> = if config.smtp.host.is_some() {
        Arc::new(SmtpNotifier::from_config(&config.smtp)?)
    } else {
        warn!("smtp.host not configured, operator email notifications are disabled");
        Arc::new(DisabledNotifier)
    };

    let state = AppState::new(db.clone(), channel, payments, notifier, &config);

    let result = start_server(
        &config.gateway.bind_address,
        config.gateway.port,
        state,
        config.cron.shared_secret.clone(),
    )
    .await;

    db.close().await?;
    info!("recobra serve shutdown complete");
    result
}

/// Runs the `recobra cadence` command: one pass for today, counters to
/// stdout. Useful for host crontabs that call the binary instead of the
/// HTTP trigger.
pub async fn run_cadence_once(config: RecobraConfig) -> Result<(), RecobraError> {
    let db = open_database(&config).await?;
    let channel = build_channel(&config)?;

    let scheduler = CadenceScheduler::new(db.clone(), channel);
    let today = chrono::Local::now().date_naive();
    let results = scheduler.run(today).await?;

    println!(
        "cadence {today}: {} processed, {} sent, {} errors",
        results.processed, results.sent, results.errors
    );

    db.close().await
}

async fn open_database(config: &RecobraConfig) -> Result<Database, RecobraError> {
    Database::open_with(&config.storage.database_path, config.storage.wal_mode).await
}

fn build_channel(config: &RecobraConfig) -> Result<Arc<dyn MessagingChannel>, RecobraError> {
    Ok(Arc::new(CloudApiChannel::new(&config.whatsapp)?))
}
