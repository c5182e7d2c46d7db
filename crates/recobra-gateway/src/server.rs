// SPDX-FileCopyrightText: 2026 Recobra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route table, shared state, and server lifecycle.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use recobra_cadence::CadenceScheduler;
use recobra_config::RecobraConfig;
use recobra_core::error::RecobraError;
use recobra_core::traits::{MessagingChannel, OwnerNotifier, PaymentProvider};
use recobra_inbound::InboundProcessor;
use recobra_reconcile::Reconciler;
use recobra_storage::database::Database;

use crate::auth::{cron_auth_middleware, CronAuth};
use crate::handlers;
use crate::webhooks;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub channel: Arc<dyn MessagingChannel>,
    pub payments: Arc<dyn PaymentProvider>,
    pub scheduler: Arc<CadenceScheduler>,
    pub inbound: Arc<InboundProcessor>,
    pub reconciler: Arc<Reconciler>,
    /// Token expected in the WhatsApp verification handshake.
    pub verify_token: Option<String>,
    /// Optional shared secret checked against `X-Webhook-Token` on the
    /// payments webhook.
    pub payment_webhook_token: Option<String>,
    pub charge_expiry_secs: u64,
}

impl AppState {
    /// Wire the processing pipelines around the given adapters.
    pub fn new(
        db: Database,
        channel: Arc<dyn MessagingChannel>,
        payments: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn OwnerNotifier>,
        config: &RecobraConfig,
    ) -> Self {
        let scheduler = Arc::new(CadenceScheduler::new(db.clone(), channel.clone()));
        let inbound = Arc::new(InboundProcessor::new(db.clone(), notifier));
        let reconciler = Arc::new(Reconciler::new(db.clone(), channel.clone()));
        Self {
            db,
            channel,
            payments,
            scheduler,
            inbound,
            reconciler,
            verify_token: config.whatsapp.verify_token.clone(),
            payment_webhook_token: config.payments.webhook_token.clone(),
            charge_expiry_secs: u64::from(config.payments.charge_expiry_secs),
        }
    }
}

/// Build the full route table.
pub fn build_router(state: AppState, cron_secret: Option<String>) -> Router {
    let cron_auth = CronAuth {
        shared_secret: cron_secret,
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let webhook_routes = Router::new()
        .route(
            "/webhooks/whatsapp",
            get(webhooks::verify_whatsapp).post(webhooks::post_whatsapp),
        )
        .route("/webhooks/payments", post(webhooks::post_payments))
        .with_state(state.clone());

    let cron_routes = Router::new()
        .route("/cron/cadence", get(handlers::run_cadence))
        .route_layer(axum_middleware::from_fn_with_state(
            cron_auth,
            cron_auth_middleware,
        ))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/debts",
            get(handlers::list_debts).post(handlers::create_debt),
        )
        .route("/v1/debts/import", post(handlers::import_debts))
        .route(
            "/v1/debts/{id}",
            get(handlers::get_debt)
                .patch(handlers::update_debt)
                .delete(handlers::delete_debt),
        )
        .route(
            "/v1/debts/{id}/messages",
            get(handlers::list_debt_messages).post(handlers::send_debt_message),
        )
        .route("/v1/renegotiations", get(handlers::list_renegotiations))
        .route("/v1/charges", post(handlers::create_charge))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(cron_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped.
pub async fn start_server(
    bind_address: &str,
    port: u16,
    state: AppState,
    cron_secret: Option<String>,
) -> Result<(), RecobraError> {
    let app = build_router(state, cron_secret);

    let addr = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RecobraError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RecobraError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

/// Resolves on ctrl-c or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
