//! HTTP entry point: webhook route, liveness routes, server lifecycle.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use realstate_core::Settings;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::gateway::TelegramGateway;
use crate::handlers::{WebhookAck, WebhookHandler};

/// Service name reported by `GET /`.
pub const SERVICE_NAME: &str = "real-state-bot";

/// State shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<WebhookHandler>,
}

impl AppState {
    pub fn new(handler: WebhookHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Creates the router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Service banner.
async fn root() -> Json<Value> {
    Json(json!({"status": "ok", "service": SERVICE_NAME}))
}

/// GET /health - Liveness check.
async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

/// POST /webhook - One Telegram update; always answers 200.
async fn webhook(State(state): State<AppState>, body: Bytes) -> Json<WebhookAck> {
    Json(state.handler.handle_payload(&body).await)
}

/// Register `{webhook_url}/webhook` with Telegram, if a base URL is configured.
pub async fn register_webhook(settings: &Settings, gateway: &dyn TelegramGateway) -> bool {
    let Some(endpoint) = settings.webhook_endpoint() else {
        warn!("WEBHOOK_URL not set, the bot will not receive messages");
        return false;
    };
    let registered = gateway.set_webhook(&endpoint).await;
    if registered {
        info!(url = %endpoint, "Webhook configured");
    } else {
        error!(url = %endpoint, "Error configuring webhook");
    }
    registered
}

/// Register the webhook, then serve until Ctrl-C.
pub async fn serve(
    settings: &Settings,
    state: AppState,
    gateway: &dyn TelegramGateway,
) -> Result<()> {
    register_webhook(settings, gateway).await;

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Webhook server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutting down server...");
}
