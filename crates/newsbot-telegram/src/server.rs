//! Webhook HTTP server (axum).

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use teloxide::{prelude::*, types::Update};
use tracing::{info, warn};

use newsbot_core::errors::Error;

use crate::{handlers, router::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/setwebhook", get(set_webhook))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// Register the webhook once, then serve until ctrl-c.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.cfg.listen_addr.clone();
    if let Some(url) = state.cfg.webhook_url.as_deref() {
        let ok = register_webhook(&state.bot, url).await;
        info!(url, ok, "webhook registration");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "newsbot started (webhook)");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Drop any existing registration and point Telegram at `url`.
pub async fn register_webhook(bot: &Bot, url: &str) -> bool {
    let url = match reqwest::Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            warn!(url, error = %e, "invalid webhook url");
            return false;
        }
    };
    if let Err(e) = bot.delete_webhook().await {
        warn!(error = %e, "delete webhook failed");
    }
    match bot.set_webhook(url).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "set webhook failed");
            false
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn index() -> &'static str {
    "Bot is running!"
}

async fn set_webhook(State(state): State<Arc<AppState>>) -> String {
    let ok = match state.cfg.webhook_url.as_deref() {
        Some(url) => register_webhook(&state.bot, url).await,
        None => false,
    };
    format!("Webhook set: {ok}")
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn parse_update(body: &[u8]) -> Result<Update, Error> {
    serde_json::from_slice(body).map_err(|e| Error::MalformedRequest(e.to_string()))
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        return (StatusCode::FORBIDDEN, "Invalid content type").into_response();
    }
    let update = match parse_update(&body) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "rejected webhook payload");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    handlers::handle_update(state, update).await;
    StatusCode::OK.into_response()
}
