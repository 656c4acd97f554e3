//! Farcaster frame webhook. Events are logged, nothing is persisted.

use axum::body::Bytes;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::parse_body;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(default, alias = "type")]
    event: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WebhookHealth {
    status: &'static str,
    message: &'static str,
}

pub async fn receive(body: Bytes) -> Result<Json<Ack>, ApiError> {
    let event: WebhookEvent = parse_body(&body)?;
    match event.event.as_deref() {
        Some("frame.added") => info!(data = %event.data, "frame added"),
        Some("frame.removed") => info!(data = %event.data, "frame removed"),
        Some("user.action") => info!(data = %event.data, "user action"),
        other => debug!(event = ?other, "unhandled webhook event"),
    }
    Ok(Json(Ack {
        success: true,
        message: "Webhook received",
    }))
}

pub async fn health() -> Json<WebhookHealth> {
    Json(WebhookHealth {
        status: "ok",
        message: "Webhook endpoint is active",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_known_and_unknown_events() {
        for body in [
            r#"{"event":"frame.added","data":{"fid":1}}"#,
            r#"{"type":"user.action"}"#,
            r#"{"event":"something.else"}"#,
        ] {
            assert!(receive(Bytes::from(body)).await.is_ok(), "{body}");
        }
        assert!(receive(Bytes::from_static(b"nope")).await.is_err());
    }
}
