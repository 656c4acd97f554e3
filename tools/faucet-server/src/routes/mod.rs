//! HTTP surface. Every JSON body carries `success`; failures render through [`ApiError`].

use alloy_primitives::Address;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use faucet_claim_types::{parse_wallet, Fid};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

mod admin;
mod chain;
mod claim;
mod donations;
mod webhook;

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route(
            "/api/eligibility",
            get(claim::eligibility).post(claim::record_claim),
        )
        .route("/api/claim", post(claim::claim))
        .route("/api/claim-amount", get(admin::claim_amount))
        .route(
            "/api/admin/claim-amount",
            get(admin::recommend).post(admin::review),
        )
        .route("/api/claim-status", get(chain::claim_status))
        .route(
            "/api/contribute",
            get(chain::contribution).post(chain::log_contribution),
        )
        .route("/api/nft-status", get(chain::nft_status))
        .route("/api/mint-nft", post(chain::mint_nft))
        .route("/api/donations", get(donations::list).post(donations::log))
        .route("/api/webhook", get(webhook::health).post(webhook::receive))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "ok"
}

/// Bodies are decoded by hand so a malformed payload renders as an `InvalidInput` JSON error.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::invalid(format!("invalid request body: {e}")))
}

/// Query strings get the same treatment, rather than axum's plain-text rejection.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::invalid(format!("invalid query string: {}", e.body_text())))
}

fn require_wallet(address: Option<&str>) -> Result<Address, ApiError> {
    let raw = address
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::invalid("address is required"))?;
    Ok(parse_wallet(raw)?)
}

fn optional_fid(fid: Option<&str>) -> Result<Option<Fid>, ApiError> {
    match fid.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(Some(raw.parse()?)),
        None => Ok(None),
    }
}

fn require_fid(fid: Option<&str>) -> Result<Fid, ApiError> {
    optional_fid(fid)?.ok_or_else(|| ApiError::invalid("fid is required"))
}

fn fid_from_number(fid: Option<u64>) -> Result<Option<Fid>, ApiError> {
    fid.map(|raw| Fid::new(raw).ok_or_else(|| ApiError::invalid(format!("invalid fid: {raw}"))))
        .transpose()
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_secret.as_deref() else {
        return Ok(());
    };
    match headers.get(ADMIN_SECRET_HEADER).and_then(|v| v.to_str().ok()) {
        Some(given) if given == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}
