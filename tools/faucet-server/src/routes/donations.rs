use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_body, query_params, require_wallet};
use crate::donations::{Donation, DonationInput};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DonationQuery {
    address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Logged {
    success: bool,
    message: &'static str,
    nft_eligible: bool,
}

#[derive(Debug, Serialize)]
pub struct DonorHistory {
    success: bool,
    eligible: bool,
    donations: Vec<Donation>,
    total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    success: bool,
    donations: Vec<Donation>,
    total: usize,
    total_nft_eligible: usize,
}

pub async fn log(State(state): State<AppState>, body: Bytes) -> Result<Json<Logged>, ApiError> {
    let input: DonationInput = parse_body(&body)?;
    let donation = state.donations.validate(input)?;
    state.donations.record(donation).await;
    Ok(Json(Logged {
        success: true,
        message: "Donation logged successfully",
        nft_eligible: true,
    }))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<DonationQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = query_params(query)?;
    if query.address.is_some() {
        let address = require_wallet(query.address.as_deref())?;
        let (eligible, donations) = state
            .donations
            .for_address(&format!("{address:#x}"))
            .await;
        return Ok(Json(DonorHistory {
            success: true,
            eligible,
            total: donations.len(),
            donations,
        })
        .into_response());
    }
    let (donations, total_nft_eligible) = state.donations.summary().await;
    Ok(Json(LedgerSummary {
        success: true,
        total: donations.len(),
        donations,
        total_nft_eligible,
    })
    .into_response())
}
