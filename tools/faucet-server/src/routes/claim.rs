use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use faucet_attestor::utils::unix_now;
use faucet_attestor::{ClaimGrant, ClaimRequest, EligibilityReport};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{fid_from_number, optional_fid, parse_body, query_params, require_wallet};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    address: Option<String>,
    fid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaimBody {
    address: Option<String>,
    fid: Option<u64>,
}

impl ClaimBody {
    fn into_request(self) -> Result<ClaimRequest, ApiError> {
        Ok(ClaimRequest {
            wallet: require_wallet(self.address.as_deref())?,
            fid: fid_from_number(self.fid)?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    success: bool,
    eligible: bool,
    seconds_until_claim: u64,
    /// Smallest units.
    claim_amount: String,
    claim_amount_eth: String,
    has_claimed: bool,
}

impl From<EligibilityReport> for EligibilityResponse {
    fn from(report: EligibilityReport) -> Self {
        Self {
            success: true,
            eligible: report.eligibility.eligible,
            seconds_until_claim: report.eligibility.seconds_remaining,
            claim_amount: report.payout.wei_amount.to_string(),
            claim_amount_eth: report.payout.eth_amount,
            has_claimed: report.has_claimed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    success: bool,
    identity_hash: String,
    recipient: String,
    expiry: u64,
    chain_id: u64,
    contract: String,
    signature: String,
    signer: String,
    strategy: &'static str,
    sponsored: bool,
    claim_amount: String,
    claim_amount_eth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<String>,
}

impl ClaimResponse {
    fn new(grant: ClaimGrant, signer: String) -> Self {
        let sponsored = grant.sponsored();
        let attestation = grant.attestation;
        Self {
            success: true,
            identity_hash: format!("{:#x}", attestation.identity_hash),
            recipient: format!("{:#x}", attestation.recipient),
            expiry: attestation.expiry,
            chain_id: attestation.chain_id,
            contract: format!("{:#x}", attestation.verifying_contract),
            signature: attestation.signature_hex(),
            signer,
            strategy: grant.strategy.as_str(),
            sponsored,
            claim_amount: grant.payout.wei_amount.to_string(),
            claim_amount_eth: grant.payout.eth_amount,
            tx_hash: grant.tx_hash.map(|h| format!("{h:#x}")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Recorded {
    success: bool,
    message: &'static str,
}

pub async fn eligibility(
    State(state): State<AppState>,
    query: Result<Query<EligibilityQuery>, QueryRejection>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let query = query_params(query)?;
    let request = ClaimRequest {
        wallet: require_wallet(query.address.as_deref())?,
        fid: optional_fid(query.fid.as_deref())?,
    };
    let report = state.claims.check(&request, unix_now()).await?;
    Ok(Json(report.into()))
}

/// Start the cooldown for a wallet (and FID). Unauthenticated: callers are trusted to report
/// only claims that landed. Rejected with a configuration error when records come from the chain.
pub async fn record_claim(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Recorded>, ApiError> {
    let request = parse_body::<ClaimBody>(&body)?.into_request()?;
    state.claims.record_claim(&request, unix_now()).await?;
    info!(identity = %request.identity(), "claim recorded");
    Ok(Json(Recorded {
        success: true,
        message: "Claim recorded",
    }))
}

pub async fn claim(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClaimResponse>, ApiError> {
    let request = parse_body::<ClaimBody>(&body)?.into_request()?;
    let grant = state.claims.claim(&request, unix_now()).await?;
    let signer = format!("{:#x}", state.claims.signer().address());
    Ok(Json(ClaimResponse::new(grant, signer)))
}
