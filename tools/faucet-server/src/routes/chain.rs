//! Reads and relayed writes against the faucet contract.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use faucet_attestor::ClaimError;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{fid_from_number, parse_body, query_params, require_fid, require_wallet};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FidQuery {
    fid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NftQuery {
    address: Option<String>,
    fid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: T,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatus {
    fid: u64,
    can_claim: bool,
    next_claim_time: u64,
    seconds_until_claim: u64,
    has_claimed: bool,
}

pub async fn claim_status(
    State(state): State<AppState>,
    query: Result<Query<FidQuery>, QueryRejection>,
) -> Result<Json<Envelope<ClaimStatus>>, ApiError> {
    let query = query_params(query)?;
    let fid = require_fid(query.fid.as_deref())?;
    let chain = &state.chain;
    let (can_claim, next_claim_time, seconds_until_claim, has_claimed) = tokio::try_join!(
        chain.can_claim(fid),
        chain.next_claim_time(fid),
        chain.time_until_next_claim(fid),
        chain.has_claimed(fid),
    )?;
    Ok(Envelope::ok(ClaimStatus {
        fid: fid.get(),
        can_claim,
        next_claim_time,
        seconds_until_claim,
        has_claimed,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionResponse {
    success: bool,
    address: String,
    /// Smallest units.
    total_contribution: String,
}

pub async fn contribution(
    State(state): State<AppState>,
    query: Result<Query<AddressQuery>, QueryRejection>,
) -> Result<Json<ContributionResponse>, ApiError> {
    let query = query_params(query)?;
    let address = require_wallet(query.address.as_deref())?;
    let total = state.chain.contribution(address).await?;
    Ok(Json(ContributionResponse {
        success: true,
        address: format!("{address:#x}"),
        total_contribution: total.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionBody {
    address: Option<String>,
    tx_hash: Option<String>,
}

/// Acknowledge a contribution sent by the client and report the new on-chain total.
pub async fn log_contribution(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContributionResponse>, ApiError> {
    let body: ContributionBody = parse_body(&body)?;
    let address = require_wallet(body.address.as_deref())?;
    let tx_hash = body
        .tx_hash
        .ok_or_else(|| ApiError::invalid("txHash is required"))?;
    state.donations.check_tx_hash(&tx_hash)?;
    let total = state.chain.contribution(address).await?;
    info!(%address, %tx_hash, total = %total, "contribution logged");
    Ok(Json(ContributionResponse {
        success: true,
        address: format!("{address:#x}"),
        total_contribution: total.to_string(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OgNft {
    eligible: bool,
    minted: bool,
    contribution: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimerNft {
    eligible: bool,
    minted: bool,
    has_claimed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftStatus {
    #[serde(rename = "ogNFT")]
    og_nft: OgNft,
    #[serde(rename = "claimerNFT")]
    claimer_nft: ClaimerNft,
}

pub async fn nft_status(
    State(state): State<AppState>,
    query: Result<Query<NftQuery>, QueryRejection>,
) -> Result<Json<Envelope<NftStatus>>, ApiError> {
    let query = query_params(query)?;
    let address = require_wallet(query.address.as_deref())?;
    let fid = require_fid(query.fid.as_deref())?;
    let chain = &state.chain;
    let (contribution, og_eligible, og_minted, has_claimed, claimer_minted) = tokio::try_join!(
        chain.contribution(address),
        chain.is_eligible_for_og_nft(address),
        chain.has_og_nft(address),
        chain.has_claimed(fid),
        chain.has_claimer_nft(fid),
    )?;
    Ok(Envelope::ok(NftStatus {
        og_nft: OgNft {
            eligible: og_eligible,
            minted: og_minted,
            contribution: contribution.to_string(),
        },
        claimer_nft: ClaimerNft {
            eligible: has_claimed && !claimer_minted,
            minted: claimer_minted,
            has_claimed,
        },
    }))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NftType {
    Og,
    Claimer,
}

impl NftType {
    fn as_str(self) -> &'static str {
        match self {
            NftType::Og => "og",
            NftType::Claimer => "claimer",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintBody {
    address: Option<String>,
    fid: Option<u64>,
    nft_type: NftType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    success: bool,
    tx_hash: String,
    nft_type: &'static str,
    message: String,
}

/// Mint an OG or Claimer NFT through the relayer once the contract confirms eligibility.
pub async fn mint_nft(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MintResponse>, ApiError> {
    let body: MintBody = parse_body(&body)?;
    let address = require_wallet(body.address.as_deref())?;
    let relayer = state.claims.relayer().ok_or_else(|| {
        ApiError::from(ClaimError::ServerMisconfiguration(
            "NFT minting needs a relayer key".to_string(),
        ))
    })?;

    let tx_hash = match body.nft_type {
        NftType::Og => {
            if !state.chain.is_eligible_for_og_nft(address).await? {
                return Err(ApiError::invalid("Not eligible for OG NFT"));
            }
            relayer.mint_og_nft(address).await?
        }
        NftType::Claimer => {
            let fid = fid_from_number(body.fid)?
                .ok_or_else(|| ApiError::invalid("fid is required for the Claimer NFT"))?;
            let (has_claimed, minted) = tokio::try_join!(
                state.chain.has_claimed(fid),
                state.chain.has_claimer_nft(fid),
            )?;
            if !has_claimed {
                return Err(ApiError::invalid("FID has not claimed yet"));
            }
            if minted {
                return Err(ApiError::invalid("Claimer NFT already minted for this FID"));
            }
            relayer.mint_claimer_nft(fid, address).await?
        }
    };

    info!(%address, nft_type = body.nft_type.as_str(), tx_hash = %tx_hash, "nft mint submitted");
    Ok(Json(MintResponse {
        success: true,
        tx_hash: format!("{tx_hash:#x}"),
        nft_type: body.nft_type.as_str(),
        message: format!("{} NFT mint submitted", body.nft_type.as_str()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nft_status_uses_contract_field_names() {
        let rendered = serde_json::to_value(NftStatus {
            og_nft: OgNft {
                eligible: true,
                minted: false,
                contribution: "1000".into(),
            },
            claimer_nft: ClaimerNft {
                eligible: false,
                minted: true,
                has_claimed: true,
            },
        })
        .unwrap();
        assert_eq!(rendered["ogNFT"]["contribution"], "1000");
        assert_eq!(rendered["claimerNFT"]["hasClaimed"], true);
    }

    #[test]
    fn mint_body_requires_known_nft_type() {
        let ok: MintBody =
            serde_json::from_str(r#"{"address":"0x1","nftType":"claimer","fid":3}"#).unwrap();
        assert_eq!(ok.nft_type, NftType::Claimer);
        assert!(serde_json::from_str::<MintBody>(r#"{"address":"0x1","nftType":"gold"}"#).is_err());
    }
}
