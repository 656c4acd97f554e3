use alloy_primitives::{hex, U256};
use alloy_sol_types::SolCall;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use faucet_attestor::chain::interfaces::IFaucet;
use faucet_attestor::payout::format_amount;
use faucet_attestor::{AmountReview, ClaimSettings, Recommendation};
use faucet_claim_types::Wad;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{authorize, parse_body};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAmountResponse {
    success: bool,
    eth_price: String,
    price_source: &'static str,
    eth_amount: String,
    wei_amount: String,
    usd_value: String,
}

pub async fn claim_amount(
    State(state): State<AppState>,
) -> Result<Json<ClaimAmountResponse>, ApiError> {
    let quote = state.claims.quote().await?;
    Ok(Json(ClaimAmountResponse {
        success: true,
        eth_price: quote.price.value.to_string(),
        price_source: quote.price.source.as_str(),
        eth_amount: quote.eth_amount,
        wei_amount: quote.wei_amount.to_string(),
        usd_value: quote.usd_value.to_string(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountSummary {
    eth_amount: String,
    wei_amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstructions {
    function: &'static str,
    contract: String,
    calldata: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    success: bool,
    current_eth_price: String,
    price_source: &'static str,
    target_usd_value: String,
    recommended: AmountSummary,
    instructions: UpdateInstructions,
}

/// Recommended claim amount plus the `setClaimAmount` call an owner would submit.
pub async fn recommend(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RecommendResponse>, ApiError> {
    authorize(&state, &headers)?;
    let quote = state.claims.quote().await?;
    let calldata = IFaucet::setClaimAmountCall {
        newAmount: quote.wei_amount,
    }
    .abi_encode();
    Ok(Json(RecommendResponse {
        success: true,
        current_eth_price: quote.price.value.to_string(),
        price_source: quote.price.source.as_str(),
        target_usd_value: quote.usd_value.to_string(),
        recommended: AmountSummary {
            eth_amount: quote.eth_amount,
            wei_amount: quote.wei_amount.to_string(),
        },
        instructions: UpdateInstructions {
            function: "setClaimAmount(uint256)",
            contract: format!("{:#x}", state.chain.contract()),
            calldata: hex::encode_prefixed(calldata),
        },
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewBody {
    current_claim_amount_wei: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStatus {
    claim_amount_wei: String,
    claim_amount_eth: String,
    current_usd_value: String,
    target_usd_value: String,
    deviation: String,
    deviation_percent: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedAmount {
    new_claim_amount_wei: String,
    new_claim_amount_eth: String,
    eth_price: String,
    price_source: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    success: bool,
    needs_update: bool,
    current_status: CurrentStatus,
    recommendation: Option<ProposedAmount>,
}

impl ReviewResponse {
    fn new(review: AmountReview, settings: &ClaimSettings) -> Self {
        let AmountReview {
            current_wei,
            current_usd,
            deviation,
            needs_update,
            recommendation,
        } = review;
        let Recommendation {
            wei_amount,
            eth_amount,
            price,
            ..
        } = recommendation;
        Self {
            success: true,
            needs_update,
            current_status: CurrentStatus {
                claim_amount_wei: current_wei.to_string(),
                claim_amount_eth: format_amount(current_wei, settings.asset.decimals()),
                current_usd_value: current_usd.to_string(),
                target_usd_value: settings.target_usd.to_string(),
                deviation: deviation.to_string(),
                deviation_percent: Wad::from_raw(deviation.raw().saturating_mul(U256::from(100u8)))
                    .to_string(),
            },
            recommendation: needs_update.then(|| ProposedAmount {
                new_claim_amount_wei: wei_amount.to_string(),
                new_claim_amount_eth: eth_amount,
                eth_price: price.value.to_string(),
                price_source: price.source.as_str(),
            }),
        }
    }
}

/// Compare the current claim amount (given, or read from the contract) with the target.
pub async fn review(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReviewResponse>, ApiError> {
    authorize(&state, &headers)?;
    let body: ReviewBody = if body.is_empty() {
        ReviewBody::default()
    } else {
        parse_body(&body)?
    };
    let current = match body.current_claim_amount_wei.as_deref() {
        Some(raw) => U256::from_str_radix(raw.trim(), 10)
            .map_err(|_| ApiError::invalid(format!("invalid currentClaimAmountWei: {raw}")))?,
        None => state.chain.claim_amount().await?,
    };
    let review = state.claims.review_amount(current).await?;
    info!(
        current_wei = %current,
        needs_update = review.needs_update,
        deviation = %review.deviation,
        "claim amount reviewed"
    );
    Ok(Json(ReviewResponse::new(review, state.claims.settings())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faucet_attestor::ClaimPolicy;
    use faucet_claim_types::{ClaimStrategy, PriceAsset, PriceQuote};

    fn settings() -> ClaimSettings {
        ClaimSettings {
            target_usd: "0.1".parse().unwrap(),
            tolerance: "0.1".parse().unwrap(),
            asset: PriceAsset::Ethereum,
            strategy: ClaimStrategy::Direct,
            policy: ClaimPolicy::default(),
        }
    }

    fn review(current_wei: u64, needs_update: bool) -> AmountReview {
        let price = PriceQuote::live(Wad::from_integer(2500), 0);
        AmountReview {
            current_wei: U256::from(current_wei),
            current_usd: "0.125".parse().unwrap(),
            deviation: "0.25".parse().unwrap(),
            needs_update,
            recommendation: Recommendation {
                wei_amount: U256::from(40_000_000_000_000u64),
                eth_amount: "0.00004".to_string(),
                usd_value: "0.1".parse().unwrap(),
                price,
            },
        }
    }

    #[test]
    fn review_reports_percent_and_proposal() {
        let rendered = serde_json::to_value(ReviewResponse::new(
            review(50_000_000_000_000, true),
            &settings(),
        ))
        .unwrap();
        assert_eq!(rendered["needsUpdate"], true);
        assert_eq!(rendered["currentStatus"]["claimAmountEth"], "0.00005");
        assert_eq!(rendered["currentStatus"]["deviationPercent"], "25");
        assert_eq!(
            rendered["recommendation"]["newClaimAmountWei"],
            "40000000000000"
        );
        assert_eq!(rendered["recommendation"]["priceSource"], "live");
    }

    #[test]
    fn no_proposal_within_tolerance() {
        let rendered = serde_json::to_value(ReviewResponse::new(
            review(40_000_000_000_000, false),
            &settings(),
        ))
        .unwrap();
        assert_eq!(rendered["needsUpdate"], false);
        assert!(rendered["recommendation"].is_null());
    }

    #[test]
    fn set_claim_amount_calldata_is_selector_plus_word() {
        let calldata = IFaucet::setClaimAmountCall {
            newAmount: U256::from(1u8),
        }
        .abi_encode();
        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(calldata[35], 1);
    }
}
