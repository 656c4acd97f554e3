//! Read-only view of the faucet contract over JSON-RPC `eth_call`.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use faucet_claim_types::Fid;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::interfaces::IFaucet;
use crate::errors::ChainError;
use crate::utils::http::{HttpClient, HttpConfig};

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallObject<'a>, &'static str),
}

#[derive(Serialize)]
struct CallObject<'a> {
    to: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct ChainReader {
    rpc_url: String,
    contract: Address,
    contract_hex: String,
    http: HttpClient,
    next_id: AtomicU64,
}

impl ChainReader {
    pub fn new(
        rpc_url: impl Into<String>,
        contract: Address,
        http: HttpConfig,
    ) -> Result<Self, ChainError> {
        let rpc_url = rpc_url.into();
        if rpc_url.trim().is_empty() {
            return Err(ChainError::Config("rpc url is empty".to_string()));
        }
        if contract == Address::ZERO {
            return Err(ChainError::Config("contract address not configured".to_string()));
        }
        Ok(Self {
            rpc_url,
            contract,
            contract_hex: format!("{contract:#x}"),
            http: HttpClient::new(http)?,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// `eth_call` at `latest` and decode the return data.
    pub async fn call<C: SolCall>(
        &self,
        op: &'static str,
        call: &C,
    ) -> Result<C::Return, ChainError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: "eth_call",
            params: (
                CallObject {
                    to: &self.contract_hex,
                    data: format!("0x{}", hex::encode(call.abi_encode())),
                },
                "latest",
            ),
        };
        let response: RpcResponse = self.http.post_json(op, &self.rpc_url, &request).await?;

        if let Some(err) = response.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = response
            .result
            .ok_or_else(|| ChainError::Decode(format!("{op}: response has neither result nor error")))?;
        let bytes = hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| ChainError::Decode(format!("{op}: {e}")))?;
        debug!(operation = op, len = bytes.len(), "eth_call returned");
        C::abi_decode_returns(&bytes, true).map_err(|e| ChainError::Decode(format!("{op}: {e}")))
    }

    pub async fn claim_amount(&self) -> Result<U256, ChainError> {
        Ok(self
            .call("claim_amount", &IFaucet::claimAmountCall {})
            .await?
            ._0)
    }

    pub async fn cooldown_time(&self) -> Result<u64, ChainError> {
        let raw = self
            .call("cooldown_time", &IFaucet::cooldownTimeCall {})
            .await?
            ._0;
        to_secs("cooldown_time", raw)
    }

    pub async fn can_claim(&self, fid: Fid) -> Result<bool, ChainError> {
        Ok(self
            .call("can_claim", &IFaucet::canClaimCall { fid: fid_word(fid) })
            .await?
            ._0)
    }

    pub async fn has_claimed(&self, fid: Fid) -> Result<bool, ChainError> {
        Ok(self
            .call("has_claimed", &IFaucet::hasClaimedCall { fid: fid_word(fid) })
            .await?
            ._0)
    }

    pub async fn next_claim_time(&self, fid: Fid) -> Result<u64, ChainError> {
        let raw = self
            .call(
                "next_claim_time",
                &IFaucet::getNextClaimTimeCall { fid: fid_word(fid) },
            )
            .await?
            ._0;
        to_secs("next_claim_time", raw)
    }

    pub async fn time_until_next_claim(&self, fid: Fid) -> Result<u64, ChainError> {
        let raw = self
            .call(
                "time_until_next_claim",
                &IFaucet::getTimeUntilNextClaimCall { fid: fid_word(fid) },
            )
            .await?
            ._0;
        to_secs("time_until_next_claim", raw)
    }

    pub async fn fid_last_claim_time(&self, fid: Fid) -> Result<u64, ChainError> {
        let raw = self
            .call(
                "fid_last_claim_time",
                &IFaucet::fidLastClaimTimeCall { fid: fid_word(fid) },
            )
            .await?
            ._0;
        to_secs("fid_last_claim_time", raw)
    }

    pub async fn last_claim_time(&self, user: Address) -> Result<u64, ChainError> {
        let raw = self
            .call("last_claim_time", &IFaucet::lastClaimTimeCall { user })
            .await?
            ._0;
        to_secs("last_claim_time", raw)
    }

    pub async fn contribution(&self, user: Address) -> Result<U256, ChainError> {
        Ok(self
            .call("contribution", &IFaucet::getContributionCall { user })
            .await?
            ._0)
    }

    pub async fn is_eligible_for_og_nft(&self, user: Address) -> Result<bool, ChainError> {
        Ok(self
            .call("is_eligible_for_og_nft", &IFaucet::isEligibleForOGNFTCall { user })
            .await?
            ._0)
    }

    pub async fn has_og_nft(&self, user: Address) -> Result<bool, ChainError> {
        Ok(self
            .call("has_og_nft", &IFaucet::hasOGNFTCall { user })
            .await?
            ._0)
    }

    pub async fn has_claimer_nft(&self, fid: Fid) -> Result<bool, ChainError> {
        Ok(self
            .call(
                "has_claimer_nft",
                &IFaucet::hasClaimerNFTCall { fid: fid_word(fid) },
            )
            .await?
            ._0)
    }
}

fn fid_word(fid: Fid) -> U256 {
    U256::from(fid.get())
}

fn to_secs(op: &'static str, raw: U256) -> Result<u64, ChainError> {
    u64::try_from(raw).map_err(|_| ChainError::Decode(format!("{op}: {raw} does not fit in u64")))
}
