use std::sync::Arc;

use async_trait::async_trait;
use faucet_claim_types::{ClaimRecord, Identity, RecordError};

use super::ClaimRecordStore;
use crate::chain::ChainReader;
use crate::errors::ChainError;

/// Claim records as the verifying contract sees them. Writes happen on-chain, never here.
pub struct ChainClaimRecords {
    reader: Arc<ChainReader>,
}

impl ChainClaimRecords {
    pub fn new(reader: Arc<ChainReader>) -> Self {
        Self { reader }
    }
}

fn unavailable(err: ChainError) -> RecordError {
    RecordError::Unavailable(err.to_string())
}

#[async_trait]
impl ClaimRecordStore for ChainClaimRecords {
    async fn get(&self, identity: &Identity) -> Result<Option<ClaimRecord>, RecordError> {
        match identity {
            Identity::Wallet(address) => {
                let last = self
                    .reader
                    .last_claim_time(*address)
                    .await
                    .map_err(unavailable)?;
                // the contract reports zero for wallets that never claimed
                Ok((last > 0).then(|| ClaimRecord::claimed_at(last)))
            }
            Identity::Social(fid) => {
                let (has_claimed, last) = tokio::try_join!(
                    self.reader.has_claimed(*fid),
                    self.reader.fid_last_claim_time(*fid),
                )
                .map_err(unavailable)?;
                if !has_claimed {
                    return Ok(None);
                }
                Ok(Some(ClaimRecord {
                    has_claimed,
                    last_claim_time: (last > 0).then_some(last),
                }))
            }
        }
    }

    async fn record(&self, _identity: &Identity, _at: u64) -> Result<(), RecordError> {
        Err(RecordError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::interfaces::IFaucet;
    use crate::utils::http::HttpConfig;
    use alloy_primitives::{address, Address, U256};
    use alloy_sol_types::SolCall;
    use faucet_claim_types::Fid;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const USER: Address = address!("742d35Cc6634C0532925a3b844Bc9e7595f0bEb0");

    async fn answer<C: SolCall>(server: &MockServer, call: C, value: u64) {
        let data = format!("0x{}", hex::encode(call.abi_encode()));
        let result = format!("0x{}", hex::encode(U256::from(value).to_be_bytes::<32>()));
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "params": [{"data": data}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result})),
            )
            .mount(server)
            .await;
    }

    fn records(server: &MockServer) -> ChainClaimRecords {
        let reader = ChainReader::new(
            server.uri(),
            CONTRACT,
            HttpConfig {
                timeout_ms: 1_000,
                retry_max: 1,
            },
        )
        .unwrap();
        ChainClaimRecords::new(Arc::new(reader))
    }

    #[tokio::test]
    async fn wallet_record_follows_last_claim_time() {
        let server = MockServer::start().await;
        answer(&server, IFaucet::lastClaimTimeCall { user: USER }, 1_700_000_000).await;
        let store = records(&server);
        assert_eq!(
            store.get(&Identity::Wallet(USER)).await.unwrap(),
            Some(ClaimRecord::claimed_at(1_700_000_000))
        );
    }

    #[tokio::test]
    async fn zero_timestamp_means_never_claimed() {
        let server = MockServer::start().await;
        answer(&server, IFaucet::lastClaimTimeCall { user: USER }, 0).await;
        assert_eq!(records(&server).get(&Identity::Wallet(USER)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fid_record_combines_flag_and_time() {
        let server = MockServer::start().await;
        let fid = Fid::new(1234).unwrap();
        let word = U256::from(1234u64);
        answer(&server, IFaucet::hasClaimedCall { fid: word }, 1).await;
        answer(&server, IFaucet::fidLastClaimTimeCall { fid: word }, 1_700_000_500).await;

        assert_eq!(
            records(&server).get(&Identity::Social(fid)).await.unwrap(),
            Some(ClaimRecord::claimed_at(1_700_000_500))
        );
    }

    #[tokio::test]
    async fn writes_are_refused_and_outages_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let store = records(&server);
        assert_eq!(
            store.record(&Identity::Wallet(USER), 1).await,
            Err(RecordError::ReadOnly)
        );
        assert!(matches!(
            store.get(&Identity::Wallet(USER)).await,
            Err(RecordError::Unavailable(_))
        ));
    }
}
