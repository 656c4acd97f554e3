//! Server-paid transactions against the faucet contract.
//!
//! Submission returns as soon as the node accepts the transaction; confirmation is not awaited.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{TransactionRequest, H160};
use faucet_claim_types::Fid;
use tracing::info;

use super::interfaces::IFaucet;
use crate::attestation::Attestation;
use crate::errors::ChainError;

#[async_trait]
pub trait TransactionRelayer: Send + Sync {
    /// Send `calldata` to the faucet contract, returning the transaction hash.
    async fn submit(&self, op: &'static str, calldata: Vec<u8>) -> Result<B256, ChainError>;

    async fn claim_for(&self, attestation: &Attestation) -> Result<B256, ChainError> {
        let call = IFaucet::claimForCall {
            identityHash: attestation.identity_hash,
            recipient: attestation.recipient,
            expiry: U256::from(attestation.expiry),
            signature: Bytes::copy_from_slice(&attestation.signature),
        };
        self.submit("claim_for", call.abi_encode()).await
    }

    async fn mint_og_nft(&self, to: Address) -> Result<B256, ChainError> {
        self.submit("mint_og_nft", IFaucet::mintOGNFTCall { to }.abi_encode())
            .await
    }

    async fn mint_claimer_nft(&self, fid: Fid, to: Address) -> Result<B256, ChainError> {
        let call = IFaucet::mintClaimerNFTCall {
            fid: U256::from(fid.get()),
            to,
        };
        self.submit("mint_claimer_nft", call.abi_encode()).await
    }
}

/// Relayer backed by an ethers signing middleware over HTTP.
pub struct EthersRelayer {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    contract: H160,
}

impl EthersRelayer {
    pub fn new(
        rpc_url: &str,
        key_hex: &str,
        chain_id: u64,
        contract: Address,
    ) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::Config(format!("invalid rpc url: {e}")))?;
        let wallet: LocalWallet = key_hex
            .trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|_| ChainError::Config("invalid relayer key".to_string()))?;
        let wallet = wallet.with_chain_id(chain_id);
        Ok(Self {
            client: SignerMiddleware::new(provider, wallet),
            contract: H160::from_slice(contract.as_slice()),
        })
    }

    pub fn address(&self) -> Address {
        Address::from_slice(self.client.signer().address().as_bytes())
    }
}

#[async_trait]
impl TransactionRelayer for EthersRelayer {
    async fn submit(&self, op: &'static str, calldata: Vec<u8>) -> Result<B256, ChainError> {
        let tx = TransactionRequest::new()
            .to(self.contract)
            .data(calldata);
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainError::Submit(format!("{op}: {e}")))?;
        let tx_hash = B256::from_slice(pending.tx_hash().as_bytes());
        info!(operation = op, tx_hash = %tx_hash, "transaction submitted");
        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::AttestationSigner;
    use alloy_primitives::{address, keccak256};
    use faucet_claim_types::Identity;
    use tokio::sync::Mutex;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const RECIPIENT: Address = address!("742d35Cc6634C0532925a3b844Bc9e7595f0bEb0");

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<(&'static str, Vec<u8>)>>,
    }

    #[async_trait]
    impl TransactionRelayer for Recording {
        async fn submit(&self, op: &'static str, calldata: Vec<u8>) -> Result<B256, ChainError> {
            let hash = keccak256(&calldata);
            self.sent.lock().await.push((op, calldata));
            Ok(hash)
        }
    }

    #[tokio::test]
    async fn claim_for_encodes_the_attestation() {
        let signer = AttestationSigner::from_hex(KEY, 8453, CONTRACT).unwrap();
        let fid = Fid::new(99).unwrap();
        let attestation = signer
            .attest(&Identity::Social(fid), RECIPIENT, 1_700_000_000)
            .unwrap();

        let relayer = Recording::default();
        relayer.claim_for(&attestation).await.unwrap();

        let sent = relayer.sent.lock().await;
        let (op, calldata) = &sent[0];
        assert_eq!(*op, "claim_for");
        let decoded = IFaucet::claimForCall::abi_decode(calldata, true).unwrap();
        assert_eq!(decoded.identityHash, attestation.identity_hash);
        assert_eq!(decoded.recipient, RECIPIENT);
        assert_eq!(decoded.expiry, U256::from(attestation.expiry));
        assert_eq!(decoded.signature.as_ref(), attestation.signature.as_slice());
    }

    #[tokio::test]
    async fn mints_target_the_right_functions() {
        let relayer = Recording::default();
        relayer.mint_og_nft(RECIPIENT).await.unwrap();
        relayer
            .mint_claimer_nft(Fid::new(7).unwrap(), RECIPIENT)
            .await
            .unwrap();

        let sent = relayer.sent.lock().await;
        assert_eq!(sent[0].1[..4], IFaucet::mintOGNFTCall::SELECTOR);
        let claimer = IFaucet::mintClaimerNFTCall::abi_decode(&sent[1].1, true).unwrap();
        assert_eq!(claimer.fid, U256::from(7u64));
        assert_eq!(claimer.to, RECIPIENT);
    }

    #[test]
    fn relayer_address_comes_from_its_key() {
        let relayer = EthersRelayer::new("http://127.0.0.1:8545", KEY, 8453, CONTRACT).unwrap();
        assert_eq!(
            relayer.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            EthersRelayer::new("not a url", KEY, 8453, CONTRACT),
            Err(ChainError::Config(_))
        ));
        assert!(matches!(
            EthersRelayer::new("http://127.0.0.1:8545", "0x1234", 8453, CONTRACT),
            Err(ChainError::Config(_))
        ));
    }
}
