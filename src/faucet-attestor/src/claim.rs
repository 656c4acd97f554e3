//! Claim orchestration: records, policy, price and signer wired together per request.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use faucet_claim_types::{
    ClaimRecord, ClaimStrategy, ClaimWindow, Eligibility, Fid, Identity, PriceAsset, RecordError,
    Wad,
};
use tracing::{debug, info, warn};

use crate::attestation::{Attestation, AttestationSigner};
use crate::chain::TransactionRelayer;
use crate::eligibility::{evaluate_all, Gate};
use crate::errors::ClaimError;
use crate::oracle::PriceOracle;
use crate::payout::{self, Recommendation};
use crate::store::ClaimRecordStore;

/// Policies for the social identity and for the receiving wallet. Both must pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimPolicy {
    pub identity_window: ClaimWindow,
    pub wallet_window: ClaimWindow,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self {
            identity_window: ClaimWindow::protocol_cooldown(),
            wallet_window: ClaimWindow::protocol_cooldown(),
        }
    }
}

/// Who is asking: the paid wallet, plus an optional verified FID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimRequest {
    pub wallet: Address,
    pub fid: Option<Fid>,
}

impl ClaimRequest {
    /// The identity the attestation is issued for. An FID takes precedence over the wallet.
    pub fn identity(&self) -> Identity {
        match self.fid {
            Some(fid) => Identity::Social(fid),
            None => Identity::Wallet(self.wallet),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EligibilityReport {
    pub eligibility: Eligibility,
    pub has_claimed: bool,
    pub payout: Recommendation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimGrant {
    pub attestation: Attestation,
    pub strategy: ClaimStrategy,
    pub payout: Recommendation,
    /// Set when the server submitted the claim itself.
    pub tx_hash: Option<B256>,
}

impl ClaimGrant {
    pub fn sponsored(&self) -> bool {
        self.strategy == ClaimStrategy::SmartAccountSponsored
    }
}

/// How far an on-chain claim amount has drifted from the fiat target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmountReview {
    pub current_wei: U256,
    pub current_usd: Wad,
    pub deviation: Wad,
    pub needs_update: bool,
    pub recommendation: Recommendation,
}

#[derive(Clone, Debug)]
pub struct ClaimSettings {
    pub target_usd: Wad,
    pub tolerance: Wad,
    pub asset: PriceAsset,
    pub strategy: ClaimStrategy,
    pub policy: ClaimPolicy,
}

pub struct ClaimService {
    settings: ClaimSettings,
    signer: AttestationSigner,
    oracle: Arc<dyn PriceOracle>,
    store: Arc<dyn ClaimRecordStore>,
    relayer: Option<Arc<dyn TransactionRelayer>>,
}

impl ClaimService {
    pub fn new(
        settings: ClaimSettings,
        signer: AttestationSigner,
        oracle: Arc<dyn PriceOracle>,
        store: Arc<dyn ClaimRecordStore>,
        relayer: Option<Arc<dyn TransactionRelayer>>,
    ) -> Result<Self, ClaimError> {
        if settings.target_usd.is_zero() {
            return Err(ClaimError::ServerMisconfiguration(
                "target fiat value must be positive".to_string(),
            ));
        }
        if settings.strategy == ClaimStrategy::RelayerSigned && relayer.is_none() {
            return Err(ClaimError::ServerMisconfiguration(
                "relayer-signed claims need a relayer key".to_string(),
            ));
        }
        Ok(Self {
            settings,
            signer,
            oracle,
            store,
            relayer,
        })
    }

    pub fn settings(&self) -> &ClaimSettings {
        &self.settings
    }

    pub fn signer(&self) -> &AttestationSigner {
        &self.signer
    }

    pub fn relayer(&self) -> Option<&Arc<dyn TransactionRelayer>> {
        self.relayer.as_ref()
    }

    /// Current recommended payout at the oracle's price.
    pub async fn quote(&self) -> Result<Recommendation, ClaimError> {
        let price = self.oracle.get_price(self.settings.asset).await;
        Ok(payout::recommend(
            self.settings.target_usd,
            &price,
            self.settings.asset.decimals(),
        )?)
    }

    /// Compare an on-chain claim amount against the target at the current price.
    pub async fn review_amount(&self, current_wei: U256) -> Result<AmountReview, ClaimError> {
        let price = self.oracle.get_price(self.settings.asset).await;
        let decimals = self.settings.asset.decimals();
        let target = self.settings.target_usd;
        Ok(AmountReview {
            current_wei,
            current_usd: payout::to_fiat_value(current_wei, &price, decimals)?,
            deviation: payout::deviation(current_wei, target, &price, decimals)?,
            needs_update: payout::needs_update(
                current_wei,
                target,
                &price,
                decimals,
                self.settings.tolerance,
            )?,
            recommendation: payout::recommend(target, &price, decimals)?,
        })
    }

    async fn records(
        &self,
        request: &ClaimRequest,
    ) -> Result<(Option<ClaimRecord>, Option<ClaimRecord>), RecordError> {
        let wallet = Identity::Wallet(request.wallet);
        match request.fid {
            Some(fid) => {
                let social = Identity::Social(fid);
                let (social, wallet) =
                    tokio::try_join!(self.store.get(&social), self.store.get(&wallet))?;
                Ok((social, wallet))
            }
            None => Ok((None, self.store.get(&wallet).await?)),
        }
    }

    async fn eligibility(
        &self,
        request: &ClaimRequest,
        now: u64,
    ) -> Result<(Eligibility, bool), ClaimError> {
        let (social, wallet) = self.records(request).await?;
        let has_claimed = social.iter().chain(wallet.iter()).any(|r| r.has_claimed);
        let policy = self.settings.policy;
        let mut gates = vec![Gate {
            policy: policy.wallet_window,
            record: wallet.as_ref(),
        }];
        if request.fid.is_some() {
            gates.push(Gate {
                policy: policy.identity_window,
                record: social.as_ref(),
            });
        }
        Ok((evaluate_all(&gates, now), has_claimed))
    }

    pub async fn check(
        &self,
        request: &ClaimRequest,
        now: u64,
    ) -> Result<EligibilityReport, ClaimError> {
        let (eligibility, has_claimed) = self.eligibility(request, now).await?;
        debug!(
            identity = %request.identity(),
            eligible = eligibility.eligible,
            seconds_remaining = eligibility.seconds_remaining,
            "eligibility evaluated"
        );
        Ok(EligibilityReport {
            eligibility,
            has_claimed,
            payout: self.quote().await?,
        })
    }

    /// Issue an attestation for an eligible request, submitting it when the server relays claims.
    pub async fn claim(&self, request: &ClaimRequest, now: u64) -> Result<ClaimGrant, ClaimError> {
        let (eligibility, _) = self.eligibility(request, now).await?;
        if !eligibility.eligible {
            info!(
                identity = %request.identity(),
                seconds_until_claim = eligibility.seconds_remaining,
                "claim refused"
            );
            return Err(ClaimError::NotEligible {
                seconds_until_claim: eligibility.seconds_remaining,
            });
        }

        let payout = self.quote().await?;
        let attestation = self.signer.attest(&request.identity(), request.wallet, now)?;
        let strategy = self.settings.strategy;

        let tx_hash = match (strategy, &self.relayer) {
            (ClaimStrategy::RelayerSigned, Some(relayer)) => {
                let tx_hash = relayer.claim_for(&attestation).await?;
                self.remember(request, now).await;
                Some(tx_hash)
            }
            (ClaimStrategy::RelayerSigned, None) => {
                return Err(ClaimError::ServerMisconfiguration(
                    "relayer-signed claims need a relayer key".to_string(),
                ))
            }
            _ => None,
        };

        info!(
            identity = %request.identity(),
            recipient = %request.wallet,
            expiry = attestation.expiry,
            strategy = strategy.as_str(),
            "claim attested"
        );
        Ok(ClaimGrant {
            attestation,
            strategy,
            payout,
            tx_hash,
        })
    }

    /// Mark a completed claim for the wallet and, when given, the FID.
    ///
    /// Nothing here proves the claim happened on chain. A caller that can reach this starts the
    /// cooldown for any wallet or FID it names, so only the in-memory store accepts writes; the
    /// chain store is read-only and authoritative.
    pub async fn record_claim(&self, request: &ClaimRequest, now: u64) -> Result<(), ClaimError> {
        self.store
            .record(&Identity::Wallet(request.wallet), now)
            .await?;
        if let Some(fid) = request.fid {
            self.store.record(&Identity::Social(fid), now).await?;
        }
        Ok(())
    }

    // Relayed claims are known to have been sent; a read-only store learns of them from the chain.
    async fn remember(&self, request: &ClaimRequest, now: u64) {
        match self.record_claim(request, now).await {
            Ok(()) => {}
            Err(ClaimError::ServerMisconfiguration(detail)) => {
                debug!(error = %detail, "claim store is read-only; relayed claim not recorded")
            }
            Err(err) => warn!(error = %err, "failed to record relayed claim"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::interfaces::IFaucet;
    use crate::errors::ChainError;
    use crate::oracle::FixedPriceOracle;
    use crate::store::InMemoryClaimStore;
    use alloy_primitives::{address, keccak256};
    use alloy_sol_types::SolCall;
    use faucet_claim_types::COOLDOWN_SECS;
    use tokio::sync::Mutex;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const WALLET: Address = address!("742d35Cc6634C0532925a3b844Bc9e7595f0bEb0");
    const T: u64 = 1_700_000_000;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait::async_trait]
    impl TransactionRelayer for Recording {
        async fn submit(&self, _op: &'static str, calldata: Vec<u8>) -> Result<B256, ChainError> {
            let hash = keccak256(&calldata);
            self.sent.lock().await.push(calldata);
            Ok(hash)
        }
    }

    fn settings(strategy: ClaimStrategy) -> ClaimSettings {
        ClaimSettings {
            target_usd: "0.10".parse().unwrap(),
            tolerance: "0.10".parse().unwrap(),
            asset: PriceAsset::Ethereum,
            strategy,
            policy: ClaimPolicy::default(),
        }
    }

    fn service_with(
        strategy: ClaimStrategy,
        store: Arc<InMemoryClaimStore>,
        relayer: Option<Arc<dyn TransactionRelayer>>,
    ) -> ClaimService {
        ClaimService::new(
            settings(strategy),
            AttestationSigner::from_hex(KEY, 8453, CONTRACT).unwrap(),
            Arc::new(FixedPriceOracle::new(Wad::from_integer(2500))),
            store,
            relayer,
        )
        .unwrap()
    }

    fn request(fid: Option<u64>) -> ClaimRequest {
        ClaimRequest {
            wallet: WALLET,
            fid: fid.and_then(Fid::new),
        }
    }

    #[tokio::test]
    async fn fresh_identity_is_eligible_with_the_pegged_amount() {
        let service = service_with(ClaimStrategy::Direct, Arc::default(), None);
        let report = service.check(&request(Some(1234)), T).await.unwrap();
        assert_eq!(report.eligibility, Eligibility::ELIGIBLE);
        assert!(!report.has_claimed);
        assert_eq!(report.payout.wei_amount, U256::from(40_000_000_000_000u64));
    }

    #[tokio::test]
    async fn direct_claim_returns_a_verifiable_attestation() {
        let service = service_with(ClaimStrategy::Direct, Arc::default(), None);
        let grant = service.claim(&request(Some(1234)), T).await.unwrap();

        assert_eq!(grant.strategy, ClaimStrategy::Direct);
        assert!(grant.tx_hash.is_none());
        assert!(!grant.sponsored());
        assert_eq!(grant.attestation.identity_hash, keccak256(b"farcaster:1234"));
        assert_eq!(grant.attestation.recipient, WALLET);
        assert_eq!(grant.attestation.expiry, T + 300);
        assert_eq!(grant.attestation.signer().unwrap(), service.signer().address());
    }

    #[tokio::test]
    async fn recorded_claims_start_the_cooldown() {
        let store = Arc::new(InMemoryClaimStore::new());
        let service = service_with(ClaimStrategy::Direct, store.clone(), None);
        service.record_claim(&request(Some(1234)), T).await.unwrap();
        assert_eq!(store.len().await, 2);

        let err = service
            .claim(&request(Some(1234)), T + 100)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClaimError::NotEligible {
                seconds_until_claim: COOLDOWN_SECS - 100
            }
        );

        // the same FID paying another wallet is still gated by the FID window
        let other_wallet = ClaimRequest {
            wallet: CONTRACT,
            fid: Fid::new(1234),
        };
        assert!(!service.check(&other_wallet, T + 100).await.unwrap().eligibility.eligible);

        assert!(service
            .claim(&request(Some(1234)), T + COOLDOWN_SECS)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn wallet_only_requests_attest_the_wallet() {
        let store = Arc::new(InMemoryClaimStore::new());
        let service = service_with(ClaimStrategy::SmartAccountSponsored, store, None);
        let grant = service.claim(&request(None), T).await.unwrap();
        assert!(grant.sponsored());
        assert_eq!(grant.attestation.identity_hash, keccak256(WALLET.as_slice()));
    }

    #[tokio::test]
    async fn relayer_strategy_submits_and_records() {
        let store = Arc::new(InMemoryClaimStore::new());
        let relayer = Arc::new(Recording::default());
        let service = service_with(
            ClaimStrategy::RelayerSigned,
            store.clone(),
            Some(relayer.clone() as Arc<dyn TransactionRelayer>),
        );

        let grant = service.claim(&request(Some(7)), T).await.unwrap();
        let sent = relayer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(grant.tx_hash, Some(keccak256(&sent[0])));
        let call = IFaucet::claimForCall::abi_decode(&sent[0], true).unwrap();
        assert_eq!(call.recipient, WALLET);
        assert!(store.get(&Identity::Social(Fid::new(7).unwrap())).await.unwrap().is_some());
    }

    struct ChainBacked;

    #[async_trait::async_trait]
    impl ClaimRecordStore for ChainBacked {
        async fn get(&self, _identity: &Identity) -> Result<Option<ClaimRecord>, RecordError> {
            Ok(None)
        }

        async fn record(&self, _identity: &Identity, _at: u64) -> Result<(), RecordError> {
            Err(RecordError::ReadOnly)
        }
    }

    #[tokio::test]
    async fn read_only_store_does_not_fail_relayed_claims() {
        let relayer = Arc::new(Recording::default());
        let service = ClaimService::new(
            settings(ClaimStrategy::RelayerSigned),
            AttestationSigner::from_hex(KEY, 8453, CONTRACT).unwrap(),
            Arc::new(FixedPriceOracle::new(Wad::from_integer(2500))),
            Arc::new(ChainBacked),
            Some(relayer.clone() as Arc<dyn TransactionRelayer>),
        )
        .unwrap();

        let grant = service.claim(&request(Some(7)), T).await.unwrap();
        assert!(grant.tx_hash.is_some());
        assert_eq!(relayer.sent.lock().await.len(), 1);
        assert!(matches!(
            service.record_claim(&request(Some(7)), T).await,
            Err(ClaimError::ServerMisconfiguration(_))
        ));
    }

    #[test]
    fn relayer_strategy_requires_a_relayer() {
        let result = ClaimService::new(
            settings(ClaimStrategy::RelayerSigned),
            AttestationSigner::from_hex(KEY, 8453, CONTRACT).unwrap(),
            Arc::new(FixedPriceOracle::new(Wad::from_integer(2500))),
            Arc::new(InMemoryClaimStore::new()),
            None,
        );
        assert!(matches!(result, Err(ClaimError::ServerMisconfiguration(_))));
    }

    #[tokio::test]
    async fn amount_review_flags_drift() {
        let service = service_with(ClaimStrategy::Direct, Arc::default(), None);
        let on_target = service
            .review_amount(U256::from(40_000_000_000_000u64))
            .await
            .unwrap();
        assert!(!on_target.needs_update);
        assert_eq!(on_target.current_usd, "0.1".parse().unwrap());

        let doubled = service
            .review_amount(U256::from(80_000_000_000_000u64))
            .await
            .unwrap();
        assert!(doubled.needs_update);
        assert_eq!(doubled.deviation, Wad::from_integer(1));
        assert_eq!(
            doubled.recommendation.wei_amount,
            U256::from(40_000_000_000_000u64)
        );
    }
}
