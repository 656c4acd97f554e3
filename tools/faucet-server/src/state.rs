use std::sync::Arc;

use anyhow::{Context, Result};
use faucet_attestor::chain::{ChainReader, EthersRelayer, TransactionRelayer};
use faucet_attestor::oracle::{CoinGeckoConfig, CoinGeckoOracle};
use faucet_attestor::store::{ChainClaimRecords, ClaimRecordStore, InMemoryClaimStore};
use faucet_attestor::utils::http::HttpConfig;
use faucet_attestor::{AttestationSigner, ClaimPolicy, ClaimService, ClaimSettings};
use faucet_claim_types::PriceAsset;
use tracing::info;

use crate::config::{RecordSource, Settings};
use crate::donations::{DonationLedger, InMemoryDonations};

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub claims: Arc<ClaimService>,
    pub chain: Arc<ChainReader>,
    pub donations: Arc<DonationLedger>,
    pub admin_secret: Option<Arc<str>>,
}

impl AppState {
    /// Wire collaborators from settings. Fails on anything an operator must fix.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let relayer = match &settings.relayer_key {
            Some(key) if !key.trim().is_empty() => {
                let relayer = EthersRelayer::new(
                    &settings.rpc_url,
                    key,
                    settings.chain_id,
                    settings.contract_address,
                )
                .context("failed to build relayer")?;
                info!(relayer = %relayer.address(), "relayer loaded");
                Some(Arc::new(relayer) as Arc<dyn TransactionRelayer>)
            }
            _ => None,
        };
        Self::with_relayer(settings, relayer)
    }

    /// Same as [`AppState::from_settings`], with the transaction relayer supplied by the caller.
    pub fn with_relayer(
        settings: &Settings,
        relayer: Option<Arc<dyn TransactionRelayer>>,
    ) -> Result<Self> {
        let signer = AttestationSigner::from_hex(
            &settings.signer_key()?,
            settings.chain_id,
            settings.contract_address,
        )
        .context("invalid signer key")?
        .with_scheme(settings.identity_hash)
        .with_ttl(settings.attestation_ttl_secs);
        info!(signer = %signer.address(), "attestation signer loaded");

        let oracle = CoinGeckoOracle::new(
            CoinGeckoConfig {
                base_url: settings.price_api_url.clone(),
                http: HttpConfig {
                    timeout_ms: settings.price_timeout_ms,
                    retry_max: settings.price_retry_max,
                },
                cache_ttl_secs: settings.price_cache_ttl_secs,
            },
            settings.fallback_price_usd,
        )
        .context("failed to build price oracle")?;

        let chain = Arc::new(
            ChainReader::new(
                settings.rpc_url.clone(),
                settings.contract_address,
                HttpConfig {
                    timeout_ms: settings.rpc_timeout_ms,
                    retry_max: settings.rpc_retry_max,
                },
            )
            .context("failed to build chain reader")?,
        );

        let store: Arc<dyn ClaimRecordStore> = match settings.claim_records {
            RecordSource::Memory => Arc::new(InMemoryClaimStore::new()),
            RecordSource::Chain => Arc::new(ChainClaimRecords::new(Arc::clone(&chain))),
        };

        let claims = ClaimService::new(
            ClaimSettings {
                target_usd: settings.target_usd,
                tolerance: settings.update_tolerance,
                asset: PriceAsset::Ethereum,
                strategy: settings.claim_strategy,
                policy: ClaimPolicy {
                    identity_window: settings.identity_window,
                    wallet_window: settings.wallet_window,
                },
            },
            signer,
            Arc::new(oracle),
            store,
            relayer,
        )
        .context("invalid claim configuration")?;

        Ok(Self {
            claims: Arc::new(claims),
            chain,
            donations: Arc::new(
                DonationLedger::new(Arc::new(InMemoryDonations::with_capacity(
                    settings.donation_capacity,
                )))
                .context("invalid donation rules")?,
            ),
            admin_secret: settings
                .admin_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Arc::from),
        })
    }
}
