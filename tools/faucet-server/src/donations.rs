//! Donation log and the addresses it makes eligible for the OG NFT.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use faucet_claim_types::parse_wallet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::ApiError;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationInput {
    pub address: String,
    pub tx_hash: String,
    pub token: String,
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    /// Lower-case hex.
    pub address: String,
    pub tx_hash: String,
    pub token: String,
    pub amount: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

/// Retained donations. Addresses are lower-case hex.
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// Append a donation and return how many are retained.
    async fn append(&self, donation: Donation) -> usize;

    /// `(nft_eligible, donations)` for one address.
    async fn for_address(&self, address: &str) -> (bool, Vec<Donation>);

    /// `(all donations, number of NFT-eligible addresses)`.
    async fn summary(&self) -> (Vec<Donation>, usize);
}

pub const DEFAULT_DONATION_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Ring {
    donations: VecDeque<Donation>,
    /// Retained donation count per donor. An address is NFT-eligible while it has any.
    donors: HashMap<String, usize>,
}

/// Process-local ring of the most recent donations. Lost on restart.
#[derive(Debug)]
pub struct InMemoryDonations {
    capacity: usize,
    ring: RwLock<Ring>,
}

impl InMemoryDonations {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ring: RwLock::new(Ring::default()),
        }
    }
}

impl Default for InMemoryDonations {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DONATION_CAPACITY)
    }
}

#[async_trait]
impl DonationStore for InMemoryDonations {
    async fn append(&self, donation: Donation) -> usize {
        let mut ring = self.ring.write().await;
        while ring.donations.len() >= self.capacity {
            let Some(evicted) = ring.donations.pop_front() else {
                break;
            };
            if let Some(count) = ring.donors.get_mut(&evicted.address) {
                *count -= 1;
                if *count == 0 {
                    ring.donors.remove(&evicted.address);
                }
            }
            debug!(address = %evicted.address, tx_hash = %evicted.tx_hash, "donation evicted");
        }
        *ring.donors.entry(donation.address.clone()).or_default() += 1;
        ring.donations.push_back(donation);
        ring.donations.len()
    }

    async fn for_address(&self, address: &str) -> (bool, Vec<Donation>) {
        let key = address.to_lowercase();
        let ring = self.ring.read().await;
        let donations = ring
            .donations
            .iter()
            .filter(|d| d.address == key)
            .cloned()
            .collect();
        (ring.donors.contains_key(&key), donations)
    }

    async fn summary(&self) -> (Vec<Donation>, usize) {
        let ring = self.ring.read().await;
        (ring.donations.iter().cloned().collect(), ring.donors.len())
    }
}

struct Rules {
    tx_hash: Regex,
    token: Regex,
    amount: Regex,
}

/// Validation rules in front of a [`DonationStore`].
pub struct DonationLedger {
    rules: Rules,
    store: Arc<dyn DonationStore>,
}

impl DonationLedger {
    pub fn new(store: Arc<dyn DonationStore>) -> Result<Self, regex::Error> {
        Ok(Self {
            rules: Rules {
                tx_hash: Regex::new(r"^0x[a-fA-F0-9]{64}$")?,
                token: Regex::new(r"^[A-Za-z0-9.\-]{1,32}$")?,
                amount: Regex::new(r"^[0-9]+(\.[0-9]+)?$")?,
            },
            store,
        })
    }

    /// Check the shape of a donation report and stamp it with the current time.
    pub fn validate(&self, input: DonationInput) -> Result<Donation, ApiError> {
        let address = parse_wallet(&input.address)?;
        self.check_tx_hash(&input.tx_hash)?;
        if !self.rules.token.is_match(&input.token) {
            return Err(ApiError::invalid(format!("invalid token: {}", input.token)));
        }
        if !self.rules.amount.is_match(&input.amount) {
            return Err(ApiError::invalid(format!("invalid amount: {}", input.amount)));
        }
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        Ok(Donation {
            address: format!("{address:#x}"),
            tx_hash: input.tx_hash.to_lowercase(),
            token: input.token,
            amount: input.amount,
            timestamp,
        })
    }

    pub fn check_tx_hash(&self, tx_hash: &str) -> Result<(), ApiError> {
        if self.rules.tx_hash.is_match(tx_hash) {
            Ok(())
        } else {
            Err(ApiError::invalid(format!("invalid txHash: {tx_hash}")))
        }
    }

    /// Append a donation and mark its sender NFT-eligible. Returns the retained count.
    pub async fn record(&self, donation: Donation) -> usize {
        info!(
            address = %donation.address,
            token = %donation.token,
            amount = %donation.amount,
            tx_hash = %donation.tx_hash,
            "donation logged"
        );
        self.store.append(donation).await
    }

    pub async fn for_address(&self, address: &str) -> (bool, Vec<Donation>) {
        self.store.for_address(address).await
    }

    pub async fn summary(&self) -> (Vec<Donation>, usize) {
        self.store.summary().await
    }
}
