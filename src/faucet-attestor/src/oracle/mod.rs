//! USD price sources for the payout asset.

mod coingecko;

pub use coingecko::{CoinGeckoConfig, CoinGeckoOracle};

use std::str::FromStr;

use async_trait::async_trait;
use faucet_claim_types::{PriceAsset, PriceQuote, Wad};

use crate::errors::OracleError;
use crate::utils::unix_now;

/// Infallible by contract: upstream trouble degrades to the configured fallback quote.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn get_price(&self, asset: PriceAsset) -> PriceQuote;
}

/// Price served when the feed is unreachable. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FallbackPrice(Wad);

impl FallbackPrice {
    pub fn new(value: Wad) -> Result<Self, OracleError> {
        if value.is_zero() {
            return Err(OracleError::InvalidFallback(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Wad {
        self.0
    }

    pub fn quote(&self, now: u64) -> PriceQuote {
        PriceQuote::fallback(self.0, now)
    }
}

impl FromStr for FallbackPrice {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Wad = s
            .parse()
            .map_err(|_| OracleError::InvalidFallback(s.to_string()))?;
        Self::new(value)
    }
}

/// Serves one price forever. Used offline and in tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedPriceOracle {
    value: Wad,
}

impl FixedPriceOracle {
    pub fn new(value: Wad) -> Self {
        Self { value }
    }
}

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn get_price(&self, _asset: PriceAsset) -> PriceQuote {
        PriceQuote::live(self.value, unix_now())
    }
}
