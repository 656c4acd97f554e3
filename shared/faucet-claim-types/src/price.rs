use crate::decimal::Wad;

/// Assets the faucet can pay out, keyed by their price-feed id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriceAsset {
    Ethereum,
}

impl PriceAsset {
    pub fn feed_id(&self) -> &'static str {
        match self {
            PriceAsset::Ethereum => "ethereum",
        }
    }

    /// Smallest-unit decimals (wei for ETH).
    pub fn decimals(&self) -> u8 {
        match self {
            PriceAsset::Ethereum => 18,
        }
    }
}

/// Where a quote came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceSource {
    Live,
    Fallback,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Live => "live",
            PriceSource::Fallback => "fallback",
        }
    }
}

/// USD price for one whole unit of the payout asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    pub value: Wad,
    /// Unix seconds when the quote was taken.
    pub captured_at: u64,
    pub source: PriceSource,
}

impl PriceQuote {
    pub fn live(value: Wad, captured_at: u64) -> Self {
        Self {
            value,
            captured_at,
            source: PriceSource::Live,
        }
    }

    pub fn fallback(value: Wad, captured_at: u64) -> Self {
        Self {
            value,
            captured_at,
            source: PriceSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PriceSource::Fallback
    }
}
