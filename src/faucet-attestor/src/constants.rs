//! Protocol constants shared by the server and tooling.

/// Base mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 8453;

/// How long a signed attestation stays valid on-chain.
pub const ATTESTATION_TTL_SECS: u64 = 300;

/// USD value paid per claim.
pub const DEFAULT_TARGET_USD: &str = "0.10";

/// ETH/USD used when the price feed is unavailable.
pub const DEFAULT_FALLBACK_PRICE_USD: &str = "2500";

/// Relative deviation of the on-chain claim amount that triggers an update (10%).
pub const DEFAULT_UPDATE_TOLERANCE: &str = "0.10";

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_RPC_URL: &str = "https://mainnet.base.org";
