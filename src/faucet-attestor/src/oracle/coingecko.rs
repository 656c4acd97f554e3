use std::collections::HashMap;

use async_trait::async_trait;
use faucet_claim_types::{PriceAsset, PriceQuote, Wad};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{FallbackPrice, PriceOracle};
use crate::constants::DEFAULT_PRICE_API_URL;
use crate::errors::OracleError;
use crate::utils::http::{HttpClient, HttpConfig};
use crate::utils::unix_now;

#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub http: HttpConfig,
    /// Live quotes younger than this are served from memory. Zero disables caching.
    pub cache_ttl_secs: u64,
}

impl CoinGeckoConfig {
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PRICE_API_URL.to_string(),
            http: HttpConfig::default(),
            cache_ttl_secs: Self::DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// `GET {base}/simple/price?ids=<asset>&vs_currencies=usd`, answering `{"<asset>": {"usd": n}}`.
pub struct CoinGeckoOracle {
    base_url: String,
    http: HttpClient,
    fallback: FallbackPrice,
    cache_ttl_secs: u64,
    cache: Mutex<HashMap<PriceAsset, PriceQuote>>,
}

impl CoinGeckoOracle {
    pub fn new(cfg: CoinGeckoConfig, fallback: FallbackPrice) -> Result<Self, OracleError> {
        let http = HttpClient::new(cfg.http)?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            http,
            fallback,
            cache_ttl_secs: cfg.cache_ttl_secs,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// One round-trip to the feed, no fallback and no cache.
    pub async fn fetch(&self, asset: PriceAsset) -> Result<Wad, OracleError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            asset.feed_id()
        );
        let body: Value = self.http.get_json("price_feed", &url).await?;
        parse_usd_quote(&body, asset)
    }

    async fn cached(&self, asset: PriceAsset, now: u64) -> Option<PriceQuote> {
        if self.cache_ttl_secs == 0 {
            return None;
        }
        let cache = self.cache.lock().await;
        cache
            .get(&asset)
            .filter(|quote| now.saturating_sub(quote.captured_at) < self.cache_ttl_secs)
            .copied()
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoOracle {
    async fn get_price(&self, asset: PriceAsset) -> PriceQuote {
        let now = unix_now();
        if let Some(quote) = self.cached(asset, now).await {
            debug!(asset = asset.feed_id(), price = %quote.value, "serving cached price");
            return quote;
        }

        match self.fetch(asset).await {
            Ok(value) => {
                let quote = PriceQuote::live(value, now);
                if self.cache_ttl_secs > 0 {
                    self.cache.lock().await.insert(asset, quote);
                }
                quote
            }
            Err(err) => {
                warn!(
                    asset = asset.feed_id(),
                    error = %err,
                    fallback = %self.fallback.value(),
                    "price feed unavailable, using fallback price"
                );
                self.fallback.quote(now)
            }
        }
    }
}

/// Non-integer prices arrive as `f64`; their shortest round-trip text is what gets parsed, so the
/// price is exact to that text rather than to the float's binary value.
fn parse_usd_quote(body: &Value, asset: PriceAsset) -> Result<Wad, OracleError> {
    let number = body
        .get(asset.feed_id())
        .and_then(|entry| match entry.get("usd") {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        })
        .ok_or(OracleError::MissingQuote(asset.feed_id()))?;
    let text = number.to_string();
    let value: Wad = plain_decimal(&text)
        .and_then(|plain| plain.parse().ok())
        .ok_or_else(|| OracleError::InvalidPrice(text.clone()))?;
    if value.is_zero() {
        return Err(OracleError::InvalidPrice(text));
    }
    Ok(value)
}

const MAX_EXPONENT: u32 = 80;

/// Rewrite exponent notation (`1.5e21`, `1e-7`) positionally. Other text is returned unchanged.
fn plain_decimal(text: &str) -> Option<String> {
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return Some(text.to_string());
    };
    let exponent: i32 = exponent.parse().ok()?;
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return None;
    }
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let point = whole.len() as i32 + exponent;
    let plain = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (head, tail) = digits.split_at(point as usize);
        format!("{head}.{tail}")
    };
    Some(format!("{sign}{plain}"))
}
