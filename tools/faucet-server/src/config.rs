use std::fmt;
use std::fs;
use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use faucet_attestor::constants::{
    ATTESTATION_TTL_SECS, DEFAULT_CHAIN_ID, DEFAULT_FALLBACK_PRICE_USD, DEFAULT_PRICE_API_URL,
    DEFAULT_RPC_URL, DEFAULT_TARGET_USD, DEFAULT_UPDATE_TOLERANCE,
};
use faucet_attestor::oracle::FallbackPrice;
use faucet_claim_types::{parse_wallet, ClaimStrategy, ClaimWindow, IdentityHashScheme, Wad};

use crate::donations::DEFAULT_DONATION_CAPACITY;

/// Where prior claims are looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecordSource {
    /// Process-local map, written by `POST /api/eligibility` and relayed claims.
    Memory,
    /// Read from the faucet contract.
    Chain,
}

/// Faucet claim API server.
#[derive(Parser, Clone)]
#[command(author, version, about)]
pub struct Settings {
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// Faucet contract that verifies attestations.
    #[arg(long, env = "CONTRACT_ADDRESS", value_parser = parse_wallet)]
    pub contract_address: Address,

    #[arg(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    #[arg(long, env = "BASE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Attestation signing key (hex string, 0x...).
    #[arg(long, env = "SIGNER_PRIVATE_KEY", conflicts_with = "signer_key_path")]
    pub signer_key: Option<String>,

    /// Path to a file containing the attestation signing key.
    #[arg(long, env = "SIGNER_KEY_PATH", conflicts_with = "signer_key")]
    pub signer_key_path: Option<PathBuf>,

    /// Key that pays gas for relayed claims and NFT mints.
    #[arg(long, env = "RELAYER_PRIVATE_KEY")]
    pub relayer_key: Option<String>,

    /// Shared secret expected in `x-admin-secret` on admin routes. Unset leaves them open.
    #[arg(long, env = "ADMIN_SECRET")]
    pub admin_secret: Option<String>,

    #[arg(long, env = "CLAIM_STRATEGY", default_value = "direct", value_parser = parse_strategy)]
    pub claim_strategy: ClaimStrategy,

    #[arg(long, env = "IDENTITY_CLAIM_WINDOW", default_value = "cooldown", value_parser = parse_window)]
    pub identity_window: ClaimWindow,

    #[arg(long, env = "WALLET_CLAIM_WINDOW", default_value = "cooldown", value_parser = parse_window)]
    pub wallet_window: ClaimWindow,

    #[arg(long, env = "IDENTITY_HASH_SCHEME", default_value = "prefixed-string", value_parser = parse_scheme)]
    pub identity_hash: IdentityHashScheme,

    #[arg(long, env = "CLAIM_RECORDS", value_enum, default_value_t = RecordSource::Memory)]
    pub claim_records: RecordSource,

    /// Most recent donations kept in memory; older ones are evicted.
    #[arg(long, env = "DONATION_CAPACITY", default_value_t = DEFAULT_DONATION_CAPACITY)]
    pub donation_capacity: usize,

    #[arg(long, env = "ATTESTATION_TTL_SECS", default_value_t = ATTESTATION_TTL_SECS)]
    pub attestation_ttl_secs: u64,

    /// USD value paid per claim.
    #[arg(long, env = "CLAIM_TARGET_USD", default_value = DEFAULT_TARGET_USD)]
    pub target_usd: Wad,

    /// Relative drift of the on-chain amount that warrants an update.
    #[arg(long, env = "CLAIM_UPDATE_TOLERANCE", default_value = DEFAULT_UPDATE_TOLERANCE)]
    pub update_tolerance: Wad,

    #[arg(long, env = "PRICE_API_URL", default_value = DEFAULT_PRICE_API_URL)]
    pub price_api_url: String,

    #[arg(long, env = "FALLBACK_ETH_PRICE_USD", default_value = DEFAULT_FALLBACK_PRICE_USD)]
    pub fallback_price_usd: FallbackPrice,

    #[arg(long, env = "PRICE_TIMEOUT_MS", default_value_t = 3_000)]
    pub price_timeout_ms: u64,

    #[arg(long, env = "PRICE_RETRY_MAX", default_value_t = 2)]
    pub price_retry_max: u32,

    #[arg(long, env = "PRICE_CACHE_TTL_SECS", default_value_t = 30)]
    pub price_cache_ttl_secs: u64,

    #[arg(long, env = "RPC_TIMEOUT_MS", default_value_t = 5_000)]
    pub rpc_timeout_ms: u64,

    #[arg(long, env = "RPC_RETRY_MAX", default_value_t = 2)]
    pub rpc_retry_max: u32,
}

impl Settings {
    /// Resolve the attestation key from the file or the literal, in that order.
    pub fn signer_key(&self) -> Result<String> {
        if let Some(path) = &self.signer_key_path {
            let key = fs::read_to_string(path)
                .with_context(|| format!("failed reading signer key from {}", path.display()))?;
            return Ok(key.trim().to_string());
        }
        self.signer_key.clone().ok_or_else(|| {
            anyhow!(
                "missing signer key: provide --signer-key-path or --signer-key (or set SIGNER_KEY_PATH/SIGNER_PRIVATE_KEY)"
            )
        })
    }
}

fn redact(value: &Option<impl AsRef<str>>) -> &'static str {
    match value {
        Some(v) if !v.as_ref().is_empty() => "<redacted>",
        _ => "<unset>",
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("listen_addr", &self.listen_addr)
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("signer_key", &redact(&self.signer_key))
            .field("signer_key_path", &self.signer_key_path)
            .field("relayer_key", &redact(&self.relayer_key))
            .field("admin_secret", &redact(&self.admin_secret))
            .field("claim_strategy", &self.claim_strategy)
            .field("identity_window", &self.identity_window)
            .field("wallet_window", &self.wallet_window)
            .field("identity_hash", &self.identity_hash)
            .field("claim_records", &self.claim_records)
            .field("donation_capacity", &self.donation_capacity)
            .field("attestation_ttl_secs", &self.attestation_ttl_secs)
            .field("target_usd", &self.target_usd.to_string())
            .field("update_tolerance", &self.update_tolerance.to_string())
            .field("price_api_url", &self.price_api_url)
            .field("fallback_price_usd", &self.fallback_price_usd.value().to_string())
            .finish_non_exhaustive()
    }
}

fn parse_strategy(s: &str) -> Result<ClaimStrategy, String> {
    ClaimStrategy::try_from(s)
}

fn parse_window(s: &str) -> Result<ClaimWindow, String> {
    ClaimWindow::try_from(s)
}

fn parse_scheme(s: &str) -> Result<IdentityHashScheme, String> {
    IdentityHashScheme::try_from(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn defaults_follow_the_protocol_constants() {
        let settings =
            Settings::try_parse_from(["faucet-server", "--contract-address", CONTRACT]).unwrap();
        assert_eq!(settings.chain_id, 8453);
        assert_eq!(settings.target_usd, "0.10".parse().unwrap());
        assert_eq!(settings.fallback_price_usd.value(), Wad::from_integer(2500));
        assert_eq!(settings.identity_hash, IdentityHashScheme::PrefixedString);
        assert_eq!(settings.identity_window, ClaimWindow::protocol_cooldown());
        assert_eq!(settings.attestation_ttl_secs, 300);
        assert_eq!(settings.donation_capacity, 10_000);
    }

    #[test]
    fn key_flags_conflict() {
        let result = Settings::try_parse_from([
            "faucet-server",
            "--contract-address",
            CONTRACT,
            "--signer-key",
            KEY,
            "--signer-key-path",
            "/tmp/key",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_values() {
        for args in [
            vec!["--contract-address", "0x1234"],
            vec!["--contract-address", CONTRACT, "--claim-strategy", "teleport"],
            vec!["--contract-address", CONTRACT, "--fallback-price-usd", "0"],
            vec!["--contract-address", CONTRACT, "--identity-hash", "sha256"],
        ] {
            let argv = std::iter::once("faucet-server").chain(args.iter().copied());
            assert!(Settings::try_parse_from(argv).is_err(), "{args:?} should be rejected");
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let settings = Settings::try_parse_from([
            "faucet-server",
            "--contract-address",
            CONTRACT,
            "--signer-key",
            KEY,
            "--admin-secret",
            "hunter2",
        ])
        .unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains(&KEY[2..]));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(settings.signer_key().unwrap(), KEY);
    }

    #[test]
    fn key_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("faucet-signer-{}.key", std::process::id()));
        fs::write(&path, format!("{KEY}\n")).unwrap();
        let settings = Settings::try_parse_from([
            "faucet-server",
            "--contract-address",
            CONTRACT,
            "--signer-key-path",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(settings.signer_key().unwrap(), KEY);
        fs::remove_file(path).unwrap();
    }
}
