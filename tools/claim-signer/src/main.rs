use std::fs;
use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use faucet_attestor::constants::{ATTESTATION_TTL_SECS, DEFAULT_CHAIN_ID};
use faucet_attestor::utils::unix_now;
use faucet_attestor::{Attestation, AttestationSigner};
use faucet_claim_types::{parse_wallet, Fid, Identity, IdentityHashScheme};
use serde::Serialize;

/// Sign a claim attestation for a Farcaster ID and print what the client submits to `claim`.
///
/// The signature is recovered before printing, so a bad key or layout fails here rather than
/// on-chain.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Farcaster ID, either `1234` or `farcaster:1234`.
    #[arg(long)]
    farcaster_id: Fid,

    /// Wallet receiving the payout.
    #[arg(long, value_parser = parse_wallet)]
    wallet: Address,

    /// Faucet contract that verifies the attestation.
    #[arg(long, env = "CONTRACT_ADDRESS", value_parser = parse_wallet)]
    contract: Address,

    #[arg(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,

    /// Absolute expiry in unix seconds. Defaults to now + `--ttl-secs`.
    #[arg(long, conflicts_with = "ttl_secs")]
    expiry: Option<u64>,

    #[arg(long, default_value_t = ATTESTATION_TTL_SECS)]
    ttl_secs: u64,

    /// Hash the FID as a 32-byte word instead of the `farcaster:<fid>` string.
    #[arg(long)]
    uint256_identity: bool,

    /// Path to a file containing the attestor private key.
    #[arg(long, env = "SIGNER_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<PathBuf>,

    /// Attestor private key (hex string, 0x...).
    #[arg(long, env = "SIGNER_PRIVATE_KEY", conflicts_with = "private_key_path")]
    private_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedClaim {
    farcaster_id_hash: String,
    recipient: String,
    expiry: u64,
    chain_id: u64,
    contract: String,
    signature: String,
    signer: String,
}

impl SignedClaim {
    fn new(attestation: &Attestation, signer: Address) -> Self {
        Self {
            farcaster_id_hash: format!("{:#x}", attestation.identity_hash),
            recipient: format!("{:#x}", attestation.recipient),
            expiry: attestation.expiry,
            chain_id: attestation.chain_id,
            contract: format!("{:#x}", attestation.verifying_contract),
            signature: attestation.signature_hex(),
            signer: format!("{signer:#x}"),
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let signed = sign_claim(&cli, unix_now())?;
    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(())
}

fn signer_key(cli: &Cli) -> Result<String> {
    if let Some(path) = &cli.private_key_path {
        let key = fs::read_to_string(path)
            .with_context(|| format!("failed reading key from {}", path.display()))?;
        return Ok(key.trim().to_string());
    }
    cli.private_key.clone().ok_or_else(|| {
        anyhow!(
            "missing attestor key: provide --private-key-path or --private-key (or set SIGNER_KEY_PATH/SIGNER_PRIVATE_KEY)"
        )
    })
}

fn sign_claim(cli: &Cli, now: u64) -> Result<SignedClaim> {
    let scheme = if cli.uint256_identity {
        IdentityHashScheme::Uint256
    } else {
        IdentityHashScheme::PrefixedString
    };
    let signer = AttestationSigner::from_hex(&signer_key(cli)?, cli.chain_id, cli.contract)
        .context("invalid attestor key")?
        .with_scheme(scheme);

    let expiry = cli.expiry.unwrap_or_else(|| now.saturating_add(cli.ttl_secs));
    if expiry <= now {
        bail!("expiry {expiry} is not in the future");
    }
    let identity = Identity::Social(cli.farcaster_id);
    let attestation = signer
        .attest_until(identity.hash(scheme), cli.wallet, expiry)
        .context("signing failed")?;

    let recovered = attestation.signer().context("signature does not recover")?;
    if recovered != signer.address() {
        bail!(
            "recovered signer {recovered:#x} does not match attestor {:#x}",
            signer.address()
        );
    }

    Ok(SignedClaim::new(&attestation, recovered))
}
