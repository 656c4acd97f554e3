//! Claim attestation payload, digest and signing.
//!
//! The verifying contract recomputes
//! `keccak256(abi.encodePacked(bytes32 identityHash, address recipient, uint256 expiry,
//! uint256 chainId, address verifyingContract))`, applies the EIP-191 prefix and checks that
//! `ecrecover` yields the configured attestor. The construction here must match bit-for-bit.

use core::fmt;

use alloy_primitives::{keccak256, Address, B256};
use faucet_claim_types::{Identity, IdentityHashScheme};
use k256::ecdsa::SigningKey;

use crate::constants::ATTESTATION_TTL_SECS;
use crate::errors::AttestationError;
use crate::utils::bytes::{fixed, u64_word};
use crate::utils::crypto::{address_of, recover_signer, sign_eth_message, signing_key_from_hex};

/// `bytes32 || address || uint256 || uint256 || address`, tightly packed.
pub const PAYLOAD_LEN: usize = 32 + 20 + 32 + 32 + 20;

/// A signed authorisation for one claim, valid on-chain until `expiry`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attestation {
    pub identity_hash: B256,
    pub recipient: Address,
    pub expiry: u64,
    pub chain_id: u64,
    pub verifying_contract: Address,
    /// `r || s || v`, `v` in {27, 28}.
    pub signature: [u8; 65],
}

impl Attestation {
    pub fn signature_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signature))
    }

    /// Unprefixed payload digest the signature commits to.
    pub fn digest(&self) -> B256 {
        keccak256(packed_payload(
            &self.identity_hash.0,
            &self.recipient.0 .0,
            self.expiry,
            self.chain_id,
            &self.verifying_contract.0 .0,
        ))
    }

    /// Address that produced `signature`.
    pub fn signer(&self) -> Result<Address, AttestationError> {
        recover_signer(&self.digest(), &self.signature)
    }
}

fn packed_payload(
    identity_hash: &[u8; 32],
    recipient: &[u8; 20],
    expiry: u64,
    chain_id: u64,
    verifying_contract: &[u8; 20],
) -> [u8; PAYLOAD_LEN] {
    let mut buf = [0u8; PAYLOAD_LEN];
    buf[0..32].copy_from_slice(identity_hash);
    buf[32..52].copy_from_slice(recipient);
    buf[52..84].copy_from_slice(&u64_word(expiry));
    buf[84..116].copy_from_slice(&u64_word(chain_id));
    buf[116..136].copy_from_slice(verifying_contract);
    buf
}

/// Build the canonical payload, rejecting inputs of the wrong width.
pub fn attestation_payload(
    identity_hash: &[u8],
    recipient: &[u8],
    expiry: u64,
    chain_id: u64,
    verifying_contract: &[u8],
) -> Result<[u8; PAYLOAD_LEN], AttestationError> {
    let identity_hash = fixed::<32>(identity_hash, "identity hash")?;
    let recipient = fixed::<20>(recipient, "recipient")?;
    let verifying_contract = fixed::<20>(verifying_contract, "verifying contract")?;
    Ok(packed_payload(
        &identity_hash,
        &recipient,
        expiry,
        chain_id,
        &verifying_contract,
    ))
}

/// `keccak256(payload)`, before the EIP-191 prefix.
pub fn attestation_digest(
    identity_hash: &[u8],
    recipient: &[u8],
    expiry: u64,
    chain_id: u64,
    verifying_contract: &[u8],
) -> Result<B256, AttestationError> {
    attestation_payload(identity_hash, recipient, expiry, chain_id, verifying_contract)
        .map(keccak256)
}

/// Sign exactly what was given. Expiry is not checked here; the contract enforces it.
pub fn sign(
    identity_hash: &[u8],
    recipient: &[u8],
    expiry: u64,
    chain_id: u64,
    verifying_contract: &[u8],
    signing_key: &SigningKey,
) -> Result<[u8; 65], AttestationError> {
    let digest = attestation_digest(identity_hash, recipient, expiry, chain_id, verifying_contract)?;
    sign_eth_message(signing_key, &digest)
}

/// Server-side attestor bound to one chain and verifying contract.
#[derive(Clone)]
pub struct AttestationSigner {
    key: SigningKey,
    address: Address,
    chain_id: u64,
    verifying_contract: Address,
    scheme: IdentityHashScheme,
    ttl_secs: u64,
}

impl AttestationSigner {
    pub fn new(key: SigningKey, chain_id: u64, verifying_contract: Address) -> Self {
        let address = address_of(key.verifying_key());
        Self {
            key,
            address,
            chain_id,
            verifying_contract,
            scheme: IdentityHashScheme::default(),
            ttl_secs: ATTESTATION_TTL_SECS,
        }
    }

    pub fn from_hex(
        key_hex: &str,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Result<Self, AttestationError> {
        Ok(Self::new(signing_key_from_hex(key_hex)?, chain_id, verifying_contract))
    }

    pub fn with_scheme(mut self, scheme: IdentityHashScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    pub fn scheme(&self) -> IdentityHashScheme {
        self.scheme
    }

    /// Attest a claim by `identity` paying `recipient`, valid for the configured TTL from `now`.
    pub fn attest(
        &self,
        identity: &Identity,
        recipient: Address,
        now: u64,
    ) -> Result<Attestation, AttestationError> {
        let expiry = now.saturating_add(self.ttl_secs);
        self.attest_until(identity.hash(self.scheme), recipient, expiry)
    }

    pub fn attest_until(
        &self,
        identity_hash: B256,
        recipient: Address,
        expiry: u64,
    ) -> Result<Attestation, AttestationError> {
        let signature = sign(
            identity_hash.as_slice(),
            recipient.as_slice(),
            expiry,
            self.chain_id,
            self.verifying_contract.as_slice(),
            &self.key,
        )?;
        Ok(Attestation {
            identity_hash,
            recipient,
            expiry,
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract,
            signature,
        })
    }
}

impl fmt::Debug for AttestationSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttestationSigner")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("verifying_contract", &self.verifying_contract)
            .field("scheme", &self.scheme)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
