//! secp256k1 helpers for EIP-191 personal-message signatures.
//!
//! Purpose: produce signatures the verifying contract accepts via
//! `ecrecover(keccak256("\x19Ethereum Signed Message:\n32" || digest), v, r, s)`, and recover
//! them off-chain the same way.

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::errors::AttestationError;
use crate::utils::bytes::hex_fixed;

/// EIP-191 prefix for a 32-byte message.
pub const EIP191_PREFIX_32: &[u8] = b"\x19Ethereum Signed Message:\n32";

fn eth_message_hasher(digest: &B256) -> Keccak256 {
    let mut h = Keccak256::new();
    h.update(EIP191_PREFIX_32);
    h.update(digest.as_slice());
    h
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || digest)`.
pub fn eth_message_hash(digest: &B256) -> B256 {
    B256::from_slice(eth_message_hasher(digest).finalize().as_slice())
}

/// Parse a 32-byte private key from hex (`0x` prefix optional).
pub fn signing_key_from_hex(s: &str) -> Result<SigningKey, AttestationError> {
    let bytes = hex_fixed::<32>(s, "signing key").map_err(|_| AttestationError::InvalidKey)?;
    SigningKey::from_slice(&bytes).map_err(|_| AttestationError::InvalidKey)
}

/// Ethereum address of a public key: low 20 bytes of `keccak256(x || y)`.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Sign `digest` as an EIP-191 personal message. Returns `r || s || v` with `v` in {27, 28}.
///
/// RFC6979 nonces make the output deterministic for a given key and digest.
pub fn sign_eth_message(key: &SigningKey, digest: &B256) -> Result<[u8; 65], AttestationError> {
    let (signature, recovery_id) = key
        .sign_digest_recoverable(eth_message_hasher(digest))
        .map_err(|_| AttestationError::SigningFailed)?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(signature.to_bytes().as_slice());
    out[64] = recovery_id.to_byte() + 27;
    Ok(out)
}

/// Recover the signer of an EIP-191 signature over `digest`.
///
/// Accepts `v` in {0, 1, 27, 28}; any other `v` tries both parities.
pub fn recover_signer(digest: &B256, sig: &[u8; 65]) -> Result<Address, AttestationError> {
    let signature =
        Signature::from_slice(&sig[..64]).map_err(|_| AttestationError::RecoveryFailed)?;
    let prehash = eth_message_hash(digest);

    let candidates: &[u8] = match sig[64] {
        27 | 28 => &sig[64..65],
        0 => &[27],
        1 => &[28],
        _ => &[27, 28],
    };

    for v in candidates {
        let Some(recovery_id) = RecoveryId::from_byte(v - 27) else {
            continue;
        };
        if let Ok(key) =
            VerifyingKey::recover_from_prehash(prehash.as_slice(), &signature, recovery_id)
        {
            return Ok(address_of(&key));
        }
    }

    Err(AttestationError::RecoveryFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat account #0.
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn derives_the_well_known_address() {
        let key = signing_key_from_hex(KEY).unwrap();
        assert_eq!(format!("{:#x}", address_of(key.verifying_key())), ADDRESS);
    }

    #[test]
    fn rejects_bad_keys() {
        assert!(matches!(
            signing_key_from_hex("0x1234"),
            Err(AttestationError::InvalidKey)
        ));
        assert!(matches!(
            signing_key_from_hex(&format!("0x{}", "00".repeat(32))),
            Err(AttestationError::InvalidKey)
        ));
    }

    #[test]
    fn sign_then_recover() {
        let key = signing_key_from_hex(KEY).unwrap();
        let digest = keccak256(b"faucet");
        let sig = sign_eth_message(&key, &digest).unwrap();
        assert!(sig[64] == 27 || sig[64] == 28);
        assert_eq!(
            recover_signer(&digest, &sig).unwrap(),
            address_of(key.verifying_key())
        );

        let mut zero_based = sig;
        zero_based[64] -= 27;
        assert_eq!(
            recover_signer(&digest, &zero_based).unwrap(),
            address_of(key.verifying_key())
        );
    }

    #[test]
    fn recovery_from_another_digest_yields_another_address() {
        let key = signing_key_from_hex(KEY).unwrap();
        let sig = sign_eth_message(&key, &keccak256(b"faucet")).unwrap();
        let other = recover_signer(&keccak256(b"tampered"), &sig);
        assert_ne!(other.ok(), Some(address_of(key.verifying_key())));
    }
}
