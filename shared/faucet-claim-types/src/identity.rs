use core::fmt;
use core::str::FromStr;

use alloy_primitives::{keccak256, Address, B256, U256};

/// Numeric Farcaster identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fid(u64);

impl Fid {
    /// Returns `None` for zero, which is never a valid FID.
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fid {
    type Err = IdentityError;

    /// Accepts `1234` as well as the `farcaster:1234` form used by the signing scripts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw.strip_prefix(FARCASTER_PREFIX).unwrap_or(raw);
        let value: u64 = digits
            .parse()
            .map_err(|_| IdentityError::InvalidFid(s.to_string()))?;
        Fid::new(value).ok_or_else(|| IdentityError::InvalidFid(s.to_string()))
    }
}

const FARCASTER_PREFIX: &str = "farcaster:";

/// Who is claiming: a wallet or an externally verified social identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    Wallet(Address),
    Social(Fid),
}

/// How an identity is normalised into the 32-byte hash the verifying contract checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentityHashScheme {
    /// `keccak256("farcaster:" || fid)` over the UTF-8 string.
    #[default]
    PrefixedString,
    /// `keccak256(uint256(fid))`, the fid as a 32-byte big-endian word.
    Uint256,
}

impl Identity {
    /// Canonical store key: lower-case hex for wallets, `farcaster:<fid>` for FIDs.
    pub fn key(&self) -> String {
        match self {
            Identity::Wallet(address) => format!("{address:#x}"),
            Identity::Social(fid) => format!("{FARCASTER_PREFIX}{fid}"),
        }
    }

    pub fn hash(&self, scheme: IdentityHashScheme) -> B256 {
        match (self, scheme) {
            (Identity::Wallet(address), _) => keccak256(address.as_slice()),
            (Identity::Social(fid), IdentityHashScheme::PrefixedString) => {
                keccak256(format!("{FARCASTER_PREFIX}{fid}").as_bytes())
            }
            (Identity::Social(fid), IdentityHashScheme::Uint256) => {
                keccak256(U256::from(fid.get()).to_be_bytes::<32>())
            }
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl TryFrom<&str> for IdentityHashScheme {
    type Error = IdentityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let scheme = match value {
            "prefixed-string" => IdentityHashScheme::PrefixedString,
            "uint256" => IdentityHashScheme::Uint256,
            other => return Err(IdentityError::UnknownScheme(other.to_string())),
        };
        Ok(scheme)
    }
}

/// Parse a `0x`-prefixed, 40-hex-digit wallet address.
pub fn parse_wallet(s: &str) -> Result<Address, IdentityError> {
    let raw = s.trim();
    let hex_part = raw
        .strip_prefix("0x")
        .ok_or_else(|| IdentityError::InvalidAddress(s.to_string()))?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdentityError::InvalidAddress(s.to_string()));
    }
    Address::from_str(raw).map_err(|_| IdentityError::InvalidAddress(s.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("invalid fid: {0}")]
    InvalidFid(String),
    #[error("unknown identity hash scheme: {0}")]
    UnknownScheme(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fid_accepts_prefixed_and_bare_forms() {
        assert_eq!("1234".parse::<Fid>().unwrap().get(), 1234);
        assert_eq!("farcaster:1234".parse::<Fid>().unwrap().get(), 1234);
        assert!("0".parse::<Fid>().is_err());
        assert!("-5".parse::<Fid>().is_err());
        assert!("abc".parse::<Fid>().is_err());
    }

    #[test]
    fn prefixed_scheme_hashes_the_farcaster_string() {
        let fid = Fid::new(1234).unwrap();
        let hash = Identity::Social(fid).hash(IdentityHashScheme::PrefixedString);
        assert_eq!(hash, keccak256(b"farcaster:1234"));
    }

    #[test]
    fn uint256_scheme_hashes_a_padded_word() {
        let fid = Fid::new(7).unwrap();
        let mut word = [0u8; 32];
        word[31] = 7;
        let hash = Identity::Social(fid).hash(IdentityHashScheme::Uint256);
        assert_eq!(hash, keccak256(word));
        assert_ne!(hash, Identity::Social(fid).hash(IdentityHashScheme::PrefixedString));
    }

    #[test]
    fn wallet_key_is_lower_case() {
        let address = parse_wallet("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0").unwrap();
        assert_eq!(
            Identity::Wallet(address).key(),
            "0x742d35cc6634c0532925a3b844bc9e7595f0beb0"
        );
    }

    #[test]
    fn parse_wallet_rejects_bad_shapes() {
        assert!(parse_wallet("742d35Cc6634C0532925a3b844Bc9e7595f0bEb0").is_err());
        assert!(parse_wallet("0x742d35").is_err());
        assert!(parse_wallet("0xzz2d35Cc6634C0532925a3b844Bc9e7595f0bEb0").is_err());
    }
}
