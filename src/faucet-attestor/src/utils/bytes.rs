//! Fixed-width byte helpers.

use crate::errors::AttestationError;

/// Copy `bytes` into a fixed array, rejecting any other length.
pub fn fixed<const N: usize>(bytes: &[u8], field: &'static str) -> Result<[u8; N], AttestationError> {
    if bytes.len() != N {
        return Err(AttestationError::InvalidInputLength {
            field,
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Decode `0x`-prefixed (or bare) hex into exactly `N` bytes.
pub fn hex_fixed<const N: usize>(s: &str, field: &'static str) -> Result<[u8; N], AttestationError> {
    let raw = s.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|_| AttestationError::InvalidHex(field))?;
    fixed::<N>(&bytes, field)
}

/// Big-endian `uint256` word holding a `u64`.
pub fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..32].copy_from_slice(&value.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rejects_short_and_long_input() {
        assert!(fixed::<20>(&[0u8; 20], "recipient").is_ok());
        assert_eq!(
            fixed::<20>(&[0u8; 19], "recipient"),
            Err(AttestationError::InvalidInputLength {
                field: "recipient",
                expected: 20,
                actual: 19
            })
        );
        assert!(fixed::<20>(&[0u8; 21], "recipient").is_err());
    }

    #[test]
    fn hex_fixed_accepts_prefix_and_rejects_garbage() {
        let a = hex_fixed::<2>("0xabcd", "x").unwrap();
        let b = hex_fixed::<2>("abcd", "x").unwrap();
        assert_eq!(a, [0xab, 0xcd]);
        assert_eq!(a, b);
        assert_eq!(hex_fixed::<2>("0xzz", "x"), Err(AttestationError::InvalidHex("x")));
    }

    #[test]
    fn u64_word_is_right_aligned() {
        let word = u64_word(0x0102);
        assert!(word[..30].iter().all(|b| *b == 0));
        assert_eq!(&word[30..], &[0x01, 0x02]);
    }
}
