//! 18-decimal fixed-point numbers for fiat values and prices.
//!
//! Values are parsed from and rendered to decimal strings through alloy's unit helpers, so
//! no binary floating point is involved anywhere between the price feed and the payout.

use core::fmt;
use core::str::FromStr;

use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use alloy_primitives::U256;

/// Unsigned fixed-point number with 18 fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wad(U256);

impl Wad {
    pub const DECIMALS: u8 = 18;
    pub const ZERO: Wad = Wad(U256::ZERO);

    /// `10^18`, the raw representation of `1.0`.
    pub fn scale() -> U256 {
        U256::from(10u64).pow(U256::from(Self::DECIMALS))
    }

    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> U256 {
        self.0
    }

    pub fn from_integer(value: u64) -> Self {
        Self(U256::from(value) * Self::scale())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn abs_diff(self, other: Wad) -> Wad {
        if self.0 >= other.0 {
            Wad(self.0 - other.0)
        } else {
            Wad(other.0 - self.0)
        }
    }
}

impl FromStr for Wad {
    type Err = WadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(WadError::Malformed(s.to_string()));
        }
        match parse_units(trimmed, Self::DECIMALS) {
            Ok(ParseUnits::U256(raw)) => Ok(Wad(raw)),
            Ok(ParseUnits::I256(_)) => Err(WadError::Negative(s.to_string())),
            Err(_) => Err(WadError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_units(self.0, Self::DECIMALS) {
            Ok(s) => f.write_str(trim_fraction(&s)),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

/// Drop trailing fractional zeros (and a dangling point): `"0.100"` -> `"0.1"`, `"2.000"` -> `"2"`.
pub fn trim_fraction(s: &str) -> &str {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.')
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WadError {
    #[error("malformed decimal: {0}")]
    Malformed(String),
    #[error("negative decimal: {0}")]
    Negative(String),
}
