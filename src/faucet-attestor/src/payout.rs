//! USD-pegged payout conversion.
//!
//! All arithmetic is integer arithmetic over [`Wad`] (18-decimal fixed point) and `U256`
//! smallest units. Every division floors, so a computed payout never exceeds the target value.

use alloy_primitives::utils::format_units;
use alloy_primitives::U256;
use faucet_claim_types::decimal::trim_fraction;
use faucet_claim_types::{PriceQuote, Wad};

use crate::errors::PayoutError;

/// Suggested on-chain claim amount for a target fiat value at a given price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recommendation {
    pub wei_amount: U256,
    /// `wei_amount` rendered in whole units, trailing zeros trimmed.
    pub eth_amount: String,
    pub usd_value: Wad,
    pub price: PriceQuote,
}

fn unit(decimals: u8) -> Result<U256, PayoutError> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or(PayoutError::Overflow)
}

/// `floor(target * 10^decimals / price)`.
pub fn compute_payout_amount(
    target: Wad,
    price: &PriceQuote,
    decimals: u8,
) -> Result<U256, PayoutError> {
    if price.value.is_zero() {
        return Err(PayoutError::InvalidPrice);
    }
    if target.is_zero() {
        return Err(PayoutError::InvalidTarget);
    }
    let scaled = target
        .raw()
        .checked_mul(unit(decimals)?)
        .ok_or(PayoutError::Overflow)?;
    Ok(scaled / price.value.raw())
}

/// `floor(amount * price / 10^decimals)`.
pub fn to_fiat_value(amount: U256, price: &PriceQuote, decimals: u8) -> Result<Wad, PayoutError> {
    if price.value.is_zero() {
        return Err(PayoutError::InvalidPrice);
    }
    let scaled = amount
        .checked_mul(price.value.raw())
        .ok_or(PayoutError::Overflow)?;
    Ok(Wad::from_raw(scaled / unit(decimals)?))
}

/// Relative deviation `|fiat(current) - target| / target`, floored to 18 decimals.
pub fn deviation(
    current: U256,
    target: Wad,
    price: &PriceQuote,
    decimals: u8,
) -> Result<Wad, PayoutError> {
    if target.is_zero() {
        return Err(PayoutError::InvalidTarget);
    }
    let diff = to_fiat_value(current, price, decimals)?.abs_diff(target);
    let scaled = diff
        .raw()
        .checked_mul(Wad::scale())
        .ok_or(PayoutError::Overflow)?;
    Ok(Wad::from_raw(scaled / target.raw()))
}

/// True iff the current amount is worth more than `tolerance` away from `target`.
///
/// Compared by cross-multiplication so that a deviation of exactly `tolerance` is not an update.
pub fn needs_update(
    current: U256,
    target: Wad,
    price: &PriceQuote,
    decimals: u8,
    tolerance: Wad,
) -> Result<bool, PayoutError> {
    if target.is_zero() {
        return Err(PayoutError::InvalidTarget);
    }
    let diff = to_fiat_value(current, price, decimals)?.abs_diff(target);
    let lhs = diff
        .raw()
        .checked_mul(Wad::scale())
        .ok_or(PayoutError::Overflow)?;
    let rhs = tolerance
        .raw()
        .checked_mul(target.raw())
        .ok_or(PayoutError::Overflow)?;
    Ok(lhs > rhs)
}

/// Payout plus display strings for the admin and claim-amount routes.
pub fn recommend(
    target: Wad,
    price: &PriceQuote,
    decimals: u8,
) -> Result<Recommendation, PayoutError> {
    let wei_amount = compute_payout_amount(target, price, decimals)?;
    Ok(Recommendation {
        wei_amount,
        eth_amount: format_amount(wei_amount, decimals),
        usd_value: target,
        price: *price,
    })
}

/// Render smallest units as a trimmed decimal string in whole units.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    match format_units(amount, decimals) {
        Ok(s) => trim_fraction(&s).to_string(),
        Err(_) => amount.to_string(),
    }
}
