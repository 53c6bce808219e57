//! Utility functions and helpers

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use solana_sdk::pubkey::Pubkey;

use crate::shared::errors::AmountError;

/// Largest scale `rust_decimal` can represent
const MAX_DECIMALS: u8 = 28;

/// Convert a smallest-unit amount into its exact display amount
pub fn from_smallest_unit(raw_amount: u64, decimals: u8) -> Result<Decimal, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    Decimal::try_from_i128_with_scale(raw_amount as i128, decimals as u32)
        .map_err(|_| AmountError::UnsupportedDecimals(decimals))
}

/// Convert a display amount into smallest units, flooring any remainder
pub fn to_smallest_unit(display_amount: Decimal, decimals: u8) -> Result<u64, AmountError> {
    if display_amount.is_sign_negative() && !display_amount.is_zero() {
        return Err(AmountError::Negative(display_amount.to_string()));
    }
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }

    let overflow = || AmountError::Overflow {
        amount: display_amount.to_string(),
        decimals,
    };

    let multiplier = Decimal::TEN
        .checked_powu(decimals as u64)
        .ok_or(AmountError::UnsupportedDecimals(decimals))?;
    let scaled = display_amount.checked_mul(multiplier).ok_or_else(overflow)?;

    scaled.floor().to_u64().ok_or_else(overflow)
}

/// Shorten a pubkey for log lines
pub fn short_pubkey(key: &Pubkey) -> String {
    let s = key.to_string();
    if s.len() <= 12 {
        return s;
    }
    format!("{}...{}", &s[..4], &s[s.len() - 4..])
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
