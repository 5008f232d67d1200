//! Conversion between user-entered decimal strings and fixed-point on-chain
//! amounts, plus the slippage math that has to stay in integer space.

use ethers::types::U256;

use crate::error::{ AppError, Result };

/// 10^77 is the largest power of ten that fits in 256 bits.
pub const MAX_DECIMALS: u8 = 77;

pub const MIN_SWAP_AMOUNT: f64 = 0.000001;
pub const MAX_SWAP_AMOUNT: f64 = 1e12;

pub const MAX_SLIPPAGE_PERCENT: f64 = 50.0;

/// Slippage is applied in millionths of a percent.
const SLIPPAGE_UNITS_PER_PERCENT: f64 = 1_000_000.0;
const SLIPPAGE_DENOMINATOR: u64 = 100_000_000;

/// Parse a non-negative decimal string into an integer scaled by 10^decimals.
///
/// Fractional digits beyond `decimals` are rejected unless they are all zero.
pub fn encode(amount: &str, decimals: u8) -> Result<U256> {
    if decimals > MAX_DECIMALS {
        return Err(AppError::InvalidAmount(format!("Unsupported token precision: {}", decimals)));
    }

    let amount = amount.trim();
    let (int_part, frac_part) = match amount.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (amount, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AppError::InvalidAmount(format!("\"{}\" is not a number", amount)));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidAmount(format!("\"{}\" is not a valid decimal amount", amount)));
    }

    let decimals = decimals as usize;
    let frac_part = if frac_part.len() > decimals {
        let (kept, dropped) = frac_part.split_at(decimals);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(
                AppError::InvalidAmount(
                    format!("\"{}\" has more than {} decimal places", amount, decimals)
                )
            );
        }
        kept
    } else {
        frac_part
    };

    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len()..decimals {
        digits.push('0');
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_dec_str(digits).map_err(|_| AppError::InvalidAmount(format!("\"{}\" is too large", amount)))
}

/// Render a fixed-point integer as a decimal string, without trailing zeros.
pub fn decode(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw;
    }

    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - raw.len() + 1), raw)
    } else {
        raw
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Display-only float projection of a fixed-point amount.
pub fn to_f64(value: U256, decimals: u8) -> f64 {
    decode(value, decimals).parse().unwrap_or_default()
}

/// An empty field or a zero amount means "no quote wanted", not an error.
pub fn is_zero_amount(amount: &str) -> bool {
    let amount = amount.trim();
    amount.is_empty() || amount.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

/// Sanity bounds applied before a quote is requested.
pub fn validate_swap_amount(amount: &str, symbol: &str) -> Result<()> {
    let value: f64 = amount.trim().parse().unwrap_or(f64::NAN);

    if value.is_nan() || value <= 0.0 {
        return Err(AppError::InvalidAmount("Amount must be greater than 0".to_string()));
    }
    if value < MIN_SWAP_AMOUNT {
        return Err(
            AppError::InvalidAmount(
                format!("Amount too small. Minimum is {} {}", MIN_SWAP_AMOUNT, symbol)
            )
        );
    }
    if value > MAX_SWAP_AMOUNT {
        return Err(AppError::InvalidAmount("Amount too large".to_string()));
    }

    Ok(())
}

pub fn validate_slippage(slippage: f64) -> Result<()> {
    if !slippage.is_finite() || slippage < 0.0 || slippage > MAX_SLIPPAGE_PERCENT {
        return Err(
            AppError::InvalidInput(
                format!("Slippage must be between 0% and {}%", MAX_SLIPPAGE_PERCENT)
            )
        );
    }
    Ok(())
}

/// Slippage percentage in millionths of a percent, e.g. 0.5% -> 500_000.
/// Differences finer than 0.000001% collapse to the same value.
pub fn slippage_units(slippage: f64) -> Result<u64> {
    validate_slippage(slippage)?;
    Ok((slippage * SLIPPAGE_UNITS_PER_PERCENT).round() as u64)
}

/// Lowest acceptable output: `quoted * (100 - slippage) / 100`, floored,
/// computed without leaving integer space.
pub fn min_output(quoted: U256, slippage: f64) -> Result<U256> {
    let keep = U256::from(SLIPPAGE_DENOMINATOR - slippage_units(slippage)?);
    let denominator = U256::from(SLIPPAGE_DENOMINATOR);

    // Split first so the multiplication cannot overflow for large amounts.
    let whole = quoted / denominator;
    let rest = quoted % denominator;
    Ok(whole * keep + (rest * keep) / denominator)
}
