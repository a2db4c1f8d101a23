/// 18-decimal fixed-point arithmetic used for weights and swap fees.
/// All operations are checked; nothing here rounds silently upwards.
use crate::constants::ONE;
use crate::errors::{ControllerError, CoreResult};
use crate::types::UnixTimestamp;

/// Number of fractional decimal digits
pub const DECIMALS: u32 = 18;

/// Convert a whole percentage into fixed point (`50` -> 0.5)
pub const fn from_percent(percent: u128) -> u128 {
    percent * (ONE / 100)
}

/// Exact sum of a slice of fixed-point values
pub fn checked_sum(values: &[u128]) -> CoreResult<u128> {
    values.iter().try_fold(0u128, |acc, value| {
        acc.checked_add(*value).ok_or(ControllerError::MathOverflow)
    })
}

/// `a * b`, rounded down
pub fn mul_down(a: u128, b: u128) -> CoreResult<u128> {
    a.checked_mul(b)
        .map(|product| product / ONE)
        .ok_or(ControllerError::MathOverflow)
}

/// `a / b`, rounded down
pub fn div_down(a: u128, b: u128) -> CoreResult<u128> {
    if b == 0 {
        return Err(ControllerError::MathOverflow);
    }
    a.checked_mul(ONE)
        .map(|scaled| scaled / b)
        .ok_or(ControllerError::MathOverflow)
}

/// Fraction of `[start_time, end_time]` that has elapsed at `now`, clamped to `[0, ONE]`
pub fn elapsed_fraction(
    now: UnixTimestamp,
    start_time: UnixTimestamp,
    end_time: UnixTimestamp,
) -> CoreResult<u128> {
    if now <= start_time {
        return Ok(0);
    }
    if now >= end_time {
        return Ok(ONE);
    }
    // start_time < now < end_time; abs_diff keeps windows wider than i64::MAX exact
    let elapsed = u128::from(now.abs_diff(start_time));
    let total = u128::from(end_time.abs_diff(start_time));
    div_down(elapsed, total)
}

/// Linear interpolation from `start` toward `end` by `fraction` (fixed point)
pub fn interpolate(start: u128, end: u128, fraction: u128) -> CoreResult<u128> {
    if fraction >= ONE {
        return Ok(end);
    }
    if end >= start {
        let delta = mul_down(end - start, fraction)?;
        start.checked_add(delta).ok_or(ControllerError::MathOverflow)
    } else {
        let delta = mul_down(start - end, fraction)?;
        Ok(start - delta)
    }
}

/// Parse a decimal string such as `"0.3"` or `"1"` into fixed point, exactly.
/// More than 18 fractional digits is an error rather than a rounding.
pub fn parse_decimal(text: &str) -> CoreResult<u128> {
    let invalid = || ControllerError::InvalidDecimal(text.to_string());
    let trimmed = text.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > DECIMALS as usize {
        return Err(invalid());
    }

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction_value: u128 = if fraction.is_empty() {
        0
    } else {
        let scale = 10u128.pow(DECIMALS - fraction.len() as u32);
        fraction.parse::<u128>().map_err(|_| invalid())? * scale
    };

    whole_value
        .checked_mul(ONE)
        .and_then(|scaled| scaled.checked_add(fraction_value))
        .ok_or_else(invalid)
}

/// Render a fixed-point value as a decimal string without trailing zeros
pub fn format_decimal(value: u128) -> String {
    let whole = value / ONE;
    let fraction = value % ONE;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:018}", fraction);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
