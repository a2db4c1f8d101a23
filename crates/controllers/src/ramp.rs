//! Gradual ramps
//!
//! Plans the endpoints of a linear fee or weight ramp, bounds-checks them, and
//! hands them to the pool. How intermediate values are computed is the pool's
//! job. A ramp descriptor lives only for the duration of one controller call.

use tracing::debug;

use crate::constants::{MAX_SWAP_FEE_PERCENTAGE, MAX_WEIGHT, MIN_SWAP_FEE_PERCENTAGE, MIN_WEIGHT, ONE};
use crate::errors::{ControllerError, CoreResult};
use crate::interfaces::ManagedPool;
use crate::math::checked_sum;
use crate::types::{TokenId, UnixTimestamp};

/// Closed time window `[start_time, end_time]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct RampWindow {
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
}

impl RampWindow {
    pub fn new(start_time: UnixTimestamp, end_time: UnixTimestamp) -> CoreResult<Self> {
        if start_time > end_time {
            return Err(ControllerError::InvalidRampWindow {
                start_time,
                end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    /// Window `[now, now + duration]`
    pub fn starting_at(now: UnixTimestamp, duration: i64) -> CoreResult<Self> {
        if duration < 0 {
            return Err(ControllerError::InvalidDuration {
                name: "ramp_duration",
                value: duration,
            });
        }
        let end_time = now
            .checked_add(duration)
            .ok_or(ControllerError::MathOverflow)?;
        Self::new(now, end_time)
    }

    pub fn duration(&self) -> CoreResult<i64> {
        self.end_time
            .checked_sub(self.start_time)
            .ok_or(ControllerError::MathOverflow)
    }

    pub fn has_elapsed(&self, now: UnixTimestamp) -> bool {
        now >= self.end_time
    }
}

/// Planned swap fee ramp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeRamp {
    pub window: RampWindow,
    pub start_swap_fee: u128,
    pub end_swap_fee: u128,
}

impl FeeRamp {
    /// Issue the single gradual-update call to the pool
    pub fn execute<P: ManagedPool + ?Sized>(&self, pool: &mut P) -> CoreResult<()> {
        debug!(
            start_time = self.window.start_time,
            end_time = self.window.end_time,
            start_swap_fee = %self.start_swap_fee,
            end_swap_fee = %self.end_swap_fee,
            "issuing swap fee ramp"
        );
        pool.update_swap_fee_gradually(
            self.window.start_time,
            self.window.end_time,
            self.start_swap_fee,
            self.end_swap_fee,
        )?;
        Ok(())
    }
}

/// Planned weight ramp
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightRamp {
    pub window: RampWindow,
    pub tokens: Vec<TokenId>,
    pub end_weights: Vec<u128>,
}

impl WeightRamp {
    /// Issue the single gradual-update call to the pool
    pub fn execute<P: ManagedPool + ?Sized>(&self, pool: &mut P) -> CoreResult<()> {
        debug!(
            start_time = self.window.start_time,
            end_time = self.window.end_time,
            tokens = self.tokens.len(),
            "issuing weight ramp"
        );
        pool.update_weights_gradually(
            self.window.start_time,
            self.window.end_time,
            &self.tokens,
            &self.end_weights,
        )?;
        Ok(())
    }
}

/// Plan a fee ramp over `[now, now + duration]`.
///
/// The fees themselves are not bounds-checked here; the pool enforces its own
/// limits and controllers only pass configured constants.
pub fn plan_fee_ramp(
    now: UnixTimestamp,
    duration: i64,
    start_swap_fee: u128,
    end_swap_fee: u128,
) -> CoreResult<FeeRamp> {
    Ok(FeeRamp {
        window: RampWindow::starting_at(now, duration)?,
        start_swap_fee,
        end_swap_fee,
    })
}

/// Plan a weight ramp over `[now, now + duration]` toward `end_weights`,
/// which are passed on untouched once validated.
pub fn plan_weight_ramp(
    now: UnixTimestamp,
    duration: i64,
    tokens: &[TokenId],
    end_weights: &[u128],
) -> CoreResult<WeightRamp> {
    plan_weight_ramp_within(RampWindow::starting_at(now, duration)?, tokens, end_weights)
}

/// Plan a weight ramp over an explicit window
pub fn plan_weight_ramp_within(
    window: RampWindow,
    tokens: &[TokenId],
    end_weights: &[u128],
) -> CoreResult<WeightRamp> {
    if tokens.len() != end_weights.len() {
        return Err(ControllerError::WeightCountMismatch {
            weights: end_weights.len(),
            tokens: tokens.len(),
        });
    }
    validate_normalized_weights(end_weights)?;

    Ok(WeightRamp {
        window,
        tokens: tokens.to_vec(),
        end_weights: end_weights.to_vec(),
    })
}

/// Every weight must lie in `[MIN_WEIGHT, MAX_WEIGHT]` and the vector must sum
/// to exactly `ONE`. No tolerance: rounding drift is rejected.
pub fn validate_normalized_weights(weights: &[u128]) -> CoreResult<()> {
    for (index, &weight) in weights.iter().enumerate() {
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
            return Err(ControllerError::WeightOutOfBounds { index, weight });
        }
    }

    let sum = checked_sum(weights)?;
    if sum != ONE {
        return Err(ControllerError::WeightsMustSumToOne { sum });
    }

    Ok(())
}

/// Swap fee must lie within the protocol bounds
pub fn validate_swap_fee(swap_fee: u128) -> CoreResult<()> {
    if !(MIN_SWAP_FEE_PERCENTAGE..=MAX_SWAP_FEE_PERCENTAGE).contains(&swap_fee) {
        return Err(ControllerError::SwapFeeOutOfBounds(swap_fee));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DAY;
    use crate::math::from_percent;
    use crate::types::Address;

    fn two_tokens() -> Vec<TokenId> {
        vec![Address::repeat_byte(1), Address::repeat_byte(2)]
    }

    #[test]
    fn test_fee_ramp_window() {
        let ramp = plan_fee_ramp(100, 7 * DAY, from_percent(90), from_percent(1)).unwrap();
        assert_eq!(ramp.window, RampWindow::new(100, 100 + 7 * DAY).unwrap());
        assert_eq!(ramp.window.duration().unwrap(), 7 * DAY);
        assert!(!ramp.window.has_elapsed(100 + 7 * DAY - 1));
        assert!(ramp.window.has_elapsed(100 + 7 * DAY));
    }

    #[test]
    fn test_weight_ramp_passes_weights_through() {
        let weights = vec![from_percent(80), from_percent(20)];
        let ramp = plan_weight_ramp(5, DAY, &two_tokens(), &weights).unwrap();

        assert_eq!(ramp.window.start_time, 5);
        assert_eq!(ramp.window.end_time, 5 + DAY);
        assert_eq!(ramp.end_weights, weights);
        assert_eq!(ramp.tokens, two_tokens());
    }

    #[test]
    fn test_weight_bounds_are_inclusive() {
        assert!(validate_normalized_weights(&[MIN_WEIGHT, MAX_WEIGHT]).is_ok());
        assert_eq!(
            validate_normalized_weights(&[MIN_WEIGHT - 1, MAX_WEIGHT + 1]),
            Err(ControllerError::WeightOutOfBounds {
                index: 0,
                weight: MIN_WEIGHT - 1
            })
        );
    }

    #[test]
    fn test_weight_sum_must_be_exact() {
        let drifted = [from_percent(50), from_percent(50) - 1];
        assert_eq!(
            validate_normalized_weights(&drifted),
            Err(ControllerError::WeightsMustSumToOne { sum: ONE - 1 })
        );
        assert!(validate_normalized_weights(&[]).is_err());
    }

    #[test]
    fn test_weight_count_must_match_tokens() {
        let result = plan_weight_ramp(0, DAY, &two_tokens(), &[from_percent(50); 3]);
        assert_eq!(
            result,
            Err(ControllerError::WeightCountMismatch {
                weights: 3,
                tokens: 2
            })
        );
    }

    #[test]
    fn test_negative_duration_rejected() {
        assert!(plan_fee_ramp(0, -1, 0, 0).is_err());
        assert!(RampWindow::new(10, 9).is_err());
    }

    #[test]
    fn test_swap_fee_bounds() {
        assert!(validate_swap_fee(MIN_SWAP_FEE_PERCENTAGE).is_ok());
        assert!(validate_swap_fee(MAX_SWAP_FEE_PERCENTAGE).is_ok());
        assert!(validate_swap_fee(MIN_SWAP_FEE_PERCENTAGE - 1).is_err());
        assert!(validate_swap_fee(MAX_SWAP_FEE_PERCENTAGE + 1).is_err());
    }
}
