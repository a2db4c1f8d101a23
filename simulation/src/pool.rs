//! Managed pool that interpolates its own ramps
//!
//! Swap fee and normalized weights are stored as ramp endpoints and evaluated
//! against the pool's clock on every read, the way a managed weighted pool does
//! it on chain. The ledger moves the clock; the pool never reads wall time.

use std::collections::BTreeSet;

use managed_pool_controllers::math::{
    checked_sum, div_down, elapsed_fraction, interpolate, mul_down,
};
use managed_pool_controllers::ramp::validate_swap_fee;
use managed_pool_controllers::{
    validate_normalized_weights, Address, ControllerError, CoreResult, FeeRampParams,
    ManagedPool, PoolError, PoolId, TokenId, UnixTimestamp, WeightRampParams, MAX_WEIGHT,
    MIN_WEIGHT, ONE,
};
use tracing::debug;

const MIN_POOL_TOKENS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedPool {
    pool_id: PoolId,
    tokens: Vec<TokenId>,
    now: UnixTimestamp,
    swap_enabled: bool,
    fee_ramp: FeeRampParams,
    weight_ramp: WeightRampParams,
    must_allowlist_lps: bool,
    allowlist: BTreeSet<Address>,
}

impl SimulatedPool {
    /// A pool with fixed starting weights and swap fee, clock at zero
    pub fn new(
        pool_id: PoolId,
        tokens: Vec<TokenId>,
        weights: Vec<u128>,
        swap_fee: u128,
        swap_enabled: bool,
    ) -> CoreResult<Self> {
        if tokens.len() != weights.len() {
            return Err(ControllerError::WeightCountMismatch {
                weights: weights.len(),
                tokens: tokens.len(),
            });
        }
        validate_normalized_weights(&weights)?;
        validate_swap_fee(swap_fee)?;

        Ok(Self {
            pool_id,
            tokens,
            now: 0,
            swap_enabled,
            fee_ramp: FeeRampParams {
                start_time: 0,
                end_time: 0,
                start_swap_fee: swap_fee,
                end_swap_fee: swap_fee,
            },
            weight_ramp: WeightRampParams {
                start_time: 0,
                end_time: 0,
                start_weights: weights.clone(),
                end_weights: weights,
            },
            must_allowlist_lps: false,
            allowlist: BTreeSet::new(),
        })
    }

    pub fn now(&self) -> UnixTimestamp {
        self.now
    }

    /// Only the ledger moves the clock
    pub(crate) fn set_time(&mut self, now: UnixTimestamp) {
        self.now = now;
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn must_allowlist_lps(&self) -> bool {
        self.must_allowlist_lps
    }

    pub fn is_allowlisted(&self, member: &Address) -> bool {
        self.allowlist.contains(member)
    }

    pub fn is_weight_change_in_progress(&self) -> bool {
        self.now < self.weight_ramp.end_time
    }

    fn ensure_no_weight_change(&self) -> Result<(), PoolError> {
        if self.is_weight_change_in_progress() {
            return Err(PoolError::CallFailed(
                "tokens cannot change during a weight change".to_string(),
            ));
        }
        Ok(())
    }

    /// Pin the weights at `weights` from now on
    fn fix_weights(&mut self, weights: Vec<u128>) {
        self.weight_ramp = WeightRampParams {
            start_time: self.now,
            end_time: self.now,
            start_weights: weights.clone(),
            end_weights: weights,
        };
    }
}

/// Value of a linear ramp at `now`.
///
/// Fees and weights never exceed `ONE`, so the fixed-point helpers cannot
/// overflow here; the end value stands in if they ever did.
fn ramp_value(
    now: UnixTimestamp,
    start_time: UnixTimestamp,
    end_time: UnixTimestamp,
    start: u128,
    end: u128,
) -> u128 {
    elapsed_fraction(now, start_time, end_time)
        .and_then(|fraction| interpolate(start, end, fraction))
        .unwrap_or(end)
}

/// Give the rounding dust left by a rescale to the largest weight
fn absorb_rounding(weights: &mut [u128]) -> Result<(), PoolError> {
    let sum = checked_sum(weights).map_err(|_| PoolError::WeightsRejected)?;
    let remainder = ONE.checked_sub(sum).ok_or(PoolError::WeightsRejected)?;
    if let Some(largest) = weights.iter_mut().max() {
        *largest += remainder;
    }
    Ok(())
}

impl ManagedPool for SimulatedPool {
    fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    fn get_swap_enabled(&self) -> bool {
        self.swap_enabled
    }

    fn set_swap_enabled(&mut self, enabled: bool) -> Result<(), PoolError> {
        debug!(pool_id = %self.pool_id, enabled, "swap enabled flag set");
        self.swap_enabled = enabled;
        Ok(())
    }

    /// Ramps cannot start in the past: the start is moved up to the pool clock
    fn update_swap_fee_gradually(
        &mut self,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        start_swap_fee: u128,
        end_swap_fee: u128,
    ) -> Result<(), PoolError> {
        let start_time = start_time.max(self.now);
        if end_time < start_time {
            return Err(PoolError::RampRejected(end_time));
        }
        for fee in [start_swap_fee, end_swap_fee] {
            validate_swap_fee(fee).map_err(|_| PoolError::SwapFeeRejected(fee))?;
        }

        self.fee_ramp = FeeRampParams {
            start_time,
            end_time,
            start_swap_fee,
            end_swap_fee,
        };
        debug!(pool_id = %self.pool_id, start_time, end_time, "swap fee ramp installed");
        Ok(())
    }

    fn update_weights_gradually(
        &mut self,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        tokens: &[TokenId],
        end_weights: &[u128],
    ) -> Result<(), PoolError> {
        let start_time = start_time.max(self.now);
        if end_time < start_time {
            return Err(PoolError::RampRejected(end_time));
        }
        if tokens.len() != self.tokens.len() || end_weights.len() != self.tokens.len() {
            return Err(PoolError::WeightsRejected);
        }
        if let Some(unknown) = tokens.iter().zip(&self.tokens).find(|(given, ours)| given != ours) {
            return Err(PoolError::UnknownToken(*unknown.0));
        }
        validate_normalized_weights(end_weights).map_err(|_| PoolError::WeightsRejected)?;

        self.weight_ramp = WeightRampParams {
            start_time,
            end_time,
            start_weights: self.get_normalized_weights(),
            end_weights: end_weights.to_vec(),
        };
        debug!(pool_id = %self.pool_id, start_time, end_time, "weight ramp installed");
        Ok(())
    }

    fn get_normalized_weights(&self) -> Vec<u128> {
        let ramp = &self.weight_ramp;
        ramp.start_weights
            .iter()
            .zip(&ramp.end_weights)
            .map(|(start, end)| ramp_value(self.now, ramp.start_time, ramp.end_time, *start, *end))
            .collect()
    }

    fn get_swap_fee_percentage(&self) -> u128 {
        let ramp = &self.fee_ramp;
        ramp_value(
            self.now,
            ramp.start_time,
            ramp.end_time,
            ramp.start_swap_fee,
            ramp.end_swap_fee,
        )
    }

    fn get_gradual_swap_fee_update_params(&self) -> FeeRampParams {
        self.fee_ramp
    }

    fn get_gradual_weight_update_params(&self) -> WeightRampParams {
        self.weight_ramp.clone()
    }

    fn set_must_allowlist_lps(&mut self, must_allowlist_lps: bool) -> Result<(), PoolError> {
        self.must_allowlist_lps = must_allowlist_lps;
        Ok(())
    }

    fn add_allowed_address(&mut self, member: Address) -> Result<(), PoolError> {
        if !self.must_allowlist_lps {
            return Err(PoolError::CallFailed("LP allowlist is disabled".to_string()));
        }
        if !self.allowlist.insert(member) {
            return Err(PoolError::CallFailed(format!("{} is already allowlisted", member)));
        }
        Ok(())
    }

    fn remove_allowed_address(&mut self, member: Address) -> Result<(), PoolError> {
        if !self.allowlist.remove(&member) {
            return Err(PoolError::CallFailed(format!("{} is not allowlisted", member)));
        }
        Ok(())
    }

    /// Existing weights are scaled by `ONE - normalized_weight` to make room
    fn add_token(&mut self, token: TokenId, normalized_weight: u128) -> Result<(), PoolError> {
        if self.tokens.contains(&token) {
            return Err(PoolError::TokenAlreadyRegistered(token));
        }
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&normalized_weight) {
            return Err(PoolError::WeightsRejected);
        }
        self.ensure_no_weight_change()?;

        let scale = ONE - normalized_weight;
        let mut weights = self
            .get_normalized_weights()
            .into_iter()
            .map(|weight| mul_down(weight, scale))
            .collect::<CoreResult<Vec<_>>>()
            .map_err(|_| PoolError::WeightsRejected)?;
        weights.push(normalized_weight);
        absorb_rounding(&mut weights)?;
        validate_normalized_weights(&weights).map_err(|_| PoolError::WeightsRejected)?;

        self.tokens.push(token);
        self.fix_weights(weights);
        debug!(pool_id = %self.pool_id, token = %token, "token added");
        Ok(())
    }

    /// Remaining weights are scaled back up to sum to `ONE`
    fn remove_token(&mut self, token: TokenId) -> Result<(), PoolError> {
        let position = self
            .tokens
            .iter()
            .position(|candidate| *candidate == token)
            .ok_or(PoolError::UnknownToken(token))?;
        if self.tokens.len() <= MIN_POOL_TOKENS {
            return Err(PoolError::CallFailed(
                "pool needs at least two tokens".to_string(),
            ));
        }
        self.ensure_no_weight_change()?;

        let mut weights = self.get_normalized_weights();
        let removed = weights.remove(position);
        let remaining = ONE - removed;
        let mut weights = weights
            .into_iter()
            .map(|weight| div_down(weight, remaining))
            .collect::<CoreResult<Vec<_>>>()
            .map_err(|_| PoolError::WeightsRejected)?;
        absorb_rounding(&mut weights)?;
        validate_normalized_weights(&weights).map_err(|_| PoolError::WeightsRejected)?;

        self.tokens.remove(position);
        self.fix_weights(weights);
        debug!(pool_id = %self.pool_id, token = %token, "token removed");
        Ok(())
    }
}
