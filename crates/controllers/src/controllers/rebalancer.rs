//! Rebalancer controller
//!
//! Ownerless. A rebalance installs a fee ramp that decays from a high fee to
//! the configured minimum over the rebalance window, inviting arbitrageurs to
//! bring the pool back to market prices. Once the window has fully elapsed the
//! pool may be paused; it stays paused until the next rebalance, which resumes
//! swaps and restarts the ramp in the same call.
//!
//! Two policies exist side by side (see [`RebalancePolicy`]): the standard one
//! rebalances from idle or paused, the paused-cooldown one only from a pause
//! that has lasted the minimum pause duration.

use tracing::info;

use crate::constants::REBALANCE_START_SWAP_FEE;
use crate::context::Invocation;
use crate::controllers::identity::ControllerIdentity;
use crate::errors::{ControllerError, CoreResult};
use crate::events::{PoolPaused, PoolRebalancing};
use crate::gate::{PhaseGate, PhaseSchedule, RebalancePolicy};
use crate::interfaces::{ManagedPool, PoolResolver, Vault};
use crate::ramp::{plan_fee_ramp, validate_swap_fee};
use crate::types::{Address, PoolId, TokenId, UnixTimestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct RebalancerController {
    identity: ControllerIdentity,
    gate: PhaseGate,
    /// Fee the rebalance ramp decays to
    min_swap_fee: u128,
}

impl RebalancerController {
    /// Create a controller with the default schedule (30-day interval,
    /// 7-day rebalance window, 7-day minimum pause)
    pub fn new<V, R>(
        vault: &V,
        resolver: &R,
        min_swap_fee: u128,
        policy: RebalancePolicy,
    ) -> CoreResult<Self>
    where
        V: Vault + ?Sized,
        R: PoolResolver + ?Sized,
    {
        Self::with_schedule(vault, resolver, min_swap_fee, policy, PhaseSchedule::default())
    }

    pub fn with_schedule<V, R>(
        vault: &V,
        resolver: &R,
        min_swap_fee: u128,
        policy: RebalancePolicy,
        schedule: PhaseSchedule,
    ) -> CoreResult<Self>
    where
        V: Vault + ?Sized,
        R: PoolResolver + ?Sized,
    {
        validate_swap_fee(min_swap_fee)?;
        if min_swap_fee > REBALANCE_START_SWAP_FEE {
            return Err(ControllerError::SwapFeeOutOfBounds(min_swap_fee));
        }

        let identity = ControllerIdentity::resolve(vault, resolver)?;
        let gate = PhaseGate::new(policy, schedule)?;

        Ok(Self {
            identity,
            gate,
            min_swap_fee,
        })
    }

    /// Start a rebalance: install the decaying fee ramp, then resume swaps if paused
    pub fn rebalance<P: ManagedPool + ?Sized>(
        &mut self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<PoolRebalancing> {
        let now = ctx.now;
        self.identity.check_pool(&*ctx.pool)?;

        let swaps_enabled = ctx.pool.get_swap_enabled();
        self.gate.check_rebalance(now, swaps_enabled)?;

        let ramp = plan_fee_ramp(
            now,
            self.gate.schedule().rebalance_window,
            REBALANCE_START_SWAP_FEE,
            self.min_swap_fee,
        )?;

        // fee premium goes in before swaps reopen
        ramp.execute(&mut *ctx.pool)?;
        if !swaps_enabled {
            ctx.pool.set_swap_enabled(true)?;
        }

        self.gate.record_rebalance_entered(now);

        info!(
            pool_id = %self.identity.pool_id(),
            caller = %ctx.caller,
            start_time = ramp.window.start_time,
            end_time = ramp.window.end_time,
            resumed_swaps = !swaps_enabled,
            "pool rebalancing"
        );

        Ok(PoolRebalancing {
            pool_id: self.identity.pool_id(),
            start_time: ramp.window.start_time,
            end_time: ramp.window.end_time,
            start_swap_fee: ramp.start_swap_fee,
            end_swap_fee: ramp.end_swap_fee,
            resumed_swaps: !swaps_enabled,
        })
    }

    /// Disable swaps once the rebalance window has fully elapsed
    pub fn pause<P: ManagedPool + ?Sized>(
        &mut self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<PoolPaused> {
        let now = ctx.now;
        self.identity.check_pool(&*ctx.pool)?;

        let swaps_enabled = ctx.pool.get_swap_enabled();
        self.gate.check_pause(now, swaps_enabled)?;

        ctx.pool.set_swap_enabled(false)?;

        self.gate.record_pause_entered(now);

        info!(pool_id = %self.identity.pool_id(), caller = %ctx.caller, now, "pool paused");

        Ok(PoolPaused {
            pool_id: self.identity.pool_id(),
            paused_at: now,
        })
    }

    pub fn is_pool_paused<P: ManagedPool + ?Sized>(&self, pool: &P) -> CoreResult<bool> {
        self.identity.check_pool(pool)?;
        Ok(!pool.get_swap_enabled())
    }

    pub fn policy(&self) -> RebalancePolicy {
        self.gate.policy()
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        self.gate.schedule()
    }

    pub fn min_swap_fee(&self) -> u128 {
        self.min_swap_fee
    }

    pub fn rebalance_start_swap_fee(&self) -> u128 {
        REBALANCE_START_SWAP_FEE
    }

    pub fn last_rebalance_call(&self) -> Option<UnixTimestamp> {
        self.gate.last_rebalance_call()
    }

    pub fn last_pause_call(&self) -> Option<UnixTimestamp> {
        self.gate.last_pause_call()
    }

    pub fn next_rebalance_allowed_at(&self) -> CoreResult<Option<UnixTimestamp>> {
        self.gate.next_rebalance_allowed_at()
    }

    pub fn rebalance_window_ends_at(&self) -> CoreResult<Option<UnixTimestamp>> {
        self.gate.rebalance_window_ends_at()
    }

    pub fn gate(&self) -> &PhaseGate {
        &self.gate
    }

    pub fn identity(&self) -> &ControllerIdentity {
        &self.identity
    }

    pub fn pool_id(&self) -> PoolId {
        self.identity.pool_id()
    }

    pub fn pool_address(&self) -> Address {
        self.identity.pool_address()
    }

    pub fn vault(&self) -> Address {
        self.identity.vault()
    }

    pub fn tokens(&self) -> &[TokenId] {
        self.identity.tokens()
    }
}
