//! Weight changer controller
//!
//! Ramps a two-token pool toward one of a few named allocations over a fixed
//! window. Anyone may call it, there is no interval guard, and a new target
//! simply replans from "now" using whatever weights the pool currently reports.
//! Whether a ramp is in flight is the pool's own bookkeeping.

use tracing::info;

use crate::constants::{WEIGHT_CHANGER_TOKEN_COUNT, WEIGHT_CHANGE_DURATION};
use crate::context::Invocation;
use crate::controllers::identity::ControllerIdentity;
use crate::errors::{ControllerError, CoreResult};
use crate::events::WeightChangeScheduled;
use crate::interfaces::{ManagedPool, PoolResolver, Vault};
use crate::math::from_percent;
use crate::ramp::plan_weight_ramp;
use crate::types::{Address, PoolId, TokenId};

/// Named two-token target allocations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "snake_case"))]
pub enum TargetAllocation {
    /// 50% / 50%
    FiftyFifty,
    /// 80% / 20%
    EightyTwenty,
    /// 20% / 80%
    TwentyEighty,
    /// 99% / 1%
    NinetyNineOne,
    /// 1% / 99%
    OneNinetyNine,
}

impl TargetAllocation {
    pub const ALL: [TargetAllocation; 5] = [
        TargetAllocation::FiftyFifty,
        TargetAllocation::EightyTwenty,
        TargetAllocation::TwentyEighty,
        TargetAllocation::NinetyNineOne,
        TargetAllocation::OneNinetyNine,
    ];

    pub fn weights(&self) -> [u128; 2] {
        let (first, second) = match self {
            TargetAllocation::FiftyFifty => (50, 50),
            TargetAllocation::EightyTwenty => (80, 20),
            TargetAllocation::TwentyEighty => (20, 80),
            TargetAllocation::NinetyNineOne => (99, 1),
            TargetAllocation::OneNinetyNine => (1, 99),
        };
        [from_percent(first), from_percent(second)]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct WeightChangerController {
    identity: ControllerIdentity,
}

impl WeightChangerController {
    pub fn new<V, R>(vault: &V, resolver: &R) -> CoreResult<Self>
    where
        V: Vault + ?Sized,
        R: PoolResolver + ?Sized,
    {
        let identity = ControllerIdentity::resolve(vault, resolver)?;
        if identity.tokens().len() != WEIGHT_CHANGER_TOKEN_COUNT {
            return Err(ControllerError::UnsupportedTokenCount {
                expected: WEIGHT_CHANGER_TOKEN_COUNT,
                actual: identity.tokens().len(),
            });
        }
        Ok(Self { identity })
    }

    /// Validate `target_weights` and ramp toward them over the next 7 days
    pub fn make_target_ramp<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        target_weights: &[u128],
    ) -> CoreResult<WeightChangeScheduled> {
        self.identity.check_pool(&*ctx.pool)?;

        let ramp = plan_weight_ramp(
            ctx.now,
            WEIGHT_CHANGE_DURATION,
            self.identity.tokens(),
            target_weights,
        )?;
        ramp.execute(&mut *ctx.pool)?;

        info!(
            pool_id = %self.identity.pool_id(),
            caller = %ctx.caller,
            start_time = ramp.window.start_time,
            end_time = ramp.window.end_time,
            "weight change scheduled"
        );

        Ok(WeightChangeScheduled {
            pool_id: self.identity.pool_id(),
            start_time: ramp.window.start_time,
            end_time: ramp.window.end_time,
            tokens: ramp.tokens,
            end_weights: ramp.end_weights,
        })
    }

    pub fn make_allocation<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        allocation: TargetAllocation,
    ) -> CoreResult<WeightChangeScheduled> {
        self.make_target_ramp(ctx, &allocation.weights())
    }

    pub fn make_50_50<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<WeightChangeScheduled> {
        self.make_allocation(ctx, TargetAllocation::FiftyFifty)
    }

    pub fn make_80_20<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<WeightChangeScheduled> {
        self.make_allocation(ctx, TargetAllocation::EightyTwenty)
    }

    pub fn make_20_80<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<WeightChangeScheduled> {
        self.make_allocation(ctx, TargetAllocation::TwentyEighty)
    }

    pub fn make_99_01<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<WeightChangeScheduled> {
        self.make_allocation(ctx, TargetAllocation::NinetyNineOne)
    }

    pub fn make_01_99<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<WeightChangeScheduled> {
        self.make_allocation(ctx, TargetAllocation::OneNinetyNine)
    }

    pub fn current_weights<P: ManagedPool + ?Sized>(&self, pool: &P) -> CoreResult<Vec<u128>> {
        self.identity.check_pool(pool)?;
        Ok(pool.get_normalized_weights())
    }

    pub fn weight_change_duration(&self) -> i64 {
        WEIGHT_CHANGE_DURATION
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
