//! Pause/unpause controller
//!
//! Owner-gated. Prices may drift while a pool is paused, so unpausing straight
//! away hands the first arbitrage trade a free profit at the LPs' expense. The
//! safe path installs a fee ramp that starts high and decays to the configured
//! end fee, so that first trade pays a large fee to LPs instead. The immediate
//! path resumes swaps with no fee adjustment.

use tracing::{info, warn};

use crate::constants::{SAFE_UNPAUSE_DURATION, SAFE_UNPAUSE_START_SWAP_FEE};
use crate::context::Invocation;
use crate::controllers::identity::ControllerIdentity;
use crate::controllers::ownership::Ownership;
use crate::errors::{ControllerError, CoreResult};
use crate::events::{PoolPaused, PoolUnpaused};
use crate::interfaces::{ManagedPool, PoolResolver, Vault};
use crate::ramp::{plan_fee_ramp, validate_swap_fee};
use crate::types::{Address, PoolId, TokenId};

/// How swaps are resumed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "snake_case"))]
pub enum UnpauseMode {
    /// Install the decaying fee ramp, then resume swaps
    Safe,
    /// Resume swaps with the current fee
    Immediate,
}

impl From<bool> for UnpauseMode {
    fn from(safe: bool) -> Self {
        if safe {
            UnpauseMode::Safe
        } else {
            UnpauseMode::Immediate
        }
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
pub struct PauseUnpauseController {
    identity: ControllerIdentity,
    ownership: Ownership,
    /// Fee the safe-unpause ramp decays to
    end_swap_fee: u128,
}

impl PauseUnpauseController {
    /// Create the controller and hand the owner role from `deployer` to `manager`
    pub fn new<V, R>(
        vault: &V,
        resolver: &R,
        deployer: Address,
        manager: Address,
        end_swap_fee: u128,
    ) -> CoreResult<Self>
    where
        V: Vault + ?Sized,
        R: PoolResolver + ?Sized,
    {
        validate_swap_fee(end_swap_fee)?;
        if end_swap_fee > SAFE_UNPAUSE_START_SWAP_FEE {
            return Err(ControllerError::SwapFeeOutOfBounds(end_swap_fee));
        }

        let identity = ControllerIdentity::resolve(vault, resolver)?;

        Ok(Self {
            identity,
            ownership: Ownership::handed_over(deployer, manager),
            end_swap_fee,
        })
    }

    /// Disable swaps. The pool's flag is read back afterwards.
    pub fn pause_pool<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
    ) -> CoreResult<PoolPaused> {
        self.ownership.ensure_owner(ctx.caller)?;
        self.identity.check_pool(&*ctx.pool)?;

        if !ctx.pool.get_swap_enabled() {
            return Err(ControllerError::SwapsAlreadyPaused);
        }

        ctx.pool.set_swap_enabled(false)?;
        if ctx.pool.get_swap_enabled() {
            warn!(pool_id = %self.identity.pool_id(), "pool still reports swaps enabled after pause");
            return Err(ControllerError::PausingFailed);
        }

        info!(pool_id = %self.identity.pool_id(), now = ctx.now, "pool paused");

        Ok(PoolPaused {
            pool_id: self.identity.pool_id(),
            paused_at: ctx.now,
        })
    }

    /// Resume swaps, either behind a decaying fee ramp or immediately.
    ///
    /// On the safe path swaps are enabled in the same call as the ramp is
    /// installed; the ramp does not need to have started yet.
    pub fn unpause_pool<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        mode: UnpauseMode,
    ) -> CoreResult<PoolUnpaused> {
        self.ownership.ensure_owner(ctx.caller)?;
        self.identity.check_pool(&*ctx.pool)?;

        if ctx.pool.get_swap_enabled() {
            return Err(ControllerError::SwapsAlreadyEnabled);
        }

        let fee_ramp = match mode {
            UnpauseMode::Safe => {
                let ramp = plan_fee_ramp(
                    ctx.now,
                    SAFE_UNPAUSE_DURATION,
                    SAFE_UNPAUSE_START_SWAP_FEE,
                    self.end_swap_fee,
                )?;
                ramp.execute(&mut *ctx.pool)?;
                Some(ramp)
            }
            UnpauseMode::Immediate => None,
        };

        ctx.pool.set_swap_enabled(true)?;
        if !ctx.pool.get_swap_enabled() {
            warn!(pool_id = %self.identity.pool_id(), "pool still reports swaps disabled after unpause");
            return Err(ControllerError::UnpausingFailed);
        }

        info!(
            pool_id = %self.identity.pool_id(),
            now = ctx.now,
            mode = ?mode,
            "pool unpaused"
        );

        Ok(PoolUnpaused {
            pool_id: self.identity.pool_id(),
            unpaused_at: ctx.now,
            fee_ramp: fee_ramp.map(|ramp| ramp.window),
            end_swap_fee: fee_ramp.map(|ramp| ramp.end_swap_fee),
        })
    }

    pub fn is_pool_paused<P: ManagedPool + ?Sized>(&self, pool: &P) -> CoreResult<bool> {
        self.identity.check_pool(pool)?;
        Ok(!pool.get_swap_enabled())
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn end_swap_fee(&self) -> u128 {
        self.end_swap_fee
    }

    pub fn safe_unpause_start_swap_fee(&self) -> u128 {
        SAFE_UNPAUSE_START_SWAP_FEE
    }

    pub fn safe_unpause_duration(&self) -> i64 {
        SAFE_UNPAUSE_DURATION
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
