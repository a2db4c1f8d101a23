//! Permission-checklist controller
//!
//! Owner-gated pass-through to the pool. Which pass-through actions exist is
//! fixed at construction by a rights bitmask; each action checks the owner,
//! then the right, then its own inputs, and forwards exactly one pool call.

use std::fmt;

use tracing::info;

use crate::constants::{MAX_WEIGHT, MIN_WEIGHT};
use crate::context::Invocation;
use crate::controllers::identity::ControllerIdentity;
use crate::controllers::ownership::Ownership;
use crate::errors::{ControllerError, CoreResult, PoolError};
use crate::events::{
    PermissionedAction, PoolPermissionAction, SwapFeeChangeScheduled, WeightChangeScheduled,
};
use crate::interfaces::{ManagedPool, PoolResolver, Vault};
use crate::ramp::{plan_weight_ramp_within, validate_swap_fee, RampWindow};
use crate::types::{Address, PoolId, TokenId, UnixTimestamp};

/// Smallest token count a managed pool can be reduced to
const MIN_POOL_TOKENS: usize = 2;

/// Bitmask of rights granted to a [`CrpController`]
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct ManagedPoolRights(u8);

impl ManagedPoolRights {
    pub const PAUSE_SWAPPING: ManagedPoolRights = ManagedPoolRights(1 << 0);
    pub const CHANGE_SWAP_FEE: ManagedPoolRights = ManagedPoolRights(1 << 1);
    pub const CHANGE_WEIGHTS: ManagedPoolRights = ManagedPoolRights(1 << 2);
    pub const ADD_REMOVE_TOKENS: ManagedPoolRights = ManagedPoolRights(1 << 3);
    pub const MANAGE_LP_ALLOWLIST: ManagedPoolRights = ManagedPoolRights(1 << 4);

    const ALL_BITS: u8 = 0b1_1111;

    const NAMES: [(ManagedPoolRights, &'static str); 5] = [
        (Self::PAUSE_SWAPPING, "pause_swapping"),
        (Self::CHANGE_SWAP_FEE, "change_swap_fee"),
        (Self::CHANGE_WEIGHTS, "change_weights"),
        (Self::ADD_REMOVE_TOKENS, "add_remove_tokens"),
        (Self::MANAGE_LP_ALLOWLIST, "manage_lp_allowlist"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    /// `None` if any unknown bit is set
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL_BITS != 0 {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Look a right up by its snake_case name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(right, _)| *right)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, other: ManagedPoolRights) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: ManagedPoolRights) -> Self {
        Self(self.0 | other.0)
    }

    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(right, _)| self.contains(*right))
            .map(|(_, name)| *name)
            .collect()
    }

    fn name(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(right, _)| right == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }
}

impl std::ops::BitOr for ManagedPoolRights {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for ManagedPoolRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManagedPoolRights").field(&self.names()).finish()
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
pub struct CrpController {
    identity: ControllerIdentity,
    ownership: Ownership,
    rights: ManagedPoolRights,
    /// Shortest weight ramp the owner may request (seconds)
    min_weight_change_duration: i64,
    /// Current token list; changes only through this controller's add/remove actions
    tokens: Vec<TokenId>,
}

impl CrpController {
    pub fn new<V, R>(
        vault: &V,
        resolver: &R,
        deployer: Address,
        manager: Address,
        rights: ManagedPoolRights,
        min_weight_change_duration: i64,
    ) -> CoreResult<Self>
    where
        V: Vault + ?Sized,
        R: PoolResolver + ?Sized,
    {
        if min_weight_change_duration < 0 {
            return Err(ControllerError::InvalidDuration {
                name: "min_weight_change_duration",
                value: min_weight_change_duration,
            });
        }

        let identity = ControllerIdentity::resolve(vault, resolver)?;
        let tokens = identity.tokens().to_vec();

        info!(rights = ?rights, min_weight_change_duration, "permission checklist configured");

        Ok(Self {
            identity,
            ownership: Ownership::handed_over(deployer, manager),
            rights,
            min_weight_change_duration,
            tokens,
        })
    }

    fn authorize<P: ManagedPool + ?Sized>(
        &self,
        ctx: &Invocation<'_, P>,
        right: ManagedPoolRights,
    ) -> CoreResult<()> {
        self.ownership.ensure_owner(ctx.caller)?;
        if !self.rights.contains(right) {
            return Err(ControllerError::RightNotGranted(right.name()));
        }
        self.identity.check_pool(&*ctx.pool)
    }

    fn action_event<P: ManagedPool + ?Sized>(
        &self,
        ctx: &Invocation<'_, P>,
        action: PermissionedAction,
    ) -> PoolPermissionAction {
        info!(pool_id = %self.identity.pool_id(), caller = %ctx.caller, action = ?action, "pass-through action");
        PoolPermissionAction {
            pool_id: self.identity.pool_id(),
            caller: ctx.caller,
            action,
            at: ctx.now,
        }
    }

    pub fn set_swap_enabled<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        swap_enabled: bool,
    ) -> CoreResult<PoolPermissionAction> {
        self.authorize(ctx, ManagedPoolRights::PAUSE_SWAPPING)?;
        ctx.pool.set_swap_enabled(swap_enabled)?;
        Ok(self.action_event(ctx, PermissionedAction::SetSwapEnabled))
    }

    pub fn update_swap_fee_gradually<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        start_swap_fee: u128,
        end_swap_fee: u128,
    ) -> CoreResult<SwapFeeChangeScheduled> {
        self.authorize(ctx, ManagedPoolRights::CHANGE_SWAP_FEE)?;
        let window = RampWindow::new(start_time, end_time)?;
        validate_swap_fee(start_swap_fee)?;
        validate_swap_fee(end_swap_fee)?;

        ctx.pool.update_swap_fee_gradually(
            window.start_time,
            window.end_time,
            start_swap_fee,
            end_swap_fee,
        )?;
        info!(
            pool_id = %self.identity.pool_id(),
            start_time = window.start_time,
            end_time = window.end_time,
            "swap fee change scheduled"
        );

        Ok(SwapFeeChangeScheduled {
            pool_id: self.identity.pool_id(),
            start_time: window.start_time,
            end_time: window.end_time,
            start_swap_fee,
            end_swap_fee,
        })
    }

    /// Ramp weights over `[start_time, end_time]`; the window must be at least
    /// the configured minimum weight-change duration
    pub fn update_weights_gradually<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        end_weights: &[u128],
    ) -> CoreResult<WeightChangeScheduled> {
        self.authorize(ctx, ManagedPoolRights::CHANGE_WEIGHTS)?;
        let window = RampWindow::new(start_time, end_time)?;
        let duration = window.duration()?;
        if duration < self.min_weight_change_duration {
            return Err(ControllerError::WeightChangeTooFast {
                duration,
                minimum: self.min_weight_change_duration,
            });
        }

        let ramp = plan_weight_ramp_within(window, &self.tokens, end_weights)?;
        ramp.execute(&mut *ctx.pool)?;
        info!(
            pool_id = %self.identity.pool_id(),
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

    pub fn set_must_allowlist_lps<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        must_allowlist_lps: bool,
    ) -> CoreResult<PoolPermissionAction> {
        self.authorize(ctx, ManagedPoolRights::MANAGE_LP_ALLOWLIST)?;
        ctx.pool.set_must_allowlist_lps(must_allowlist_lps)?;
        Ok(self.action_event(ctx, PermissionedAction::SetMustAllowlistLps))
    }

    pub fn add_allowed_address<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        member: Address,
    ) -> CoreResult<PoolPermissionAction> {
        self.authorize(ctx, ManagedPoolRights::MANAGE_LP_ALLOWLIST)?;
        ctx.pool.add_allowed_address(member)?;
        Ok(self.action_event(ctx, PermissionedAction::AddAllowedAddress))
    }

    pub fn remove_allowed_address<P: ManagedPool + ?Sized>(
        &self,
        ctx: &mut Invocation<'_, P>,
        member: Address,
    ) -> CoreResult<PoolPermissionAction> {
        self.authorize(ctx, ManagedPoolRights::MANAGE_LP_ALLOWLIST)?;
        ctx.pool.remove_allowed_address(member)?;
        Ok(self.action_event(ctx, PermissionedAction::RemoveAllowedAddress))
    }

    /// Register a new token at `normalized_weight`; the pool scales the
    /// existing weights down to make room
    pub fn add_token<P: ManagedPool + ?Sized>(
        &mut self,
        ctx: &mut Invocation<'_, P>,
        token: TokenId,
        normalized_weight: u128,
    ) -> CoreResult<PoolPermissionAction> {
        self.authorize(ctx, ManagedPoolRights::ADD_REMOVE_TOKENS)?;
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&normalized_weight) {
            return Err(ControllerError::WeightOutOfBounds {
                index: self.tokens.len(),
                weight: normalized_weight,
            });
        }
        if self.tokens.contains(&token) {
            return Err(PoolError::TokenAlreadyRegistered(token).into());
        }

        ctx.pool.add_token(token, normalized_weight)?;
        self.tokens.push(token);
        Ok(self.action_event(ctx, PermissionedAction::AddToken))
    }

    pub fn remove_token<P: ManagedPool + ?Sized>(
        &mut self,
        ctx: &mut Invocation<'_, P>,
        token: TokenId,
    ) -> CoreResult<PoolPermissionAction> {
        self.authorize(ctx, ManagedPoolRights::ADD_REMOVE_TOKENS)?;
        let position = self
            .tokens
            .iter()
            .position(|candidate| *candidate == token)
            .ok_or(PoolError::UnknownToken(token))?;
        if self.tokens.len() <= MIN_POOL_TOKENS {
            return Err(ControllerError::UnsupportedTokenCount {
                expected: MIN_POOL_TOKENS,
                actual: self.tokens.len() - 1,
            });
        }

        ctx.pool.remove_token(token)?;
        self.tokens.remove(position);
        Ok(self.action_event(ctx, PermissionedAction::RemoveToken))
    }

    pub fn rights(&self) -> ManagedPoolRights {
        self.rights
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn min_weight_change_duration(&self) -> i64 {
        self.min_weight_change_duration
    }

    pub fn identity(&self) -> &ControllerIdentity {
        &self.identity
    }

    pub fn pool_id(&self) -> PoolId {
        self.identity.pool_id()
    }

    pub fn vault(&self) -> Address {
        self.identity.vault()
    }

    /// Current token list, including tokens added after deployment
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }
}
