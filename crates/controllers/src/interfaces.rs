//! Collaborator interfaces
//!
//! The pool and the vault are external to the controllers. Controllers only
//! ever see them through these traits, so tests and the simulator can plug in
//! in-memory implementations.

use crate::errors::PoolError;
use crate::types::{Address, PoolId, TokenId, UnixTimestamp};

/// Registered tokens of a pool as reported by the vault
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolTokens {
    pub tokens: Vec<TokenId>,
    pub balances: Vec<u128>,
    pub last_change_block: u64,
}

/// Active gradual swap fee update, as stored by the pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeRampParams {
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
    pub start_swap_fee: u128,
    pub end_swap_fee: u128,
}

/// Active gradual weight update, as stored by the pool
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightRampParams {
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
    pub start_weights: Vec<u128>,
    pub end_weights: Vec<u128>,
}

/// Managed weighted pool the controller holds privileged rights over.
///
/// The pool owns the interpolation of ramped values; a controller only hands
/// it endpoints. Allowlist and token management default to
/// [`PoolError::Unsupported`] so minimal pools need not implement them.
pub trait ManagedPool {
    /// Vault registration id of this pool
    fn pool_id(&self) -> PoolId;

    fn get_swap_enabled(&self) -> bool;

    fn set_swap_enabled(&mut self, enabled: bool) -> Result<(), PoolError>;

    fn update_swap_fee_gradually(
        &mut self,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        start_swap_fee: u128,
        end_swap_fee: u128,
    ) -> Result<(), PoolError>;

    fn update_weights_gradually(
        &mut self,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        tokens: &[TokenId],
        end_weights: &[u128],
    ) -> Result<(), PoolError>;

    fn get_normalized_weights(&self) -> Vec<u128>;

    fn get_swap_fee_percentage(&self) -> u128;

    fn get_gradual_swap_fee_update_params(&self) -> FeeRampParams;

    fn get_gradual_weight_update_params(&self) -> WeightRampParams;

    fn set_must_allowlist_lps(&mut self, _must_allowlist_lps: bool) -> Result<(), PoolError> {
        Err(PoolError::Unsupported("set_must_allowlist_lps"))
    }

    fn add_allowed_address(&mut self, _member: Address) -> Result<(), PoolError> {
        Err(PoolError::Unsupported("add_allowed_address"))
    }

    fn remove_allowed_address(&mut self, _member: Address) -> Result<(), PoolError> {
        Err(PoolError::Unsupported("remove_allowed_address"))
    }

    fn add_token(&mut self, _token: TokenId, _normalized_weight: u128) -> Result<(), PoolError> {
        Err(PoolError::Unsupported("add_token"))
    }

    fn remove_token(&mut self, _token: TokenId) -> Result<(), PoolError> {
        Err(PoolError::Unsupported("remove_token"))
    }
}

/// Vault holding the pool's tokens
pub trait Vault {
    /// Address the vault is deployed at
    fn address(&self) -> Address;

    fn get_pool_tokens(&self, pool_id: &PoolId) -> Result<PoolTokens, PoolError>;
}

/// Deployment-time lookup of the pool a controller is created for
pub trait PoolResolver {
    fn last_created_pool(&self) -> Result<PoolId, PoolError>;
}
