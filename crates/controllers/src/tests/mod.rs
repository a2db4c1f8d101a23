//! Controller tests against recording collaborators

mod weight_changer;

use std::collections::HashMap;

use crate::errors::PoolError;
use crate::interfaces::{
    FeeRampParams, ManagedPool, PoolResolver, PoolTokens, Vault, WeightRampParams,
};
use crate::math::from_percent;
use crate::types::{Address, PoolId, TokenId, UnixTimestamp};

pub const VAULT: Address = Address::repeat_byte(0xaa);
pub const DEPLOYER: Address = Address::repeat_byte(0xd0);
pub const MANAGER: Address = Address::repeat_byte(0xee);
pub const STRANGER: Address = Address::repeat_byte(0x55);
pub const TOKEN_A: TokenId = Address::repeat_byte(0x0a);
pub const TOKEN_B: TokenId = Address::repeat_byte(0x0b);
pub const TOKEN_C: TokenId = Address::repeat_byte(0x0c);

pub fn pool_id() -> PoolId {
    PoolId::new(Address::repeat_byte(0x70), 0, 1)
}

/// Every state-changing call the controller made, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolCall {
    SetSwapEnabled(bool),
    UpdateSwapFeeGradually(FeeRampParams),
    UpdateWeightsGradually {
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        tokens: Vec<TokenId>,
        end_weights: Vec<u128>,
    },
    SetMustAllowlistLps(bool),
    AddAllowedAddress(Address),
    RemoveAllowedAddress(Address),
    AddToken(TokenId, u128),
    RemoveToken(TokenId),
}

#[derive(Clone, Debug)]
pub struct MockPool {
    pub pool_id: PoolId,
    pub swap_enabled: bool,
    pub swap_fee: u128,
    pub weights: Vec<u128>,
    pub fee_params: FeeRampParams,
    pub weight_params: WeightRampParams,
    pub calls: Vec<PoolCall>,
    /// Accept swap toggles without applying them
    pub ignore_swap_toggle: bool,
    /// Reject every swap fee ramp
    pub reject_fee_updates: bool,
}

impl MockPool {
    pub fn new(pool_id: PoolId) -> Self {
        Self {
            pool_id,
            swap_enabled: true,
            swap_fee: from_percent(1),
            weights: vec![from_percent(30), from_percent(70)],
            fee_params: FeeRampParams::default(),
            weight_params: WeightRampParams::default(),
            calls: Vec::new(),
            ignore_swap_toggle: false,
            reject_fee_updates: false,
        }
    }

    pub fn paused(mut self) -> Self {
        self.swap_enabled = false;
        self
    }

    pub fn fee_ramp_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PoolCall::UpdateSwapFeeGradually(_)))
            .count()
    }
}

impl ManagedPool for MockPool {
    fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    fn get_swap_enabled(&self) -> bool {
        self.swap_enabled
    }

    fn set_swap_enabled(&mut self, enabled: bool) -> Result<(), PoolError> {
        self.calls.push(PoolCall::SetSwapEnabled(enabled));
        if !self.ignore_swap_toggle {
            self.swap_enabled = enabled;
        }
        Ok(())
    }

    fn update_swap_fee_gradually(
        &mut self,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        start_swap_fee: u128,
        end_swap_fee: u128,
    ) -> Result<(), PoolError> {
        if self.reject_fee_updates {
            return Err(PoolError::SwapFeeRejected(start_swap_fee));
        }
        let params = FeeRampParams {
            start_time,
            end_time,
            start_swap_fee,
            end_swap_fee,
        };
        self.calls.push(PoolCall::UpdateSwapFeeGradually(params));
        self.fee_params = params;
        Ok(())
    }

    fn update_weights_gradually(
        &mut self,
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        tokens: &[TokenId],
        end_weights: &[u128],
    ) -> Result<(), PoolError> {
        self.calls.push(PoolCall::UpdateWeightsGradually {
            start_time,
            end_time,
            tokens: tokens.to_vec(),
            end_weights: end_weights.to_vec(),
        });
        self.weight_params = WeightRampParams {
            start_time,
            end_time,
            start_weights: self.weights.clone(),
            end_weights: end_weights.to_vec(),
        };
        Ok(())
    }

    fn get_normalized_weights(&self) -> Vec<u128> {
        self.weights.clone()
    }

    fn get_swap_fee_percentage(&self) -> u128 {
        self.swap_fee
    }

    fn get_gradual_swap_fee_update_params(&self) -> FeeRampParams {
        self.fee_params
    }

    fn get_gradual_weight_update_params(&self) -> WeightRampParams {
        self.weight_params.clone()
    }

    fn set_must_allowlist_lps(&mut self, must_allowlist_lps: bool) -> Result<(), PoolError> {
        self.calls.push(PoolCall::SetMustAllowlistLps(must_allowlist_lps));
        Ok(())
    }

    fn add_allowed_address(&mut self, member: Address) -> Result<(), PoolError> {
        self.calls.push(PoolCall::AddAllowedAddress(member));
        Ok(())
    }

    fn remove_allowed_address(&mut self, member: Address) -> Result<(), PoolError> {
        self.calls.push(PoolCall::RemoveAllowedAddress(member));
        Ok(())
    }

    fn add_token(&mut self, token: TokenId, normalized_weight: u128) -> Result<(), PoolError> {
        self.calls.push(PoolCall::AddToken(token, normalized_weight));
        Ok(())
    }

    fn remove_token(&mut self, token: TokenId) -> Result<(), PoolError> {
        self.calls.push(PoolCall::RemoveToken(token));
        Ok(())
    }
}

/// Vault that also answers the deployment-time "last created pool" lookup
#[derive(Clone, Debug, Default)]
pub struct MockVault {
    pub pools: HashMap<PoolId, PoolTokens>,
    pub last_created: Option<PoolId>,
}

impl MockVault {
    pub fn with_pool(pool_id: PoolId, tokens: Vec<TokenId>) -> Self {
        let balances = vec![1_000; tokens.len()];
        let mut pools = HashMap::new();
        pools.insert(
            pool_id,
            PoolTokens {
                tokens,
                balances,
                last_change_block: 0,
            },
        );
        Self {
            pools,
            last_created: Some(pool_id),
        }
    }
}

impl Vault for MockVault {
    fn address(&self) -> Address {
        VAULT
    }

    fn get_pool_tokens(&self, pool_id: &PoolId) -> Result<PoolTokens, PoolError> {
        self.pools
            .get(pool_id)
            .cloned()
            .ok_or(PoolError::UnknownPool(*pool_id))
    }
}

impl PoolResolver for MockVault {
    fn last_created_pool(&self) -> Result<PoolId, PoolError> {
        self.last_created.ok_or(PoolError::NoPoolCreated)
    }
}

/// Two-token vault plus a matching pool with swaps enabled
pub fn two_token_setup() -> (MockVault, MockPool) {
    (
        MockVault::with_pool(pool_id(), vec![TOKEN_A, TOKEN_B]),
        MockPool::new(pool_id()),
    )
}
