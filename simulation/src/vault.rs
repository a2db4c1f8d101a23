use std::collections::BTreeMap;

use managed_pool_controllers::{
    Address, CoreResult, ManagedPool, PoolError, PoolId, PoolResolver, PoolTokens, TokenId,
    Vault,
};
use tracing::info;

use crate::pool::SimulatedPool;

/// Initial balance registered for every token of a new pool
const INITIAL_BALANCE: u128 = 1_000_000;

/// Pool registry. Creating a pool also makes it the answer to
/// [`PoolResolver::last_created_pool`], which is how controllers find the pool
/// they were deployed alongside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedVault {
    address: Address,
    pools: BTreeMap<PoolId, PoolTokens>,
    last_created: Option<PoolId>,
    next_nonce: u64,
}

impl SimulatedVault {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pools: BTreeMap::new(),
            last_created: None,
            next_nonce: 0,
        }
    }

    /// Register a new pool. The pool address is derived from the registration
    /// nonce, so ids are deterministic within a run.
    pub fn create_pool(
        &mut self,
        tokens: Vec<TokenId>,
        weights: Vec<u128>,
        swap_fee: u128,
        swap_enabled: bool,
    ) -> CoreResult<SimulatedPool> {
        let nonce = self.next_nonce;
        let mut address = [0u8; 20];
        address[0] = 0x70;
        address[12..].copy_from_slice(&nonce.to_be_bytes());
        let pool_id = PoolId::new(Address::new(address), 0, nonce);

        let pool = SimulatedPool::new(pool_id, tokens.clone(), weights, swap_fee, swap_enabled)?;

        let balances = vec![INITIAL_BALANCE; tokens.len()];
        self.pools.insert(
            pool_id,
            PoolTokens {
                tokens,
                balances,
                last_change_block: 0,
            },
        );
        self.last_created = Some(pool_id);
        self.next_nonce += 1;

        info!(vault = %self.address, pool_id = %pool_id, "pool registered");
        Ok(pool)
    }

    /// Bring the registry in line with the pool's current token list
    pub fn sync(&mut self, pool: &SimulatedPool, block: u64) {
        let Some(entry) = self.pools.get_mut(&pool.pool_id()) else {
            return;
        };
        if entry.tokens == pool.tokens() {
            return;
        }

        let balances = pool
            .tokens()
            .iter()
            .map(|token| {
                entry
                    .tokens
                    .iter()
                    .position(|known| known == token)
                    .map_or(INITIAL_BALANCE, |index| entry.balances[index])
            })
            .collect();
        entry.tokens = pool.tokens().to_vec();
        entry.balances = balances;
        entry.last_change_block = block;
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl Vault for SimulatedVault {
    fn address(&self) -> Address {
        self.address
    }

    fn get_pool_tokens(&self, pool_id: &PoolId) -> Result<PoolTokens, PoolError> {
        self.pools
            .get(pool_id)
            .cloned()
            .ok_or(PoolError::UnknownPool(*pool_id))
    }
}

impl PoolResolver for SimulatedVault {
    fn last_created_pool(&self) -> Result<PoolId, PoolError> {
        self.last_created.ok_or(PoolError::NoPoolCreated)
    }
}
