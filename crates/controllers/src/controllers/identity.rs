use tracing::info;

use crate::errors::{ControllerError, CoreResult};
use crate::interfaces::{ManagedPool, PoolResolver, PoolTokens, Vault};
use crate::types::{Address, PoolId, TokenId};

/// Immutable identity of a controller: the vault, the pool it was deployed
/// for, and the pool's tokens at deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct ControllerIdentity {
    vault: Address,
    pool_id: PoolId,
    tokens: Vec<TokenId>,
}

impl ControllerIdentity {
    /// Resolve the freshly created pool and snapshot its tokens
    pub fn resolve<V, R>(vault: &V, resolver: &R) -> CoreResult<Self>
    where
        V: Vault + ?Sized,
        R: PoolResolver + ?Sized,
    {
        let pool_id = resolver.last_created_pool()?;
        let PoolTokens { tokens, .. } = vault.get_pool_tokens(&pool_id)?;

        info!(
            vault = %vault.address(),
            pool_id = %pool_id,
            tokens = tokens.len(),
            "controller bound to pool"
        );

        Ok(Self {
            vault: vault.address(),
            pool_id,
            tokens,
        })
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Derived from the pool id, never stored separately
    pub fn pool_address(&self) -> Address {
        self.pool_id.pool_address()
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Reject a collaborator that is not the bound pool
    pub fn check_pool<P: ManagedPool + ?Sized>(&self, pool: &P) -> CoreResult<()> {
        let actual = pool.pool_id();
        if actual != self.pool_id {
            return Err(ControllerError::PoolMismatch {
                expected: self.pool_id,
                actual,
            });
        }
        Ok(())
    }
}
