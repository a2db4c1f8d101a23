//! Host-ledger stand-in: one clock, one pool, atomic calls
//!
//! Every controller call runs against a snapshot. If the call fails, both the
//! pool and the controller are put back exactly as they were, so a failed call
//! has no partial effects.

use managed_pool_controllers::{
    Address, ControllerEvent, CoreResult, Invocation, TokenId, UnixTimestamp,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::pool::SimulatedPool;
use crate::vault::SimulatedVault;
use crate::{SimulationError, SimulationResult};

/// Vault address used by every simulated deployment
pub const VAULT_ADDRESS: Address = Address::repeat_byte(0xba);

/// Event emitted by a committed call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggedEvent {
    pub at: UnixTimestamp,
    pub block: u64,
    pub event: ControllerEvent,
}

#[derive(Clone, Debug)]
pub struct Ledger {
    now: UnixTimestamp,
    block: u64,
    vault: SimulatedVault,
    pool: SimulatedPool,
    events: Vec<LoggedEvent>,
}

impl Ledger {
    /// Fresh ledger at time zero holding one newly created pool
    pub fn with_pool(
        tokens: Vec<TokenId>,
        weights: Vec<u128>,
        swap_fee: u128,
        swap_enabled: bool,
    ) -> CoreResult<Self> {
        let mut vault = SimulatedVault::new(VAULT_ADDRESS);
        let pool = vault.create_pool(tokens, weights, swap_fee, swap_enabled)?;
        Ok(Self {
            now: 0,
            block: 0,
            vault,
            pool,
            events: Vec::new(),
        })
    }

    pub fn now(&self) -> UnixTimestamp {
        self.now
    }

    pub fn block(&self) -> u64 {
        self.block
    }

    pub fn pool(&self) -> &SimulatedPool {
        &self.pool
    }

    pub fn vault(&self) -> &SimulatedVault {
        &self.vault
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Move the clock to `timestamp`. Time never runs backwards.
    pub fn warp_to(&mut self, timestamp: UnixTimestamp) -> SimulationResult<()> {
        if timestamp < self.now {
            return Err(SimulationError::ClockRewind {
                now: self.now,
                requested: timestamp,
            });
        }
        self.now = timestamp;
        self.pool.set_time(timestamp);
        Ok(())
    }

    pub fn advance(&mut self, seconds: i64) -> SimulationResult<()> {
        self.warp_to(self.now.saturating_add(seconds))
    }

    /// Construct a controller against this ledger's vault, which also acts
    /// as the deployment-time resolver
    pub fn deploy<C, F>(&self, construct: F) -> CoreResult<C>
    where
        F: FnOnce(&SimulatedVault) -> CoreResult<C>,
    {
        construct(&self.vault)
    }

    /// Run one controller call as an atomic transaction.
    ///
    /// On success the emitted event is appended to the log and the vault
    /// registry is synced with the pool. On failure the pool and `controller`
    /// are restored from their pre-call snapshots.
    pub fn execute<C, E, F>(
        &mut self,
        controller: &mut C,
        caller: Address,
        call: F,
    ) -> CoreResult<E>
    where
        C: Clone,
        E: Clone + Into<ControllerEvent>,
        F: FnOnce(&mut C, &mut Invocation<'_, SimulatedPool>) -> CoreResult<E>,
    {
        let pool_snapshot = self.pool.clone();
        let controller_snapshot = controller.clone();
        self.block += 1;

        let result = {
            let mut ctx = Invocation::new(caller, self.now, &mut self.pool);
            call(controller, &mut ctx)
        };

        match result {
            Ok(event) => {
                self.vault.sync(&self.pool, self.block);
                let logged = LoggedEvent {
                    at: self.now,
                    block: self.block,
                    event: event.clone().into(),
                };
                info!(
                    block = self.block,
                    at = self.now,
                    event = logged.event.name(),
                    "call committed"
                );
                self.events.push(logged);
                Ok(event)
            }
            Err(err) => {
                self.pool = pool_snapshot;
                *controller = controller_snapshot;
                debug!(block = self.block, at = self.now, error = %err, "call reverted");
                Err(err)
            }
        }
    }
}
