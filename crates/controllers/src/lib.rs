//! # Managed Pool Controllers
//!
//! Policy objects that hold privileged call rights over a single managed
//! weighted pool and expose a narrow, time-gated command surface:
//!
//! - [`RebalancerController`]: periodic rebalance (decaying fee ramp) followed
//!   by a pause, in two explicitly named policy variants
//! - [`PauseUnpauseController`]: owner-gated pause with a safe (fee ramp) or
//!   immediate unpause path
//! - [`WeightChangerController`]: ungated ramps of a two-token pool toward
//!   named target allocations
//! - [`CrpController`]: owner-gated pass-through actions behind a rights bitmask
//!
//! The pool and vault are external collaborators modelled by the
//! [`ManagedPool`], [`Vault`] and [`PoolResolver`] traits. Interpolation of the
//! ramped values is entirely the pool's business; controllers only compute and
//! validate endpoints.
//!
//! ## Feature Flags
//!
//! - `anchor`: Enables Anchor serialization for on-chain use
//! - `client`: Enables standard serialization for off-chain use

pub mod constants;
pub mod context;
pub mod controllers;
pub mod errors;
pub mod events;
pub mod gate;
pub mod interfaces;
pub mod math;
pub mod ramp;
pub mod types;
#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use constants::*;
pub use context::Invocation;
pub use controllers::{
    ControllerIdentity, CrpController, ManagedPoolRights, PauseUnpauseController,
    RebalancerController, TargetAllocation, UnpauseMode, WeightChangerController,
};
pub use errors::{ControllerError, CoreResult, ErrorCategory, PoolError};
pub use events::*;
pub use gate::{PhaseGate, PhaseSchedule, RebalancePolicy};
pub use interfaces::{
    FeeRampParams, ManagedPool, PoolResolver, PoolTokens, Vault, WeightRampParams,
};
pub use ramp::{
    plan_fee_ramp, plan_weight_ramp, validate_normalized_weights, FeeRamp, RampWindow, WeightRamp,
};
pub use types::{Address, PoolId, TokenId, UnixTimestamp};
