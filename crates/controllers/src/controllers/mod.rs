//! Controller variants
//!
//! Each controller composes the phase gate and the ramp planner into one
//! policy over a single pool. Controllers never store the pool itself; every
//! action receives it through an [`Invocation`](crate::Invocation) and checks
//! it is the pool the controller was deployed for.

pub mod crp;
pub mod identity;
pub mod ownership;
pub mod pause_unpause;
pub mod rebalancer;
pub mod weight_changer;

pub use crp::{CrpController, ManagedPoolRights};
pub use identity::ControllerIdentity;
pub use ownership::Ownership;
pub use pause_unpause::{PauseUnpauseController, UnpauseMode};
pub use rebalancer::RebalancerController;
pub use weight_changer::{TargetAllocation, WeightChangerController};
