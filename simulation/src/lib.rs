//! Simulation harness for managed pool controllers
//!
//! Provides:
//! - [`SimulatedPool`], a managed pool that performs the gradual fee and weight
//!   interpolation itself
//! - [`SimulatedVault`], a pool registry that also answers the deployment-time
//!   "last created pool" lookup
//! - [`Ledger`], an explicit clock with atomic call execution and an event log
//! - TOML scenarios and a runner that replays them into a JSON report

pub mod ledger;
pub mod pool;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod vault;

pub use ledger::{Ledger, LoggedEvent};
pub use pool::SimulatedPool;
pub use report::{PoolSnapshot, ScenarioReport, StepOutcome, StepReport};
pub use runner::{DeployedController, ScenarioRunner};
pub use scenario::{
    Action, CallerSpec, ControllerSpec, Expectation, PoolSpec, ScenarioConfig, Step,
};
pub use vault::SimulatedVault;

use managed_pool_controllers::{ControllerError, UnixTimestamp};

#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    #[error("Clock cannot move backwards: now {now}, requested {requested}")]
    ClockRewind {
        now: UnixTimestamp,
        requested: UnixTimestamp,
    },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Action {action} is not supported by the {controller} controller")]
    UnsupportedAction {
        action: &'static str,
        controller: &'static str,
    },

    #[error("Deployment failed: {0}")]
    Deployment(#[source] ControllerError),

    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SimulationResult<T> = std::result::Result<T, SimulationError>;
