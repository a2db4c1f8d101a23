//! TOML scenario description
//!
//! A scenario deploys one pool and one controller, then replays timed steps
//! against them. Weights and fees are decimal strings (`"0.3"`) so they stay
//! exact; times are ledger seconds.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use managed_pool_controllers::math::parse_decimal;
use managed_pool_controllers::{
    Address, CoreResult, ErrorCategory, ManagedPoolRights, RebalancePolicy, TargetAllocation,
    TokenId, UnixTimestamp,
};
use serde::{Deserialize, Serialize};

use crate::{SimulationError, SimulationResult};

pub const DEPLOYER: Address = Address::repeat_byte(0xd0);
pub const MANAGER: Address = Address::repeat_byte(0xee);
pub const STRANGER: Address = Address::repeat_byte(0x55);

/// Upper bound on tokens in a scenario pool
pub const MAX_POOL_TOKENS: usize = 50;

fn default_true() -> bool {
    true
}

/// Scenario configuration loaded from a TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// Scenario name for logging and the report
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Wall-clock instant that ledger time zero maps to in the report
    #[serde(default)]
    pub genesis: Option<DateTime<Utc>>,

    pub pool: PoolSpec,

    pub controller: ControllerSpec,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Pool created at ledger time zero
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolSpec {
    /// Token addresses; generated when omitted
    #[serde(default)]
    pub tokens: Vec<TokenId>,

    /// Initial normalized weights
    pub weights: Vec<String>,

    /// Initial (fixed) swap fee
    pub swap_fee: String,

    #[serde(default = "default_true")]
    pub swap_enabled: bool,
}

/// Controller deployed right after the pool
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerSpec {
    Rebalancer {
        #[serde(default)]
        policy: RebalancePolicy,
        min_swap_fee: String,
    },
    PauseUnpause {
        end_swap_fee: String,
    },
    WeightChanger,
    Crp {
        rights: Vec<String>,
        #[serde(default)]
        min_weight_change_duration: i64,
    },
}

/// Who submits a step. Named roles or a hex address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum CallerSpec {
    Deployer,
    #[default]
    Manager,
    Stranger,
    Address(Address),
}

/// Expected outcome of a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    #[default]
    Ok,
    Guard,
    Validation,
    Authorization,
    PostCondition,
    Collaborator,
    Math,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    /// Ledger time the step executes at
    pub at: UnixTimestamp,

    #[serde(default)]
    pub caller: CallerSpec,

    #[serde(flatten)]
    pub action: Action,

    #[serde(default)]
    pub expect: Expectation,

    /// Substring the failure reason must contain
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    // Rebalancer
    Rebalance,
    Pause,

    // Pause/unpause
    PausePool,
    UnpausePool {
        #[serde(default = "default_true")]
        safe: bool,
    },

    // Weight changer
    MakeAllocation {
        allocation: TargetAllocation,
    },
    MakeTargetRamp {
        weights: Vec<String>,
    },

    // Permission checklist
    SetSwapEnabled {
        enabled: bool,
    },
    UpdateSwapFeeGradually {
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        start_swap_fee: String,
        end_swap_fee: String,
    },
    UpdateWeightsGradually {
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
        weights: Vec<String>,
    },
    SetMustAllowlistLps {
        enabled: bool,
    },
    AddAllowedAddress {
        member: Address,
    },
    RemoveAllowedAddress {
        member: Address,
    },
    AddToken {
        token: TokenId,
        weight: String,
    },
    RemoveToken {
        token: TokenId,
    },

    /// Compare the pool's reported state against expected values
    Observe {
        #[serde(default)]
        swaps_enabled: Option<bool>,
        #[serde(default)]
        weights: Option<Vec<String>>,
        #[serde(default)]
        swap_fee: Option<String>,
    },
}

impl ScenarioConfig {
    /// Load and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SimulationError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: ScenarioConfig =
            toml::from_str(&content).map_err(|source| SimulationError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a scenario from TOML text
    pub fn from_toml_str(content: &str) -> SimulationResult<Self> {
        let config: ScenarioConfig = toml::from_str(content).map_err(|source| {
            SimulationError::Parse {
                path: "<inline>".to_string(),
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks; value checks (bounds, sums) are left to the
    /// controllers so that scenarios can exercise rejections
    pub fn validate(&self) -> SimulationResult<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }

        self.pool.validate()?;
        self.controller.validate()?;

        let mut previous = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at < previous {
                return Err(invalid(format!(
                    "step {} at {} runs before the previous step at {}",
                    index, step.at, previous
                )));
            }
            previous = step.at;

            if !self.controller.supports(&step.action) {
                return Err(SimulationError::UnsupportedAction {
                    action: step.action.name(),
                    controller: self.controller.kind(),
                });
            }
            step.action
                .validate()
                .map_err(|err| invalid(format!("step {}: {}", index, err)))?;
        }

        Ok(())
    }

    pub fn genesis(&self) -> DateTime<Utc> {
        self.genesis.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

fn invalid(message: impl Into<String>) -> SimulationError {
    SimulationError::InvalidScenario(message.into())
}

/// Parse a list of decimal strings into fixed point
pub fn parse_decimals(values: &[String]) -> CoreResult<Vec<u128>> {
    values.iter().map(|value| parse_decimal(value)).collect()
}

impl PoolSpec {
    fn validate(&self) -> SimulationResult<()> {
        if self.weights.len() < 2 {
            return Err(invalid("pool needs at least two weights"));
        }
        if self.weights.len() > MAX_POOL_TOKENS {
            return Err(invalid(format!(
                "pool has {} weights, at most {} are supported",
                self.weights.len(),
                MAX_POOL_TOKENS
            )));
        }
        if !self.tokens.is_empty() && self.tokens.len() != self.weights.len() {
            return Err(invalid(format!(
                "{} tokens but {} weights",
                self.tokens.len(),
                self.weights.len()
            )));
        }
        parse_decimals(&self.weights).map_err(|err| invalid(err.to_string()))?;
        parse_decimal(&self.swap_fee).map_err(|err| invalid(err.to_string()))?;
        Ok(())
    }

    /// Configured tokens, or `0x0a0a..`, `0x0b0b..`, ... when none are given
    pub fn token_list(&self) -> Vec<TokenId> {
        if !self.tokens.is_empty() {
            return self.tokens.clone();
        }
        (0x0a..=u8::MAX)
            .take(self.weights.len())
            .map(Address::repeat_byte)
            .collect()
    }

    pub fn initial_weights(&self) -> CoreResult<Vec<u128>> {
        parse_decimals(&self.weights)
    }

    pub fn initial_swap_fee(&self) -> CoreResult<u128> {
        parse_decimal(&self.swap_fee)
    }
}

impl ControllerSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerSpec::Rebalancer { .. } => "rebalancer",
            ControllerSpec::PauseUnpause { .. } => "pause_unpause",
            ControllerSpec::WeightChanger => "weight_changer",
            ControllerSpec::Crp { .. } => "crp",
        }
    }

    fn validate(&self) -> SimulationResult<()> {
        match self {
            ControllerSpec::Rebalancer { min_swap_fee, .. } => {
                parse_decimal(min_swap_fee).map_err(|err| invalid(err.to_string()))?;
            }
            ControllerSpec::PauseUnpause { end_swap_fee } => {
                parse_decimal(end_swap_fee).map_err(|err| invalid(err.to_string()))?;
            }
            ControllerSpec::WeightChanger => {}
            ControllerSpec::Crp {
                min_weight_change_duration,
                ..
            } => {
                self.rights()?;
                if *min_weight_change_duration < 0 {
                    return Err(invalid("min_weight_change_duration must not be negative"));
                }
            }
        }
        Ok(())
    }

    /// Rights bitmask of a permission-checklist controller
    pub fn rights(&self) -> SimulationResult<ManagedPoolRights> {
        let ControllerSpec::Crp { rights, .. } = self else {
            return Ok(ManagedPoolRights::empty());
        };
        rights.iter().try_fold(ManagedPoolRights::empty(), |granted, name| {
            ManagedPoolRights::from_name(name)
                .map(|right| granted | right)
                .ok_or_else(|| invalid(format!("unknown right {:?}", name)))
        })
    }

    pub fn supports(&self, action: &Action) -> bool {
        use Action::*;

        if matches!(action, Observe { .. }) {
            return true;
        }
        match self {
            ControllerSpec::Rebalancer { .. } => matches!(action, Rebalance | Pause),
            ControllerSpec::PauseUnpause { .. } => {
                matches!(action, PausePool | UnpausePool { .. })
            }
            ControllerSpec::WeightChanger => {
                matches!(action, MakeAllocation { .. } | MakeTargetRamp { .. })
            }
            ControllerSpec::Crp { .. } => matches!(
                action,
                SetSwapEnabled { .. }
                    | UpdateSwapFeeGradually { .. }
                    | UpdateWeightsGradually { .. }
                    | SetMustAllowlistLps { .. }
                    | AddAllowedAddress { .. }
                    | RemoveAllowedAddress { .. }
                    | AddToken { .. }
                    | RemoveToken { .. }
            ),
        }
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Rebalance => "rebalance",
            Action::Pause => "pause",
            Action::PausePool => "pause_pool",
            Action::UnpausePool { .. } => "unpause_pool",
            Action::MakeAllocation { .. } => "make_allocation",
            Action::MakeTargetRamp { .. } => "make_target_ramp",
            Action::SetSwapEnabled { .. } => "set_swap_enabled",
            Action::UpdateSwapFeeGradually { .. } => "update_swap_fee_gradually",
            Action::UpdateWeightsGradually { .. } => "update_weights_gradually",
            Action::SetMustAllowlistLps { .. } => "set_must_allowlist_lps",
            Action::AddAllowedAddress { .. } => "add_allowed_address",
            Action::RemoveAllowedAddress { .. } => "remove_allowed_address",
            Action::AddToken { .. } => "add_token",
            Action::RemoveToken { .. } => "remove_token",
            Action::Observe { .. } => "observe",
        }
    }

    /// Every decimal in the step must parse
    fn validate(&self) -> CoreResult<()> {
        match self {
            Action::MakeTargetRamp { weights } | Action::UpdateWeightsGradually { weights, .. } => {
                parse_decimals(weights)?;
            }
            Action::UpdateSwapFeeGradually {
                start_swap_fee,
                end_swap_fee,
                ..
            } => {
                parse_decimal(start_swap_fee)?;
                parse_decimal(end_swap_fee)?;
            }
            Action::AddToken { weight, .. } => {
                parse_decimal(weight)?;
            }
            Action::Observe {
                weights, swap_fee, ..
            } => {
                if let Some(weights) = weights {
                    parse_decimals(weights)?;
                }
                if let Some(swap_fee) = swap_fee {
                    parse_decimal(swap_fee)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl CallerSpec {
    pub fn address(&self) -> Address {
        match self {
            CallerSpec::Deployer => DEPLOYER,
            CallerSpec::Manager => MANAGER,
            CallerSpec::Stranger => STRANGER,
            CallerSpec::Address(address) => *address,
        }
    }
}

impl TryFrom<String> for CallerSpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "deployer" => Ok(CallerSpec::Deployer),
            "manager" => Ok(CallerSpec::Manager),
            "stranger" => Ok(CallerSpec::Stranger),
            other => other
                .parse()
                .map(CallerSpec::Address)
                .map_err(|err| format!("unknown caller {:?}: {}", other, err)),
        }
    }
}

impl From<CallerSpec> for String {
    fn from(caller: CallerSpec) -> Self {
        caller.to_string()
    }
}

impl fmt::Display for CallerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerSpec::Deployer => write!(f, "deployer"),
            CallerSpec::Manager => write!(f, "manager"),
            CallerSpec::Stranger => write!(f, "stranger"),
            CallerSpec::Address(address) => write!(f, "{}", address),
        }
    }
}

impl From<ErrorCategory> for Expectation {
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Guard => Expectation::Guard,
            ErrorCategory::Validation => Expectation::Validation,
            ErrorCategory::Authorization => Expectation::Authorization,
            ErrorCategory::PostCondition => Expectation::PostCondition,
            ErrorCategory::Collaborator => Expectation::Collaborator,
            ErrorCategory::Math => Expectation::Math,
        }
    }
}
