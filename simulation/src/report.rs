//! JSON run report

use chrono::{DateTime, Duration, Utc};
use managed_pool_controllers::math::format_decimal;
use managed_pool_controllers::{
    Address, ControllerEvent, ErrorCategory, ManagedPool, TokenId, UnixTimestamp,
};
use serde::Serialize;

use crate::ledger::LoggedEvent;
use crate::pool::SimulatedPool;
use crate::scenario::Expectation;

/// Pool state as the pool itself reports it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub at: UnixTimestamp,
    pub swaps_enabled: bool,
    pub swap_fee: String,
    pub weights: Vec<String>,
    pub tokens: Vec<TokenId>,
    pub must_allowlist_lps: bool,
}

impl PoolSnapshot {
    pub fn capture(pool: &SimulatedPool) -> Self {
        Self {
            at: pool.now(),
            swaps_enabled: pool.get_swap_enabled(),
            swap_fee: format_decimal(pool.get_swap_fee_percentage()),
            weights: pool
                .get_normalized_weights()
                .into_iter()
                .map(format_decimal)
                .collect(),
            tokens: pool.tokens().to_vec(),
            must_allowlist_lps: pool.must_allowlist_lps(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded {
        event: ControllerEvent,
    },
    Failed {
        category: ErrorCategory,
        reason: String,
    },
    Observed {
        snapshot: PoolSnapshot,
        mismatches: Vec<String>,
    },
}

impl StepOutcome {
    /// Whether this outcome is what the step expected
    pub fn meets(&self, expect: Expectation, reason: Option<&str>) -> bool {
        match self {
            StepOutcome::Succeeded { .. } => expect == Expectation::Ok,
            StepOutcome::Observed { mismatches, .. } => {
                expect == Expectation::Ok && mismatches.is_empty()
            }
            StepOutcome::Failed {
                category,
                reason: actual,
            } => {
                Expectation::from(*category) == expect
                    && reason.map_or(true, |expected| actual.contains(expected))
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub at: UnixTimestamp,
    /// `at` rendered against the scenario genesis
    pub time: Option<String>,
    pub caller: Address,
    pub action: &'static str,
    pub expect: Expectation,
    pub outcome: StepOutcome,
    pub passed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub description: String,
    pub controller: &'static str,
    pub genesis: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    pub events: Vec<LoggedEvent>,
    pub final_state: PoolSnapshot,
    pub passed: bool,
}

impl ScenarioReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| !step.passed)
    }
}

/// RFC 3339 rendering of ledger time `at` seconds after `genesis`
pub fn render_time(genesis: DateTime<Utc>, at: UnixTimestamp) -> Option<String> {
    Duration::try_seconds(at)
        .and_then(|offset| genesis.checked_add_signed(offset))
        .map(|time| time.to_rfc3339())
}
