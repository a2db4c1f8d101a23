//! Replays a scenario against a fresh ledger

use chrono::Utc;
use managed_pool_controllers::math::parse_decimal;
use managed_pool_controllers::{
    ControllerError, ControllerEvent, CrpController, ManagedPool, PauseUnpauseController,
    RebalancerController, UnpauseMode, WeightChangerController,
};
use tracing::{info, warn};

use crate::ledger::Ledger;
use crate::pool::SimulatedPool;
use crate::report::{render_time, PoolSnapshot, ScenarioReport, StepOutcome, StepReport};
use crate::scenario::{
    parse_decimals, Action, ControllerSpec, ScenarioConfig, Step, DEPLOYER, MANAGER,
};
use crate::vault::SimulatedVault;
use crate::{SimulationError, SimulationResult};

/// A controller deployed by a scenario
#[derive(Clone, Debug)]
pub enum DeployedController {
    Rebalancer(RebalancerController),
    PauseUnpause(PauseUnpauseController),
    WeightChanger(WeightChangerController),
    Crp(CrpController),
}

impl DeployedController {
    /// Deploy against `vault`; owner-gated variants are handed from
    /// [`DEPLOYER`] to [`MANAGER`]
    pub fn deploy(spec: &ControllerSpec, vault: &SimulatedVault) -> SimulationResult<Self> {
        let controller = match spec {
            ControllerSpec::Rebalancer {
                policy,
                min_swap_fee,
            } => parse_decimal(min_swap_fee)
                .and_then(|fee| RebalancerController::new(vault, vault, fee, *policy))
                .map(DeployedController::Rebalancer),
            ControllerSpec::PauseUnpause { end_swap_fee } => parse_decimal(end_swap_fee)
                .and_then(|fee| {
                    PauseUnpauseController::new(vault, vault, DEPLOYER, MANAGER, fee)
                })
                .map(DeployedController::PauseUnpause),
            ControllerSpec::WeightChanger => {
                WeightChangerController::new(vault, vault).map(DeployedController::WeightChanger)
            }
            ControllerSpec::Crp {
                min_weight_change_duration,
                ..
            } => CrpController::new(
                vault,
                vault,
                DEPLOYER,
                MANAGER,
                spec.rights()?,
                *min_weight_change_duration,
            )
            .map(DeployedController::Crp),
        };
        controller.map_err(SimulationError::Deployment)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DeployedController::Rebalancer(_) => "rebalancer",
            DeployedController::PauseUnpause(_) => "pause_unpause",
            DeployedController::WeightChanger(_) => "weight_changer",
            DeployedController::Crp(_) => "crp",
        }
    }
}

pub struct ScenarioRunner {
    config: ScenarioConfig,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Build the ledger, deploy the controller and replay every step.
    ///
    /// Steps that miss their expectation are recorded, not fatal; the
    /// report's `passed` flag summarises them. Only setup problems are errors.
    pub fn run(&self) -> SimulationResult<ScenarioReport> {
        let config = &self.config;
        info!(scenario = %config.name, steps = config.steps.len(), "running scenario");

        let pool = &config.pool;
        let weights = pool.initial_weights().map_err(SimulationError::Deployment)?;
        let swap_fee = pool.initial_swap_fee().map_err(SimulationError::Deployment)?;
        let mut ledger = Ledger::with_pool(pool.token_list(), weights, swap_fee, pool.swap_enabled)
            .map_err(SimulationError::Deployment)?;
        let mut controller = DeployedController::deploy(&config.controller, ledger.vault())?;

        let genesis = config.genesis();
        let mut steps = Vec::with_capacity(config.steps.len());
        for (index, step) in config.steps.iter().enumerate() {
            ledger.warp_to(step.at)?;
            let outcome = apply(&mut ledger, &mut controller, step)?;
            let passed = outcome.meets(step.expect, step.reason.as_deref());

            if !passed {
                warn!(
                    scenario = %config.name,
                    step = index,
                    action = step.action.name(),
                    outcome = ?outcome,
                    "step did not meet its expectation"
                );
            }

            steps.push(StepReport {
                index,
                at: step.at,
                time: render_time(genesis, step.at),
                caller: step.caller.address(),
                action: step.action.name(),
                expect: step.expect,
                outcome,
                passed,
            });
        }

        let passed = steps.iter().all(|step| step.passed);
        info!(scenario = %config.name, passed, "scenario finished");

        Ok(ScenarioReport {
            name: config.name.clone(),
            description: config.description.clone(),
            controller: controller.kind(),
            genesis,
            generated_at: Utc::now(),
            steps,
            events: ledger.events().to_vec(),
            final_state: PoolSnapshot::capture(ledger.pool()),
            passed,
        })
    }
}

fn settle<E: Into<ControllerEvent>>(result: Result<E, ControllerError>) -> StepOutcome {
    match result {
        Ok(event) => StepOutcome::Succeeded {
            event: event.into(),
        },
        Err(err) => StepOutcome::Failed {
            category: err.category(),
            reason: err.to_string(),
        },
    }
}

/// Execute one step at the ledger's current time
pub fn apply(
    ledger: &mut Ledger,
    controller: &mut DeployedController,
    step: &Step,
) -> SimulationResult<StepOutcome> {
    let caller = step.caller.address();

    let outcome = match (controller, &step.action) {
        (
            _,
            Action::Observe {
                swaps_enabled,
                weights,
                swap_fee,
            },
        ) => observe(ledger.pool(), *swaps_enabled, weights.as_deref(), swap_fee.as_deref())?,

        (DeployedController::Rebalancer(c), Action::Rebalance) => {
            settle(ledger.execute(c, caller, |c, ctx| c.rebalance(ctx)))
        }
        (DeployedController::Rebalancer(c), Action::Pause) => {
            settle(ledger.execute(c, caller, |c, ctx| c.pause(ctx)))
        }

        (DeployedController::PauseUnpause(c), Action::PausePool) => {
            settle(ledger.execute(c, caller, |c, ctx| c.pause_pool(ctx)))
        }
        (DeployedController::PauseUnpause(c), Action::UnpausePool { safe }) => {
            let mode = UnpauseMode::from(*safe);
            settle(ledger.execute(c, caller, |c, ctx| c.unpause_pool(ctx, mode)))
        }

        (DeployedController::WeightChanger(c), Action::MakeAllocation { allocation }) => {
            let allocation = *allocation;
            settle(ledger.execute(c, caller, |c, ctx| c.make_allocation(ctx, allocation)))
        }
        (DeployedController::WeightChanger(c), Action::MakeTargetRamp { weights }) => {
            settle(ledger.execute(c, caller, |c, ctx| {
                c.make_target_ramp(ctx, &parse_decimals(weights)?)
            }))
        }

        (DeployedController::Crp(c), Action::SetSwapEnabled { enabled }) => {
            settle(ledger.execute(c, caller, |c, ctx| c.set_swap_enabled(ctx, *enabled)))
        }
        (
            DeployedController::Crp(c),
            Action::UpdateSwapFeeGradually {
                start_time,
                end_time,
                start_swap_fee,
                end_swap_fee,
            },
        ) => settle(ledger.execute(c, caller, |c, ctx| {
            c.update_swap_fee_gradually(
                ctx,
                *start_time,
                *end_time,
                parse_decimal(start_swap_fee)?,
                parse_decimal(end_swap_fee)?,
            )
        })),
        (
            DeployedController::Crp(c),
            Action::UpdateWeightsGradually {
                start_time,
                end_time,
                weights,
            },
        ) => settle(ledger.execute(c, caller, |c, ctx| {
            c.update_weights_gradually(ctx, *start_time, *end_time, &parse_decimals(weights)?)
        })),
        (DeployedController::Crp(c), Action::SetMustAllowlistLps { enabled }) => {
            settle(ledger.execute(c, caller, |c, ctx| c.set_must_allowlist_lps(ctx, *enabled)))
        }
        (DeployedController::Crp(c), Action::AddAllowedAddress { member }) => {
            settle(ledger.execute(c, caller, |c, ctx| c.add_allowed_address(ctx, *member)))
        }
        (DeployedController::Crp(c), Action::RemoveAllowedAddress { member }) => {
            settle(ledger.execute(c, caller, |c, ctx| c.remove_allowed_address(ctx, *member)))
        }
        (DeployedController::Crp(c), Action::AddToken { token, weight }) => {
            settle(ledger.execute(c, caller, |c, ctx| {
                c.add_token(ctx, *token, parse_decimal(weight)?)
            }))
        }
        (DeployedController::Crp(c), Action::RemoveToken { token }) => {
            settle(ledger.execute(c, caller, |c, ctx| c.remove_token(ctx, *token)))
        }

        (controller, action) => {
            return Err(SimulationError::UnsupportedAction {
                action: action.name(),
                controller: controller.kind(),
            })
        }
    };

    Ok(outcome)
}

/// Compare what the pool reports against the step's expected values
fn observe(
    pool: &SimulatedPool,
    swaps_enabled: Option<bool>,
    weights: Option<&[String]>,
    swap_fee: Option<&str>,
) -> SimulationResult<StepOutcome> {
    let invalid = |err: ControllerError| SimulationError::InvalidScenario(err.to_string());
    let mut mismatches = Vec::new();

    if let Some(expected) = swaps_enabled {
        if pool.get_swap_enabled() != expected {
            mismatches.push(format!(
                "swaps_enabled: expected {}, pool reports {}",
                expected,
                pool.get_swap_enabled()
            ));
        }
    }
    if let Some(expected) = weights {
        let expected = parse_decimals(expected).map_err(invalid)?;
        let actual = pool.get_normalized_weights();
        if actual != expected {
            mismatches.push(format!(
                "weights: expected {:?}, pool reports {:?}",
                expected, actual
            ));
        }
    }
    if let Some(expected) = swap_fee {
        let expected = parse_decimal(expected).map_err(invalid)?;
        let actual = pool.get_swap_fee_percentage();
        if actual != expected {
            mismatches.push(format!(
                "swap_fee: expected {}, pool reports {}",
                expected, actual
            ));
        }
    }

    Ok(StepOutcome::Observed {
        snapshot: PoolSnapshot::capture(pool),
        mismatches,
    })
}
