use std::path::PathBuf;

use managed_pool_controllers::math::from_percent;
use managed_pool_controllers::{
    Address, ControllerError, ErrorCategory, ManagedPool, PauseUnpauseController,
    RebalancePolicy, RebalancerController, UnpauseMode, WeightChangerController, DAY,
    REBALANCE_DURATION, REBALANCE_START_SWAP_FEE, SAFE_UNPAUSE_START_SWAP_FEE,
};
use managed_pool_simulation::scenario::{DEPLOYER, MANAGER, STRANGER};
use managed_pool_simulation::{Ledger, ScenarioConfig, ScenarioRunner};

const TOKEN_A: Address = Address::repeat_byte(0x0a);
const TOKEN_B: Address = Address::repeat_byte(0x0b);

fn ledger(weights: [u128; 2], swap_enabled: bool) -> Ledger {
    Ledger::with_pool(
        vec![TOKEN_A, TOKEN_B],
        weights.to_vec(),
        from_percent(1),
        swap_enabled,
    )
    .unwrap()
}

fn rebalancer_ledger() -> (Ledger, RebalancerController) {
    let ledger = ledger([from_percent(50), from_percent(50)], true);
    let controller = ledger
        .deploy(|vault| {
            RebalancerController::new(vault, vault, from_percent(1), RebalancePolicy::Standard)
        })
        .unwrap();
    (ledger, controller)
}

fn rebalance(
    ledger: &mut Ledger,
    controller: &mut RebalancerController,
) -> Result<(), ControllerError> {
    ledger
        .execute(controller, STRANGER, |controller, ctx| controller.rebalance(ctx))
        .map(|_| ())
}

#[test]
fn test_first_rebalance_opens_seven_day_window() {
    let (mut ledger, mut controller) = rebalancer_ledger();

    let event = ledger
        .execute(&mut controller, STRANGER, |controller, ctx| controller.rebalance(ctx))
        .unwrap();

    assert_eq!((event.start_time, event.end_time), (0, 604_800));
    assert_eq!(event.start_swap_fee, REBALANCE_START_SWAP_FEE);
    assert_eq!(event.end_swap_fee, from_percent(1));
    assert_eq!(ledger.pool().get_swap_fee_percentage(), REBALANCE_START_SWAP_FEE);

    ledger.warp_to(302_400).unwrap();
    let midway = ledger.pool().get_swap_fee_percentage();
    assert!(midway < REBALANCE_START_SWAP_FEE && midway > from_percent(1));

    ledger.warp_to(REBALANCE_DURATION).unwrap();
    assert_eq!(ledger.pool().get_swap_fee_percentage(), from_percent(1));
}

#[test]
fn test_second_rebalance_four_days_later_fails() {
    let (mut ledger, mut controller) = rebalancer_ledger();
    rebalance(&mut ledger, &mut controller).unwrap();

    ledger.warp_to(345_600).unwrap();
    let err = rebalance(&mut ledger, &mut controller).unwrap_err();

    assert!(err.to_string().starts_with("Minimum time between calls not met"));
    assert_eq!(err.category(), ErrorCategory::Guard);
    assert_eq!(controller.last_rebalance_call(), Some(0));
}

#[test]
fn test_rebalance_after_thirty_one_days_succeeds() {
    let (mut ledger, mut controller) = rebalancer_ledger();
    rebalance(&mut ledger, &mut controller).unwrap();

    ledger.warp_to(2_678_400).unwrap();
    rebalance(&mut ledger, &mut controller).unwrap();

    assert_eq!(controller.last_rebalance_call(), Some(2_678_400));
    assert_eq!(ledger.events().len(), 2);
}

#[test]
fn test_pause_just_after_window() {
    let (mut ledger, mut controller) = rebalancer_ledger();
    rebalance(&mut ledger, &mut controller).unwrap();

    ledger.warp_to(605_002).unwrap();
    ledger
        .execute(&mut controller, STRANGER, |controller, ctx| controller.pause(ctx))
        .unwrap();

    assert!(controller.is_pool_paused(ledger.pool()).unwrap());
}

#[test]
fn test_weight_changer_reaches_fifty_fifty() {
    let mut ledger = ledger([from_percent(30), from_percent(70)], true);
    let mut controller = ledger
        .deploy(|vault| WeightChangerController::new(vault, vault))
        .unwrap();

    ledger
        .execute(&mut controller, STRANGER, |controller, ctx| controller.make_50_50(ctx))
        .unwrap();

    ledger.warp_to(4 * DAY).unwrap();
    let halfway = controller.current_weights(ledger.pool()).unwrap();
    assert!(halfway[0] > from_percent(30) && halfway[0] < from_percent(50));
    assert!(halfway[1] < from_percent(70) && halfway[1] > from_percent(50));

    ledger.warp_to(8 * DAY).unwrap();
    assert_eq!(
        controller.current_weights(ledger.pool()).unwrap(),
        vec![from_percent(50), from_percent(50)]
    );
}

#[test]
fn test_safe_unpause_and_owner_gate() {
    let mut ledger = ledger([from_percent(50), from_percent(50)], true);
    let mut controller = ledger
        .deploy(|vault| {
            PauseUnpauseController::new(vault, vault, DEPLOYER, MANAGER, from_percent(1))
        })
        .unwrap();

    ledger
        .execute(&mut controller, MANAGER, |controller, ctx| controller.pause_pool(ctx))
        .unwrap();

    for caller in [STRANGER, DEPLOYER] {
        let err = ledger
            .execute(&mut controller, caller, |controller, ctx| controller.pause_pool(ctx))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authorization);

        let err = ledger
            .execute(&mut controller, caller, |controller, ctx| {
                controller.unpause_pool(ctx, UnpauseMode::Safe)
            })
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }

    ledger.advance(DAY).unwrap();
    ledger
        .execute(&mut controller, MANAGER, |controller, ctx| {
            controller.unpause_pool(ctx, UnpauseMode::Safe)
        })
        .unwrap();

    let pool = ledger.pool();
    assert!(pool.get_swap_enabled());
    assert_eq!(pool.get_gradual_swap_fee_update_params().end_swap_fee, from_percent(1));
    assert_eq!(pool.get_swap_fee_percentage(), SAFE_UNPAUSE_START_SWAP_FEE);
}

fn scenario_files() -> Vec<PathBuf> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();
    files
}

#[test]
fn test_bundled_scenarios_pass() {
    let files = scenario_files();
    assert!(files.len() >= 6);

    for path in files {
        let config = ScenarioConfig::load(&path).unwrap();
        let report = ScenarioRunner::new(config).run().unwrap();
        let failures: Vec<_> = report.failed_steps().collect();
        assert!(report.passed, "{}: {:?}", path.display(), failures);
    }
}

#[test]
fn test_report_serializes_to_json() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/rebalancer_cycle.toml");
    let report = ScenarioRunner::new(ScenarioConfig::load(path).unwrap())
        .run()
        .unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["controller"], "rebalancer");
    assert_eq!(json["steps"][0]["time"], "2024-01-01T00:00:00+00:00");
    assert_eq!(json["steps"][2]["outcome"]["status"], "failed");
    assert_eq!(json["steps"][2]["outcome"]["category"], "guard");
    assert_eq!(json["events"][0]["event"]["event"], "pool_rebalancing");
}
