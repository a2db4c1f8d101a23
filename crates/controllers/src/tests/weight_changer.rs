use super::*;
use crate::constants::{DAY, MAX_WEIGHT, WEIGHT_CHANGE_DURATION};
use crate::context::Invocation;
use crate::controllers::{TargetAllocation, WeightChangerController};
use crate::errors::{ControllerError, ErrorCategory};

fn controller() -> (WeightChangerController, MockPool) {
    let (vault, pool) = two_token_setup();
    (WeightChangerController::new(&vault, &vault).unwrap(), pool)
}

#[test]
fn test_make_50_50_plans_seven_day_ramp() {
    let (controller, mut pool) = controller();

    let event = controller
        .make_50_50(&mut Invocation::new(STRANGER, DAY, &mut pool))
        .unwrap();

    assert_eq!(event.start_time, DAY);
    assert_eq!(event.end_time, DAY + WEIGHT_CHANGE_DURATION);
    assert_eq!(event.end_weights, vec![from_percent(50), from_percent(50)]);
    assert_eq!(
        pool.calls,
        vec![PoolCall::UpdateWeightsGradually {
            start_time: DAY,
            end_time: DAY + WEIGHT_CHANGE_DURATION,
            tokens: vec![TOKEN_A, TOKEN_B],
            end_weights: vec![from_percent(50), from_percent(50)],
        }]
    );
}

#[test]
fn test_every_named_allocation_is_valid() {
    let (controller, mut pool) = controller();

    for allocation in TargetAllocation::ALL {
        let event = controller
            .make_allocation(&mut Invocation::new(STRANGER, 0, &mut pool), allocation)
            .unwrap();
        assert_eq!(event.end_weights, allocation.weights().to_vec());
    }
    assert_eq!(pool.calls.len(), TargetAllocation::ALL.len());
}

#[test]
fn test_new_target_replans_from_now() {
    let (controller, mut pool) = controller();

    controller
        .make_80_20(&mut Invocation::new(STRANGER, 0, &mut pool))
        .unwrap();
    controller
        .make_20_80(&mut Invocation::new(STRANGER, 2 * DAY, &mut pool))
        .unwrap();

    let params = pool.get_gradual_weight_update_params();
    assert_eq!(params.start_time, 2 * DAY);
    assert_eq!(params.end_weights, vec![from_percent(20), from_percent(80)]);
}

#[test]
fn test_invalid_target_rejected_before_pool_call() {
    let (controller, mut pool) = controller();

    let err = controller
        .make_target_ramp(
            &mut Invocation::new(STRANGER, 0, &mut pool),
            &[from_percent(60), from_percent(50)],
        )
        .unwrap_err();
    assert!(err.to_string().starts_with("Weights must sum to one"));
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = controller
        .make_target_ramp(
            &mut Invocation::new(STRANGER, 0, &mut pool),
            &[MAX_WEIGHT + from_percent(1) / 2, from_percent(1) / 2],
        )
        .unwrap_err();
    assert!(matches!(err, ControllerError::WeightOutOfBounds { index: 0, .. }));

    assert!(pool.calls.is_empty());
}

#[test]
fn test_current_weights_read_from_pool() {
    let (controller, pool) = controller();
    assert_eq!(
        controller.current_weights(&pool).unwrap(),
        vec![from_percent(30), from_percent(70)]
    );
}

#[test]
fn test_requires_two_token_pool() {
    let vault = MockVault::with_pool(pool_id(), vec![TOKEN_A, TOKEN_B, TOKEN_C]);

    let err = WeightChangerController::new(&vault, &vault).unwrap_err();

    assert_eq!(
        err,
        ControllerError::UnsupportedTokenCount {
            expected: 2,
            actual: 3
        }
    );
}
