//! Property-based tests for the phase gate and ramp validation, run against
//! the simulated ledger.

use managed_pool_controllers::math::from_percent;
use managed_pool_controllers::{
    plan_weight_ramp, Address, ControllerError, ManagedPool, RebalancePolicy,
    RebalancerController, TokenId, WeightChangerController, DAY, MAX_WEIGHT,
    MIN_TIME_BETWEEN_REBALANCES, MIN_WEIGHT, ONE, WEIGHT_CHANGE_DURATION,
};
use managed_pool_simulation::scenario::STRANGER;
use managed_pool_simulation::Ledger;
use proptest::collection::SizeRange;
use proptest::prelude::*;

// ============================================================================
// Test Strategies
// ============================================================================

fn tokens(count: usize) -> Vec<TokenId> {
    (0..count).map(|i| Address::repeat_byte(0x10 + i as u8)).collect()
}

fn ledger(count: usize, swap_enabled: bool) -> Ledger {
    let mut weights = vec![ONE / count as u128; count];
    weights[0] += ONE - ONE / count as u128 * count as u128;
    Ledger::with_pool(tokens(count), weights, from_percent(1), swap_enabled).unwrap()
}

/// Normalized weight vectors that satisfy both the bounds and the exact sum
fn valid_weights(count: impl Into<SizeRange>) -> impl Strategy<Value = Vec<u128>> {
    prop::collection::vec(1u128..=100, count).prop_map(|parts| {
        let count = parts.len() as u128;
        let spare = ONE - count * MIN_WEIGHT;
        let total: u128 = parts.iter().sum();
        let mut weights: Vec<u128> = parts
            .iter()
            .map(|part| MIN_WEIGHT + spare / total * part)
            .collect();
        let sum: u128 = weights.iter().sum();
        weights[0] += ONE - sum;
        weights
    })
}

/// Anything from clearly invalid to valid, around the interesting edges
fn any_weight() -> impl Strategy<Value = u128> {
    prop_oneof![
        0u128..MIN_WEIGHT,
        Just(MIN_WEIGHT),
        MIN_WEIGHT..=MAX_WEIGHT,
        Just(MAX_WEIGHT),
        MAX_WEIGHT + 1..=ONE,
        Just(ONE / 2),
    ]
}

fn two_weights() -> impl Strategy<Value = Vec<u128>> {
    prop_oneof![
        prop::collection::vec(any_weight(), 2),
        any_weight().prop_map(|w| vec![w, ONE.saturating_sub(w)]),
    ]
}

fn is_acceptable(weights: &[u128]) -> bool {
    weights.iter().all(|w| (MIN_WEIGHT..=MAX_WEIGHT).contains(w))
        && weights.iter().sum::<u128>() == ONE
}

#[derive(Clone, Copy, Debug)]
enum GateCall {
    Rebalance,
    Pause,
}

fn gate_calls() -> impl Strategy<Value = Vec<(i64, GateCall)>> {
    prop::collection::vec(
        (
            0i64..40 * DAY,
            prop_oneof![Just(GateCall::Rebalance), Just(GateCall::Pause)],
        ),
        1..20,
    )
}

fn policy() -> impl Strategy<Value = RebalancePolicy> {
    prop_oneof![
        Just(RebalancePolicy::Standard),
        Just(RebalancePolicy::PausedCooldown)
    ]
}

// ============================================================================
// Interval Monotonicity
// ============================================================================

proptest! {
    /// Any second rebalance before the interval has elapsed is rejected
    #[test]
    fn prop_rebalance_interval_enforced(elapsed in 0i64..MIN_TIME_BETWEEN_REBALANCES) {
        let mut ledger = ledger(2, true);
        let mut controller = ledger
            .deploy(|vault| {
                RebalancerController::new(vault, vault, from_percent(1), RebalancePolicy::Standard)
            })
            .unwrap();
        ledger.execute(&mut controller, STRANGER, |c, ctx| c.rebalance(ctx)).unwrap();

        ledger.warp_to(elapsed).unwrap();
        let err = ledger
            .execute(&mut controller, STRANGER, |c, ctx| c.rebalance(ctx))
            .unwrap_err();
        prop_assert_eq!(
            err,
            ControllerError::MinimumIntervalNotMet { next_allowed_at: MIN_TIME_BETWEEN_REBALANCES }
        );

        ledger.warp_to(MIN_TIME_BETWEEN_REBALANCES).unwrap();
        prop_assert!(ledger.execute(&mut controller, STRANGER, |c, ctx| c.rebalance(ctx)).is_ok());
    }
}

// ============================================================================
// Weight Validation
// ============================================================================

proptest! {
    /// A target is accepted iff every weight is in bounds and they sum to one;
    /// a rejected target never reaches the pool
    #[test]
    fn prop_weight_changer_validation(weights in two_weights(), now in 0i64..365 * DAY) {
        let mut ledger = ledger(2, true);
        let mut controller = ledger
            .deploy(|vault| WeightChangerController::new(vault, vault))
            .unwrap();
        ledger.warp_to(now).unwrap();
        let before = ledger.pool().get_gradual_weight_update_params();

        let result = ledger.execute(&mut controller, STRANGER, |c, ctx| {
            c.make_target_ramp(ctx, &weights)
        });

        prop_assert_eq!(result.is_ok(), is_acceptable(&weights));
        if result.is_err() {
            prop_assert_eq!(ledger.pool().get_gradual_weight_update_params(), before);
            prop_assert!(ledger.events().is_empty());
        } else {
            prop_assert_eq!(ledger.pool().get_gradual_weight_update_params().end_weights, weights);
        }
    }

    #[test]
    fn prop_plan_rejects_any_invalid_vector(
        weights in prop::collection::vec(any_weight(), 2..=6),
    ) {
        let result = plan_weight_ramp(0, WEIGHT_CHANGE_DURATION, &tokens(weights.len()), &weights);
        prop_assert_eq!(result.is_ok(), is_acceptable(&weights));
    }
}

// ============================================================================
// Ramp Endpoints
// ============================================================================

proptest! {
    /// The planned window is exactly `[now, now + duration]` and the end
    /// weights are passed through untouched
    #[test]
    fn prop_weight_ramp_endpoints(
        weights in valid_weights(2..=6),
        now in 0i64..10_000 * DAY,
        duration in 0i64..365 * DAY,
    ) {
        let ramp = plan_weight_ramp(now, duration, &tokens(weights.len()), &weights).unwrap();

        prop_assert_eq!(ramp.window.start_time, now);
        prop_assert_eq!(ramp.window.end_time, now + duration);
        prop_assert_eq!(&ramp.end_weights, &weights);
    }

    /// Same through the simulated pool: once the window is over, the pool
    /// reports exactly the target
    #[test]
    fn prop_pool_lands_on_target(weights in valid_weights(2)) {
        let mut ledger = ledger(2, true);
        let mut controller = ledger
            .deploy(|vault| WeightChangerController::new(vault, vault))
            .unwrap();

        let event = ledger
            .execute(&mut controller, STRANGER, |c, ctx| c.make_target_ramp(ctx, &weights))
            .unwrap();
        prop_assert_eq!((event.start_time, event.end_time), (0, WEIGHT_CHANGE_DURATION));

        ledger.warp_to(WEIGHT_CHANGE_DURATION).unwrap();
        prop_assert_eq!(ledger.pool().get_normalized_weights(), weights);
    }
}

// ============================================================================
// Failed Calls Leave No Trace
// ============================================================================

proptest! {
    /// Whatever sequence of calls is made, a failed call leaves the phase
    /// timestamps and the pool exactly as they were
    #[test]
    fn prop_failed_calls_leave_timestamps(
        policy in policy(),
        start_paused in any::<bool>(),
        calls in gate_calls(),
    ) {
        let mut ledger = ledger(2, !start_paused);
        let mut controller = ledger
            .deploy(|vault| RebalancerController::new(vault, vault, from_percent(1), policy))
            .unwrap();

        for (delay, call) in calls {
            ledger.advance(delay).unwrap();
            let rebalance_before = controller.last_rebalance_call();
            let pause_before = controller.last_pause_call();
            let pool_before = ledger.pool().clone();

            let result = match call {
                GateCall::Rebalance => ledger
                    .execute(&mut controller, STRANGER, |c, ctx| c.rebalance(ctx))
                    .map(|_| ()),
                GateCall::Pause => ledger
                    .execute(&mut controller, STRANGER, |c, ctx| c.pause(ctx))
                    .map(|_| ()),
            };

            match result {
                Err(err) => {
                    prop_assert!(err.is_guard_violation(), "unexpected error {:?}", err);
                    prop_assert_eq!(controller.last_rebalance_call(), rebalance_before);
                    prop_assert_eq!(controller.last_pause_call(), pause_before);
                    prop_assert_eq!(ledger.pool(), &pool_before);
                }
                Ok(()) => {
                    let now = Some(ledger.now());
                    let recorded = match call {
                        GateCall::Rebalance => controller.last_rebalance_call(),
                        GateCall::Pause => controller.last_pause_call(),
                    };
                    prop_assert_eq!(recorded, now);
                }
            }
        }
    }
}
