//! Protocol constants
//!
//! Fixed-point values use 18 decimals (`ONE` = 1.0). Durations are seconds.

// ============================================================================
// Fixed Point
// ============================================================================

/// Fixed-point 1.0
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// 1% in fixed point
pub const ONE_PERCENT: u128 = ONE / 100;

/// Smallest normalized weight a token may be ramped to (1%)
pub const MIN_WEIGHT: u128 = ONE_PERCENT;

/// Largest normalized weight a token may be ramped to (99%)
pub const MAX_WEIGHT: u128 = 99 * ONE_PERCENT;

// ============================================================================
// Swap Fee Bounds
// ============================================================================

/// Lowest swap fee a managed pool accepts (0.0001%)
pub const MIN_SWAP_FEE_PERCENTAGE: u128 = 1_000_000_000_000;

/// Highest swap fee a managed pool accepts (95%)
pub const MAX_SWAP_FEE_PERCENTAGE: u128 = 95 * ONE_PERCENT;

// ============================================================================
// Time
// ============================================================================

pub const HOUR: i64 = 60 * 60;
pub const DAY: i64 = 24 * HOUR;

// ============================================================================
// Rebalancer
// ============================================================================

/// Length of the decaying fee ramp started by each rebalance
pub const REBALANCE_DURATION: i64 = 7 * DAY;

/// Minimum time between two rebalance calls
pub const MIN_TIME_BETWEEN_REBALANCES: i64 = 30 * DAY;

/// Minimum time the pool stays paused before the paused-cooldown policy
/// allows the next rebalance
pub const MIN_PAUSE_DURATION: i64 = 7 * DAY;

/// Fee the rebalance ramp starts from (90%)
pub const REBALANCE_START_SWAP_FEE: u128 = 90 * ONE_PERCENT;

// ============================================================================
// Pause / Unpause
// ============================================================================

/// Length of the fee ramp installed by a safe unpause
pub const SAFE_UNPAUSE_DURATION: i64 = 3 * DAY;

/// Fee a safe unpause starts from (80%)
pub const SAFE_UNPAUSE_START_SWAP_FEE: u128 = 80 * ONE_PERCENT;

// ============================================================================
// Weight Changer
// ============================================================================

/// Length of every weight ramp started by the weight changer
pub const WEIGHT_CHANGE_DURATION: i64 = 7 * DAY;

/// Number of tokens the weight changer supports
pub const WEIGHT_CHANGER_TOKEN_COUNT: usize = 2;
