//! # Controller Error Types
//!
//! Every failure aborts the whole controller call. Variants are grouped by
//! [`ErrorCategory`] so callers can tell "too early", "wrong phase",
//! "bad input" and "authorization denied" apart without string matching.

use thiserror::Error;

use crate::types::{Address, PoolId, TokenId, UnixTimestamp};

/// Result type for controller operations
pub type CoreResult<T> = Result<T, ControllerError>;

/// Coarse classification of a [`ControllerError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "snake_case"))]
pub enum ErrorCategory {
    /// Timing or phase-ordering precondition failed; retry later or in the right phase
    Guard,
    /// Caller input rejected
    Validation,
    /// Caller lacks the required role or right
    Authorization,
    /// Pool did not change state as commanded
    PostCondition,
    /// Pool or vault rejected the call
    Collaborator,
    /// Checked arithmetic failed
    Math,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    // ========================================================================
    // Guard Violations
    // ========================================================================
    #[error("Minimum time between calls not met (next call allowed at {next_allowed_at})")]
    MinimumIntervalNotMet { next_allowed_at: UnixTimestamp },

    #[error("Pool is still rebalancing (window ends at {window_ends_at})")]
    StillRebalancing { window_ends_at: UnixTimestamp },

    #[error("Minimum pause duration not met (pause ends at {pause_ends_at})")]
    MinimumPauseNotMet { pause_ends_at: UnixTimestamp },

    #[error("Pool must be paused before rebalancing")]
    PoolNotPaused,

    #[error("Swaps already paused")]
    SwapsAlreadyPaused,

    #[error("Swaps already enabled")]
    SwapsAlreadyEnabled,

    // ========================================================================
    // Validation Failures
    // ========================================================================
    #[error("Weight out of bounds: weight {index} is {weight}")]
    WeightOutOfBounds { index: usize, weight: u128 },

    #[error("Weights must sum to one (got {sum})")]
    WeightsMustSumToOne { sum: u128 },

    #[error("Weight count mismatch: {weights} weights for {tokens} tokens")]
    WeightCountMismatch { weights: usize, tokens: usize },

    #[error("Swap fee out of bounds: {0}")]
    SwapFeeOutOfBounds(u128),

    #[error("Invalid ramp window: start {start_time}, end {end_time}")]
    InvalidRampWindow {
        start_time: UnixTimestamp,
        end_time: UnixTimestamp,
    },

    #[error("Invalid duration {name}: {value}")]
    InvalidDuration { name: &'static str, value: i64 },

    #[error("Weight change too fast: {duration}s is below the {minimum}s minimum")]
    WeightChangeTooFast { duration: i64, minimum: i64 },

    #[error("Unsupported token count: expected {expected}, pool holds {actual}")]
    UnsupportedTokenCount { expected: usize, actual: usize },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("Pool mismatch: controller is bound to {expected}, got {actual}")]
    PoolMismatch { expected: PoolId, actual: PoolId },

    // ========================================================================
    // Authorization Failures
    // ========================================================================
    #[error("Caller is not the owner: {caller}")]
    CallerNotOwner { caller: Address },

    #[error("Right not granted: {0}")]
    RightNotGranted(&'static str),

    // ========================================================================
    // Defensive Post-Condition Failures
    // ========================================================================
    #[error("Pausing failed")]
    PausingFailed,

    #[error("Unpausing failed")]
    UnpausingFailed,

    // ========================================================================
    // Collaborator and Math Errors
    // ========================================================================
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Math overflow")]
    MathOverflow,
}

impl ControllerError {
    pub fn category(&self) -> ErrorCategory {
        use ControllerError::*;
        match self {
            MinimumIntervalNotMet { .. }
            | StillRebalancing { .. }
            | MinimumPauseNotMet { .. }
            | PoolNotPaused
            | SwapsAlreadyPaused
            | SwapsAlreadyEnabled => ErrorCategory::Guard,
            WeightOutOfBounds { .. }
            | WeightsMustSumToOne { .. }
            | WeightCountMismatch { .. }
            | SwapFeeOutOfBounds(_)
            | InvalidRampWindow { .. }
            | InvalidDuration { .. }
            | WeightChangeTooFast { .. }
            | UnsupportedTokenCount { .. }
            | InvalidIdentifier(_)
            | InvalidDecimal(_)
            | PoolMismatch { .. } => ErrorCategory::Validation,
            CallerNotOwner { .. } | RightNotGranted(_) => ErrorCategory::Authorization,
            PausingFailed | UnpausingFailed => ErrorCategory::PostCondition,
            Pool(_) => ErrorCategory::Collaborator,
            MathOverflow => ErrorCategory::Math,
        }
    }

    pub fn is_guard_violation(&self) -> bool {
        self.category() == ErrorCategory::Guard
    }
}

/// Failures reported by the pool or vault collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Unknown pool: {0}")]
    UnknownPool(PoolId),

    #[error("No pool has been created yet")]
    NoPoolCreated,

    #[error("Swap fee rejected by pool: {0}")]
    SwapFeeRejected(u128),

    #[error("Weights rejected by pool")]
    WeightsRejected,

    #[error("Token not registered in pool: {0}")]
    UnknownToken(TokenId),

    #[error("Token already registered in pool: {0}")]
    TokenAlreadyRegistered(TokenId),

    #[error("Pool rejected ramp ending at {0}")]
    RampRejected(UnixTimestamp),

    #[error("Pool call failed: {0}")]
    CallFailed(String),

    #[error("Operation not supported by pool: {0}")]
    Unsupported(&'static str),
}
