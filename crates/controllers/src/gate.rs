//! Phase gate
//!
//! Tracks when the last rebalance and the last pause happened and answers
//! whether the next transition is allowed. Mutual exclusion between the
//! rebalancing and paused phases comes purely from these timestamps; there is
//! no other lock. Boundaries are inclusive: a call exactly one interval after
//! the previous one is allowed.

use tracing::debug;

use crate::constants::{MIN_PAUSE_DURATION, MIN_TIME_BETWEEN_REBALANCES, REBALANCE_DURATION};
use crate::errors::{ControllerError, CoreResult};
use crate::types::UnixTimestamp;

/// Which phases a rebalance may start from
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "snake_case"))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
#[repr(u8)]
pub enum RebalancePolicy {
    /// Rebalance from idle or paused once the interval has elapsed; a paused
    /// pool gets its swaps re-enabled as part of the rebalance
    #[default]
    Standard = 0,

    /// Rebalance only from the paused phase, and only after the pause has
    /// lasted the minimum pause duration
    PausedCooldown = 1,
}

/// Durations (seconds) the gate enforces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct PhaseSchedule {
    /// Minimum time between two rebalances
    pub min_rebalance_interval: i64,
    /// Length of the rebalance fee ramp; pausing is blocked until it ends
    pub rebalance_window: i64,
    /// Minimum pause length before a rebalance (paused-cooldown policy only)
    pub min_pause_duration: i64,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            min_rebalance_interval: MIN_TIME_BETWEEN_REBALANCES,
            rebalance_window: REBALANCE_DURATION,
            min_pause_duration: MIN_PAUSE_DURATION,
        }
    }
}

impl PhaseSchedule {
    pub fn validate(&self) -> CoreResult<()> {
        let durations = [
            ("min_rebalance_interval", self.min_rebalance_interval),
            ("rebalance_window", self.rebalance_window),
            ("min_pause_duration", self.min_pause_duration),
        ];
        for (name, value) in durations {
            if value < 0 {
                return Err(ControllerError::InvalidDuration { name, value });
            }
        }
        Ok(())
    }
}

/// Guard timestamps of a rebalancing controller
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct PhaseGate {
    policy: RebalancePolicy,
    schedule: PhaseSchedule,
    /// Time of the last successful rebalance, `None` before the first one
    last_rebalance_call: Option<UnixTimestamp>,
    /// Time of the last successful pause, `None` before the first one
    last_pause_call: Option<UnixTimestamp>,
}

impl PhaseGate {
    pub fn new(policy: RebalancePolicy, schedule: PhaseSchedule) -> CoreResult<Self> {
        schedule.validate()?;
        Ok(Self {
            policy,
            schedule,
            last_rebalance_call: None,
            last_pause_call: None,
        })
    }

    pub fn policy(&self) -> RebalancePolicy {
        self.policy
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    pub fn last_rebalance_call(&self) -> Option<UnixTimestamp> {
        self.last_rebalance_call
    }

    pub fn last_pause_call(&self) -> Option<UnixTimestamp> {
        self.last_pause_call
    }

    /// Earliest time the interval guard lets the next rebalance through
    pub fn next_rebalance_allowed_at(&self) -> CoreResult<Option<UnixTimestamp>> {
        self.last_rebalance_call
            .map(|last| offset(last, self.schedule.min_rebalance_interval))
            .transpose()
    }

    /// End of the current (or last) rebalance fee ramp
    pub fn rebalance_window_ends_at(&self) -> CoreResult<Option<UnixTimestamp>> {
        self.last_rebalance_call
            .map(|last| offset(last, self.schedule.rebalance_window))
            .transpose()
    }

    /// Earliest time the pause cooldown is satisfied
    pub fn pause_cooldown_ends_at(&self) -> CoreResult<Option<UnixTimestamp>> {
        self.last_pause_call
            .map(|last| offset(last, self.schedule.min_pause_duration))
            .transpose()
    }

    /// Whether the rebalance fee ramp is still running at `now`
    pub fn is_rebalancing(&self, now: UnixTimestamp) -> CoreResult<bool> {
        Ok(matches!(self.rebalance_window_ends_at()?, Some(end) if now < end))
    }

    /// Check every guard on entering the rebalancing phase
    pub fn check_rebalance(&self, now: UnixTimestamp, swaps_enabled: bool) -> CoreResult<()> {
        if let Some(next_allowed_at) = self.next_rebalance_allowed_at()? {
            if now < next_allowed_at {
                debug!(now, next_allowed_at, "rebalance interval not met");
                return Err(ControllerError::MinimumIntervalNotMet { next_allowed_at });
            }
        }

        if self.policy == RebalancePolicy::PausedCooldown {
            if swaps_enabled {
                debug!(now, "rebalance requires a paused pool");
                return Err(ControllerError::PoolNotPaused);
            }
            if let Some(pause_ends_at) = self.pause_cooldown_ends_at()? {
                if now < pause_ends_at {
                    debug!(now, pause_ends_at, "pause cooldown not met");
                    return Err(ControllerError::MinimumPauseNotMet { pause_ends_at });
                }
            }
        }

        Ok(())
    }

    pub fn can_enter_rebalance(&self, now: UnixTimestamp, swaps_enabled: bool) -> bool {
        self.check_rebalance(now, swaps_enabled).is_ok()
    }

    /// Check every guard on entering the paused phase
    pub fn check_pause(&self, now: UnixTimestamp, swaps_enabled: bool) -> CoreResult<()> {
        if let Some(window_ends_at) = self.rebalance_window_ends_at()? {
            if now < window_ends_at {
                debug!(now, window_ends_at, "rebalance window still open");
                return Err(ControllerError::StillRebalancing { window_ends_at });
            }
        }

        if !swaps_enabled {
            return Err(ControllerError::SwapsAlreadyPaused);
        }

        Ok(())
    }

    pub fn can_enter_pause(&self, now: UnixTimestamp, swaps_enabled: bool) -> bool {
        self.check_pause(now, swaps_enabled).is_ok()
    }

    /// Record a completed rebalance. Timestamps never move backwards.
    pub fn record_rebalance_entered(&mut self, now: UnixTimestamp) {
        self.last_rebalance_call = Some(self.last_rebalance_call.map_or(now, |last| last.max(now)));
    }

    /// Record a completed pause. Timestamps never move backwards.
    pub fn record_pause_entered(&mut self, now: UnixTimestamp) {
        self.last_pause_call = Some(self.last_pause_call.map_or(now, |last| last.max(now)));
    }
}

fn offset(timestamp: UnixTimestamp, duration: i64) -> CoreResult<UnixTimestamp> {
    timestamp
        .checked_add(duration)
        .ok_or(ControllerError::MathOverflow)
}
