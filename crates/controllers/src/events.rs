//! Events emitted by successful controller transitions

use crate::ramp::RampWindow;
use crate::types::{Address, PoolId, TokenId, UnixTimestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolRebalancing {
    pub pool_id: PoolId,
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
    pub start_swap_fee: u128,
    pub end_swap_fee: u128,
    /// Swaps were disabled and got re-enabled by this rebalance
    pub resumed_swaps: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolPaused {
    pub pool_id: PoolId,
    pub paused_at: UnixTimestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolUnpaused {
    pub pool_id: PoolId,
    pub unpaused_at: UnixTimestamp,
    /// Fee ramp installed by a safe unpause, `None` for an immediate one
    pub fee_ramp: Option<RampWindow>,
    pub end_swap_fee: Option<u128>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightChangeScheduled {
    pub pool_id: PoolId,
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
    pub tokens: Vec<TokenId>,
    pub end_weights: Vec<u128>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapFeeChangeScheduled {
    pub pool_id: PoolId,
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
    pub start_swap_fee: u128,
    pub end_swap_fee: u128,
}

/// Pass-through action forwarded by the permission-checklist controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "snake_case"))]
pub enum PermissionedAction {
    SetSwapEnabled,
    SetMustAllowlistLps,
    AddAllowedAddress,
    RemoveAllowedAddress,
    AddToken,
    RemoveToken,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolPermissionAction {
    pub pool_id: PoolId,
    pub caller: Address,
    pub action: PermissionedAction,
    pub at: UnixTimestamp,
}

/// Any event a controller can emit
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize))]
#[cfg_attr(feature = "client", serde(tag = "event", rename_all = "snake_case"))]
pub enum ControllerEvent {
    PoolRebalancing(PoolRebalancing),
    PoolPaused(PoolPaused),
    PoolUnpaused(PoolUnpaused),
    WeightChangeScheduled(WeightChangeScheduled),
    SwapFeeChangeScheduled(SwapFeeChangeScheduled),
    PoolPermissionAction(PoolPermissionAction),
}

macro_rules! impl_from_event {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ControllerEvent {
                fn from(event: $variant) -> Self {
                    ControllerEvent::$variant(event)
                }
            }
        )*
    };
}

impl_from_event!(
    PoolRebalancing,
    PoolPaused,
    PoolUnpaused,
    WeightChangeScheduled,
    SwapFeeChangeScheduled,
    PoolPermissionAction,
);

impl ControllerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerEvent::PoolRebalancing(_) => "PoolRebalancing",
            ControllerEvent::PoolPaused(_) => "PoolPaused",
            ControllerEvent::PoolUnpaused(_) => "PoolUnpaused",
            ControllerEvent::WeightChangeScheduled(_) => "WeightChangeScheduled",
            ControllerEvent::SwapFeeChangeScheduled(_) => "SwapFeeChangeScheduled",
            ControllerEvent::PoolPermissionAction(_) => "PoolPermissionAction",
        }
    }
}
