use tracing::info;

use crate::errors::{ControllerError, CoreResult};
use crate::types::Address;

/// Single-owner access control.
///
/// The owner role starts with the deployer and is handed to the manager once,
/// at construction. There is no later reassignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "anchor",
    derive(
        anchor_lang::prelude::AnchorSerialize,
        anchor_lang::prelude::AnchorDeserialize
    )
)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    pub fn handed_over(deployer: Address, manager: Address) -> Self {
        info!(previous_owner = %deployer, new_owner = %manager, "ownership transferred");
        Self { owner: manager }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ensure_owner(&self, caller: Address) -> CoreResult<()> {
        if caller != self.owner {
            return Err(ControllerError::CallerNotOwner { caller });
        }
        Ok(())
    }
}
