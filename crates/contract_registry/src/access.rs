//! Owner-only access control

use crate::errors::*;
use crate::types::*;

/// Access guard
///
/// Holds the single principal allowed to mutate the registry. There is
/// always exactly one owner: ownership moves only through `transfer`, which
/// the current owner must authorize, and never to the zero principal.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    owner: Principal,
}

impl AccessGuard {
    pub fn new(owner: Principal) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn is_owner(&self, caller: &Principal) -> bool {
        &self.owner == caller
    }

    pub fn authorize(&self, caller: &Principal) -> Result<()> {
        if !self.is_owner(caller) {
            return Err(RegistryError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Validate a `transfer` without applying it.
    pub fn check_transfer(&self, caller: &Principal, new_owner: &Principal) -> Result<()> {
        self.authorize(caller)?;
        if new_owner.is_zero() {
            return Err(RegistryError::InvalidAddress {
                name: "owner".to_string(),
            });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`, returning the previous owner.
    pub fn transfer(&mut self, caller: &Principal, new_owner: Principal) -> Result<Principal> {
        self.check_transfer(caller, &new_owner)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
