//! Insertion-ordered name → address table

use crate::errors::*;
use crate::types::*;
use std::collections::HashMap;

/// Address book
///
/// Maps logical contract names to deployed addresses. Names are compared
/// case-sensitively and keep the position of their first insertion. A name
/// may be reserved with the zero address during bootstrap; such a slot is
/// invisible to lookups until a real address is bound.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `address`.
    ///
    /// Returns the previously bound address, if any. Filling a reserved slot
    /// is not an overwrite.
    pub fn set(
        &mut self,
        name: &str,
        address: Address,
        allow_overwrite: bool,
    ) -> Result<Option<Address>> {
        self.check_set(name, address, allow_overwrite)?;

        match self.entries.get_mut(name) {
            Some(entry) => {
                let previous = (!entry.is_reserved()).then_some(entry.address);
                entry.address = address;
                Ok(previous)
            }
            None => {
                self.insert(name, address);
                Ok(None)
            }
        }
    }

    /// Validate a `set` without applying it.
    pub fn check_set(&self, name: &str, address: Address, allow_overwrite: bool) -> Result<()> {
        validate_name(name)?;

        if address.is_zero() {
            return Err(RegistryError::InvalidAddress {
                name: name.to_string(),
            });
        }

        if let Some(entry) = self.entries.get(name) {
            if entry.frozen {
                return Err(RegistryError::FrozenName {
                    name: name.to_string(),
                });
            }
            if !allow_overwrite && !entry.is_reserved() {
                return Err(RegistryError::AlreadyRegistered {
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Reserve `name` with the zero placeholder. No-op if the name exists.
    ///
    /// Returns whether a new slot was created.
    pub fn reserve(&mut self, name: &str) -> Result<bool> {
        validate_name(name)?;
        if self.entries.contains_key(name) {
            return Ok(false);
        }
        self.insert(name, Address::ZERO);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Result<Address> {
        match self.entries.get(name) {
            Some(entry) if !entry.is_reserved() => Ok(entry.address),
            _ => Err(RegistryError::unknown(name)),
        }
    }

    /// Mark an entry immutable. Idempotent.
    ///
    /// Returns whether the entry was newly frozen.
    pub fn freeze(&mut self, name: &str) -> Result<bool> {
        self.check_freeze(name)?;
        match self.entries.get_mut(name) {
            Some(entry) if !entry.frozen => {
                entry.frozen = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Validate a `freeze` without applying it.
    pub fn check_freeze(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.get(name).map(|_| ())
    }

    /// Whether `name` resolves to a deployed address
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(Entry::is_reserved)
    }

    pub fn is_frozen(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.frozen)
    }

    /// All entries, reserved ones included, in insertion order
    pub fn entries(&self) -> Vec<Entry> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, name: &str, address: Address) {
        self.order.push(name.to_string());
        self.entries.insert(
            name.to_string(),
            Entry {
                name: name.to_string(),
                address,
                frozen: false,
            },
        );
    }
}
