//! Contract registry implementation
//!
//! Composes the address book, alias resolver and access guard behind a
//! single lock, journals every mutation, and notifies observers when a
//! name is rebound.

use crate::access::AccessGuard;
use crate::address_book::AddressBook;
use crate::aliases::AliasResolver;
use crate::errors::*;
use crate::journal::*;
use crate::observer::{AddressObserver, SubscriptionId};
use crate::types::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read access to contract addresses by logical name.
///
/// This is all a wired component needs to reach its peers.
pub trait ContractLookup: Send + Sync {
    fn contract_address(&self, name: &str) -> Result<Address>;
}

type ObserverList = Vec<(SubscriptionId, Arc<dyn AddressObserver>)>;

/// Contract registry
///
/// The single source of truth every component queries to resolve a peer.
/// Reads share a lock; writes take it exclusively for the whole
/// validate → journal → apply sequence, so a reader never sees a partial
/// update and a failed operation leaves no trace.
pub struct Registry {
    state: RwLock<RegistryState>,
    /// Watched name → observers
    observers: RwLock<HashMap<String, ObserverList>>,
    next_subscription: AtomicU64,
}

struct RegistryState {
    book: AddressBook,
    aliases: AliasResolver,
    guard: AccessGuard,
    journal: Box<dyn JournalSink>,
    next_sequence: u64,
}

impl RegistryState {
    fn genesis(owner: Principal, mut journal: Box<dyn JournalSink>) -> Result<Self> {
        if owner.is_zero() {
            return Err(RegistryError::InvalidAddress {
                name: "owner".to_string(),
            });
        }
        journal.append(&JournalRecord::new(
            0,
            owner,
            JournalAction::Genesis { owner },
        ))?;

        Ok(Self {
            book: AddressBook::new(),
            aliases: AliasResolver::new(),
            guard: AccessGuard::new(owner),
            journal,
            next_sequence: 1,
        })
    }

    /// Check `action` on behalf of `actor`.
    ///
    /// Returns `false` when the action is valid but would not change state.
    fn validate(&self, actor: &Principal, action: &JournalAction) -> Result<bool> {
        if let Err(err) = self.guard.authorize(actor) {
            warn!(caller = %actor, owner = %self.guard.owner(), "Rejected registry mutation");
            return Err(err);
        }

        match action {
            JournalAction::Genesis { .. } => Err(RegistryError::Journal(
                "genesis record is only valid at sequence 0".to_string(),
            )),
            JournalAction::SetAddress { name, address } => {
                self.book.check_set(name, *address, true)?;
                Ok(true)
            }
            JournalAction::Reserve { name } => {
                validate_name(name)?;
                Ok(!self.book.is_reserved(name) && !self.book.exists(name))
            }
            JournalAction::Freeze { name } => {
                self.book.check_freeze(name)?;
                Ok(!self.book.is_frozen(name))
            }
            JournalAction::AddAlias { alias, canonical } => {
                self.aliases.check_alias(alias, canonical)?;
                Ok(true)
            }
            JournalAction::RemoveAlias { alias } => {
                if !self.aliases.contains(alias) {
                    return Err(RegistryError::unknown(alias));
                }
                Ok(true)
            }
            JournalAction::TransferOwnership { new_owner } => {
                self.guard.check_transfer(actor, new_owner)?;
                Ok(true)
            }
        }
    }

    /// Apply a validated action to the in-memory tables.
    fn apply(&mut self, actor: &Principal, action: &JournalAction) -> Result<()> {
        match action {
            JournalAction::Genesis { .. } => {}
            JournalAction::SetAddress { name, address } => {
                self.book.set(name, *address, true)?;
            }
            JournalAction::Reserve { name } => {
                self.book.reserve(name)?;
            }
            JournalAction::Freeze { name } => {
                self.book.freeze(name)?;
            }
            JournalAction::AddAlias { alias, canonical } => {
                self.aliases.add_alias(alias, canonical)?;
            }
            JournalAction::RemoveAlias { alias } => {
                self.aliases.remove_alias(alias)?;
            }
            JournalAction::TransferOwnership { new_owner } => {
                self.guard.transfer(actor, *new_owner)?;
            }
        }
        Ok(())
    }

    /// Validate, journal, then apply. Returns whether state changed.
    fn commit(&mut self, actor: Principal, action: JournalAction) -> Result<bool> {
        if !self.validate(&actor, &action)? {
            return Ok(false);
        }

        let record = JournalRecord::new(self.next_sequence, actor, action);
        self.journal.append(&record)?;
        self.next_sequence += 1;
        self.apply(&actor, &record.action)?;
        Ok(true)
    }
}

impl Registry {
    /// Create an empty registry owned by `owner`, journaled in memory.
    pub fn new(owner: Principal) -> Result<Self> {
        Self::with_journal(owner, Box::new(MemoryJournal::new()))
    }

    /// Create an empty registry owned by `owner` on a fresh journal.
    pub fn with_journal(owner: Principal, journal: Box<dyn JournalSink>) -> Result<Self> {
        if !journal.records()?.is_empty() {
            return Err(RegistryError::Journal(
                "journal already holds records; reopen it instead".to_string(),
            ));
        }

        let state = RegistryState::genesis(owner, journal)?;
        info!(owner = %owner, "Created contract registry");
        Ok(Self::from_state(state))
    }

    /// Rebuild a registry by replaying an existing journal.
    pub fn open(journal: Box<dyn JournalSink>) -> Result<Self> {
        let records = journal.records()?;
        let (first, rest) = records
            .split_first()
            .ok_or_else(|| RegistryError::Journal("journal is empty".to_string()))?;

        let owner = match &first.action {
            JournalAction::Genesis { owner } if first.sequence == 0 => *owner,
            _ => {
                return Err(RegistryError::Journal(
                    "journal does not start with a genesis record".to_string(),
                ))
            }
        };

        let mut state = RegistryState {
            book: AddressBook::new(),
            aliases: AliasResolver::new(),
            guard: AccessGuard::new(owner),
            journal,
            next_sequence: 1,
        };

        for record in rest {
            if record.sequence != state.next_sequence {
                return Err(RegistryError::Journal(format!(
                    "expected sequence {}, found {}",
                    state.next_sequence, record.sequence
                )));
            }
            state
                .validate(&record.actor, &record.action)
                .and_then(|_| state.apply(&record.actor, &record.action))
                .map_err(|e| {
                    RegistryError::Journal(format!("replay failed at {}: {e}", record.sequence))
                })?;
            state.next_sequence += 1;
        }

        info!(
            owner = %state.guard.owner(),
            records = records.len(),
            "Restored contract registry from journal"
        );
        Ok(Self::from_state(state))
    }

    fn from_state(state: RegistryState) -> Self {
        Self {
            state: RwLock::new(state),
            observers: RwLock::new(HashMap::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Bind `name` to `address`. Aliases are not resolved.
    ///
    /// With `notify`, observers watching `name` (or an alias of it) are
    /// invoked after the update. Bootstrap registrations pass `false`
    /// because nothing can be watching a component that does not exist yet.
    pub fn set_contract_address(
        &self,
        caller: &Principal,
        name: &str,
        address: Address,
        notify: bool,
    ) -> Result<()> {
        let watched = {
            let mut state = self.state.write();
            state.commit(
                *caller,
                JournalAction::SetAddress {
                    name: name.to_string(),
                    address,
                },
            )?;
            info!(name, %address, notify, "Set contract address");

            let mut watched = state.aliases.aliases_of(name);
            watched.push(name.to_string());
            watched
        };

        if notify {
            self.notify(&watched);
        }
        Ok(())
    }

    /// Reserve `name` with the zero placeholder during bootstrap.
    pub fn reserve_contract(&self, caller: &Principal, name: &str) -> Result<()> {
        let changed = self.state.write().commit(
            *caller,
            JournalAction::Reserve {
                name: name.to_string(),
            },
        )?;
        if changed {
            info!(name, "Reserved contract name");
        }
        Ok(())
    }

    /// Resolve `name` through one alias hop and return its address.
    pub fn get_contract_address(&self, name: &str) -> Result<Address> {
        let state = self.state.read();
        let resolved = state.aliases.resolve(name);
        state.book.get(resolved)
    }

    /// Make the address bound to `name` permanent.
    pub fn freeze(&self, caller: &Principal, name: &str) -> Result<()> {
        let changed = self.state.write().commit(
            *caller,
            JournalAction::Freeze {
                name: name.to_string(),
            },
        )?;
        if changed {
            info!(name, "Froze contract address");
        }
        Ok(())
    }

    /// Point `alias` at `canonical`. Watchers of `alias` are notified when
    /// the target changes.
    pub fn add_alias(&self, caller: &Principal, alias: &str, canonical: &str) -> Result<()> {
        let retargeted = {
            let mut state = self.state.write();
            let previous = state.aliases.resolve(alias).to_string();
            state.commit(
                *caller,
                JournalAction::AddAlias {
                    alias: alias.to_string(),
                    canonical: canonical.to_string(),
                },
            )?;
            previous != canonical
        };
        info!(alias, canonical, "Added alias");

        if retargeted {
            self.notify(&[alias.to_string()]);
        }
        Ok(())
    }

    /// Drop `alias`. Its watchers are notified since it no longer resolves
    /// to the old target.
    pub fn remove_alias(&self, caller: &Principal, alias: &str) -> Result<()> {
        self.state.write().commit(
            *caller,
            JournalAction::RemoveAlias {
                alias: alias.to_string(),
            },
        )?;
        info!(alias, "Removed alias");

        self.notify(&[alias.to_string()]);
        Ok(())
    }

    /// Transfer registry ownership. The caller must be the current owner.
    pub fn set_owner(&self, caller: &Principal, new_owner: Principal) -> Result<()> {
        self.state
            .write()
            .commit(*caller, JournalAction::TransferOwnership { new_owner })?;
        info!(previous = %caller, owner = %new_owner, "Transferred registry ownership");
        Ok(())
    }

    pub fn owner(&self) -> Principal {
        self.state.read().guard.owner()
    }

    /// Whether `name` (after alias resolution) resolves to an address
    pub fn contains(&self, name: &str) -> bool {
        self.get_contract_address(name).is_ok()
    }

    /// Canonical name `name` resolves to
    pub fn resolve_name(&self, name: &str) -> String {
        self.state.read().aliases.resolve(name).to_string()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.state.read().book.entries()
    }

    pub fn aliases(&self) -> Vec<Alias> {
        self.state.read().aliases.aliases()
    }

    /// Journal records in sequence order
    pub fn journal(&self) -> Result<Vec<JournalRecord>> {
        self.state.read().journal.records()
    }

    /// Watch `name` for address updates.
    pub fn subscribe(&self, name: &str, observer: Arc<dyn AddressObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .entry(name.to_string())
            .or_default()
            .push((id, observer));
        debug!(name, subscription = id.0, "Registered address observer");
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let mut removed = false;
        observers.retain(|_, list| {
            let before = list.len();
            list.retain(|(sub, _)| *sub != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    fn notify(&self, names: &[String]) {
        let targets: Vec<Arc<dyn AddressObserver>> = {
            let observers = self.observers.read();
            names
                .iter()
                .filter_map(|name| observers.get(name))
                .flat_map(|list| list.iter().map(|(_, observer)| observer.clone()))
                .collect()
        };

        if targets.is_empty() {
            return;
        }
        debug!(names = ?names, observers = targets.len(), "Notifying address observers");
        for observer in targets {
            observer.on_address_updated();
        }
    }
}

impl ContractLookup for Registry {
    fn contract_address(&self, name: &str) -> Result<Address> {
        self.get_contract_address(name)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("owner", &state.guard.owner())
            .field("entries", &state.book.len())
            .field("aliases", &state.aliases.len())
            .finish()
    }
}
