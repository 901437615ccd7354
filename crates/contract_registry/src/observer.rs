//! Address-update observers and late-bound peer handles

use crate::errors::*;
use crate::registry::Registry;
use crate::types::*;
use parking_lot::RwLock;
use std::sync::Arc;

/// Hook invoked after a watched name is rebound with notification enabled.
///
/// Observers run outside the registry lock and may query the registry.
pub trait AddressObserver: Send + Sync {
    fn on_address_updated(&self);
}

/// Handle returned by [`Registry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Component-side reference to a peer, resolved by name on first use.
///
/// The resolved address is cached until the registry reports that the peer
/// was redeployed, so an upgrade is picked up without redeploying the
/// component holding the handle.
pub struct PeerHandle {
    registry: Arc<Registry>,
    name: String,
    cache: Arc<RwLock<Option<Address>>>,
    subscription: SubscriptionId,
}

struct CacheInvalidator {
    cache: Arc<RwLock<Option<Address>>>,
}

impl AddressObserver for CacheInvalidator {
    fn on_address_updated(&self) {
        *self.cache.write() = None;
    }
}

impl PeerHandle {
    pub fn new(registry: Arc<Registry>, name: impl Into<String>) -> Self {
        let name = name.into();
        let cache = Arc::new(RwLock::new(None));
        let subscription = registry.subscribe(
            &name,
            Arc::new(CacheInvalidator {
                cache: cache.clone(),
            }),
        );

        Self {
            registry,
            name,
            cache,
            subscription,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Current address of the peer
    pub fn address(&self) -> Result<Address> {
        if let Some(address) = *self.cache.read() {
            return Ok(address);
        }

        // Held across the lookup so a concurrent invalidation cannot be
        // overwritten by a stale result.
        let mut cache = self.cache.write();
        let address = self.registry.get_contract_address(&self.name)?;
        *cache = Some(address);
        Ok(address)
    }

    pub fn is_cached(&self) -> bool {
        self.cache.read().is_some()
    }
}

impl Drop for PeerHandle {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.subscription);
    }
}

impl std::fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerHandle")
            .field("name", &self.name)
            .field("cached", &*self.cache.read())
            .finish()
    }
}
