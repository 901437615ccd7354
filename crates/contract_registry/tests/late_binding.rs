use contract_registry::*;
use std::sync::Arc;
use std::thread;

fn owner() -> Principal {
    Principal(Address([0x01; ADDRESS_BYTES]))
}

fn addr(byte: u8) -> Address {
    Address([byte; ADDRESS_BYTES])
}

/// Two components that need each other's address. Neither receives the
/// other at construction; both resolve through the registry on use.
struct CreditProvider {
    exchange: PeerHandle,
}

struct OptionsExchange {
    credit: PeerHandle,
}

#[test]
fn cyclic_peers_resolve_after_wiring() {
    let registry = Arc::new(Registry::new(owner()).unwrap());

    let provider = CreditProvider {
        exchange: PeerHandle::new(registry.clone(), "OptionsExchange"),
    };
    let exchange = OptionsExchange {
        credit: PeerHandle::new(registry.clone(), "CreditProvider"),
    };

    // not wired yet: lookups fail cleanly
    assert!(provider.exchange.address().is_err());

    registry
        .set_contract_address(&owner(), "CreditProvider", addr(0xc1), false)
        .unwrap();
    registry
        .set_contract_address(&owner(), "OptionsExchange", addr(0xe1), false)
        .unwrap();

    assert_eq!(provider.exchange.address().unwrap(), addr(0xe1));
    assert_eq!(exchange.credit.address().unwrap(), addr(0xc1));
}

#[test]
fn upgrade_refreshes_cached_peer() {
    let registry = Arc::new(Registry::new(owner()).unwrap());
    registry
        .set_contract_address(&owner(), "LinearInterpolator", addr(1), false)
        .unwrap();

    let pool = PeerHandle::new(registry.clone(), "LinearInterpolator");
    assert_eq!(pool.address().unwrap(), addr(1));
    assert!(pool.is_cached());

    // silent rebind keeps the cached copy
    registry
        .set_contract_address(&owner(), "LinearInterpolator", addr(2), false)
        .unwrap();
    assert_eq!(pool.address().unwrap(), addr(1));

    registry
        .set_contract_address(&owner(), "LinearInterpolator", addr(3), true)
        .unwrap();
    assert!(!pool.is_cached());
    assert_eq!(pool.address().unwrap(), addr(3));
}

#[test]
fn peer_handle_through_alias_sees_canonical_upgrade() {
    let registry = Arc::new(Registry::new(owner()).unwrap());
    registry
        .add_alias(&owner(), "CreditIssuer", "CreditProvider")
        .unwrap();
    registry
        .set_contract_address(&owner(), "CreditProvider", addr(1), false)
        .unwrap();

    let issuer = PeerHandle::new(registry.clone(), "CreditIssuer");
    assert_eq!(issuer.address().unwrap(), addr(1));

    registry
        .set_contract_address(&owner(), "CreditProvider", addr(2), true)
        .unwrap();
    assert_eq!(issuer.address().unwrap(), addr(2));
}

#[test]
fn dropped_handle_unsubscribes() {
    let registry = Arc::new(Registry::new(owner()).unwrap());
    let handle = PeerHandle::new(registry.clone(), "YieldTracker");
    let subscription = handle.subscription();
    drop(handle);

    assert!(!registry.unsubscribe(subscription));
    registry
        .set_contract_address(&owner(), "YieldTracker", addr(4), true)
        .unwrap();
    assert_eq!(Arc::strong_count(&registry), 1);
}

#[test]
fn alias_override_refreshes_cached_peer() {
    let registry = Arc::new(Registry::new(owner()).unwrap());
    registry
        .set_contract_address(&owner(), "EthFeedMock", addr(0x0a), false)
        .unwrap();
    registry
        .set_contract_address(&owner(), "ChainlinkFeed", addr(0x0b), false)
        .unwrap();
    registry
        .add_alias(&owner(), "UnderlyingFeed", "EthFeedMock")
        .unwrap();

    let feed = PeerHandle::new(registry.clone(), "UnderlyingFeed");
    assert_eq!(feed.address().unwrap(), addr(0x0a));

    registry
        .add_alias(&owner(), "UnderlyingFeed", "ChainlinkFeed")
        .unwrap();
    assert_eq!(feed.address().unwrap(), addr(0x0b));

    registry.remove_alias(&owner(), "UnderlyingFeed").unwrap();
    assert!(matches!(
        feed.address().unwrap_err(),
        RegistryError::UnknownName { .. }
    ));
}

#[test]
fn concurrent_readers_never_see_partial_state() {
    let registry = Arc::new(Registry::new(owner()).unwrap());
    registry
        .set_contract_address(&owner(), "UnderlyingFeed", addr(1), false)
        .unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let address = registry.get_contract_address("UnderlyingFeed").unwrap();
                    let byte = address.as_bytes()[0];
                    assert!(address.as_bytes().iter().all(|b| *b == byte));
                }
            })
        })
        .collect();

    for round in 2..=50u8 {
        registry
            .set_contract_address(&owner(), "UnderlyingFeed", addr(round), true)
            .unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.get_contract_address("UnderlyingFeed").unwrap(), addr(50));
}

#[test]
fn lookup_trait_is_object_safe() {
    let registry = Registry::new(owner()).unwrap();
    registry
        .set_contract_address(&owner(), "ProtocolSettings", addr(9), false)
        .unwrap();

    let lookup: &dyn ContractLookup = &registry;
    assert_eq!(lookup.contract_address("ProtocolSettings").unwrap(), addr(9));
}

#[cfg(feature = "persistent")]
#[test]
fn sled_journal_restores_registry_between_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry-journal");

    {
        let journal = SledJournal::open(&path).unwrap();
        let registry = Registry::with_journal(owner(), Box::new(journal)).unwrap();
        registry.reserve_contract(&owner(), "TimeProvider").unwrap();
        registry
            .set_contract_address(&owner(), "CreditProvider", addr(7), false)
            .unwrap();
        registry
            .add_alias(&owner(), "CreditIssuer", "CreditProvider")
            .unwrap();
    }

    let registry = Registry::open(Box::new(SledJournal::open(&path).unwrap())).unwrap();
    assert_eq!(registry.get_contract_address("CreditIssuer").unwrap(), addr(7));
    assert!(!registry.contains("TimeProvider"));

    registry
        .set_contract_address(&owner(), "TimeProvider", addr(8), false)
        .unwrap();
    drop(registry);

    let registry = Registry::open(Box::new(SledJournal::open(&path).unwrap())).unwrap();
    assert_eq!(registry.get_contract_address("TimeProvider").unwrap(), addr(8));
    let names: Vec<_> = registry.entries().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["TimeProvider", "CreditProvider"]);
}
