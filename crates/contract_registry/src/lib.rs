//! Contract Name Registry
//!
//! Components whose dependency graph contains cycles cannot be wired at
//! construction time. Instead every component is deployed on its own and
//! resolves its peers by logical name through this registry when it needs
//! them. The registry owns all name and alias records; mutation is limited
//! to a single owner principal.

pub mod access;
pub mod address_book;
pub mod aliases;
pub mod errors;
pub mod journal;
pub mod observer;
pub mod registry;
pub mod types;

pub use access::AccessGuard;
pub use address_book::AddressBook;
pub use aliases::AliasResolver;
pub use errors::*;
pub use journal::*;
pub use observer::{AddressObserver, PeerHandle, SubscriptionId};
pub use registry::{ContractLookup, Registry};
pub use types::*;
