//! Component deployment backends

use async_trait::async_trait;
use contract_registry::{Address, ADDRESS_BYTES};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

/// Instantiates components.
///
/// Each deployment is a separate, confirmed step; components receive only
/// the registry address and resolve everything else by name later.
#[async_trait]
pub trait DeployBackend: Send + Sync {
    async fn deploy(&self, component: &str, registry: Address) -> anyhow::Result<Address>;
}

/// In-process backend that derives deterministic addresses.
///
/// The address of the n-th deployment is the first 20 bytes of
/// `SHA-256(component || n || registry)`.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    deployments: Mutex<Vec<(String, Address)>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components deployed so far, in order
    pub fn deployments(&self) -> Vec<(String, Address)> {
        self.deployments.lock().clone()
    }

    fn derive_address(component: &str, nonce: u64, registry: &Address) -> Address {
        let mut h = Sha256::new();
        h.update(component.as_bytes());
        h.update(nonce.to_le_bytes());
        h.update(registry.as_bytes());
        let digest = h.finalize();

        let mut bytes = [0u8; ADDRESS_BYTES];
        bytes.copy_from_slice(&digest[..ADDRESS_BYTES]);
        Address(bytes)
    }
}

#[async_trait]
impl DeployBackend for SimulatedBackend {
    async fn deploy(&self, component: &str, registry: Address) -> anyhow::Result<Address> {
        let mut deployments = self.deployments.lock();
        let address = Self::derive_address(component, deployments.len() as u64, &registry);
        if address.is_zero() {
            anyhow::bail!("derived the zero address for {component}");
        }
        deployments.push((component.to_string(), address));
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn addresses_are_deterministic_and_distinct() {
        let registry = Address([9; ADDRESS_BYTES]);

        let first = SimulatedBackend::new();
        let a = first.deploy("CreditToken", registry).await.unwrap();
        let b = first.deploy("CreditToken", registry).await.unwrap();
        assert_ne!(a, b);

        let second = SimulatedBackend::new();
        assert_eq!(second.deploy("CreditToken", registry).await.unwrap(), a);
        assert_eq!(first.deployments().len(), 2);
    }
}
