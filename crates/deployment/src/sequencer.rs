//! Deployment sequencer
//!
//! Runs a [`DeploymentPlan`] step by step against a registry. The first
//! failing step aborts the run: downstream components assume every peer
//! name they declare resolves, so a partially wired system is never
//! reported as deployed.

use crate::backend::DeployBackend;
use crate::errors::*;
use crate::plan::{DeploymentPlan, Step};
use contract_registry::{Address, Alias, Principal, Registry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedComponent {
    pub name: String,
    pub component: String,
    pub address: Address,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub registry: Option<Address>,
    pub deployed: Vec<DeployedComponent>,
    pub bound: Vec<(String, Address)>,
    pub aliases: Vec<Alias>,
    pub frozen: Vec<String>,
}

impl DeploymentReport {
    /// Latest address registered under `name` during this run
    pub fn address_of(&self, name: &str) -> Option<Address> {
        self.deployed
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| d.address)
            .or_else(|| {
                self.bound
                    .iter()
                    .rev()
                    .find(|(bound, _)| bound == name)
                    .map(|(_, address)| *address)
            })
    }
}

pub struct DeploymentSequencer<B: DeployBackend> {
    registry: Arc<Registry>,
    registry_address: Address,
    deployer: Principal,
    backend: B,
}

impl<B: DeployBackend> DeploymentSequencer<B> {
    /// `registry_address` is handed to every component constructor.
    pub fn new(
        registry: Arc<Registry>,
        registry_address: Address,
        deployer: Principal,
        backend: B,
    ) -> Self {
        Self {
            registry,
            registry_address,
            deployer,
            backend,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn run(&self, plan: &DeploymentPlan) -> Result<DeploymentReport> {
        info!(
            steps = plan.len(),
            deployer = %self.deployer,
            registry = %self.registry_address,
            "Starting deployment"
        );

        let mut report = DeploymentReport {
            registry: Some(self.registry_address),
            ..Default::default()
        };

        for (index, step) in plan.steps.iter().enumerate() {
            if let Err(e) = self.execute(step, &mut report).await {
                error!(index, step = %step, error = %e, "Deployment step failed; aborting");
                return Err(DeploymentError::StepFailed {
                    index,
                    step: step.to_string(),
                    source: Box::new(e),
                });
            }
            info!(index, step = %step, "Deployment step complete");
        }

        info!(
            deployed = report.deployed.len(),
            aliases = report.aliases.len(),
            frozen = report.frozen.len(),
            "Deployment finished"
        );
        Ok(report)
    }

    async fn execute(&self, step: &Step, report: &mut DeploymentReport) -> Result<()> {
        match step {
            Step::Reserve { name } => {
                self.registry.reserve_contract(&self.deployer, name)?;
            }
            Step::Deploy {
                component,
                name,
                notify,
            } => {
                let address = self
                    .backend
                    .deploy(component, self.registry_address)
                    .await
                    .map_err(|source| DeploymentError::Backend {
                        component: component.clone(),
                        source,
                    })?;
                self.registry
                    .set_contract_address(&self.deployer, name, address, *notify)?;
                report.deployed.push(DeployedComponent {
                    name: name.clone(),
                    component: component.clone(),
                    address,
                });
            }
            Step::Bind { name, address } => {
                self.registry
                    .set_contract_address(&self.deployer, name, *address, true)?;
                report.bound.push((name.clone(), *address));
            }
            Step::Alias { alias, canonical } => {
                self.registry.add_alias(&self.deployer, alias, canonical)?;
                report.aliases.push(Alias {
                    alias: alias.clone(),
                    canonical: canonical.clone(),
                });
            }
            Step::Freeze { name } => {
                self.registry.freeze(&self.deployer, name)?;
                report.frozen.push(name.clone());
            }
        }
        Ok(())
    }
}
