//! Contract Deployment Driver
//!
//! Deploys each component independently, then populates the contract
//! registry in a fixed order so components can find their peers by name.
//! The choice between mock and real oracle wiring is made here, never in
//! the registry.

pub mod backend;
pub mod errors;
pub mod logging;
pub mod plan;
pub mod sequencer;
pub mod settings;

pub use backend::{DeployBackend, SimulatedBackend};
pub use errors::*;
pub use plan::{names, DeploymentPlan, Step};
pub use sequencer::{DeployedComponent, DeploymentReport, DeploymentSequencer};
pub use settings::{DeploymentConfig, LogFormat, LoggingConfig, OracleConfig, WiringMode};
