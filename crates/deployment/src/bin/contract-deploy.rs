//! Deployment rehearsal
//!
//! Wires the options protocol through a contract registry using the
//! simulated backend and prints the resulting report as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use contract_deployment::logging::init_tracing;
use contract_deployment::{
    DeployBackend, DeploymentConfig, DeploymentPlan, DeploymentSequencer, SimulatedBackend,
    WiringMode,
};
use contract_registry::{Address, JournalSink, Principal, Registry, SledJournal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "contract-deploy")]
#[command(about = "Wire contracts through the contract registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the configured wiring mode
    #[arg(long, value_enum)]
    mode: Option<WiringMode>,

    /// Override the configured journal location
    #[arg(long)]
    journal: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DeploymentConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(journal) = cli.journal {
        config.journal_path = Some(journal);
    }
    config.validate()?;

    init_tracing(&config.logging)?;
    info!(mode = ?config.mode, owner = %config.owner, "Loaded deployment configuration");

    let owner = Principal::new(config.owner);
    let registry = Arc::new(open_registry(owner, &config)?);

    let backend = SimulatedBackend::new();
    let registry_address = backend
        .deploy("Deployer", Address::ZERO)
        .await
        .context("deploying the registry")?;

    let plan = DeploymentPlan::protocol(config.mode, &config.oracles)?
        .with_freezes(config.freeze.iter().cloned());

    let sequencer = DeploymentSequencer::new(registry, registry_address, owner, backend);
    let report = sequencer.run(&plan).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn open_registry(owner: Principal, config: &DeploymentConfig) -> Result<Registry> {
    let Some(path) = &config.journal_path else {
        return Ok(Registry::new(owner)?);
    };

    let journal = SledJournal::open(path)
        .with_context(|| format!("opening journal at {}", path.display()))?;
    let registry = if journal.records()?.is_empty() {
        Registry::with_journal(owner, Box::new(journal))?
    } else {
        Registry::open(Box::new(journal))?
    };
    Ok(registry)
}
