//! Ordered deployment plans

use crate::errors::*;
use crate::settings::{OracleConfig, WiringMode};
use contract_registry::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry names used by the options protocol
pub mod names {
    pub const TIME_PROVIDER: &str = "TimeProvider";
    pub const UNDERLYING_FEED: &str = "UnderlyingFeed";
    pub const PROTOCOL_SETTINGS: &str = "ProtocolSettings";
    pub const CREDIT_TOKEN: &str = "CreditToken";
    pub const GOV_TOKEN: &str = "GovToken";
    pub const CREDIT_PROVIDER: &str = "CreditProvider";
    pub const CREDIT_ISSUER: &str = "CreditIssuer";
    pub const OPTIONS_EXCHANGE: &str = "OptionsExchange";
    pub const LINEAR_INTERPOLATOR: &str = "LinearInterpolator";
    pub const YIELD_TRACKER: &str = "YieldTracker";
    pub const LINEAR_LIQUIDITY_POOL: &str = "LinearLiquidityPool";
}

/// One step of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Hold a slot with the zero placeholder
    Reserve { name: String },
    /// Instantiate `component` and register it under `name`
    Deploy {
        component: String,
        name: String,
        notify: bool,
    },
    /// Register an externally deployed address
    Bind { name: String, address: Address },
    Alias { alias: String, canonical: String },
    Freeze { name: String },
}

impl Step {
    pub fn deploy(component: &str, name: &str, notify: bool) -> Self {
        Step::Deploy {
            component: component.to_string(),
            name: name.to_string(),
            notify,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Reserve { name } => write!(f, "reserve {name}"),
            Step::Deploy {
                component, name, ..
            } if component == name => write!(f, "deploy {name}"),
            Step::Deploy {
                component, name, ..
            } => write!(f, "deploy {component} as {name}"),
            Step::Bind { name, address } => write!(f, "bind {name} to {address}"),
            Step::Alias { alias, canonical } => write!(f, "alias {alias} -> {canonical}"),
            Step::Freeze { name } => write!(f, "freeze {name}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub steps: Vec<Step>,
}

impl DeploymentPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Standard wiring of the options protocol.
    ///
    /// Core components are registered without notification: they are being
    /// deployed for the first time, so nothing can be watching them yet. The
    /// pool stage runs against an already wired core and notifies.
    pub fn protocol(mode: WiringMode, oracles: &OracleConfig) -> Result<Self> {
        use crate::plan::names::*;

        let mut plan = DeploymentPlan::new()
            .push(Step::Reserve {
                name: TIME_PROVIDER.to_string(),
            })
            .push(Step::Reserve {
                name: UNDERLYING_FEED.to_string(),
            });

        plan = match mode {
            WiringMode::Mock => plan
                .push(Step::deploy("TimeProviderMock", TIME_PROVIDER, false))
                .push(Step::deploy("EthFeedMock", UNDERLYING_FEED, false)),
            WiringMode::Real => {
                let time_provider = oracles.time_provider.ok_or_else(|| {
                    DeploymentError::InvalidConfig("missing oracles.time_provider".to_string())
                })?;
                let underlying_feed = oracles.underlying_feed.ok_or_else(|| {
                    DeploymentError::InvalidConfig("missing oracles.underlying_feed".to_string())
                })?;
                plan.push(Step::Bind {
                    name: TIME_PROVIDER.to_string(),
                    address: time_provider,
                })
                .push(Step::Bind {
                    name: UNDERLYING_FEED.to_string(),
                    address: underlying_feed,
                })
            }
        };

        for name in [
            PROTOCOL_SETTINGS,
            CREDIT_TOKEN,
            GOV_TOKEN,
            CREDIT_PROVIDER,
            OPTIONS_EXCHANGE,
        ] {
            plan = plan.push(Step::deploy(name, name, false));
        }

        plan = plan.push(Step::Alias {
            alias: CREDIT_ISSUER.to_string(),
            canonical: CREDIT_PROVIDER.to_string(),
        });

        for name in [LINEAR_INTERPOLATOR, YIELD_TRACKER, LINEAR_LIQUIDITY_POOL] {
            plan = plan.push(Step::deploy(name, name, true));
        }

        Ok(plan)
    }

    /// Append a freeze step for each name.
    pub fn with_freezes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps
            .extend(names.into_iter().map(|name| Step::Freeze { name: name.into() }));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_registry::ADDRESS_BYTES;

    #[test]
    fn mock_plan_deploys_oracle_stand_ins() {
        let plan = DeploymentPlan::protocol(WiringMode::Mock, &OracleConfig::default()).unwrap();
        assert_eq!(
            plan.steps[2],
            Step::deploy("TimeProviderMock", names::TIME_PROVIDER, false)
        );
        assert!(!plan.steps.iter().any(|s| matches!(s, Step::Bind { .. })));
    }

    #[test]
    fn real_plan_binds_configured_oracles() {
        let oracles = OracleConfig {
            time_provider: Some(Address([1; ADDRESS_BYTES])),
            underlying_feed: Some(Address([2; ADDRESS_BYTES])),
        };
        let plan = DeploymentPlan::protocol(WiringMode::Real, &oracles).unwrap();
        assert_eq!(
            plan.steps[3],
            Step::Bind {
                name: names::UNDERLYING_FEED.to_string(),
                address: Address([2; ADDRESS_BYTES]),
            }
        );
        assert!(!plan
            .steps
            .iter()
            .any(|s| matches!(s, Step::Deploy { component, .. } if component.ends_with("Mock"))));
    }

    #[test]
    fn real_plan_requires_oracles() {
        let err = DeploymentPlan::protocol(WiringMode::Real, &OracleConfig::default()).unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidConfig(_)));
    }

    #[test]
    fn only_pool_stage_notifies() {
        let plan = DeploymentPlan::protocol(WiringMode::Mock, &OracleConfig::default()).unwrap();
        let notifying: Vec<&str> = plan
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Deploy {
                    name, notify: true, ..
                } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            notifying,
            [
                names::LINEAR_INTERPOLATOR,
                names::YIELD_TRACKER,
                names::LINEAR_LIQUIDITY_POOL
            ]
        );
    }

    #[test]
    fn freezes_are_appended_last() {
        let plan = DeploymentPlan::protocol(WiringMode::Mock, &OracleConfig::default())
            .unwrap()
            .with_freezes(["ProtocolSettings"]);
        assert_eq!(
            plan.steps.last(),
            Some(&Step::Freeze {
                name: "ProtocolSettings".to_string()
            })
        );
    }

    #[test]
    fn step_display_is_readable() {
        assert_eq!(
            Step::deploy("EthFeedMock", names::UNDERLYING_FEED, false).to_string(),
            "deploy EthFeedMock as UnderlyingFeed"
        );
        assert_eq!(
            Step::deploy("GovToken", "GovToken", false).to_string(),
            "deploy GovToken"
        );
    }
}
