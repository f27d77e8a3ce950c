use {
    crate::{
        environment::{DeployOptions, RuntimeEnvironment},
        error::ConfigError,
    },
    anyhow::Result,
    serde_json::Value,
};

/// Name of the account that sends contract creation transactions.
pub const DEPLOYER: &str = "deployer";

/// A unit of deployment work the [`crate::runner::Runner`] can select by tag
/// and execute once per network.
#[async_trait::async_trait]
pub trait DeploymentTask: Send + Sync {
    /// Stable identifier. A task with an id is not executed again on a network
    /// where it already completed successfully.
    fn id(&self) -> Option<&str>;

    /// Labels used to select a subset of tasks.
    fn tags(&self) -> &[String];

    /// Human readable name for log output.
    fn name(&self) -> &str;

    async fn run(&self, env: &RuntimeEnvironment) -> Result<()>;
}

/// Deploys one contract artifact from the `deployer` account and logs its
/// address.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDeployment {
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub contract: String,
    pub args: Vec<Value>,
    pub log: bool,
}

impl ContractDeployment {
    /// The `Votes` contract, deployed without constructor arguments.
    pub fn votes() -> Self {
        Self {
            id: Some("deploy_votes".to_string()),
            tags: vec!["Votes".to_string()],
            contract: "Votes".to_string(),
            args: Vec::new(),
            log: true,
        }
    }
}

#[async_trait::async_trait]
impl DeploymentTask for ContractDeployment {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn name(&self) -> &str {
        &self.contract
    }

    async fn run(&self, env: &RuntimeEnvironment) -> Result<()> {
        let accounts = env.get_named_accounts().await?;
        let deployer = *accounts
            .get(DEPLOYER)
            .ok_or_else(|| ConfigError::MissingNamedAccount {
                name: DEPLOYER.to_string(),
                network: env.network.name.clone(),
            })?;

        let deployed = env
            .deployments()
            .deploy(
                &self.contract,
                DeployOptions {
                    from: deployer,
                    args: self.args.clone(),
                    log: self.log,
                },
            )
            .await?;

        tracing::info!("{} contract:  {}", self.contract, deployed.address);
        Ok(())
    }
}
