//! Trait definitions for the external system boundaries of a deployment task.
//!
//! A task only ever sees a [`RuntimeEnvironment`]: something that resolves
//! named accounts and something that deploys contracts. The chain-backed
//! implementations live in [`crate::chain`] and [`crate::accounts`], tests use
//! mocks.

use {
    alloy::primitives::{Address, B256},
    anyhow::Result,
    serde_json::Value,
    std::{collections::HashMap, fmt, sync::Arc},
};

/// The network a deployment run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Name of the network as used in the configuration file and in the
    /// deployments folder.
    pub name: String,
    pub chain_id: u64,
}

/// Resolves account names like `deployer` to addresses for the active
/// network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NamedAccounts: Send + Sync {
    /// Returns every named account that is defined for the active network.
    async fn named_accounts(&self) -> Result<HashMap<String, Address>>;
}

/// Options of a single deployment request.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOptions {
    /// Sender of the contract creation transaction.
    pub from: Address,
    /// Ordered constructor arguments.
    pub args: Vec<Value>,
    /// Whether the deployment progress gets logged.
    pub log: bool,
}

/// Outcome of a deployment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub address: Address,
    /// `None` when the deployment was recorded without a transaction hash.
    pub transaction_hash: Option<B256>,
    /// `false` if an identical earlier deployment was reused.
    pub newly_deployed: bool,
}

/// Deploys compiled contract artifacts by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Deployments: Send + Sync {
    async fn deploy(&self, contract_name: &str, options: DeployOptions) -> Result<DeployResult>;
}

/// Everything a deployment task may use while it runs. Built once per network
/// by the caller and only borrowed by the tasks.
#[derive(Clone)]
pub struct RuntimeEnvironment {
    pub network: Network,
    pub accounts: Arc<dyn NamedAccounts>,
    pub deployments: Arc<dyn Deployments>,
}

impl RuntimeEnvironment {
    pub async fn get_named_accounts(&self) -> Result<HashMap<String, Address>> {
        self.accounts.named_accounts().await
    }

    pub fn deployments(&self) -> &dyn Deployments {
        self.deployments.as_ref()
    }
}

impl fmt::Debug for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeEnvironment")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
