//! Named account resolution.
//!
//! The configuration maps names like `deployer` to either an index into the
//! accounts available on the network or to a literal address, with optional
//! per-network overrides:
//!
//! ```toml
//! [named-accounts.deployer]
//! default = 0
//! sepolia = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
//! ```

use {
    crate::{environment::NamedAccounts, error::ConfigError},
    alloy::primitives::Address,
    serde::Deserialize,
    std::collections::HashMap,
};

/// Where a named account points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    /// Index into the accounts available on the network.
    Index(usize),
    Address(Address),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamedAccount {
    /// Used on every network without an explicit entry.
    pub default: Option<AccountRef>,
    #[serde(flatten)]
    pub networks: HashMap<String, AccountRef>,
}

impl NamedAccount {
    fn for_network(&self, network: &str) -> Option<AccountRef> {
        self.networks.get(network).copied().or(self.default)
    }
}

/// Resolves named accounts from the configuration against the accounts that
/// are available on the active network.
#[derive(Debug, Clone)]
pub struct ConfiguredAccounts {
    network: String,
    named: HashMap<String, NamedAccount>,
    available: Vec<Address>,
}

impl ConfiguredAccounts {
    pub fn new(
        network: impl Into<String>,
        named: HashMap<String, NamedAccount>,
        available: Vec<Address>,
    ) -> Self {
        Self {
            network: network.into(),
            named,
            available,
        }
    }

    /// Accounts without an entry for the active network and without a default
    /// are left out of the result.
    pub fn resolve(&self) -> Result<HashMap<String, Address>, ConfigError> {
        self.named
            .iter()
            .filter_map(|(name, account)| {
                let address = match account.for_network(&self.network)? {
                    AccountRef::Address(address) => Ok(address),
                    AccountRef::Index(index) => self.available.get(index).copied().ok_or_else(
                        || ConfigError::AccountIndexOutOfRange {
                            name: name.clone(),
                            index,
                            available: self.available.len(),
                        },
                    ),
                };
                Some(address.map(|address| (name.clone(), address)))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl NamedAccounts for ConfiguredAccounts {
    async fn named_accounts(&self) -> anyhow::Result<HashMap<String, Address>> {
        let accounts = self.resolve()?;
        tracing::debug!(network = %self.network, ?accounts, "resolved named accounts");
        Ok(accounts)
    }
}
