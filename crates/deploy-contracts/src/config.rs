use {
    crate::{accounts::NamedAccount, error::ConfigError},
    alloy::primitives::B256,
    anyhow::{Context, Result},
    serde::Deserialize,
    std::{
        collections::HashMap,
        fmt,
        path::{Path, PathBuf},
    },
    tokio::fs,
    url::Url,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Directory with the compiled contract artifacts. Relative paths are
    /// resolved against the directory of the configuration file.
    #[serde(default = "default_artifacts")]
    pub artifacts: PathBuf,

    /// Directory where deployment records are stored, one folder per network.
    #[serde(default = "default_deployments")]
    pub deployments: PathBuf,

    /// Account names available to deployment tasks.
    #[serde(default)]
    pub named_accounts: HashMap<String, NamedAccount>,

    #[serde(rename = "network")]
    pub networks: HashMap<String, NetworkConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkConfig {
    /// JSON RPC endpoint of the node.
    pub url: Url,

    /// Optional chain ID. The node's chain ID is always fetched and the
    /// deployment aborts if it does not match this value.
    pub chain_id: Option<u64>,

    /// Private keys used to sign transactions. When empty, the node's
    /// unlocked accounts are used instead.
    #[serde(default)]
    pub private_keys: Vec<B256>,
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("url", &self.url.as_str())
            .field("chain_id", &self.chain_id)
            .field("private_keys", &format_args!("{} SECRET", self.private_keys.len()))
            .finish()
    }
}

impl Config {
    pub fn network(&self, name: &str) -> Result<&NetworkConfig, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    fn resolve_paths(mut self, base: &Path) -> Self {
        self.artifacts = base.join(&self.artifacts);
        self.deployments = base.join(&self.deployments);
        self
    }
}

fn default_artifacts() -> PathBuf {
    "artifacts".into()
}

fn default_deployments() -> PathBuf {
    "deployments".into()
}

pub fn parse(data: &str) -> Result<Config> {
    // Not printing detailed error because it could leak private keys.
    toml::de::from_str(data).map_err(|err| {
        anyhow::anyhow!(
            "TOML syntax error: {}",
            err.span()
                .map(|span| format!("at bytes {span:?}"))
                .unwrap_or_default()
        )
    })
}

/// Load the deployment configuration from a TOML file.
pub async fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    let config = parse(&data).with_context(|| format!("invalid configuration {path:?}"))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.resolve_paths(base))
}
