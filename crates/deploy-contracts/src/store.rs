//! On-disk bookkeeping of deployments, one folder per network:
//!
//! ```text
//! deployments/<network>/.chainId          chain the folder belongs to
//! deployments/<network>/.migrations.json  task id -> unix timestamp
//! deployments/<network>/<Contract>.json   deployment record
//! ```

use {
    crate::error::ConfigError,
    alloy::{
        json_abi::JsonAbi,
        primitives::{Address, B256, Bytes},
    },
    anyhow::{Context, Result},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
    std::{
        collections::BTreeMap,
        io::ErrorKind,
        path::{Path, PathBuf},
    },
    tokio::fs,
};

const CHAIN_ID_FILE: &str = ".chainId";
const MIGRATIONS_FILE: &str = ".migrations.json";

/// Task ids that completed on a network, with the unix timestamp of their
/// completion.
pub type Migrations = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub abi: JsonAbi,
    pub transaction_hash: Option<B256>,
    pub receipt: Option<ReceiptSummary>,
    pub args: Vec<Value>,
    /// Creation bytecode without constructor arguments.
    pub bytecode: Bytes,
    pub deployed_bytecode: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub from: Address,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(root: &Path, network: &str) -> Self {
        Self {
            dir: root.join(network),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Binds the folder to `chain_id` on first use and rejects it afterwards
    /// if it belongs to a different chain.
    pub async fn ensure_chain_id(&self, chain_id: u64) -> Result<()> {
        let path = self.dir.join(CHAIN_ID_FILE);
        match fs::read_to_string(&path).await {
            Ok(stored) => {
                let stored: u64 = stored
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid chain id in {path:?}"))?;
                if stored != chain_id {
                    return Err(ConfigError::ChainIdMismatch {
                        network: self.network_name(),
                        expected: stored,
                        actual: chain_id,
                    }
                    .into());
                }
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.create_dir().await?;
                fs::write(&path, chain_id.to_string())
                    .await
                    .with_context(|| format!("failed to write {path:?}"))
            }
            Err(err) => Err(err).with_context(|| format!("failed to read {path:?}")),
        }
    }

    pub async fn migrations(&self) -> Result<Migrations> {
        Ok(self
            .read_json(&self.dir.join(MIGRATIONS_FILE))
            .await?
            .unwrap_or_default())
    }

    pub async fn record_migration(&self, id: &str, timestamp: i64) -> Result<()> {
        let mut migrations = self.migrations().await?;
        migrations.insert(id.to_string(), timestamp);
        self.write_json(&self.dir.join(MIGRATIONS_FILE), &migrations)
            .await
    }

    pub async fn record(&self, contract: &str) -> Result<Option<DeploymentRecord>> {
        self.read_json(&self.record_path(contract)).await
    }

    pub async fn save_record(&self, contract: &str, record: &DeploymentRecord) -> Result<()> {
        self.write_json(&self.record_path(contract), record).await
    }

    /// Forgets everything that was recorded for the network.
    pub async fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                tracing::info!(dir = ?self.dir, "removed previous deployments");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to remove {:?}", self.dir)),
        }
    }

    fn record_path(&self, contract: &str) -> PathBuf {
        self.dir.join(format!("{contract}.json"))
    }

    fn network_name(&self) -> String {
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    async fn create_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {:?}", self.dir))
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("failed to read {path:?}")),
        };
        serde_json::from_slice(&data)
            .map(Some)
            .with_context(|| format!("corrupt deployment file {path:?}"))
    }

    /// Replaces the file at `path` in one step, a crash never leaves it half
    /// written.
    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.create_dir().await?;
        let data = serde_json::to_vec_pretty(value)?;
        let tmp = temporary_path(path);
        fs::write(&tmp, data)
            .await
            .with_context(|| format!("failed to write {tmp:?}"))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("failed to move {tmp:?} to {path:?}"))
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
