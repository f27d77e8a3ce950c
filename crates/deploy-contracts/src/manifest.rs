//! Data-driven list of deployment tasks.
//!
//! Each `[[deployment]]` table of a manifest becomes one
//! [`ContractDeployment`]; without a manifest the built-in Votes deployment is
//! used.

use {
    crate::{error::ConfigError, task::ContractDeployment},
    anyhow::{Context, Result},
    serde::Deserialize,
    serde_json::Value,
    std::{collections::HashSet, path::Path},
    tokio::fs,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Manifest {
    #[serde(rename = "deployment", default)]
    deployments: Vec<Deployment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Deployment {
    /// Optional de-duplication key.
    id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    /// Name of the contract artifact.
    contract: String,
    /// Ordered constructor arguments.
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default = "default_log")]
    log: bool,
}

fn default_log() -> bool {
    true
}

/// The tasks that run when no manifest is given.
pub fn builtin() -> Vec<ContractDeployment> {
    vec![ContractDeployment::votes()]
}

pub fn parse(data: &str) -> Result<Vec<ContractDeployment>> {
    let manifest: Manifest = toml::de::from_str(data).context("TOML syntax error")?;
    if manifest.deployments.is_empty() {
        return Err(ConfigError::EmptyManifest.into());
    }

    let mut ids = HashSet::new();
    for id in manifest.deployments.iter().filter_map(|d| d.id.as_ref()) {
        if !ids.insert(id) {
            return Err(ConfigError::DuplicateTaskId(id.clone()).into());
        }
    }

    Ok(manifest
        .deployments
        .into_iter()
        .map(|deployment| ContractDeployment {
            id: deployment.id,
            tags: deployment.tags,
            contract: deployment.contract,
            args: deployment.args,
            log: deployment.log,
        })
        .collect())
}

/// Load a deployment manifest from a TOML file.
pub async fn load(path: &Path) -> Result<Vec<ContractDeployment>> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    parse(&data).with_context(|| format!("invalid manifest {path:?}"))
}
