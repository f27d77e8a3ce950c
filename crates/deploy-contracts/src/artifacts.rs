//! Compiled contract artifacts in the Hardhat JSON format.

use {
    crate::error::ArtifactError,
    alloy::{
        dyn_abi::{DynSolType, DynSolValue, Specifier},
        json_abi::JsonAbi,
        primitives::Bytes,
    },
    anyhow::{Context, Result},
    serde::Deserialize,
    serde_json::Value,
    std::path::{Path, PathBuf},
    tokio::fs,
};

/// Folder Hardhat writes compiler inputs and outputs to, it contains no
/// artifacts.
const BUILD_INFO: &str = "build-info";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    #[serde(default)]
    pub deployed_bytecode: Option<Bytes>,
}

impl Artifact {
    /// Creation code followed by the ABI encoded constructor arguments.
    pub fn init_code(&self, args: &[Value]) -> Result<Bytes, ArtifactError> {
        if self.bytecode.is_empty() {
            return Err(ArtifactError::MissingBytecode(self.contract_name.clone()));
        }

        let params = self
            .abi
            .constructor()
            .map(|constructor| constructor.inputs.as_slice())
            .unwrap_or_default();
        if params.len() != args.len() {
            return Err(ArtifactError::ConstructorArgCount {
                name: self.contract_name.clone(),
                expected: params.len(),
                actual: args.len(),
            });
        }

        let values = params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (param, arg))| {
                let invalid = |source| ArtifactError::InvalidArgument {
                    name: self.contract_name.clone(),
                    index,
                    ty: param.ty.clone(),
                    source,
                };
                let ty = param.resolve().map_err(invalid)?;
                coerce(&ty, arg).map_err(invalid)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut code = self.bytecode.to_vec();
        if !values.is_empty() {
            code.extend(DynSolValue::Tuple(values).abi_encode_params());
        }
        Ok(code.into())
    }
}

/// Converts a JSON argument into a value of type `ty`. Structs and arrays are
/// given as JSON arrays, leaf values as strings or plain JSON scalars.
fn coerce(ty: &DynSolType, value: &Value) -> Result<DynSolValue, alloy::dyn_abi::Error> {
    match (ty, value) {
        (DynSolType::Tuple(types), Value::Array(values)) if types.len() == values.len() => types
            .iter()
            .zip(values)
            .map(|(ty, value)| coerce(ty, value))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Tuple),
        (DynSolType::Array(inner), Value::Array(values)) => values
            .iter()
            .map(|value| coerce(inner, value))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(inner, len), Value::Array(values)) if *len == values.len() => {
            values
                .iter()
                .map(|value| coerce(inner, value))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        (ty, Value::String(text)) => ty.coerce_str(text),
        (ty, other) => ty.coerce_str(&other.to_string()),
    }
}

/// Looks up artifacts by contract name below a directory.
#[derive(Debug, Clone)]
pub struct Artifacts {
    dir: PathBuf,
}

impl Artifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn load(&self, name: &str) -> Result<Artifact> {
        let path = self.find(name).await?;
        let data = fs::read(&path)
            .await
            .with_context(|| format!("failed to read {path:?}"))?;
        let artifact = serde_json::from_slice(&data)
            .map_err(|source| ArtifactError::Malformed { path, source })?;
        Ok(artifact)
    }

    async fn find(&self, name: &str) -> Result<PathBuf> {
        let file_name = format!("{name}.json");
        let mut matches = Vec::new();
        let mut pending = vec![self.dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err).with_context(|| format!("failed to list {dir:?}")),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    if entry.file_name() != BUILD_INFO {
                        pending.push(path);
                    }
                } else if entry.file_name().to_str() == Some(file_name.as_str()) {
                    matches.push(path);
                }
            }
        }

        match matches.len() {
            0 => Err(ArtifactError::NotFound {
                name: name.to_string(),
                dir: self.dir.clone(),
            }
            .into()),
            1 => Ok(matches.remove(0)),
            _ => {
                matches.sort();
                Err(ArtifactError::Ambiguous {
                    name: name.to_string(),
                    paths: matches,
                }
                .into())
            }
        }
    }
}
