//! Failure taxonomy of a deployment run.
//!
//! Every failure is fatal to the task that hit it. Nothing here is retried,
//! errors are only wrapped with context and handed back to the runner.

use {
    alloy::primitives::B256,
    std::path::PathBuf,
    thiserror::Error,
};

/// Problems with the local setup, detected before anything reaches the
/// network.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("named account {name:?} is not defined for network {network:?}")]
    MissingNamedAccount { name: String, network: String },
    #[error(
        "named account {name:?} refers to account #{index} but only {available} accounts are \
         available"
    )]
    AccountIndexOutOfRange {
        name: String,
        index: usize,
        available: usize,
    },
    #[error("network {0:?} is not configured")]
    UnknownNetwork(String),
    #[error("network {network:?} is configured for chain {expected} but the node reports {actual}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
    #[error("deployment id {0:?} is used by more than one task")]
    DuplicateTaskId(String),
    #[error("manifest does not contain any deployment")]
    EmptyManifest,
}

/// Problems locating or using a compiled contract artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no artifact for contract {name:?} in {dir:?}")]
    NotFound { name: String, dir: PathBuf },
    #[error("multiple artifacts for contract {name:?}: {paths:?}")]
    Ambiguous { name: String, paths: Vec<PathBuf> },
    #[error("artifact {path:?} is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("contract {0:?} has no bytecode, it is abstract or an interface")]
    MissingBytecode(String),
    #[error("contract {name:?} expects {expected} constructor arguments but got {actual}")]
    ConstructorArgCount {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("constructor argument #{index} of {name:?} is not a valid {ty}")]
    InvalidArgument {
        name: String,
        index: usize,
        ty: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
}

/// Problems talking to the node or with the transaction itself.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Rpc(#[from] alloy::transports::TransportError),
    #[error("deployment transaction {0} reverted")]
    Reverted(B256),
    #[error("receipt of deployment transaction {0} has no contract address")]
    MissingContractAddress(B256),
    #[error("deployment transaction {0} was not mined in time")]
    ReceiptTimeout(B256),
}
