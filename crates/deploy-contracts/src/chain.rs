//! Chain-backed implementation of the deployment environment using alloy.

use {
    crate::{
        artifacts::{Artifact, Artifacts},
        config::NetworkConfig,
        environment::{DeployOptions, DeployResult, Deployments},
        error::{ConfigError, TransactionError},
        store::{DeploymentRecord, ReceiptSummary, Store},
    },
    alloy::{
        network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
        primitives::{Address, B256},
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::types::{TransactionReceipt, TransactionRequest},
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result},
    serde_json::Value,
    std::time::Duration,
};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const RECEIPT_POLL_ATTEMPTS: u32 = 300;

/// A connection to a node together with the accounts that can send
/// transactions through it.
pub struct Connection {
    pub provider: DynProvider,
    pub chain_id: u64,
    /// Addresses of the configured signers, or the node's unlocked accounts
    /// when no private keys are configured.
    pub accounts: Vec<Address>,
}

/// Connects to the network's node and verifies that it serves the configured
/// chain.
pub async fn connect(name: &str, config: &NetworkConfig) -> Result<Connection> {
    let signers = config
        .private_keys
        .iter()
        .map(PrivateKeySigner::from_bytes)
        .collect::<Result<Vec<_>, _>>()
        .context("invalid private key")?;
    let signer_addresses = signers
        .iter()
        .map(|signer| signer.address())
        .collect::<Vec<_>>();

    let mut signers = signers.into_iter();
    let provider = match signers.next() {
        Some(first) => {
            let mut wallet = EthereumWallet::new(first);
            for signer in signers {
                wallet.register_signer(signer);
            }
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(config.url.clone())
                .erased()
        }
        None => ProviderBuilder::new()
            .connect_http(config.url.clone())
            .erased(),
    };

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(TransactionError::from)
        .context("could not fetch current chain id")?;
    if let Some(expected) = config.chain_id
        && expected != chain_id
    {
        return Err(ConfigError::ChainIdMismatch {
            network: name.to_string(),
            expected,
            actual: chain_id,
        }
        .into());
    }

    let accounts = if signer_addresses.is_empty() {
        provider
            .get_accounts()
            .await
            .map_err(TransactionError::from)
            .context("could not fetch node accounts")?
    } else {
        signer_addresses
    };
    tracing::info!(network = name, chain_id, accounts = accounts.len(), "connected to node");

    Ok(Connection {
        provider,
        chain_id,
        accounts,
    })
}

/// Deploys artifacts with contract creation transactions and keeps a record
/// of every deployment in the [`Store`].
pub struct ChainDeployments {
    provider: DynProvider,
    artifacts: Artifacts,
    store: Store,
}

impl ChainDeployments {
    pub fn new(provider: DynProvider, artifacts: Artifacts, store: Store) -> Self {
        Self {
            provider,
            artifacts,
            store,
        }
    }

    /// Returns the previous deployment of `contract` if it used the same
    /// bytecode and arguments and its code is still on chain.
    async fn reusable(
        &self,
        contract: &str,
        artifact: &Artifact,
        args: &[Value],
    ) -> Result<Option<DeploymentRecord>> {
        let Some(record) = self.store.record(contract).await? else {
            return Ok(None);
        };
        if record.bytecode != artifact.bytecode || record.args != args {
            tracing::debug!(contract, "stored deployment differs, redeploying");
            return Ok(None);
        }
        let code = self
            .provider
            .get_code_at(record.address)
            .await
            .map_err(TransactionError::from)?;
        if code.is_empty() {
            tracing::debug!(contract, address = %record.address, "no code at stored address");
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Polls for the receipt of a sent transaction.
    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<TransactionReceipt, TransactionError> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(TransactionError::ReceiptTimeout(tx_hash))
    }
}

#[async_trait::async_trait]
impl Deployments for ChainDeployments {
    async fn deploy(&self, contract_name: &str, options: DeployOptions) -> Result<DeployResult> {
        let artifact = self.artifacts.load(contract_name).await?;
        let init_code = artifact.init_code(&options.args)?;

        if let Some(existing) = self
            .reusable(contract_name, &artifact, &options.args)
            .await?
        {
            if options.log {
                tracing::info!("reusing \"{contract_name}\" at {}", existing.address);
            }
            return Ok(DeployResult {
                address: existing.address,
                transaction_hash: existing.transaction_hash,
                newly_deployed: false,
            });
        }

        let tx = TransactionRequest::default()
            .with_from(options.from)
            .with_deploy_code(init_code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(TransactionError::from)
            .with_context(|| format!("failed to send deployment of {contract_name:?}"))?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(contract = contract_name, ?tx_hash, "sent deployment transaction");

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.status() {
            return Err(TransactionError::Reverted(tx_hash).into());
        }
        let address = receipt
            .contract_address()
            .ok_or(TransactionError::MissingContractAddress(tx_hash))?;
        if options.log {
            tracing::info!(
                "deploying \"{contract_name}\" (tx: {tx_hash})...: deployed at {address} with {} \
                 gas",
                receipt.gas_used()
            );
        }

        self.store
            .save_record(
                contract_name,
                &DeploymentRecord {
                    address,
                    abi: artifact.abi,
                    transaction_hash: Some(tx_hash),
                    receipt: Some(ReceiptSummary {
                        from: receipt.from(),
                        block_number: receipt.block_number(),
                        gas_used: receipt.gas_used(),
                    }),
                    args: options.args,
                    bytecode: artifact.bytecode,
                    deployed_bytecode: artifact.deployed_bytecode,
                },
            )
            .await?;

        Ok(DeployResult {
            address,
            transaction_hash: Some(tx_hash),
            newly_deployed: true,
        })
    }
}
