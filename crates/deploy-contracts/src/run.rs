use {
    crate::{
        accounts::ConfiguredAccounts,
        arguments::Arguments,
        artifacts::Artifacts,
        chain::{self, ChainDeployments},
        config,
        environment::{Network, RuntimeEnvironment},
        manifest,
        runner::{Runner, Summary},
        store::Store,
        task::DeploymentTask,
    },
    anyhow::Result,
    clap::Parser,
    std::sync::Arc,
};

/// Entry point of the `deploy` binary. Exits the process with a non-zero code
/// if the deployment fails.
pub async fn start(args: impl Iterator<Item = String>) {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running deploy with validated arguments:\n{}", args);

    match run(args).await {
        Ok(summary) => tracing::info!(
            executed = ?summary.executed,
            skipped = ?summary.skipped,
            "deployment finished"
        ),
        Err(err) => {
            tracing::error!("deployment failed: {err:?}");
            std::process::exit(1);
        }
    }
}

pub async fn run(args: Arguments) -> Result<Summary> {
    let config = config::load(&args.config).await?;
    let network_config = config.network(&args.network)?;
    let tasks: Vec<Box<dyn DeploymentTask>> = match &args.manifest {
        Some(path) => manifest::load(path).await?,
        None => manifest::builtin(),
    }
    .into_iter()
    .map(|task| Box::new(task) as Box<dyn DeploymentTask>)
    .collect();

    let connection = chain::connect(&args.network, network_config).await?;
    let store = Store::new(&config.deployments, &args.network);
    let env = RuntimeEnvironment {
        network: Network {
            name: args.network.clone(),
            chain_id: connection.chain_id,
        },
        accounts: Arc::new(ConfiguredAccounts::new(
            args.network.clone(),
            config.named_accounts.clone(),
            connection.accounts,
        )),
        deployments: Arc::new(ChainDeployments::new(
            connection.provider,
            Artifacts::new(&config.artifacts),
            store.clone(),
        )),
    };

    Runner {
        env: &env,
        store: &store,
        tags: &args.tags,
        reset: args.reset,
    }
    .run(&tasks)
    .await
}
