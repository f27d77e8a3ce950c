use {
    clap::Parser,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
};

/// Deploy contracts to a configured network
#[derive(Parser, Debug)]
#[command(version)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Path to the deployment configuration file. This file should be in TOML
    /// format.
    #[clap(long, env, default_value = "deploy.toml")]
    pub config: PathBuf,

    /// The network to deploy to, as named in the configuration file.
    #[clap(long, env, default_value = "localhost")]
    pub network: String,

    /// Only run deployment tasks carrying at least one of these tags. Runs
    /// every task when empty.
    #[clap(long, env, use_value_delimiter = true)]
    pub tags: Vec<String>,

    /// Optional TOML manifest listing the deployment tasks. Without it only
    /// the Votes contract is deployed.
    #[clap(long, env)]
    pub manifest: Option<PathBuf>,

    /// Forget the deployments recorded for the network and run every task
    /// again.
    #[clap(long, env)]
    pub reset: bool,
}

#[derive(Parser, Debug)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,deploy_contracts=info")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Output log events as JSON.
    #[clap(long, env)]
    pub log_json: bool,
}

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::Config {
        let mut config = observe::Config::default().with_env_filter(&self.log_filter);
        if let Some(level) = self.log_stderr_threshold.into_level() {
            config = config.with_stderr_threshold(level);
        }
        if self.log_json {
            config = config.with_json_format();
        }
        config
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            config,
            network,
            tags,
            manifest,
            reset,
        } = self;

        writeln!(f, "log_filter: {}", logging.log_filter)?;
        writeln!(f, "log_stderr_threshold: {}", logging.log_stderr_threshold)?;
        writeln!(f, "log_json: {}", logging.log_json)?;
        writeln!(f, "config: {}", config.display())?;
        writeln!(f, "network: {network}")?;
        writeln!(f, "tags: {tags:?}")?;
        writeln!(
            f,
            "manifest: {}",
            manifest
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "None".to_string())
        )?;
        writeln!(f, "reset: {reset}")?;
        Ok(())
    }
}
