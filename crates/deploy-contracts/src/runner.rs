use {
    crate::{environment::RuntimeEnvironment, store::Store, task::DeploymentTask},
    anyhow::{Context, Result},
};

/// Executes deployment tasks in order against one network.
pub struct Runner<'a> {
    pub env: &'a RuntimeEnvironment,
    pub store: &'a Store,
    /// Only tasks with at least one of these tags run. Empty selects all.
    pub tags: &'a [String],
    /// Forget everything recorded for the network before running.
    pub reset: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
}

impl Runner<'_> {
    /// Runs every selected task that has not completed on the network before.
    /// Stops at the first failing task, whose id is then not recorded.
    pub async fn run(&self, tasks: &[Box<dyn DeploymentTask>]) -> Result<Summary> {
        if self.reset {
            self.store.reset().await?;
        }
        self.store
            .ensure_chain_id(self.env.network.chain_id)
            .await?;
        let migrations = self.store.migrations().await?;

        let mut summary = Summary::default();
        for task in tasks {
            let label = task.id().unwrap_or(task.name()).to_string();
            if !self.selected(task.as_ref()) {
                tracing::debug!(task = %label, "not selected by tags");
                summary.skipped.push(label);
                continue;
            }
            if let Some(executed_at) = task.id().and_then(|id| migrations.get(id)) {
                tracing::info!(
                    task = %label,
                    executed_at,
                    "skipping task, it already ran on this network"
                );
                summary.skipped.push(label);
                continue;
            }

            tracing::info!(task = %label, network = %self.env.network.name, "running task");
            task.run(self.env)
                .await
                .with_context(|| format!("deployment task {label:?} failed"))?;
            if let Some(id) = task.id() {
                self.store
                    .record_migration(id, chrono::Utc::now().timestamp())
                    .await?;
            }
            summary.executed.push(label);
        }

        Ok(summary)
    }

    fn selected(&self, task: &dyn DeploymentTask) -> bool {
        self.tags.is_empty() || task.tags().iter().any(|tag| self.tags.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            environment::{DeployResult, MockDeployments, MockNamedAccounts},
            task::{ContractDeployment, DEPLOYER},
            tests::environment,
        },
        alloy::primitives::Address,
        anyhow::anyhow,
        maplit::hashmap,
    };

    fn greeter() -> ContractDeployment {
        ContractDeployment {
            id: Some("deploy_greeter".to_string()),
            tags: vec!["Greeter".to_string()],
            contract: "Greeter".to_string(),
            args: vec!["Bonjour, le monde!".into()],
            log: true,
        }
    }

    fn tasks() -> Vec<Box<dyn DeploymentTask>> {
        vec![Box::new(ContractDeployment::votes()), Box::new(greeter())]
    }

    fn accounts(times: usize) -> MockNamedAccounts {
        let mut accounts = MockNamedAccounts::new();
        accounts
            .expect_named_accounts()
            .times(times)
            .returning(|| Ok(hashmap! { DEPLOYER.to_string() => Address::repeat_byte(0xaa) }));
        accounts
    }

    fn expect_deploy(deployments: &mut MockDeployments, contract: &'static str, times: usize) {
        deployments
            .expect_deploy()
            .times(times)
            .withf(move |name, _| name == contract)
            .returning(|_, _| {
                Ok(DeployResult {
                    address: Address::repeat_byte(0xbb),
                    transaction_hash: None,
                    newly_deployed: true,
                })
            });
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn runs_all_tasks_and_records_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        let mut deployments = MockDeployments::new();
        expect_deploy(&mut deployments, "Votes", 1);
        expect_deploy(&mut deployments, "Greeter", 1);
        let env = environment(accounts(2), deployments);

        let summary = Runner {
            env: &env,
            store: &store,
            tags: &[],
            reset: false,
        }
        .run(&tasks())
        .await
        .unwrap();

        assert_eq!(summary.executed, strings(&["deploy_votes", "deploy_greeter"]));
        assert!(summary.skipped.is_empty());
        let migrations = store.migrations().await.unwrap();
        assert!(migrations.contains_key("deploy_votes"));
        assert!(migrations.contains_key("deploy_greeter"));
    }

    #[tokio::test]
    async fn tags_select_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        let mut deployments = MockDeployments::new();
        expect_deploy(&mut deployments, "Votes", 1);
        let env = environment(accounts(1), deployments);

        let summary = Runner {
            env: &env,
            store: &store,
            tags: &strings(&["Votes"]),
            reset: false,
        }
        .run(&tasks())
        .await
        .unwrap();

        assert_eq!(summary.executed, strings(&["deploy_votes"]));
        assert_eq!(summary.skipped, strings(&["deploy_greeter"]));
        assert!(!store.migrations().await.unwrap().contains_key("deploy_greeter"));
    }

    #[tokio::test]
    async fn completed_ids_are_not_run_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        store.record_migration("deploy_votes", 1).await.unwrap();
        let mut deployments = MockDeployments::new();
        expect_deploy(&mut deployments, "Votes", 0);
        expect_deploy(&mut deployments, "Greeter", 1);
        let env = environment(accounts(1), deployments);

        let summary = Runner {
            env: &env,
            store: &store,
            tags: &[],
            reset: false,
        }
        .run(&tasks())
        .await
        .unwrap();

        assert_eq!(summary.executed, strings(&["deploy_greeter"]));
        assert_eq!(summary.skipped, strings(&["deploy_votes"]));
        assert_eq!(store.migrations().await.unwrap()["deploy_votes"], 1);
    }

    #[tokio::test]
    async fn reset_runs_completed_ids_again() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        store.record_migration("deploy_votes", 1).await.unwrap();
        let mut deployments = MockDeployments::new();
        expect_deploy(&mut deployments, "Votes", 1);
        let env = environment(accounts(1), deployments);

        let summary = Runner {
            env: &env,
            store: &store,
            tags: &strings(&["Votes"]),
            reset: true,
        }
        .run(&tasks())
        .await
        .unwrap();

        assert_eq!(summary.executed, strings(&["deploy_votes"]));
        assert_ne!(store.migrations().await.unwrap()["deploy_votes"], 1);
    }

    #[tokio::test]
    async fn tasks_without_id_always_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        let anonymous: Vec<Box<dyn DeploymentTask>> = vec![Box::new(ContractDeployment {
            id: None,
            ..ContractDeployment::votes()
        })];
        let mut deployments = MockDeployments::new();
        expect_deploy(&mut deployments, "Votes", 2);
        let env = environment(accounts(2), deployments);
        let runner = Runner {
            env: &env,
            store: &store,
            tags: &[],
            reset: false,
        };

        for _ in 0..2 {
            let summary = runner.run(&anonymous).await.unwrap();
            assert_eq!(summary.executed, strings(&["Votes"]));
        }
        assert!(store.migrations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        let mut deployments = MockDeployments::new();
        deployments
            .expect_deploy()
            .times(1)
            .withf(|name, _| name == "Votes")
            .returning(|_, _| Err(anyhow!("transaction reverted")));
        expect_deploy(&mut deployments, "Greeter", 0);
        let env = environment(accounts(1), deployments);

        let err = Runner {
            env: &env,
            store: &store,
            tags: &[],
            reset: false,
        }
        .run(&tasks())
        .await
        .unwrap_err();

        assert_eq!(err.root_cause().to_string(), "transaction reverted");
        assert!(store.migrations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_folder_of_other_chain() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "localhost");
        store.ensure_chain_id(1).await.unwrap();
        let mut deployments = MockDeployments::new();
        deployments.expect_deploy().never();
        let env = environment(accounts(0), deployments);

        let result = Runner {
            env: &env,
            store: &store,
            tags: &[],
            reset: false,
        }
        .run(&tasks())
        .await;
        assert!(result.is_err());
    }
}
