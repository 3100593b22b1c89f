//! `meroxa environments`: self-hosted environments, gated behind the
//! `environments` feature flag. The gate on the namespace applies to every
//! command below it.

use std::sync::Arc;

use meroxa_builder::{
    assemble, capabilities, Command, CommandError, Context, Docs, ExecuteFuture, HasAliases,
    HasArgs, HasClient, HasConfirmWithValue, HasDocs, HasExecute, HasFeatureFlag, HasLogger,
    HasNoHeaders, HasSubCommands, Logger, Node, PlatformClient,
};

use crate::display;

/// Entitlement required for every environments command.
pub const FEATURE_FLAG: &str = "environments";

/// Namespace for the environment commands.
#[derive(Debug, Default)]
pub struct Environments;

impl Command for Environments {
    fn usage(&self) -> &str {
        "environments"
    }
    capabilities!(docs, aliases, feature_flag, sub_commands);
}

impl HasDocs for Environments {
    fn docs(&self) -> Docs {
        Docs::short("Manage environments on Meroxa")
    }
}

impl HasAliases for Environments {
    fn aliases(&self) -> Vec<String> {
        vec!["env".to_string(), "environment".to_string()]
    }
}

impl HasFeatureFlag for Environments {
    fn feature_flag(&self) -> (String, CommandError) {
        (
            FEATURE_FLAG.to_string(),
            CommandError::entitlement("no access to the Meroxa self-hosted environments feature"),
        )
    }
}

impl HasSubCommands for Environments {
    fn sub_commands(&self) -> Vec<Node> {
        vec![
            assemble(Describe::default()),
            assemble(List::default()),
            assemble(Remove::default()),
        ]
    }
}

/// Lists environments.
#[derive(Default)]
pub struct List {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
    hide_headers: bool,
}

impl Command for List {
    fn usage(&self) -> &str {
        "list"
    }
    capabilities!(docs, aliases, client, logger, no_headers, execute);
}

impl HasDocs for List {
    fn docs(&self) -> Docs {
        Docs::short("List environments")
    }
}

impl HasAliases for List {
    fn aliases(&self) -> Vec<String> {
        vec!["ls".to_string()]
    }
}

impl HasClient for List {
    fn attach_client(&mut self, client: Arc<dyn PlatformClient>) {
        self.client = Some(client);
    }
}

impl HasLogger for List {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasNoHeaders for List {
    fn set_hide_headers(&mut self, hide: bool) {
        self.hide_headers = hide;
    }
}

impl HasExecute for List {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let environments = super::client(self.client.as_ref())?
                .list_environments()
                .await?;
            self.logger.json(&environments);
            self.logger
                .info(display::environments_table(&environments, self.hide_headers));
            Ok::<_, CommandError>(())
        })
    }
}

/// Shows one environment.
#[derive(Default)]
pub struct Describe {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
    name: String,
}

impl Command for Describe {
    fn usage(&self) -> &str {
        "describe [NAME|UUID]"
    }
    capabilities!(docs, args, client, logger, execute);
}

impl HasDocs for Describe {
    fn docs(&self) -> Docs {
        Docs::short("Describe environment")
    }
}

impl HasArgs for Describe {
    fn parse_args(&mut self, args: &[String]) -> Result<(), CommandError> {
        self.name = args
            .first()
            .cloned()
            .ok_or_else(|| CommandError::requires("environment name"))?;
        Ok(())
    }
}

impl HasClient for Describe {
    fn attach_client(&mut self, client: Arc<dyn PlatformClient>) {
        self.client = Some(client);
    }
}

impl HasLogger for Describe {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasExecute for Describe {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let environment = super::client(self.client.as_ref())?
                .get_environment(&self.name)
                .await?;
            self.logger.info(display::environment_table(&environment));
            self.logger.json(&environment);
            Ok::<_, CommandError>(())
        })
    }
}

/// Starts deprovisioning an environment after the user types its name.
#[derive(Default)]
pub struct Remove {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
    name: String,
}

impl Command for Remove {
    fn usage(&self) -> &str {
        "remove NAME|UUID"
    }
    capabilities!(docs, aliases, args, client, logger, confirm_with_value, execute);
}

impl HasDocs for Remove {
    fn docs(&self) -> Docs {
        Docs::short("Remove environment")
    }
}

impl HasAliases for Remove {
    fn aliases(&self) -> Vec<String> {
        vec!["rm".to_string(), "delete".to_string()]
    }
}

impl HasArgs for Remove {
    fn parse_args(&mut self, args: &[String]) -> Result<(), CommandError> {
        self.name = args
            .first()
            .cloned()
            .ok_or_else(|| CommandError::requires("environment name"))?;
        Ok(())
    }
}

impl HasClient for Remove {
    fn attach_client(&mut self, client: Arc<dyn PlatformClient>) {
        self.client = Some(client);
    }
}

impl HasLogger for Remove {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasConfirmWithValue for Remove {
    fn value_to_confirm(&self, _ctx: &Context) -> String {
        self.name.clone()
    }
}

impl HasExecute for Remove {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            self.logger
                .info(format!("Environment {:?} is being removed...", self.name));
            let environment = super::client(self.client.as_ref())?
                .delete_environment(&self.name)
                .await?;
            self.logger.info(format!(
                "Run `meroxa env describe {}` for status.",
                self.name
            ));
            self.logger.json(&environment);
            Ok::<_, CommandError>(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meroxa_client::{Environment, FakeClient, Status};

    fn prod() -> Environment {
        Environment {
            uuid: "e-1".to_string(),
            name: "prod".to_string(),
            kind: "self_hosted".to_string(),
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            status: Status {
                state: "ready".to_string(),
                details: String::new(),
            },
            ..Environment::default()
        }
    }

    #[test]
    fn namespace_is_gated() {
        let (flag, fallback) = Environments.feature_flag();
        assert_eq!(flag, FEATURE_FLAG);
        assert!(matches!(fallback, CommandError::Entitlement(_)));
    }

    #[tokio::test]
    async fn list_prints_environments() {
        let (logger, captured) = Logger::capture();
        let mut cmd = List::default();
        cmd.attach_logger(logger);
        cmd.attach_client(Arc::new(FakeClient::new().with_environment(prod())));

        cmd.execute(&Context::default()).await.expect("runs");

        let out = captured.leveled_output();
        assert!(out.contains("PROVIDER"));
        assert!(out.contains("us-east-1"));
    }

    #[tokio::test]
    async fn describe_finds_by_uuid() {
        let (logger, captured) = Logger::capture();
        let mut cmd = Describe::default();
        cmd.attach_logger(logger);
        cmd.attach_client(Arc::new(FakeClient::new().with_environment(prod())));
        cmd.parse_args(&["e-1".to_string()]).expect("valid");

        cmd.execute(&Context::default()).await.expect("runs");

        assert!(captured.leveled_output().contains("Name: prod"));
    }

    #[tokio::test]
    async fn remove_reports_follow_up() {
        let fake = Arc::new(FakeClient::new().with_environment(prod()));
        let (logger, captured) = Logger::capture();
        let mut cmd = Remove::default();
        cmd.attach_logger(logger);
        cmd.attach_client(fake.clone());
        cmd.parse_args(&["prod".to_string()]).expect("valid");
        assert_eq!(cmd.value_to_confirm(&Context::default()), "prod");

        cmd.execute(&Context::default()).await.expect("runs");

        assert_eq!(fake.deleted(), ["prod"]);
        assert_eq!(
            captured.leveled_output(),
            "Environment \"prod\" is being removed...\nRun `meroxa env describe prod` for status.\n"
        );
        assert!(captured.json_output().contains("deprovisioning"));
    }
}
