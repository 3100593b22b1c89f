//! `meroxa resources`: list, describe and remove resources.

use std::sync::Arc;

use meroxa_builder::{
    assemble, capabilities, flag_set, Command, CommandError, Context, Docs, ExecuteFuture,
    FlagSet, HasAliases, HasArgs, HasClient, HasConfirm, HasDocs, HasExecute, HasFlags,
    HasLogger, HasNoHeaders, HasSubCommands, Logger, Node, PlatformClient,
};

use crate::display;

/// Namespace for the resource commands.
#[derive(Debug, Default)]
pub struct Resources;

impl Command for Resources {
    fn usage(&self) -> &str {
        "resources"
    }
    capabilities!(docs, aliases, sub_commands);
}

impl HasDocs for Resources {
    fn docs(&self) -> Docs {
        Docs::short("Manage resources on Meroxa")
    }
}

impl HasAliases for Resources {
    fn aliases(&self) -> Vec<String> {
        vec!["resource".to_string()]
    }
}

impl HasSubCommands for Resources {
    fn sub_commands(&self) -> Vec<Node> {
        vec![
            assemble(Describe::default()),
            assemble(List::default()),
            assemble(Remove::default()),
        ]
    }
}

flag_set! {
    #[derive(Debug, Default)]
    struct ListFlags {
        #[flag(long = "types", usage = "list resource types")]
        types: bool,
        #[flag(long = "type", usage = "alias of --types", hidden = "true")]
        kind: bool,
    }
}

/// Lists resources, or the supported resource types with `--types`.
#[derive(Default)]
pub struct List {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
    flags: ListFlags,
    hide_headers: bool,
}

impl Command for List {
    fn usage(&self) -> &str {
        "list"
    }
    capabilities!(docs, aliases, flags, client, logger, no_headers, execute);
}

impl HasDocs for List {
    fn docs(&self) -> Docs {
        Docs {
            short: "List resources and resource types".to_string(),
            example: "meroxa resources list\nmeroxa resources list --types".to_string(),
            ..Docs::default()
        }
    }
}

impl HasAliases for List {
    fn aliases(&self) -> Vec<String> {
        vec!["ls".to_string()]
    }
}

impl HasFlags for List {
    fn flags(&mut self) -> &mut dyn FlagSet {
        &mut self.flags
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
            let client = super::client(self.client.as_ref())?;
            if self.flags.types || self.flags.kind {
                let types = client.list_resource_types().await?;
                self.logger.json(&types);
                self.logger
                    .info(display::resource_types_table(&types, self.hide_headers));
                return Ok(());
            }
            let resources = client.list_resources().await?;
            self.logger.json(&resources);
            self.logger
                .info(display::resources_table(&resources, self.hide_headers));
            Ok::<_, CommandError>(())
        })
    }
}

/// Shows one resource.
#[derive(Default)]
pub struct Describe {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
    name: String,
}

impl Command for Describe {
    fn usage(&self) -> &str {
        "describe [NAME]"
    }
    capabilities!(docs, args, client, logger, execute);
}

impl HasDocs for Describe {
    fn docs(&self) -> Docs {
        Docs::short("Describe resource")
    }
}

impl HasArgs for Describe {
    fn parse_args(&mut self, args: &[String]) -> Result<(), CommandError> {
        self.name = args
            .first()
            .cloned()
            .ok_or_else(|| CommandError::requires("resource name"))?;
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
            let client = super::client(self.client.as_ref())?;
            let resource = client.get_resource_by_name(&self.name).await?;
            self.logger.info(display::resource_table(&resource));
            self.logger.json(&resource);
            Ok::<_, CommandError>(())
        })
    }
}

/// Deletes a resource after the user types its name.
#[derive(Default)]
pub struct Remove {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
    name: String,
}

impl Command for Remove {
    fn usage(&self) -> &str {
        "remove NAME"
    }
    capabilities!(docs, aliases, args, client, logger, confirm, execute);
}

impl HasDocs for Remove {
    fn docs(&self) -> Docs {
        Docs::short("Remove resource")
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
            .ok_or_else(|| CommandError::requires("resource name"))?;
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

impl HasConfirm for Remove {
    fn confirm(&self, _ctx: &Context) -> String {
        self.name.clone()
    }
}

impl HasExecute for Remove {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            self.logger
                .info(format!("Removing resource {:?}...", self.name));
            let client = super::client(self.client.as_ref())?;
            let resource = client.get_resource_by_name(&self.name).await?;
            client.delete_resource(&resource.id.to_string()).await?;
            self.logger
                .info(format!("Resource {:?} successfully removed", self.name));
            self.logger.json(&resource);
            Ok::<_, CommandError>(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meroxa_client::{FakeClient, Resource};

    fn pg() -> Resource {
        Resource {
            id: 7,
            uuid: "r-7".to_string(),
            name: "pg".to_string(),
            kind: "postgres".to_string(),
            ..Resource::default()
        }
    }

    #[tokio::test]
    async fn list_prints_resources() {
        let (logger, captured) = Logger::capture();
        let mut cmd = List::default();
        cmd.attach_logger(logger);
        cmd.attach_client(Arc::new(FakeClient::new().with_resource(pg())));

        cmd.execute(&Context::default()).await.expect("runs");

        let out = captured.leveled_output();
        assert!(out.starts_with("UUID"));
        assert!(out.contains("postgres"));
    }

    #[tokio::test]
    async fn list_types_with_either_flag() {
        for flags in [
            ListFlags {
                types: true,
                kind: false,
            },
            ListFlags {
                types: false,
                kind: true,
            },
        ] {
            let (logger, captured) = Logger::capture();
            let mut cmd = List {
                flags,
                ..List::default()
            };
            cmd.attach_logger(logger);
            cmd.set_hide_headers(true);
            cmd.attach_client(Arc::new(
                FakeClient::new()
                    .with_resource_type("s3")
                    .with_resource_type("mysql")
                    .with_resource(pg()),
            ));

            cmd.execute(&Context::default()).await.expect("runs");

            assert_eq!(captured.leveled_output(), "mysql\ns3\n");
        }
    }

    #[tokio::test]
    async fn describe_unknown_resource_fails() {
        let mut cmd = Describe::default();
        cmd.attach_client(Arc::new(FakeClient::new()));
        cmd.parse_args(&["nope".to_string()]).expect("valid");

        let err = cmd.execute(&Context::default()).await.expect_err("missing");
        assert!(err.to_string().contains(r#"could not find resource "nope""#));
    }

    #[tokio::test]
    async fn remove_deletes_by_id_and_reports() {
        let fake = Arc::new(FakeClient::new().with_resource(pg()));
        let (logger, captured) = Logger::capture();
        let mut cmd = Remove::default();
        cmd.attach_logger(logger);
        cmd.attach_client(fake.clone());
        cmd.parse_args(&["pg".to_string()]).expect("valid");
        assert_eq!(cmd.confirm(&Context::default()), "pg");

        cmd.execute(&Context::default()).await.expect("runs");

        assert_eq!(fake.deleted(), ["7"]);
        assert_eq!(
            captured.leveled_output(),
            "Removing resource \"pg\"...\nResource \"pg\" successfully removed\n"
        );
        assert!(captured.json_output().contains(r#""uuid": "r-7""#));
    }

    #[test]
    fn remove_requires_a_name() {
        let err = Remove::default().parse_args(&[]).expect_err("no args");
        assert_eq!(err.to_string(), "requires resource name");
    }
}
