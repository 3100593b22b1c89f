//! `meroxa accounts`: list accounts and pick the active one.

use std::sync::Arc;

use meroxa_builder::{
    assemble, capabilities, Command, CommandError, Context, Docs, ExecuteFuture, HasAliases,
    HasArgs, HasClient, HasConfig, HasDocs, HasExecute, HasLogger, HasNoHeaders, HasSubCommands,
    Logger, Node, PlatformClient, SharedConfig,
};
use meroxa_config::USER_ACCOUNT_UUID;

use crate::display;

/// Namespace for the account commands.
#[derive(Debug, Default)]
pub struct Accounts;

impl Command for Accounts {
    fn usage(&self) -> &str {
        "accounts"
    }
    capabilities!(docs, aliases, sub_commands);
}

impl HasDocs for Accounts {
    fn docs(&self) -> Docs {
        Docs::short("Manage Meroxa Accounts")
    }
}

impl HasAliases for Accounts {
    fn aliases(&self) -> Vec<String> {
        vec!["account".to_string()]
    }
}

impl HasSubCommands for Accounts {
    fn sub_commands(&self) -> Vec<Node> {
        vec![assemble(List::default()), assemble(Set::default())]
    }
}

/// Lists the accounts the user belongs to.
#[derive(Default)]
pub struct List {
    client: Option<Arc<dyn PlatformClient>>,
    config: Option<SharedConfig>,
    logger: Logger,
    hide_headers: bool,
}

impl Command for List {
    fn usage(&self) -> &str {
        "list"
    }
    capabilities!(docs, aliases, client, config, logger, no_headers, execute);
}

impl HasDocs for List {
    fn docs(&self) -> Docs {
        Docs::short("List Meroxa Accounts")
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

impl HasConfig for List {
    fn attach_config(&mut self, config: SharedConfig) {
        self.config = Some(config);
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
            let accounts = super::client(self.client.as_ref())?.list_accounts().await?;
            let current = self
                .config
                .as_ref()
                .and_then(|c| c.read().get_string(USER_ACCOUNT_UUID))
                .unwrap_or_default();
            self.logger.json(&accounts);
            self.logger
                .info(display::accounts_table(&accounts, &current, self.hide_headers));
            Ok::<_, CommandError>(())
        })
    }
}

/// Makes an account, given by name or UUID, the active one.
#[derive(Default)]
pub struct Set {
    client: Option<Arc<dyn PlatformClient>>,
    config: Option<SharedConfig>,
    logger: Logger,
    account: String,
}

impl Command for Set {
    fn usage(&self) -> &str {
        "set NAME_OR_UUID"
    }
    capabilities!(docs, args, client, config, logger, execute);
}

impl HasDocs for Set {
    fn docs(&self) -> Docs {
        Docs {
            short: "Set the active account".to_string(),
            example: "meroxa accounts set my-team".to_string(),
            ..Docs::default()
        }
    }
}

impl HasArgs for Set {
    fn parse_args(&mut self, args: &[String]) -> Result<(), CommandError> {
        self.account = args
            .first()
            .cloned()
            .ok_or_else(|| CommandError::requires("account name or UUID"))?;
        Ok(())
    }
}

impl HasClient for Set {
    fn attach_client(&mut self, client: Arc<dyn PlatformClient>) {
        self.client = Some(client);
    }
}

impl HasConfig for Set {
    fn attach_config(&mut self, config: SharedConfig) {
        self.config = Some(config);
    }
}

impl HasLogger for Set {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasExecute for Set {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let accounts = super::client(self.client.as_ref())?.list_accounts().await?;
            let Some(account) = accounts
                .iter()
                .find(|a| a.name == self.account || a.uuid == self.account)
            else {
                return Err(CommandError::Args(format!(
                    "'{}' is an invalid account UUID",
                    self.account
                )));
            };
            if let Some(config) = &self.config {
                config.write().set(USER_ACCOUNT_UUID, account.uuid.as_str());
            }
            self.logger
                .info(format!("Active account is now {:?}", account.name));
            Ok::<_, CommandError>(())
        })
    }
}
