//! The `meroxa` command tree.
//!
//! - [`version`] - print the CLI version
//! - [`whoami`] - show the logged-in user
//! - [`config`] - inspect and edit the config file
//! - [`accounts`] - list and switch accounts
//! - [`resources`] - manage resources
//! - [`environments`] - manage environments (feature-gated)

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use meroxa_builder::{
    assemble, capabilities, flag_set, Command, CommandError, Docs, FlagSet, HasDocs, HasFlags,
    HasSubCommands, Node, PlatformClient,
};

pub mod accounts;
pub mod config;
pub mod environments;
pub mod resources;
pub mod version;
pub mod whoami;

flag_set! {
    /// Flags every command accepts.
    #[derive(Debug, Clone, Default)]
    pub struct GlobalFlags {
        /// Print results as JSON.
        #[flag(long = "json", usage = "output json", persistent = "true")]
        pub json: bool,
        /// Print debug output.
        #[flag(long = "debug", usage = "display any debugging information", persistent = "true")]
        pub debug: bool,
        /// Alternative config file.
        #[flag(long = "cli-config-file", usage = "meroxa configuration file", persistent = "true")]
        pub cli_config_file: String,
        /// Alternative API root.
        #[flag(long = "api-url", usage = "API url", persistent = "true", hidden = "true")]
        pub api_url: String,
        /// Per-request API timeout.
        #[flag(long = "timeout", usage = "set the duration of the client timeout", persistent = "true", default = "10s")]
        pub timeout: Duration,
    }
}

/// The `meroxa` root command.
#[derive(Debug, Default)]
pub struct Root {
    flags: GlobalFlags,
}

impl Command for Root {
    fn usage(&self) -> &str {
        "meroxa"
    }
    capabilities!(docs, flags, sub_commands);
}

impl HasDocs for Root {
    fn docs(&self) -> Docs {
        Docs {
            short: "The Meroxa CLI".to_string(),
            long: "The Meroxa CLI allows quick and easy access to the Meroxa Data Platform.\n\n\
                   Using the CLI you are able to create and manage sophisticated data pipelines \
                   with only a few simple commands. You can get started by listing the supported \
                   resource types:\n\n\
                   meroxa resources list --types"
                .to_string(),
            example: String::new(),
        }
    }
}

impl HasFlags for Root {
    fn flags(&mut self) -> &mut dyn FlagSet {
        &mut self.flags
    }
}

impl HasSubCommands for Root {
    fn sub_commands(&self) -> Vec<Node> {
        vec![
            assemble(accounts::Accounts),
            assemble(config::ConfigCommand),
            assemble(environments::Environments),
            assemble(resources::Resources),
            assemble(version::Version::default()),
            assemble(whoami::WhoAmI::default()),
        ]
    }
}

/// The client attached by the client pre-step.
fn client(client: Option<&Arc<dyn PlatformClient>>) -> Result<&dyn PlatformClient, CommandError> {
    client
        .map(|c| &**c)
        .ok_or_else(|| CommandError::Other(anyhow!("API client was not attached")))
}

/// The assembled `meroxa` tree.
pub fn root() -> Node {
    assemble(Root::default())
}
