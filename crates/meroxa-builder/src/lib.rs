//! Command assembly for the Meroxa CLI.
//!
//! A command is a plain struct implementing [`Command`] plus whichever
//! capability traits it needs ([`HasDocs`], [`HasArgs`], [`HasClient`],
//! [`HasConfirm`], ...). [`assemble`] probes those capabilities once and
//! produces a [`Node`] whose pre-steps, execute step and post-steps wire
//! the cross-cutting concerns: logger and config injection, argument
//! parsing, client construction, feature-flag gating, confirmation
//! prompts, config flushing and the periodic update notice.
//!
//! # Example
//!
//! ```rust,no_run
//! use meroxa_builder::{
//!     assemble, capabilities, Cli, Command, CommandError, Context, Docs, ExecuteFuture,
//!     HasDocs, HasExecute, Logger, Session,
//! };
//!
//! struct Hello;
//!
//! impl Command for Hello {
//!     fn usage(&self) -> &str {
//!         "hello"
//!     }
//!     capabilities!(docs, execute);
//! }
//!
//! impl HasDocs for Hello {
//!     fn docs(&self) -> Docs {
//!         Docs::short("Say hello")
//!     }
//! }
//!
//! impl HasExecute for Hello {
//!     fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
//!         Box::pin(async move {
//!             println!("hello");
//!             Ok(())
//!         })
//!     }
//! }
//!
//! # async fn run() -> Result<(), CommandError> {
//! let mut cli = Cli::new(assemble(Hello));
//! let invocation = cli.parse_from(["hello"])?;
//! invocation.run(&Session::new(Logger::discard()), &Context::default()).await
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod assemble;
pub mod autoupdate;
pub mod command;
pub mod context;
pub mod error;
pub mod feature_flag;
pub mod flags;
pub mod log;
pub mod prompt;
pub mod run;
pub mod session;

pub use assemble::{assemble, Node, PostStep, PreStep};
pub use autoupdate::{should_check_for_newer_version, VersionFuture, VersionSource};
pub use command::{
    Command, Docs, ExecuteFuture, HasAliases, HasArgs, HasClient, HasConfig, HasConfirm,
    HasConfirmWithValue, HasDeprecated, HasDocs, HasExecute, HasFeatureFlag, HasFlags, HasHidden,
    HasLogger, HasNoHeaders, HasSubCommands,
};
pub use context::Context;
pub use error::CommandError;
pub use feature_flag::{check_feature_flag, check_gate, Entitlements};
pub use flags::{
    build_flags, format_duration, parse_duration, Flag, FlagField, FlagKind, FlagSet, FlagValue,
    Target,
};
pub use log::{Captured, Level, Logger, SharedBuffer};
pub use prompt::Prompt;
pub use run::{Cli, Invocation};
pub use session::{ClientFactory, Session};

pub use meroxa_client::PlatformClient;
pub use meroxa_config::{Config, SharedConfig};
