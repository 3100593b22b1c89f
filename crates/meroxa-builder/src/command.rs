//! Command descriptors and their optional capabilities.
//!
//! Every descriptor implements [`Command`]. Each capability is a separate
//! single-method trait; a descriptor opts in by implementing the trait and
//! listing it in [`capabilities!`](crate::capabilities), which overrides the
//! matching `as_*` accessor so [`assemble`](crate::assemble()) can find it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use meroxa_client::PlatformClient;
use meroxa_config::SharedConfig;

use crate::assemble::Node;
use crate::context::Context;
use crate::error::CommandError;
use crate::flags::FlagSet;
use crate::log::Logger;

/// Future returned by [`HasExecute::execute`].
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CommandError>> + 'a>>;

/// Help text for a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docs {
    /// One-line summary shown in command lists.
    pub short: String,
    /// Full description shown in the command's own help.
    pub long: String,
    /// Usage examples.
    pub example: String,
}

impl Docs {
    /// Docs with only a summary line.
    pub fn short(short: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            ..Self::default()
        }
    }
}

/// A command descriptor.
///
/// Only [`Command::usage`] is mandatory. The `as_*` accessors report which
/// capabilities the descriptor has and default to `None`; override them with
/// [`capabilities!`](crate::capabilities).
pub trait Command: 'static {
    /// Usage line; the first word is the command name, e.g. `remove NAME`.
    fn usage(&self) -> &str;

    /// See [`HasDocs`].
    fn as_docs(&self) -> Option<&dyn HasDocs> {
        None
    }
    /// See [`HasAliases`].
    fn as_aliases(&self) -> Option<&dyn HasAliases> {
        None
    }
    /// See [`HasFlags`].
    fn as_flags(&mut self) -> Option<&mut dyn HasFlags> {
        None
    }
    /// See [`HasArgs`].
    fn as_args(&mut self) -> Option<&mut dyn HasArgs> {
        None
    }
    /// See [`HasClient`].
    fn as_client(&mut self) -> Option<&mut dyn HasClient> {
        None
    }
    /// See [`HasConfirm`].
    fn as_confirm(&self) -> Option<&dyn HasConfirm> {
        None
    }
    /// See [`HasConfirmWithValue`].
    fn as_confirm_with_value(&self) -> Option<&dyn HasConfirmWithValue> {
        None
    }
    /// See [`HasSubCommands`].
    fn as_sub_commands(&self) -> Option<&dyn HasSubCommands> {
        None
    }
    /// See [`HasLogger`].
    fn as_logger(&mut self) -> Option<&mut dyn HasLogger> {
        None
    }
    /// See [`HasConfig`].
    fn as_config(&mut self) -> Option<&mut dyn HasConfig> {
        None
    }
    /// See [`HasFeatureFlag`].
    fn as_feature_flag(&self) -> Option<&dyn HasFeatureFlag> {
        None
    }
    /// See [`HasHidden`].
    fn as_hidden(&self) -> Option<&dyn HasHidden> {
        None
    }
    /// See [`HasDeprecated`].
    fn as_deprecated(&self) -> Option<&dyn HasDeprecated> {
        None
    }
    /// See [`HasNoHeaders`].
    fn as_no_headers(&mut self) -> Option<&mut dyn HasNoHeaders> {
        None
    }
    /// See [`HasExecute`].
    fn as_execute(&mut self) -> Option<&mut dyn HasExecute> {
        None
    }
}

/// Help text.
pub trait HasDocs {
    /// Summary, description and examples.
    fn docs(&self) -> Docs;
}

/// Alternative names.
pub trait HasAliases {
    /// Names that invoke the command besides its own.
    fn aliases(&self) -> Vec<String>;
}

/// Typed flags.
pub trait HasFlags {
    /// The flags struct, declared with [`flag_set!`](crate::flag_set).
    /// Parsed values are written back into it before any pre-step runs.
    fn flags(&mut self) -> &mut dyn FlagSet;
}

/// Positional arguments.
pub trait HasArgs {
    /// Validate and store the positional arguments. Runs after flags are
    /// bound and before the client is attached.
    fn parse_args(&mut self, args: &[String]) -> Result<(), CommandError>;
}

/// Needs a platform API client.
pub trait HasClient {
    /// Receives a freshly constructed client.
    fn attach_client(&mut self, client: Arc<dyn PlatformClient>);
}

/// Destructive command confirmed by typing a value.
pub trait HasConfirm {
    /// The exact text the user must type.
    fn confirm(&self, ctx: &Context) -> String;
}

/// Same contract as [`HasConfirm`]; kept so both descriptor styles work.
/// When a descriptor has both, this one wins.
pub trait HasConfirmWithValue {
    /// The exact text the user must type.
    fn value_to_confirm(&self, ctx: &Context) -> String;
}

/// Namespace with children.
pub trait HasSubCommands {
    /// Already assembled child nodes.
    fn sub_commands(&self) -> Vec<Node>;
}

/// Writes user-facing output.
pub trait HasLogger {
    /// Receives the session logger.
    fn attach_logger(&mut self, logger: Logger);
}

/// Reads or mutates persisted config. Changes are flushed after execute.
pub trait HasConfig {
    /// Receives the shared config.
    fn attach_config(&mut self, config: SharedConfig);
}

/// Gated behind an account entitlement.
pub trait HasFeatureFlag {
    /// The flag name and the error returned when the account lacks it.
    fn feature_flag(&self) -> (String, CommandError);
}

/// Possibly hidden from help.
pub trait HasHidden {
    /// Whether to hide the command.
    fn hidden(&self) -> bool;
}

/// Deprecated command.
pub trait HasDeprecated {
    /// Message printed whenever the command runs.
    fn deprecated(&self) -> String;
}

/// Prints tables that can omit their header row.
pub trait HasNoHeaders {
    /// Whether `--no-headers` was given.
    fn set_hide_headers(&mut self, hide: bool);
}

/// Runnable command.
pub trait HasExecute {
    /// Do the work. Runs after every pre-step succeeded.
    fn execute<'a>(&'a mut self, ctx: &'a Context) -> ExecuteFuture<'a>;
}

/// Generate the [`Command`] accessors for the capabilities a descriptor
/// implements. Use inside `impl Command for ...`.
///
/// Names: `docs`, `aliases`, `flags`, `args`, `client`, `confirm`,
/// `confirm_with_value`, `sub_commands`, `logger`, `config`,
/// `feature_flag`, `hidden`, `deprecated`, `no_headers`, `execute`.
#[macro_export]
macro_rules! capabilities {
    ($($cap:ident),* $(,)?) => {
        $($crate::capabilities!(@one $cap);)*
    };
    (@one docs) => {
        fn as_docs(&self) -> ::std::option::Option<&dyn $crate::command::HasDocs> {
            ::std::option::Option::Some(self)
        }
    };
    (@one aliases) => {
        fn as_aliases(&self) -> ::std::option::Option<&dyn $crate::command::HasAliases> {
            ::std::option::Option::Some(self)
        }
    };
    (@one flags) => {
        fn as_flags(&mut self) -> ::std::option::Option<&mut dyn $crate::command::HasFlags> {
            ::std::option::Option::Some(self)
        }
    };
    (@one args) => {
        fn as_args(&mut self) -> ::std::option::Option<&mut dyn $crate::command::HasArgs> {
            ::std::option::Option::Some(self)
        }
    };
    (@one client) => {
        fn as_client(&mut self) -> ::std::option::Option<&mut dyn $crate::command::HasClient> {
            ::std::option::Option::Some(self)
        }
    };
    (@one confirm) => {
        fn as_confirm(&self) -> ::std::option::Option<&dyn $crate::command::HasConfirm> {
            ::std::option::Option::Some(self)
        }
    };
    (@one confirm_with_value) => {
        fn as_confirm_with_value(
            &self,
        ) -> ::std::option::Option<&dyn $crate::command::HasConfirmWithValue> {
            ::std::option::Option::Some(self)
        }
    };
    (@one sub_commands) => {
        fn as_sub_commands(&self) -> ::std::option::Option<&dyn $crate::command::HasSubCommands> {
            ::std::option::Option::Some(self)
        }
    };
    (@one logger) => {
        fn as_logger(&mut self) -> ::std::option::Option<&mut dyn $crate::command::HasLogger> {
            ::std::option::Option::Some(self)
        }
    };
    (@one config) => {
        fn as_config(&mut self) -> ::std::option::Option<&mut dyn $crate::command::HasConfig> {
            ::std::option::Option::Some(self)
        }
    };
    (@one feature_flag) => {
        fn as_feature_flag(&self) -> ::std::option::Option<&dyn $crate::command::HasFeatureFlag> {
            ::std::option::Option::Some(self)
        }
    };
    (@one hidden) => {
        fn as_hidden(&self) -> ::std::option::Option<&dyn $crate::command::HasHidden> {
            ::std::option::Option::Some(self)
        }
    };
    (@one deprecated) => {
        fn as_deprecated(&self) -> ::std::option::Option<&dyn $crate::command::HasDeprecated> {
            ::std::option::Option::Some(self)
        }
    };
    (@one no_headers) => {
        fn as_no_headers(
            &mut self,
        ) -> ::std::option::Option<&mut dyn $crate::command::HasNoHeaders> {
            ::std::option::Option::Some(self)
        }
    };
    (@one execute) => {
        fn as_execute(&mut self) -> ::std::option::Option<&mut dyn $crate::command::HasExecute> {
            ::std::option::Option::Some(self)
        }
    };
}
