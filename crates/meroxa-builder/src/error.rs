//! Errors surfaced by assembled commands.

use meroxa_client::ApiError;
use meroxa_config::ConfigError;
use thiserror::Error;

/// Error returned by any pre-step, the execute step or a post-step.
///
/// The first error stops the invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Positional arguments were missing or malformed.
    #[error("{0}")]
    Args(String),

    /// The account lacks the feature flag a command is gated on. The
    /// message is the command's own fallback text.
    #[error("{0}")]
    Entitlement(String),

    /// The user typed something other than the expected confirmation.
    #[error("action aborted")]
    Aborted,

    /// The invocation was cancelled, usually by Ctrl-C.
    #[error("command cancelled")]
    Cancelled,

    /// A flag value could not be converted to its field type.
    #[error("invalid value {value:?} for flag --{flag}: {reason}")]
    InvalidFlag {
        /// Long name of the flag.
        flag: String,
        /// Raw value given.
        value: String,
        /// Why conversion failed.
        reason: String,
    },

    /// A required flag was not given on the command line.
    #[error("required flag(s) \"{0}\" not set")]
    MissingFlag(String),

    /// Reading or writing the persisted config failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The platform API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Terminal IO failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Argument parsing failed, or help/version output was requested.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// Any other execution failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    /// `requires <what>`, the conventional missing-argument error.
    pub fn requires(what: impl std::fmt::Display) -> Self {
        Self::Args(format!("requires {what}"))
    }

    /// An entitlement failure carrying `message` verbatim.
    pub fn entitlement(message: impl Into<String>) -> Self {
        Self::Entitlement(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_formats_message() {
        assert_eq!(
            CommandError::requires("resource name").to_string(),
            "requires resource name"
        );
    }

    #[test]
    fn aborted_message() {
        assert_eq!(CommandError::Aborted.to_string(), "action aborted");
    }

    #[test]
    fn entitlement_is_verbatim() {
        let err = CommandError::entitlement("no access to the Meroxa self-hosted environments feature");
        assert_eq!(
            err.to_string(),
            "no access to the Meroxa self-hosted environments feature"
        );
    }

    #[test]
    fn missing_flag_names_the_flag() {
        assert_eq!(
            CommandError::MissingFlag("token".into()).to_string(),
            "required flag(s) \"token\" not set"
        );
    }

    #[test]
    fn api_errors_convert() {
        let err: CommandError = ApiError::not_found("could not find resource \"pg\"").into();
        assert_eq!(err.to_string(), "could not find resource \"pg\"");
    }
}
