//! Entitlement gate for feature-flagged commands.

use meroxa_config::{Config, USER_FEATURE_FLAGS};
use tracing::debug;

use crate::command::HasFeatureFlag;
use crate::error::CommandError;

/// Source of the account's feature flags.
pub trait Entitlements {
    /// Whether the account has `flag`.
    fn has_feature(&self, flag: &str) -> bool;
}

impl Entitlements for Config {
    fn has_feature(&self, flag: &str) -> bool {
        self.get_string(USER_FEATURE_FLAGS)
            .is_some_and(|flags| flags.split_whitespace().any(|f| f == flag))
    }
}

/// Fail with `fallback` unless the account has `flag`.
pub fn check_gate(
    flag: &str,
    fallback: CommandError,
    entitlements: &dyn Entitlements,
) -> Result<(), CommandError> {
    if entitlements.has_feature(flag) {
        return Ok(());
    }
    debug!(flag, "feature flag not enabled");
    Err(fallback)
}

/// Fail with the command's fallback error unless the account has the flag
/// the command is gated on.
pub fn check_feature_flag(
    command: &dyn HasFeatureFlag,
    entitlements: &dyn Entitlements,
) -> Result<(), CommandError> {
    let (flag, fallback) = command.feature_flag();
    check_gate(&flag, fallback, entitlements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    struct Gated;

    impl HasFeatureFlag for Gated {
        fn feature_flag(&self) -> (String, CommandError) {
            (
                "environments".into(),
                CommandError::entitlement("no access to the Meroxa self-hosted environments feature"),
            )
        }
    }

    fn config_with(flags: Option<&str>) -> Config {
        let mut config = Config::in_memory();
        if let Some(flags) = flags {
            config.set(USER_FEATURE_FLAGS, flags);
        }
        config
    }

    #[test_case(Some("environments"), true ; "only flag")]
    #[test_case(Some("turbine environments flink"), true ; "among others")]
    #[test_case(Some("turbine"), false ; "other flags")]
    #[test_case(Some("environments-beta"), false ; "prefix is not a match")]
    #[test_case(Some(""), false ; "empty")]
    #[test_case(None, false ; "unset")]
    fn gate_follows_config(flags: Option<&str>, allowed: bool) {
        let result = check_feature_flag(&Gated, &config_with(flags));
        assert_eq!(result.is_ok(), allowed);
    }

    #[test]
    fn fallback_error_is_returned_verbatim() {
        let err = check_feature_flag(&Gated, &config_with(None)).expect_err("gated");
        assert!(matches!(err, CommandError::Entitlement(_)));
        assert_eq!(
            err.to_string(),
            "no access to the Meroxa self-hosted environments feature"
        );
    }
}
