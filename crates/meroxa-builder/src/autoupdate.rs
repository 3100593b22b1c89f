//! Weekly "new version available" notice.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, TimeDelta, Utc};
use meroxa_config::{Config, DISABLE_NOTIFICATIONS_UPDATE, LATEST_CLI_VERSION_UPDATED_AT};
use tracing::{debug, warn};

use crate::context::Context;
use crate::session::Session;

/// Future returned by [`VersionSource::latest_version`].
pub type VersionFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

/// Where to find the newest released version.
pub trait VersionSource: Send + Sync {
    /// Latest released tag, e.g. `v2.1.0`.
    fn latest_version(&self) -> VersionFuture<'_>;
}

/// Minimum time between two checks.
pub fn check_interval() -> TimeDelta {
    TimeDelta::hours(24 * 7)
}

/// Whether a newer release should be looked up now.
///
/// Never without config or when the user disabled the notice; always when
/// no check was recorded; otherwise only once more than a week has passed.
pub fn should_check_for_newer_version(config: Option<&Config>, now: DateTime<Utc>) -> bool {
    let Some(config) = config else {
        return false;
    };
    if config.get_bool(DISABLE_NOTIFICATIONS_UPDATE) {
        return false;
    }
    match config.get_time(LATEST_CLI_VERSION_UPDATED_AT) {
        Ok(Some(last)) => now - last > check_interval(),
        Ok(None) => true,
        Err(e) => {
            debug!(error = %e, "ignoring unreadable update timestamp");
            true
        }
    }
}

/// Print the upgrade notice when a check is due and a newer release exists,
/// then record the check. Failures are logged and never fail the command.
pub async fn notify_if_due(session: &Session, ctx: &Context) {
    let (Some((current, source)), Some(config)) = (session.version_source(), session.config())
    else {
        return;
    };
    if !should_check_for_newer_version(Some(&*config.read()), Utc::now()) {
        return;
    }

    let fetched = tokio::select! {
        biased;
        () = ctx.cancelled() => return,
        res = tokio::time::timeout(ctx.timeout(), source.latest_version()) => res,
    };
    let latest = match fetched {
        Ok(Ok(latest)) => latest,
        Ok(Err(e)) => {
            debug!(error = %e, "could not look up latest CLI version");
            return;
        }
        Err(_) => {
            debug!("timed out looking up latest CLI version");
            return;
        }
    };

    if is_newer(current, &latest) {
        session.logger().info(format!(
            "\nA new version of the Meroxa CLI is available: {latest} (current: {current}).\n\
             See https://docs.meroxa.com/cli/installation for upgrade instructions."
        ));
    }

    let mut config = config.write();
    config.set_time(LATEST_CLI_VERSION_UPDATED_AT, Utc::now());
    if let Err(e) = config.write() {
        warn!(error = %e, "could not record update check");
    }
}

/// Whether `latest` is a higher release than `current`. Versions that do not
/// parse, such as development builds, never trigger the notice.
fn is_newer(current: &str, latest: &str) -> bool {
    match (parse_version(current), parse_version(latest)) {
        (Some(current), Some(latest)) => latest > current,
        _ => false,
    }
}

fn parse_version(raw: &str) -> Option<Vec<u64>> {
    let trimmed = raw.trim().trim_start_matches('v');
    let release = trimmed.split(['-', '+']).next()?;
    release.split('.').map(|part| part.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn checked_at(at: DateTime<Utc>) -> Config {
        let mut config = Config::in_memory();
        config.set_time(LATEST_CLI_VERSION_UPDATED_AT, at);
        config
    }

    #[test]
    fn no_config_never_checks() {
        assert!(!should_check_for_newer_version(None, Utc::now()));
    }

    #[test]
    fn disabled_never_checks() {
        let now = Utc::now();
        let mut config = checked_at(now - TimeDelta::days(30));
        config.set(DISABLE_NOTIFICATIONS_UPDATE, "true");
        assert!(!should_check_for_newer_version(Some(&config), now));
    }

    #[test]
    fn never_checked_checks() {
        assert!(should_check_for_newer_version(Some(&Config::in_memory()), Utc::now()));
    }

    #[test]
    fn just_under_a_week_does_not_check() {
        let now = Utc::now();
        let config = checked_at(now - TimeDelta::days(7) + TimeDelta::minutes(1));
        assert!(!should_check_for_newer_version(Some(&config), now));
    }

    #[test]
    fn just_over_a_week_checks() {
        let now = Utc::now();
        let config = checked_at(now - TimeDelta::days(7) - TimeDelta::minutes(1));
        assert!(should_check_for_newer_version(Some(&config), now));
    }

    #[test]
    fn exactly_a_week_does_not_check() {
        let now = Utc::now();
        let last = now - check_interval();
        let mut config = Config::in_memory();
        config.set(LATEST_CLI_VERSION_UPDATED_AT, last.to_rfc3339());
        assert!(!should_check_for_newer_version(Some(&config), now));
    }

    #[test]
    fn unreadable_timestamp_checks() {
        let mut config = Config::in_memory();
        config.set(LATEST_CLI_VERSION_UPDATED_AT, "last tuesday");
        assert!(should_check_for_newer_version(Some(&config), Utc::now()));
    }

    #[test_case("v2.0.0", "v2.1.0", true)]
    #[test_case("2.0.0", "v2.0.1", true)]
    #[test_case("v2.1.0", "v2.1.0", false)]
    #[test_case("v2.10.0", "v2.9.0", false)]
    #[test_case("v2.0.0-rc1", "v2.0.0", false)]
    #[test_case("dev", "v2.1.0", false)]
    #[test_case("v2.0.0", "nightly", false)]
    fn version_ordering(current: &str, latest: &str, newer: bool) {
        assert_eq!(is_newer(current, latest), newer);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn checks_iff_more_than_a_week_elapsed(elapsed_secs in 0i64..(30 * 24 * 3600)) {
                let now = Utc::now();
                let config = checked_at(now - TimeDelta::seconds(elapsed_secs));
                // Stored timestamps drop sub-second precision, which can only
                // lengthen the elapsed time by under a second.
                let stored = config
                    .get_time(LATEST_CLI_VERSION_UPDATED_AT)
                    .expect("valid")
                    .expect("present");
                let want = now - stored > check_interval();
                prop_assert_eq!(should_check_for_newer_version(Some(&config), now), want);
            }

            #[test]
            fn disabled_wins_regardless_of_elapsed(elapsed_secs in 0i64..(365 * 24 * 3600)) {
                let now = Utc::now();
                let mut config = checked_at(now - TimeDelta::seconds(elapsed_secs));
                config.set(DISABLE_NOTIFICATIONS_UPDATE, true);
                prop_assert!(!should_check_for_newer_version(Some(&config), now));
            }
        }
    }
}
