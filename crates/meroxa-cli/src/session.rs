//! Building the [`Session`] the command tree runs in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use meroxa_builder::{ClientFactory, CommandError, Logger, Session, SharedConfig};
use meroxa_client::{ClientOptions, HttpClient, PlatformClient, DEFAULT_API_URL};
use meroxa_config::{Config, ACCESS_TOKEN, USER_ACCOUNT_UUID};
use tracing::debug;

use crate::commands::GlobalFlags;
use crate::update::{current_tag, GithubTags};

/// Config key holding the API root.
pub const API_URL: &str = "API_URL";

/// `<user config dir>/meroxa/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("meroxa").join("config.json"))
}

/// The config file named by `--cli-config-file`, or the default location.
pub fn config_path(flag: &str) -> Option<PathBuf> {
    if flag.is_empty() {
        default_config_path()
    } else {
        Some(PathBuf::from(flag))
    }
}

/// Load the config at `path`, or an unsaved one when there is no location.
pub fn load_config(path: Option<PathBuf>) -> Result<SharedConfig, CommandError> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Config::load(path)?
        }
        None => Config::in_memory(),
    };
    Ok(config.shared())
}

/// Builds [`HttpClient`]s from the config and environment.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    api_url: Option<String>,
    timeout: Duration,
}

impl HttpClientFactory {
    /// `api_url` overrides the configured API root when non-empty.
    pub fn new(api_url: &str, timeout: Duration) -> Self {
        Self {
            api_url: Some(api_url.to_string()).filter(|u| !u.is_empty()),
            timeout,
        }
    }

    /// Options for a client acting with the credentials in `config`.
    pub fn options(&self, config: &Config) -> ClientOptions {
        let base_url = self
            .api_url
            .clone()
            .unwrap_or_else(|| config.lookup(&[API_URL, "MEROXA_API_URL"], DEFAULT_API_URL));
        let token = config.lookup(&[ACCESS_TOKEN, "MEROXA_ACCESS_TOKEN"], "");
        let account = config.lookup(&[USER_ACCOUNT_UUID, "MEROXA_ACCOUNT_UUID"], "");
        ClientOptions {
            base_url,
            access_token: Some(token).filter(|t| !t.is_empty()),
            account_uuid: Some(account).filter(|a| !a.is_empty()),
            timeout: self.timeout,
            ..ClientOptions::default()
        }
    }
}

impl ClientFactory for HttpClientFactory {
    fn new_client(&self, config: Option<&Config>) -> Result<Arc<dyn PlatformClient>, CommandError> {
        let empty = Config::in_memory();
        let opts = self.options(config.unwrap_or(&empty));
        debug!(base_url = %opts.base_url, "building API client");
        Ok(Arc::new(HttpClient::new(opts)?))
    }
}

/// The session for a run with `globals`: terminal logger, persisted config,
/// HTTP client and the GitHub release check.
pub fn build_session(globals: &GlobalFlags) -> Result<Session, CommandError> {
    let logger = Logger::stdout(globals.json, globals.debug);
    let config = load_config(config_path(&globals.cli_config_file))?;
    Ok(Session::new(logger)
        .with_config(config)
        .with_client_factory(HttpClientFactory::new(&globals.api_url, globals.timeout))
        .with_version_source(current_tag(), GithubTags::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meroxa_client::ApiError;

    #[test]
    fn explicit_config_path_wins() {
        assert_eq!(config_path("/tmp/m.json"), Some(PathBuf::from("/tmp/m.json")));
        assert_eq!(config_path(""), default_config_path());
    }

    #[test]
    fn options_read_credentials_from_config() {
        let mut config = Config::in_memory();
        config.set(ACCESS_TOKEN, "tok");
        config.set(USER_ACCOUNT_UUID, "acct");
        config.set(API_URL, "https://api.example.test");

        let opts = HttpClientFactory::new("", Duration::from_secs(3)).options(&config);

        assert_eq!(opts.base_url, "https://api.example.test");
        assert_eq!(opts.access_token.as_deref(), Some("tok"));
        assert_eq!(opts.account_uuid.as_deref(), Some("acct"));
        assert_eq!(opts.timeout, Duration::from_secs(3));
    }

    #[test]
    fn api_url_flag_overrides_config() {
        let mut config = Config::in_memory();
        config.set(API_URL, "https://api.example.test");

        let opts = HttpClientFactory::new("http://localhost:8080", Duration::from_secs(1))
            .options(&config);

        assert_eq!(opts.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_without_token_is_unauthenticated() {
        // A token exported in the test environment would satisfy the lookup.
        if std::env::var_os(ACCESS_TOKEN).is_some() || std::env::var_os("MEROXA_ACCESS_TOKEN").is_some() {
            return;
        }
        let factory = HttpClientFactory::new("", Duration::from_secs(1));
        let err = factory
            .new_client(Some(&Config::in_memory()))
            .err()
            .expect("no token");
        assert!(matches!(err, CommandError::Api(ApiError::Unauthenticated)));
    }

    #[test]
    fn missing_config_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(Some(dir.path().join("config.json"))).expect("loads");
        assert_eq!(config.read().keys().count(), 0);
    }
}
