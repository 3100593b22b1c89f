//! Process-wide services handed to every invocation.

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use meroxa_client::PlatformClient;
use meroxa_config::{Config, SharedConfig};
use parking_lot::Mutex;

use crate::autoupdate::VersionSource;
use crate::error::CommandError;
use crate::feature_flag::Entitlements;
use crate::log::Logger;
use crate::prompt::Prompt;

/// Builds the API client right before a command needs it.
pub trait ClientFactory: Send + Sync {
    /// A client for the current config.
    fn new_client(&self, config: Option<&Config>) -> Result<Arc<dyn PlatformClient>, CommandError>;
}

/// Hands out the same client every time.
struct FixedClient(Arc<dyn PlatformClient>);

impl ClientFactory for FixedClient {
    fn new_client(&self, _config: Option<&Config>) -> Result<Arc<dyn PlatformClient>, CommandError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Logger, config, prompt, client factory and update source for one process.
pub struct Session {
    logger: Logger,
    config: Option<SharedConfig>,
    prompt: Mutex<Prompt>,
    client_factory: Option<Box<dyn ClientFactory>>,
    version: Option<(String, Arc<dyn VersionSource>)>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("logger", &self.logger)
            .field("config", &self.config.as_ref().map(|c| c.read().path().map(ToOwned::to_owned)))
            .field("client_factory", &self.client_factory.is_some())
            .field("version", &self.version.as_ref().map(|(v, _)| v))
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session with no config, no client and a stdio prompt.
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            config: None,
            prompt: Mutex::new(Prompt::stdio()),
            client_factory: None,
            version: None,
        }
    }

    /// Use `config` as the persisted config.
    #[must_use]
    pub fn with_config(mut self, config: SharedConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Read confirmations from `prompt`.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Mutex::new(prompt);
        self
    }

    /// Build clients with `factory`.
    #[must_use]
    pub fn with_client_factory(mut self, factory: impl ClientFactory + 'static) -> Self {
        self.client_factory = Some(Box::new(factory));
        self
    }

    /// Always hand out `client`.
    #[must_use]
    pub fn with_client(self, client: Arc<dyn PlatformClient>) -> Self {
        self.with_client_factory(FixedClient(client))
    }

    /// Enable the update notice for the running `current` version.
    #[must_use]
    pub fn with_version_source(
        mut self,
        current: impl Into<String>,
        source: impl VersionSource + 'static,
    ) -> Self {
        self.version = Some((current.into(), Arc::new(source)));
        self
    }

    /// Output handle.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Persisted config, if one was loaded.
    pub fn config(&self) -> Option<&SharedConfig> {
        self.config.as_ref()
    }

    /// Running version and where to look for newer ones.
    pub fn version_source(&self) -> Option<(&str, &dyn VersionSource)> {
        self.version
            .as_ref()
            .map(|(current, source)| (current.as_str(), source.as_ref()))
    }

    /// A fresh API client.
    pub fn new_client(&self) -> Result<Arc<dyn PlatformClient>, CommandError> {
        let factory = self
            .client_factory
            .as_ref()
            .ok_or_else(|| anyhow!("no API client configured"))?;
        match &self.config {
            Some(config) => factory.new_client(Some(&*config.read())),
            None => factory.new_client(None),
        }
    }

    /// Ask the user to type `want`.
    pub fn confirm(&self, want: &str) -> Result<(), CommandError> {
        self.prompt.lock().confirm(want)
    }
}

impl Entitlements for Session {
    fn has_feature(&self, flag: &str) -> bool {
        self.config
            .as_ref()
            .is_some_and(|config| config.read().has_feature(flag))
    }
}
