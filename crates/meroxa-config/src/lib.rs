//! Persisted configuration for the Meroxa CLI.
//!
//! A flat key-value store serialized as a JSON object. Keys are
//! case-insensitive and always stored upper-cased, so `access_token` and
//! `ACCESS_TOKEN` address the same entry.

#![forbid(unsafe_code)]

mod error;

pub use error::ConfigError;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

/// API access token.
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
/// API refresh token.
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
/// Email of the logged-in user.
pub const ACTOR: &str = "ACTOR";
/// UUID of the logged-in user.
pub const ACTOR_UUID: &str = "ACTOR_UUID";
/// Whitespace-separated feature flags the account is entitled to.
pub const USER_FEATURE_FLAGS: &str = "USER_FEATURE_FLAGS";
/// Account the API client acts on.
pub const USER_ACCOUNT_UUID: &str = "USER_ACCOUNT_UUID";
/// Opt-out for the periodic update notice.
pub const DISABLE_NOTIFICATIONS_UPDATE: &str = "DISABLE_NOTIFICATIONS_UPDATE";
/// Last time the update notice checked for a newer release.
pub const LATEST_CLI_VERSION_UPDATED_AT: &str = "LATEST_CLI_VERSION_UPDATED_AT";

/// Config shared between the runtime and the command that asked for it.
pub type SharedConfig = Arc<RwLock<Config>>;

/// Key-value config, optionally backed by a file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    path: Option<PathBuf>,
    values: BTreeMap<String, Value>,
}

impl Config {
    /// Load the config at `path`. A missing file is an empty config that
    /// will be created on the first [`Config::write`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => {
                let parsed: BTreeMap<String, Value> =
                    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                parsed
                    .into_iter()
                    .map(|(k, v)| (normalize(&k), v))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        debug!(path = %path.display(), keys = values.len(), "loaded config");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// An empty config with no backing file; [`Config::write`] is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Wrap this config for sharing.
    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&normalize(key))
    }

    /// Value under `key` rendered as a string. Non-string scalars are
    /// formatted; null and missing keys yield `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Value under `key` as a bool. Accepts JSON booleans and the string
    /// forms understood by [`parse_bool`]; anything else is `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => parse_bool(s).unwrap_or(false),
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            _ => false,
        }
    }

    /// RFC 3339 timestamp stored under `key`.
    pub fn get_time(&self, key: &str) -> Result<Option<DateTime<Utc>>, ConfigError> {
        let Some(raw) = self.get_string(key) else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|source| ConfigError::Time {
                key: normalize(key),
                source,
            })
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(normalize(key), value.into());
    }

    /// Store `at` under `key` in RFC 3339 form.
    pub fn set_time(&mut self, key: &str, at: DateTime<Utc>) {
        self.set(key, at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(&normalize(key))
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Config value for the first of `keys` that is set, falling back to
    /// the environment variable of the same name, then to `default`.
    pub fn lookup(&self, keys: &[&str], default: &str) -> String {
        for key in keys {
            if let Some(v) = self.get_string(key).filter(|v| !v.is_empty()) {
                return v;
            }
            if let Ok(v) = std::env::var(normalize(key)) {
                if !v.is_empty() {
                    return v;
                }
            }
        }
        default.to_string()
    }

    /// Flush to the backing file, creating its parent directory.
    pub fn write(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(&self.values).map_err(|e| write_err(e.into()))?;
        std::fs::write(path, body + "\n").map_err(write_err)?;
        debug!(path = %path.display(), "wrote config");
        Ok(())
    }
}

/// Parse a boolean the way command-line flags and env vars spell them:
/// `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}
