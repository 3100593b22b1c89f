//! Config store errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, reading, or flushing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("could not read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not a JSON object.
    #[error("could not parse config file {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The config file could not be written back.
    #[error("could not write config file {path}: {source}")]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A stored timestamp is not RFC 3339.
    #[error("invalid timestamp stored under {key}: {source}")]
    Time {
        /// Key holding the value.
        key: String,
        /// Underlying parse error.
        source: chrono::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_the_file() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/meroxa.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "could not read config file /tmp/meroxa.json: denied"
        );
    }
}
