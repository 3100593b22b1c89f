//! API client errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`crate::PlatformClient`] implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("{0}")]
    Response(ErrorResponse),

    /// No access token is configured.
    #[error("you must be logged in to run this command, run `meroxa login`")]
    Unauthenticated,

    /// The configured API URL is unusable.
    #[error("invalid API url {url:?}: {reason}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A credential could not be sent as an HTTP header.
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// Connection, TLS, timeout or decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Build an error from a failed response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let mut parsed = serde_json::from_str::<ErrorResponse>(body).unwrap_or_default();
        if parsed.message.is_empty() {
            parsed.message = match body.trim() {
                "" => format!("unexpected status {status}"),
                text => text.to_string(),
            };
        }
        parsed.status = status;
        Self::Response(parsed)
    }

    /// A 404 response with a message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Response(ErrorResponse {
            status: 404,
            code: "not_found".into(),
            message: message.into(),
            details: BTreeMap::new(),
        })
    }

    /// Whether the API reported the entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Response(r) if r.status == 404)
    }
}

/// Error body returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status.
    #[serde(skip)]
    pub status: u16,
    /// Machine-readable code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Per-field validation problems.
    #[serde(default, alias = "data")]
    pub details: BTreeMap<String, Vec<String>>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let problems: Vec<(&String, &String)> = self
            .details
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| (field, m)))
            .collect();
        if problems.is_empty() {
            return Ok(());
        }
        let noun = if problems.len() == 1 { "problem" } else { "problems" };
        write!(f, ". {} {noun} occurred:", problems.len())?;
        for (i, (field, msg)) in problems.iter().enumerate() {
            write!(f, "\n{}. {field}: \"{msg}\"", i + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn body_message_is_used() {
        let err = ApiError::from_body(400, r#"{"code":"bad","message":"name is taken"}"#);
        assert_eq!(err.to_string(), "name is taken");
        assert!(!err.is_not_found());
    }

    #[test]
    fn details_are_enumerated() {
        let body = r#"{"message":"validation failed","details":{"name":["too long","has spaces"]}}"#;
        let err = ApiError::from_body(422, body);
        assert_eq!(
            err.to_string(),
            "validation failed. 2 problems occurred:\n1. name: \"too long\"\n2. name: \"has spaces\""
        );
    }

    #[test_case("", "unexpected status 502" ; "empty body")]
    #[test_case("bad gateway\n", "bad gateway" ; "plain text body")]
    fn non_json_bodies_fall_back(body: &str, want: &str) {
        assert_eq!(ApiError::from_body(502, body).to_string(), want);
    }

    #[test]
    fn not_found_is_detected() {
        let err = ApiError::from_body(404, r#"{"message":"could not find resource"}"#);
        assert!(err.is_not_found());
        assert!(ApiError::not_found("gone").is_not_found());
    }
}
