//! API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User UUID.
    pub uuid: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Primary email.
    pub email: String,
    /// First name.
    #[serde(default)]
    pub given_name: String,
    /// Last name.
    #[serde(default)]
    pub family_name: String,
    /// Whether the email was confirmed.
    #[serde(default)]
    pub email_verified: bool,
    /// Feature flags enabled for the user.
    #[serde(default)]
    pub features: Vec<String>,
}

/// An account (tenant) the user can act on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account UUID.
    pub uuid: String,
    /// Display name.
    pub name: String,
}

/// Lifecycle state reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Machine-readable state, e.g. `ready`.
    pub state: String,
    /// Human-readable detail, usually set on failure.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

/// Reference to another entity by UUID and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdentifier {
    /// Entity UUID.
    #[serde(default)]
    pub uuid: String,
    /// Entity name.
    #[serde(default)]
    pub name: String,
}

/// A data resource (database, queue, ...) registered with the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Numeric id.
    pub id: i64,
    /// Resource UUID.
    pub uuid: String,
    /// Unique name within the account.
    pub name: String,
    /// Resource type, e.g. `postgres`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Connection URL with credentials stripped.
    #[serde(default)]
    pub url: String,
    /// Current state.
    #[serde(default)]
    pub status: Status,
    /// Environment hosting the resource; `None` means the common environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EntityIdentifier>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A self-hosted or private environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment UUID.
    pub uuid: String,
    /// Unique name within the account.
    pub name: String,
    /// `self_hosted`, `private` or `common`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Cloud provider, e.g. `aws`.
    #[serde(default)]
    pub provider: String,
    /// Provider region.
    #[serde(default)]
    pub region: String,
    /// Current state.
    #[serde(default)]
    pub status: Status,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_decodes_type_field() {
        let raw = r#"{
            "id": 7,
            "uuid": "b0c5",
            "name": "pg",
            "type": "postgres",
            "status": {"state": "ready"},
            "environment": {"uuid": "e1", "name": "my-env"}
        }"#;
        let res: Resource = serde_json::from_str(raw).expect("decode");
        assert_eq!(res.kind, "postgres");
        assert_eq!(res.status.state, "ready");
        assert_eq!(res.environment.map(|e| e.name).as_deref(), Some("my-env"));
        assert!(res.url.is_empty());
    }

    #[test]
    fn status_skips_empty_details() {
        let status = Status {
            state: "ready".into(),
            details: String::new(),
        };
        let json = serde_json::to_string(&status).expect("encode");
        assert_eq!(json, r#"{"state":"ready"}"#);
    }
}
