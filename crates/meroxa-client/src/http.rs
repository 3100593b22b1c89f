//! HTTP implementation of [`PlatformClient`].

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{Account, ApiError, ClientFuture, Environment, PlatformClient, Resource, User};

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.meroxa.io";

const ACCOUNT_HEADER: &str = "Meroxa-Account-UUID";

/// Settings for [`HttpClient::new`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, e.g. [`DEFAULT_API_URL`].
    pub base_url: String,
    /// Bearer token; required.
    pub access_token: Option<String>,
    /// Account to act on; the API picks the user's default when unset.
    pub account_uuid: Option<String>,
    /// Sent as the `User-Agent` header.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            account_uuid: None,
            user_agent: format!("Meroxa CLI {}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Meroxa REST API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpClient {
    /// Build a client. Fails without an access token.
    pub fn new(opts: ClientOptions) -> Result<Self, ApiError> {
        let token = opts
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        let base = Url::parse(&opts.base_url).map_err(|e| ApiError::InvalidUrl {
            url: opts.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: opts.base_url,
                reason: "not a base URL".into(),
            });
        }

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
        headers.insert(AUTHORIZATION, bearer);
        if let Some(account) = opts.account_uuid.filter(|a| !a.is_empty()) {
            let value = HeaderValue::from_str(&account)
                .map_err(|_| ApiError::InvalidHeader(ACCOUNT_HEADER))?;
            headers.insert(ACCOUNT_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(opts.user_agent)
            .timeout(opts.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base })
    }

    /// Absolute URL for `segments` below the API root.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        decode(resp).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(segments);
        debug!(%url, "DELETE");
        let resp = self.http.delete(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_body(status.as_u16(), &body))
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::from_body(status.as_u16(), &body))
}

impl PlatformClient for HttpClient {
    fn get_user(&self) -> ClientFuture<'_, User> {
        Box::pin(self.get(&["v1", "users", "me"]))
    }

    fn list_accounts(&self) -> ClientFuture<'_, Vec<Account>> {
        Box::pin(self.get(&["v1", "accounts"]))
    }

    fn list_resources(&self) -> ClientFuture<'_, Vec<Resource>> {
        Box::pin(self.get(&["v1", "resources"]))
    }

    fn list_resource_types(&self) -> ClientFuture<'_, Vec<String>> {
        Box::pin(self.get(&["v1", "resource-types"]))
    }

    fn get_resource_by_name<'a>(&'a self, name: &'a str) -> ClientFuture<'a, Resource> {
        Box::pin(async move { self.get(&["v1", "resources", name]).await })
    }

    fn delete_resource<'a>(&'a self, name_or_id: &'a str) -> ClientFuture<'a, ()> {
        Box::pin(async move {
            self.delete(&["v1", "resources", name_or_id]).await?;
            Ok(())
        })
    }

    fn list_environments(&self) -> ClientFuture<'_, Vec<Environment>> {
        Box::pin(self.get(&["v1", "environments"]))
    }

    fn get_environment<'a>(&'a self, name_or_uuid: &'a str) -> ClientFuture<'a, Environment> {
        Box::pin(async move { self.get(&["v1", "environments", name_or_uuid]).await })
    }

    fn delete_environment<'a>(&'a self, name_or_uuid: &'a str) -> ClientFuture<'a, Environment> {
        Box::pin(async move {
            let resp = self.delete(&["v1", "environments", name_or_uuid]).await?;
            Ok(resp.json::<Environment>().await?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ClientOptions {
        ClientOptions {
            access_token: Some("token".into()),
            ..ClientOptions::default()
        }
    }

    #[test]
    fn missing_token_is_unauthenticated() {
        let err = HttpClient::new(ClientOptions::default()).expect_err("no token");
        assert!(matches!(err, ApiError::Unauthenticated));

        let err = HttpClient::new(ClientOptions {
            access_token: Some(String::new()),
            ..ClientOptions::default()
        })
        .expect_err("empty token");
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn bad_url_is_rejected() {
        let err = HttpClient::new(ClientOptions {
            base_url: "not a url".into(),
            ..options()
        })
        .expect_err("bad url");
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn endpoint_escapes_segments() {
        let client = HttpClient::new(options()).expect("client");
        assert_eq!(
            client.endpoint(&["v1", "resources", "my pg"]).as_str(),
            "https://api.meroxa.io/v1/resources/my%20pg"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = HttpClient::new(ClientOptions {
            base_url: "http://localhost:8080/api/".into(),
            ..options()
        })
        .expect("client");
        assert_eq!(
            client.endpoint(&["v1", "accounts"]).as_str(),
            "http://localhost:8080/api/v1/accounts"
        );
    }

    #[test]
    fn default_user_agent_names_the_cli() {
        assert!(ClientOptions::default().user_agent.starts_with("Meroxa CLI "));
    }
}
