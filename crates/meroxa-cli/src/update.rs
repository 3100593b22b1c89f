//! Latest release lookup for the update notice.

use anyhow::{anyhow, Context as _};
use meroxa_builder::{VersionFuture, VersionSource};
use serde::Deserialize;

/// Tags of the CLI repository, newest first.
pub const TAGS_URL: &str = "https://api.github.com/repos/meroxa/cli/tags";

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Reads the newest tag from the GitHub API.
#[derive(Debug, Clone)]
pub struct GithubTags {
    http: reqwest::Client,
    url: String,
}

impl GithubTags {
    /// Source reading from `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn fetch(&self) -> anyhow::Result<String> {
        let tags: Vec<Tag> = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .header(reqwest::header::USER_AGENT, "meroxa-cli")
            .send()
            .await
            .context("requesting release tags")?
            .error_for_status()?
            .json()
            .await
            .context("decoding release tags")?;
        tags.into_iter()
            .next()
            .map(|t| t.name)
            .ok_or_else(|| anyhow!("no release tags published"))
    }
}

impl Default for GithubTags {
    fn default() -> Self {
        Self::new(TAGS_URL)
    }
}

impl VersionSource for GithubTags {
    fn latest_version(&self) -> VersionFuture<'_> {
        Box::pin(self.fetch())
    }
}

/// Tag of this build, e.g. `v0.1.0`.
pub fn current_tag() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_decode_newest_first() {
        let raw = r#"[{"name":"v2.1.0","commit":{"sha":"abc"}},{"name":"v2.0.0"}]"#;
        let tags: Vec<Tag> = serde_json::from_str(raw).expect("decodes");
        assert_eq!(tags[0].name, "v2.1.0");
    }

    #[test]
    fn current_tag_has_v_prefix() {
        assert!(current_tag().starts_with('v'));
    }

    #[tokio::test]
    async fn unreachable_source_is_an_error() {
        let source = GithubTags::new("http://127.0.0.1:9/tags");
        assert!(source.latest_version().await.is_err());
    }
}
