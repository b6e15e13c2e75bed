use super::types::NormalizedUrl;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static SHARE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[a-z0-9-]+\.)*facebook\.com/share/[a-z]/").unwrap()
});

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Redirect ended at an unusable URL: {0}")]
    Unusable(String),
}

/// Turns share links into the URL they land on.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Whether `url` is a share link that needs a network hop.
    fn applies(&self, url: &NormalizedUrl) -> bool;

    /// Resolve a share link. Never fails: on any error the input comes back.
    async fn resolve(&self, url: NormalizedUrl) -> NormalizedUrl;
}

pub struct RedirectResolver {
    client: Client,
}

impl RedirectResolver {
    pub fn new(timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// HEAD the URL, following redirects, and return where it ends up.
    pub async fn follow_redirects(&self, url: &NormalizedUrl) -> Result<NormalizedUrl, ResolveError> {
        let response = self.client.head(url.as_str()).send().await?;
        let landed = response.url().clone();
        NormalizedUrl::from_url(landed.clone()).ok_or_else(|| ResolveError::Unusable(landed.to_string()))
    }

    /// Like `follow_redirects`, but any failure or timeout yields `url` itself.
    pub async fn follow_or_keep(&self, url: NormalizedUrl) -> NormalizedUrl {
        match self.follow_redirects(&url).await {
            Ok(resolved) => {
                tracing::info!(from = %url, to = %resolved, "resolved share link");
                resolved
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "share link resolution failed, keeping original");
                url
            }
        }
    }
}

#[async_trait]
impl LinkResolver for RedirectResolver {
    fn applies(&self, url: &NormalizedUrl) -> bool {
        SHARE_LINK_REGEX.is_match(url.as_str())
    }

    async fn resolve(&self, url: NormalizedUrl) -> NormalizedUrl {
        if !self.applies(&url) {
            return url;
        }
        self.follow_or_keep(url).await
    }
}
