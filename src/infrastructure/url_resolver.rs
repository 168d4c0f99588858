//! Short-link expansion
//!
//! Listing sheets often carry share links (`https://s.openrice.com/...`)
//! that redirect to the real listing. Only configured short-link hosts are
//! probed; every other URL passes through untouched.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, redirect::Policy};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::infrastructure::config::{FetchConfig, ResolverConfig};
use crate::infrastructure::politeness::Politeness;

/// Turns a listing reference into the URL that should be fetched
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Never fails: on any problem the input is returned as-is
    async fn resolve(&self, url: &str) -> String;
}

pub struct UrlResolver {
    client: Client,
    short_link_hosts: Vec<String>,
    politeness: Arc<Politeness>,
}

impl UrlResolver {
    pub fn new(config: &ResolverConfig, fetch: &FetchConfig, politeness: Arc<Politeness>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.probe_timeout())
            .user_agent(&fetch.user_agent)
            .cookie_store(true)
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .context("Failed to create resolver HTTP client")?;

        Ok(Self {
            client,
            short_link_hosts: config
                .short_link_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
            politeness,
        })
    }

    /// Whether `url` points at one of the configured short-link hosts
    pub fn is_short_link(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| self.short_link_hosts.iter().any(|h| host.eq_ignore_ascii_case(h)))
    }

    /// Follow redirects with HEAD, falling back to GET without reading the body
    async fn final_location(&self, url: &str) -> Result<Url> {
        self.politeness.wait().await;
        match self.client.head(url).send().await {
            Ok(response) => return Ok(response.url().clone()),
            Err(e) => debug!("HEAD probe failed for {}: {}; retrying with GET", url, e),
        }

        self.politeness.wait().await;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET probe failed for {url}"))?;
        let final_url = response.url().clone();
        drop(response);
        Ok(final_url)
    }
}

/// Drop query and fragment
pub fn canonicalize(mut url: Url) -> String {
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}

#[async_trait]
impl LinkResolver for UrlResolver {
    async fn resolve(&self, url: &str) -> String {
        let Ok(parsed) = Url::parse(url) else {
            return url.to_string();
        };
        if !self.is_short_link(&parsed) {
            return url.to_string();
        }

        match self.final_location(url).await {
            Ok(final_url) => {
                let resolved = canonicalize(final_url);
                if resolved != url {
                    info!("🔗 Short link resolved: {} -> {}", url, resolved);
                }
                resolved
            }
            Err(e) => {
                warn!("⚠️ Short link resolution failed, using original URL: {:#}", e);
                url.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::HEAD;
    use httpmock::prelude::*;

    fn resolver_for(hosts: &[&str]) -> UrlResolver {
        let config = ResolverConfig {
            short_link_hosts: hosts.iter().map(|h| (*h).to_string()).collect(),
            probe_timeout_seconds: 2,
            ..ResolverConfig::default()
        };
        UrlResolver::new(&config, &FetchConfig::default(), Politeness::disabled()).unwrap()
    }

    #[tokio::test]
    async fn non_short_links_pass_through_unchanged() {
        let resolver = resolver_for(&["s.openrice.com"]);
        let url = "https://www.openrice.com/zh/hongkong/r-abc?x=1#top";
        assert_eq!(resolver.resolve(url).await, url);
    }

    #[tokio::test]
    async fn unparseable_input_is_returned() {
        let resolver = resolver_for(&["s.openrice.com"]);
        assert_eq!(resolver.resolve("not a url").await, "not a url");
    }

    #[tokio::test]
    async fn short_link_follows_redirect_and_drops_query() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/abc");
            then.status(302).header("Location", "/target?x=1");
        });
        server.mock(|when, then| {
            when.path("/target");
            then.status(200).body("ok");
        });

        let resolver = resolver_for(&["127.0.0.1"]);
        let resolved = resolver.resolve(&server.url("/abc")).await;
        assert_eq!(resolved, server.url("/target"));
    }

    #[tokio::test]
    async fn head_failure_falls_back_to_get() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/abc");
            then.status(200).delay(std::time::Duration::from_secs(5));
        });
        server.mock(|when, then| {
            when.method(GET).path("/abc");
            then.status(302).header("Location", "/via-get");
        });
        server.mock(|when, then| {
            when.path("/via-get");
            then.status(200);
        });

        let resolver = resolver_for(&["127.0.0.1"]);
        assert_eq!(resolver.resolve(&server.url("/abc")).await, server.url("/via-get"));
    }

    #[tokio::test]
    async fn unreachable_short_link_returns_input() {
        let resolver = resolver_for(&["127.0.0.1"]);
        let url = "http://127.0.0.1:1/abc";
        assert_eq!(resolver.resolve(url).await, url);
    }

    #[test]
    fn short_link_hosts_ignore_case() {
        let resolver = resolver_for(&["S.OpenRice.com"]);
        assert!(resolver.is_short_link(&Url::parse("https://s.openrice.com/x").unwrap()));
        assert!(!resolver.is_short_link(&Url::parse("https://www.openrice.com/x").unwrap()));
    }
}
