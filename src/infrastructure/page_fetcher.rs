//! Page acquisition
//!
//! [`PageFetcher`] picks the script-executing backend when it could be
//! launched and falls back to the HTTP session per page when the browser
//! attempt fails. Every successful fetch is parsed and checked against the
//! minimum visible-text length for its [`PageKind`].

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "browser")]
use crate::infrastructure::browser_backend::BrowserBackend;
use crate::infrastructure::capabilities::CapabilityReport;
use crate::infrastructure::config::{AppConfig, FetchConfig};
use crate::infrastructure::content_decoder::ContentDecoder;
pub use crate::infrastructure::content_decoder::DecodePath;
use crate::infrastructure::fetch_error::{FetchError, FetchResult};
use crate::infrastructure::http_backend::HttpBackend;
use crate::infrastructure::parsing::ParsedDocument;
use crate::infrastructure::politeness::Politeness;

/// Which threshold a fetched page is validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageKind {
    Listing,
    SubPage,
}

/// How the markup was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FetchPath {
    Browser,
    Http,
    /// Browser attempt failed for this page; HTTP session used instead
    HttpAfterBrowserFailure { reason: String },
}

/// Backend chosen for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackendKind {
    Browser,
    Http,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => write!(f, "browser"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Parsed page plus how it was acquired.
///
/// Holds a `scraper::Html`, which is not `Send`: evaluate it before the next
/// `.await`.
#[derive(Debug)]
pub struct FetchedPage {
    pub document: ParsedDocument,
    pub path: FetchPath,
    pub decoding: DecodePath,
}

impl FetchedPage {
    /// Parse `markup` and reject it when its visible text is under `minimum`
    pub fn validated(
        url: &str,
        markup: &str,
        path: FetchPath,
        decoding: DecodePath,
        minimum: usize,
    ) -> FetchResult<Self> {
        let document = ParsedDocument::parse(url, markup);
        let length = document.text_len();
        if length < minimum {
            return Err(FetchError::too_short(url, length, minimum));
        }
        Ok(Self {
            document,
            path,
            decoding,
        })
    }
}

/// Anything that can hand back a parsed page for a URL
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str, kind: PageKind) -> FetchResult<FetchedPage>;
}

/// Script-executing backend that returns the rendered markup of a page.
///
/// An `Err` means navigation or readiness waiting failed; the fetcher then
/// retries that one page over HTTP.
#[async_trait]
pub trait RenderingBackend: Send + Sync {
    async fn fetch_markup(&self, url: &str) -> FetchResult<String>;

    /// Release whatever process backs the renderer
    async fn shutdown(&self) {}
}

pub struct PageFetcher {
    browser: Option<Box<dyn RenderingBackend>>,
    http: HttpBackend,
    min_listing_chars: usize,
    min_sub_page_chars: usize,
}

impl PageFetcher {
    /// Build both backends. A browser that fails to launch is logged and
    /// left out; the HTTP session is always available.
    pub async fn new(config: &AppConfig, capabilities: &CapabilityReport, politeness: Arc<Politeness>) -> Result<Self> {
        let fetcher = Self::http_only(&config.fetch, ContentDecoder::new(capabilities.brotli), politeness.clone())?;

        #[cfg(feature = "browser")]
        let fetcher = if config.browser.enabled && capabilities.browser {
            match BrowserBackend::launch(
                &config.browser,
                capabilities.browser_executable.as_deref(),
                &config.fetch.user_agent,
                politeness,
            )
            .await
            {
                Ok(browser) => fetcher.with_browser(Box::new(browser)),
                Err(e) => {
                    warn!("⚠️ Browser backend unavailable, using HTTP session: {:#}", e);
                    fetcher
                }
            }
        } else {
            fetcher
        };
        #[cfg(not(feature = "browser"))]
        let _ = (capabilities.browser, politeness);

        info!("📡 Page fetcher ready (primary backend: {})", fetcher.primary_backend());
        Ok(fetcher)
    }

    /// Fetcher that never starts a browser
    pub fn http_only(config: &FetchConfig, decoder: ContentDecoder, politeness: Arc<Politeness>) -> Result<Self> {
        Ok(Self {
            browser: None,
            http: HttpBackend::new(config, decoder, politeness)?,
            min_listing_chars: config.min_listing_text_chars,
            min_sub_page_chars: config.min_sub_page_text_chars,
        })
    }

    /// Make `browser` the primary backend, keeping HTTP as the per-page fallback
    #[must_use]
    pub fn with_browser(mut self, browser: Box<dyn RenderingBackend>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn primary_backend(&self) -> BackendKind {
        if self.browser.is_some() {
            BackendKind::Browser
        } else {
            BackendKind::Http
        }
    }

    pub fn minimum_text_chars(&self, kind: PageKind) -> usize {
        match kind {
            PageKind::Listing => self.min_listing_chars,
            PageKind::SubPage => self.min_sub_page_chars,
        }
    }

    async fn fetch_http(&self, url: &str, minimum: usize, path: FetchPath) -> FetchResult<FetchedPage> {
        let (markup, decoding) = self.http.fetch_markup(url).await?;
        FetchedPage::validated(url, &markup, path, decoding, minimum)
    }

    /// Release the browser process, if one was started
    pub async fn shutdown(&self) {
        if let Some(browser) = &self.browser {
            browser.shutdown().await;
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str, kind: PageKind) -> FetchResult<FetchedPage> {
        let minimum = self.minimum_text_chars(kind);

        if let Some(browser) = &self.browser {
            // A rendered page that is too short is final; only a failed
            // navigation falls back to HTTP.
            let reason = match browser.fetch_markup(url).await {
                Ok(markup) => {
                    return FetchedPage::validated(url, &markup, FetchPath::Browser, DecodePath::Rendered, minimum);
                }
                Err(e) => e.to_string(),
            };
            warn!("⚠️ Browser fetch failed, retrying over HTTP: {}", reason);
            return self
                .fetch_http(url, minimum, FetchPath::HttpAfterBrowserFailure { reason })
                .await;
        }

        self.fetch_http(url, minimum, FetchPath::Http).await
    }
}
