//! HTTP-session page backend
//!
//! A single reqwest client with a cookie store, browser-like headers and
//! gzip/deflate decoding. Brotli responses are routed through
//! [`ContentDecoder`], which may re-request the page without `br`.

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONTENT_ENCODING, HeaderMap, HeaderValue};
use reqwest::{Client, Response, redirect::Policy};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::infrastructure::config::FetchConfig;
use crate::infrastructure::content_decoder::{ContentDecoder, DecodePath};
use crate::infrastructure::fetch_error::{FetchError, FetchResult};
use crate::infrastructure::politeness::Politeness;

pub struct HttpBackend {
    client: Client,
    accept_encoding: String,
    fallback_accept_encoding: String,
    decoder: ContentDecoder,
    politeness: Arc<Politeness>,
}

impl HttpBackend {
    pub fn new(config: &FetchConfig, decoder: ContentDecoder, politeness: Arc<Politeness>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(&config.accept).context("Invalid Accept header")?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid Accept-Language header")?,
        );

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            accept_encoding: config.accept_encoding.clone(),
            fallback_accept_encoding: config.fallback_accept_encoding.clone(),
            decoder,
            politeness,
        })
    }

    async fn send(&self, url: &str, accept_encoding: &str) -> FetchResult<Response> {
        self.politeness.wait().await;

        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, accept_encoding)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("⚠️ HTTP error {}: {}", status, url);
            return Err(FetchError::status(url, status.as_u16()));
        }
        Ok(response)
    }

    /// GET `url` and return its decoded markup
    pub async fn fetch_markup(&self, url: &str) -> FetchResult<(String, DecodePath)> {
        let response = self.send(url, &self.accept_encoding).await?;
        let content_encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, &e))?;
        debug!("Received {} bytes from {} (encoding: '{}')", body.len(), url, content_encoding);

        let fallback = self.fallback_accept_encoding.as_str();
        let decoded = self
            .decoder
            .decode(&content_encoding, &body, move || async move {
                let response = self.send(url, fallback).await?;
                response
                    .bytes()
                    .await
                    .map(|b| b.to_vec())
                    .map_err(|e| FetchError::from_reqwest(url, &e))
            })
            .await
            .map_err(|e| FetchError::decoding(url, e))?;

        Ok((decoded.text, decoded.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn backend(config: &FetchConfig, brotli: bool) -> HttpBackend {
        HttpBackend::new(config, ContentDecoder::new(brotli), Politeness::disabled()).unwrap()
    }

    #[tokio::test]
    async fn plain_page_is_read_natively() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/r-1")
                .header("accept-language", "zh-TW,zh;q=0.9,en;q=0.8");
            then.status(200).body("<html><body><h1>小食堂</h1></body></html>");
        });

        let (markup, path) = backend(&FetchConfig::default(), true)
            .fetch_markup(&server.url("/r-1"))
            .await
            .unwrap();
        mock.assert();
        assert!(markup.contains("小食堂"));
        assert_eq!(path, DecodePath::Native);
    }

    #[tokio::test]
    async fn error_status_is_generic_with_code() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/gone");
            then.status(404);
        });

        let err = backend(&FetchConfig::default(), true)
            .fetch_markup(&server.url("/gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Generic { status: Some(404), .. }));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_page_is_logged_as_warning() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/r-1/photos/videos");
            then.status(404);
        });

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let result = backend(&FetchConfig::default(), true)
            .fetch_markup(&server.url("/r-1/photos/videos"))
            .await;
        assert!(result.is_err());

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("HTTP error 404"))
            .expect("status line logged");
        assert!(line.contains("WARN"), "{line}");
        assert!(!output.contains("ERROR"), "{output}");
    }

    #[tokio::test]
    async fn brotli_without_capability_renegotiates() {
        let server = MockServer::start();
        let br = server.mock(|when, then| {
            when.path("/r-1").header("accept-encoding", "gzip, deflate, br");
            then.status(200).header("content-encoding", "br").body("opaque-brotli-bytes");
        });
        let plain = server.mock(|when, then| {
            when.path("/r-1").header("accept-encoding", "gzip, deflate");
            then.status(200).body("<html><body>renegotiated</body></html>");
        });

        let (markup, path) = backend(&FetchConfig::default(), false)
            .fetch_markup(&server.url("/r-1"))
            .await
            .unwrap();
        br.assert();
        plain.assert();
        assert!(markup.contains("renegotiated"));
        assert_eq!(path, DecodePath::Renegotiated);
    }

    #[tokio::test]
    async fn failed_renegotiation_is_a_decoding_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/r-1").header("accept-encoding", "gzip, deflate, br");
            then.status(200).header("content-encoding", "br").body("opaque-brotli-bytes");
        });
        server.mock(|when, then| {
            when.path("/r-1").header("accept-encoding", "gzip, deflate");
            then.status(503);
        });

        let err = backend(&FetchConfig::default(), false)
            .fetch_markup(&server.url("/r-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decoding { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/slow");
            then.status(200).delay(Duration::from_secs(3)).body("late");
        });
        let config = FetchConfig {
            request_timeout_seconds: 1,
            ..FetchConfig::default()
        };

        let err = backend(&config, true).fetch_markup(&server.url("/slow")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        let err = backend(&FetchConfig::default(), true)
            .fetch_markup("http://127.0.0.1:1/r-1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connection { .. }), "{err:?}");
    }
}
