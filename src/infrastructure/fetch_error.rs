//! Acquisition error types
//!
//! Every variant carries the URL that was being fetched so that the report
//! writer can show exactly which request failed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Connection failed: {url} - {message}")]
    Connection { url: String, message: String },

    #[error("Content decoding failed: {url} - {message}")]
    Decoding { url: String, message: String },

    #[error("Content too short: {url} ({length} < {minimum} chars)")]
    ContentTooShort {
        url: String,
        length: usize,
        minimum: usize,
    },

    #[error("Fetch failed: {url} - {message}")]
    Generic {
        url: String,
        message: String,
        status: Option<u16>,
    },
}

impl FetchError {
    pub fn timeout(url: &str) -> Self {
        Self::Timeout {
            url: url.to_string(),
        }
    }

    pub fn connection(url: &str, message: impl ToString) -> Self {
        Self::Connection {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn decoding(url: &str, message: impl ToString) -> Self {
        Self::Decoding {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn too_short(url: &str, length: usize, minimum: usize) -> Self {
        Self::ContentTooShort {
            url: url.to_string(),
            length,
            minimum,
        }
    }

    pub fn generic(url: &str, message: impl ToString) -> Self {
        Self::Generic {
            url: url.to_string(),
            message: message.to_string(),
            status: None,
        }
    }

    /// Non-success HTTP status
    pub fn status(url: &str, status: u16) -> Self {
        Self::Generic {
            url: url.to_string(),
            message: format!("HTTP error {status}"),
            status: Some(status),
        }
    }

    /// Classify a reqwest error the same way for every backend call site
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(url)
        } else if err.is_connect() {
            Self::connection(url, err)
        } else if let Some(status) = err.status() {
            Self::status(url, status.as_u16())
        } else if err.is_body() || err.is_decode() {
            Self::decoding(url, err)
        } else {
            Self::generic(url, err)
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connection { url, .. }
            | Self::Decoding { url, .. }
            | Self::ContentTooShort { url, .. }
            | Self::Generic { url, .. } => url,
        }
    }

    /// Short variant name used in report error columns
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "Timeout",
            Self::Connection { .. } => "ConnectionError",
            Self::Decoding { .. } => "DecodingError",
            Self::ContentTooShort { .. } => "ContentTooShort",
            Self::Generic { .. } => "GenericFetchError",
        }
    }

    /// `"<kind>: <message>"`, the form written into ERROR reports
    pub fn report_detail(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
