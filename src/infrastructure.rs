//! Infrastructure layer for page acquisition, parsing, and file I/O
//!
//! This module provides the HTTP and headless-browser backends, short-link
//! resolution, content decoding, evidence detectors, CSV input/output and the
//! configuration and logging plumbing shared by the CLI.

#[cfg(feature = "browser")]
pub mod browser_backend;
pub mod capabilities;
pub mod config; // Configuration file and defaults
pub mod content_decoder;
pub mod fetch_error;
pub mod http_backend;
pub mod listing_source; // CSV listing input
pub mod logging; // Logging infrastructure
pub mod page_fetcher;
pub mod parsing; // Evidence detectors and classifier
pub mod politeness;
pub mod report_writer; // CSV report output
pub mod url_resolver;

// Re-export commonly used items
pub use capabilities::CapabilityReport;
pub use config::{AppConfig, ConfigManager, ConfigNotice, LoadedConfig};
pub use content_decoder::{ContentDecoder, DecodePath};
pub use fetch_error::{FetchError, FetchResult};
pub use http_backend::HttpBackend;
pub use listing_source::{ListingSourceError, load_listings};
pub use logging::{get_log_directory, init_logging_with_config};
pub use page_fetcher::{BackendKind, FetchPath, FetchedPage, PageFetcher, PageKind, PageSource, RenderingBackend};
pub use parsing::{Classifier, DetectionPatterns, ParsedDocument};
pub use politeness::Politeness;
pub use report_writer::{BatchSummary, ReportWriter};
pub use url_resolver::{LinkResolver, UrlResolver};
