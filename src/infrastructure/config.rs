//! Configuration infrastructure
//!
//! Contains configuration loading and management for listing audits.
//!
//! Configuration is grouped by concern:
//! 1. Acquisition (`fetch`, `browser`, `resolver`, `politeness`)
//! 2. Classification (`checker`, `patterns`)
//! 3. Ambient (`logging`, `output`)
//!
//! Every section is `#[serde(default)]`, so a file that only sets a few keys
//! is still valid.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::parsing::DetectionPatterns;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
    pub resolver: ResolverConfig,
    pub politeness: PolitenessConfig,
    pub checker: CheckerConfig,
    pub patterns: DetectionPatterns,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// HTTP-session backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Maximum redirects followed per request
    pub max_redirects: usize,

    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Accept-Encoding sent on the first attempt
    pub accept_encoding: String,

    /// Accept-Encoding sent when a Brotli body has to be re-requested
    pub fallback_accept_encoding: String,

    /// Minimum visible characters on a listing page
    pub min_listing_text_chars: usize,

    /// Minimum visible characters on a sub-page
    pub min_sub_page_text_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_redirects: defaults::MAX_REDIRECTS,
            user_agent: defaults::USER_AGENT.to_string(),
            accept: defaults::ACCEPT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            accept_encoding: defaults::ACCEPT_ENCODING.to_string(),
            fallback_accept_encoding: defaults::FALLBACK_ACCEPT_ENCODING.to_string(),
            min_listing_text_chars: defaults::MIN_LISTING_TEXT_CHARS,
            min_sub_page_text_chars: defaults::MIN_SUB_PAGE_TEXT_CHARS,
        }
    }
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Script-executing backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Try the headless browser at all
    pub enabled: bool,

    /// Explicit Chrome/Chromium executable; detected when unset
    pub executable: Option<PathBuf>,

    pub window_width: u32,
    pub window_height: u32,
    pub navigation_timeout_seconds: u64,

    /// Fixed wait after navigation for scripts to run
    pub settle_ms: u64,

    /// Upper bound on waiting for the `body` element
    pub ready_timeout_seconds: u64,

    /// Extra wait once `body` is present
    pub post_ready_ms: u64,

    /// Wait used instead when the `body` wait times out
    pub ready_grace_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: None,
            window_width: defaults::WINDOW_WIDTH,
            window_height: defaults::WINDOW_HEIGHT,
            navigation_timeout_seconds: defaults::NAVIGATION_TIMEOUT_SECONDS,
            settle_ms: defaults::SETTLE_MS,
            ready_timeout_seconds: defaults::READY_TIMEOUT_SECONDS,
            post_ready_ms: defaults::POST_READY_MS,
            ready_grace_ms: defaults::READY_GRACE_MS,
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_seconds)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_seconds)
    }

    pub fn post_ready(&self) -> Duration {
        Duration::from_millis(self.post_ready_ms)
    }

    pub fn ready_grace(&self) -> Duration {
        Duration::from_millis(self.ready_grace_ms)
    }
}

/// Short-link resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Hosts treated as short links (compared case-insensitively)
    pub short_link_hosts: Vec<String>,
    pub probe_timeout_seconds: u64,
    pub max_redirects: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            short_link_hosts: defaults::SHORT_LINK_HOSTS.iter().map(|h| (*h).to_string()).collect(),
            probe_timeout_seconds: defaults::PROBE_TIMEOUT_SECONDS,
            max_redirects: defaults::MAX_REDIRECTS,
        }
    }
}

impl ResolverConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

/// Request spacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    /// Minimum spacing between any two outbound requests; 0 disables it
    pub min_request_interval_ms: u64,

    /// Pause after each listing when the HTTP backend is in use
    pub http_listing_delay_ms: u64,

    /// Pause after each listing when the browser backend is in use
    pub browser_listing_delay_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_request_interval_ms: defaults::MIN_REQUEST_INTERVAL_MS,
            http_listing_delay_ms: defaults::HTTP_LISTING_DELAY_MS,
            browser_listing_delay_ms: defaults::BROWSER_LISTING_DELAY_MS,
        }
    }
}

impl PolitenessConfig {
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

/// Per-listing orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Sub-page fetches in flight at once; 1 means sequential
    pub max_concurrent_sub_pages: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sub_pages: defaults::MAX_CONCURRENT_SUB_PAGES,
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    pub console_output: bool,
    pub file_output: bool,

    /// Directory for rolling log files; `<data_dir>/listing-audit/logs` when unset
    pub directory: Option<PathBuf>,

    /// Module-specific log level filters (e.g. "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            directory: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("chromiumoxide".to_string(), "warn".to_string());
                filters.insert("tungstenite".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "error".to_string());
                filters
            },
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub report_name: String,

    /// Add one evidence column per category
    pub include_evidence: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            report_name: defaults::REPORT_NAME.to_string(),
            include_evidence: false,
        }
    }
}

/// Something that happened while loading the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNotice {
    /// No file existed; defaults were written
    Created,
    /// The file did not parse; it was backed up (when possible) and reset
    Reset {
        error: String,
        backup: std::result::Result<PathBuf, String>,
    },
}

/// Configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub source: PathBuf,
    pub notices: Vec<ConfigNotice>,
}

impl LoadedConfig {
    /// Replay load-time notices once a subscriber is installed
    pub fn log_notices(&self) {
        for notice in &self.notices {
            match notice {
                ConfigNotice::Created => info!("Configuration file not found, created default: {:?}", self.source),
                ConfigNotice::Reset { error, backup } => {
                    warn!("⚠️  Configuration parse error: {}", error);
                    match backup {
                        Ok(path) => info!("Backed up corrupted config to: {:?}", path),
                        Err(e) => warn!("Failed to create backup of corrupted config: {}", e),
                    }
                    warn!("⚠️  Reset to default configuration");
                }
            }
        }
        info!("Loaded configuration from: {:?}", self.source);
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory (logs live here)
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Manager for the per-user configuration file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Manager for an explicit configuration file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// Runs before logging is initialized, so anything worth reporting is
    /// returned in [`LoadedConfig::notices`] rather than logged here.
    pub async fn load_config(&self) -> Result<LoadedConfig> {
        if !self.config_path.exists() {
            self.save_config(&AppConfig::default()).await?;
            return Ok(self.loaded(AppConfig::default(), vec![ConfigNotice::Created]));
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file: {:?}", self.config_path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(self.loaded(config, Vec::new())),
            Err(parse_error) => {
                let backup_path = self.config_path.with_extension("json.corrupted");
                let backup = match fs::copy(&self.config_path, &backup_path).await {
                    Ok(_) => Ok(backup_path),
                    Err(e) => Err(e.to_string()),
                };

                self.save_config(&AppConfig::default())
                    .await
                    .context("Failed to save default configuration")?;

                let notice = ConfigNotice::Reset {
                    error: parse_error.to_string(),
                    backup,
                };
                Ok(self.loaded(AppConfig::default(), vec![notice]))
            }
        }
    }

    /// Load an explicitly requested file; missing or malformed files are errors
    pub async fn load_existing(&self) -> Result<LoadedConfig> {
        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file: {:?}", self.config_path))?;
        let config = serde_json::from_str::<AppConfig>(&content)
            .with_context(|| format!("Invalid configuration file: {:?}", self.config_path))?;
        Ok(self.loaded(config, Vec::new()))
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;
        Ok(())
    }

    fn loaded(&self, config: AppConfig, notices: Vec<ConfigNotice>) -> LoadedConfig {
        LoadedConfig {
            config,
            source: self.config_path.clone(),
            notices,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "listing-audit";
    pub const CONFIG_FILE_NAME: &str = "listing_audit_config.json";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    pub const MAX_REDIRECTS: usize = 10;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
    pub const ACCEPT_LANGUAGE: &str = "zh-TW,zh;q=0.9,en;q=0.8";
    pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";
    pub const FALLBACK_ACCEPT_ENCODING: &str = "gzip, deflate";

    pub const MIN_LISTING_TEXT_CHARS: usize = 500;
    pub const MIN_SUB_PAGE_TEXT_CHARS: usize = 100;

    // Browser defaults
    pub const WINDOW_WIDTH: u32 = 1920;
    pub const WINDOW_HEIGHT: u32 = 1080;
    pub const NAVIGATION_TIMEOUT_SECONDS: u64 = 30;
    pub const SETTLE_MS: u64 = 5000;
    pub const READY_TIMEOUT_SECONDS: u64 = 15;
    pub const POST_READY_MS: u64 = 2000;
    pub const READY_GRACE_MS: u64 = 3000;

    // Resolver defaults
    pub const SHORT_LINK_HOSTS: &[&str] = &["s.openrice.com"];
    pub const PROBE_TIMEOUT_SECONDS: u64 = 8;

    // Politeness defaults
    pub const MIN_REQUEST_INTERVAL_MS: u64 = 250;
    pub const HTTP_LISTING_DELAY_MS: u64 = 1000;
    pub const BROWSER_LISTING_DELAY_MS: u64 = 2000;

    pub const MAX_CONCURRENT_SUB_PAGES: usize = 4;

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = true;

    pub const REPORT_NAME: &str = "restaurant_check_report";
}
