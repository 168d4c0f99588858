//! Command-line entry point wiring configuration, acquisition, checking and
//! report output together.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::{BatchRunner, ListingChecker, LoggingProgress};
use crate::infrastructure::logging::log_system_info;
use crate::infrastructure::{
    AppConfig, BackendKind, CapabilityReport, Classifier, ConfigManager, LoadedConfig, PageFetcher, Politeness, ReportWriter,
    UrlResolver, init_logging_with_config, load_listings,
};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "listing-audit")]
#[command(version, about = "Batch-check restaurant listings for names, storefront, menu, food and video")]
pub struct Args {
    /// CSV file with a name column and a URL column
    pub input: PathBuf,

    /// Directory for the report files (default: from configuration)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Report file stem (default: restaurant_check_report)
    #[arg(long)]
    pub report_name: Option<String>,

    /// JSON configuration file; must exist when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Never start a headless browser
    #[arg(long)]
    pub no_browser: bool,

    /// Add an evidence column per category
    #[arg(long)]
    pub evidence: bool,

    /// Log level override: error, warn, info, debug, trace
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Fold command-line overrides into the loaded configuration
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.directory.clone_from(dir);
        }
        if let Some(name) = &self.report_name {
            config.output.report_name.clone_from(name);
        }
        if self.no_browser {
            config.browser.enabled = false;
        }
        if self.evidence {
            config.output.include_evidence = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}

async fn load_config(args: &Args) -> Result<LoadedConfig> {
    let mut loaded = match &args.config {
        Some(path) => ConfigManager::with_path(path).load_existing().await?,
        None => ConfigManager::new()?.load_config().await?,
    };
    args.apply_to(&mut loaded.config);
    Ok(loaded)
}

/// Run one audit batch end to end
pub async fn execute(args: Args) -> Result<()> {
    let loaded = load_config(&args).await?;
    let config = &loaded.config;
    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();
    loaded.log_notices();

    let capabilities = CapabilityReport::probe(config.browser.executable.as_deref());
    for warning in &capabilities.warnings {
        warn!("⚠️ {}", warning);
    }

    let listings = load_listings(&args.input)?;

    let politeness = Politeness::shared(config.politeness.min_request_interval());
    let resolver = UrlResolver::new(&config.resolver, &config.fetch, politeness.clone())?;
    let fetcher = Arc::new(PageFetcher::new(config, &capabilities, politeness).await?);
    let listing_delay = Duration::from_millis(match fetcher.primary_backend() {
        BackendKind::Browser => config.politeness.browser_listing_delay_ms,
        BackendKind::Http => config.politeness.http_listing_delay_ms,
    });

    let checker = ListingChecker::new(
        Arc::new(resolver),
        fetcher.clone(),
        Classifier::new(&config.patterns),
        &config.checker,
        config.patterns.expected_site_marker.clone(),
    );
    let runner = BatchRunner::new(checker, listing_delay);

    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 Ctrl-C received, finishing the current listing");
            ctrl_c_token.cancel();
        }
    });

    let outcome = runner.run(&listings, &cancel_token, &LoggingProgress::new()).await;
    fetcher.shutdown().await;

    let written = ReportWriter::new(&config.output).write(&outcome.reports)?;
    info!("📊 {}", written.summary);
    println!("{}", written.summary);
    println!("Report: {}", written.full_report.display());
    if let Some(failed) = &written.failed_report {
        println!("Failed listings: {}", failed.display());
    }
    if outcome.cancelled {
        println!("Batch cancelled; report covers the listings checked before Ctrl-C");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_configuration() {
        let args = Args::try_parse_from([
            "listing-audit",
            "listings.csv",
            "--output-dir",
            "out",
            "--report-name",
            "weekly",
            "--no-browser",
            "--evidence",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(args.input, PathBuf::from("listings.csv"));
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.output.report_name, "weekly");
        assert!(!config.browser.enabled);
        assert!(config.output.include_evidence);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn defaults_leave_configuration_untouched() {
        let args = Args::try_parse_from(["listing-audit", "listings.csv"]).unwrap();
        let mut config = AppConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["listing-audit"]).is_err());
    }

    #[tokio::test]
    async fn missing_explicit_config_is_an_error() {
        let args = Args::try_parse_from(["listing-audit", "in.csv", "--config", "/nonexistent/audit.json"]).unwrap();
        assert!(execute(args).await.is_err());
    }
}
