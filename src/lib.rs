//! Listing Audit - batch verification of restaurant listing pages
//!
//! Each listing is resolved, fetched (headless browser or HTTP session) and
//! checked for six content elements: localized name, secondary-script name,
//! storefront photo, menu, food photo and video.

use clap::Parser;
use std::process::ExitCode;

// Module declarations
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

/// Parse the command line and run one batch
pub async fn run() -> ExitCode {
    let args = cli::Args::parse();
    match cli::execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
