#![allow(missing_docs)]

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    listing_audit::run().await
}
