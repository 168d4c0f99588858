//! Optional capability probe.
//!
//! Sources of truth: Cargo features (compiled in or not) and environment
//! variables (runtime opt-out).
//! - LISTING_AUDIT_DISABLE_BROWSER (default: false)
//! - LISTING_AUDIT_DISABLE_BROTLI (default: false)
//!
//! Values: "1"/"true" enable, "0"/"false" disable (case-insensitive)
//!
//! The probe only returns a report; callers decide how to log warnings.

use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DISABLE_BROWSER_ENV: &str = "LISTING_AUDIT_DISABLE_BROWSER";
pub const DISABLE_BROTLI_ENV: &str = "LISTING_AUDIT_DISABLE_BROTLI";

// Environment variable accessor (production vs. tests)
#[cfg(not(test))]
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}


#[cfg(test)]
fn env_var(name: &str) -> Option<String> {
    test_env::get(name)
}

fn read_flag(name: &str, default: bool) -> bool {
    match env_var(name) {
        Some(val) => match val.trim() {
            v if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") => true,
            v if v.eq_ignore_ascii_case("0") || v.eq_ignore_ascii_case("false") => false,
            _ => default,
        },
        None => default,
    }
}

/// What optional acquisition paths are usable in this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    /// Brotli bodies can be decoded locally
    pub brotli: bool,
    /// A headless browser can be launched
    pub browser: bool,
    /// Browser executable found by the probe, if any
    pub browser_executable: Option<PathBuf>,
    /// Human-readable reasons for every disabled capability
    pub warnings: Vec<String>,
}

impl CapabilityReport {
    /// Probe compiled features, environment opt-outs and the browser executable.
    /// `configured_executable` takes precedence over the search.
    pub fn probe(configured_executable: Option<&Path>) -> Self {
        let mut warnings = Vec::new();

        let brotli = if !cfg!(feature = "brotli") {
            warnings.push("Brotli decoding not compiled in; br responses will be re-requested".to_string());
            false
        } else if read_flag(DISABLE_BROTLI_ENV, false) {
            warnings.push(format!("Brotli decoding disabled by {DISABLE_BROTLI_ENV}"));
            false
        } else {
            true
        };

        let mut browser_executable = None;
        let browser = if !cfg!(feature = "browser") {
            warnings.push("Browser automation not compiled in; using HTTP backend".to_string());
            false
        } else if read_flag(DISABLE_BROWSER_ENV, false) {
            warnings.push(format!("Browser automation disabled by {DISABLE_BROWSER_ENV}"));
            false
        } else {
            browser_executable = configured_executable
                .filter(|p| p.exists())
                .map(Path::to_path_buf)
                .or_else(find_browser_executable);
            if browser_executable.is_none() {
                warnings.push("No Chrome/Chromium executable found; using HTTP backend".to_string());
            }
            browser_executable.is_some()
        };

        Self {
            brotli,
            browser,
            browser_executable,
            warnings,
        }
    }

    /// Report with nothing optional available
    pub fn minimal() -> Self {
        Self {
            brotli: false,
            browser: false,
            browser_executable: None,
            warnings: Vec::new(),
        }
    }
}

const BROWSER_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "msedge",
];

const BROWSER_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

/// `CHROME` env var, then well-known install paths, then `PATH`
fn find_browser_executable() -> Option<PathBuf> {
    if let Some(path) = env_var("CHROME").map(PathBuf::from).filter(|p| p.exists()) {
        return Some(path);
    }

    if let Some(path) = BROWSER_PATHS.iter().map(PathBuf::from).find(|p| p.exists()) {
        return Some(path);
    }

    let search_path = env_var("PATH")?;
    std::env::split_paths(&search_path).find_map(|dir| {
        BROWSER_NAMES.iter().find_map(|name| {
            let candidate = dir.join(name);
            let candidate_exe = dir.join(format!("{name}.exe"));
            [candidate, candidate_exe].into_iter().find(|p| p.is_file())
        })
    })
}
