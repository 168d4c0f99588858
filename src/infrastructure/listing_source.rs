//! CSV listing input
//!
//! The first row is a header. The URL and name columns are located through
//! alias tables so that sheets exported in Traditional Chinese, Simplified
//! Chinese or English all load without editing.

use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::ListingReference;

pub const URL_COLUMN_ALIASES: &[&str] = &["URL", "網址", "网址", "url", "連結", "链接"];
pub const NAME_COLUMN_ALIASES: &[&str] = &["餐廳名稱", "餐厅名称", "名稱", "名称", "name", "Name"];

#[derive(Error, Debug)]
pub enum ListingSourceError {
    #[error("Missing {column} column (expected one of: {expected}); found: {found}")]
    MissingColumn {
        column: &'static str,
        expected: String,
        found: String,
    },

    #[error("Failed to open listing file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed listing CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Load every data row of `path` as a listing
pub fn load_listings(path: &Path) -> Result<Vec<ListingReference>, ListingSourceError> {
    let file = std::fs::File::open(path).map_err(|source| ListingSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let listings = read_listings(file)?;
    info!("📥 Loaded {} listing(s) from {:?}", listings.len(), path);
    Ok(listings)
}

pub fn read_listings<R: Read>(reader: R) -> Result<Vec<ListingReference>, ListingSourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let url_index = find_column(&headers, "URL", URL_COLUMN_ALIASES)?;
    let name_index = find_column(&headers, "name", NAME_COLUMN_ALIASES)?;
    debug!("Listing columns: name=#{}, url=#{}", name_index, url_index);

    let mut listings = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cell = |index: usize| record.get(index).unwrap_or_default().trim().to_string();
        listings.push(ListingReference::new(cell(name_index), cell(url_index)));
    }
    Ok(listings)
}

/// First alias (in table order) present among the headers
fn find_column(headers: &[String], column: &'static str, aliases: &[&str]) -> Result<usize, ListingSourceError> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
        .ok_or_else(|| ListingSourceError::MissingColumn {
            column,
            expected: aliases.join(", "),
            found: headers.join(", "),
        })
}
