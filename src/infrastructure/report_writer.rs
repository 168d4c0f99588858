//! CSV report output
//!
//! `<stem>.csv` holds every report in input order; `<stem>_failed.csv` is
//! written only when at least one listing did not pass.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{Category, CheckReport, ReportStatus};
use crate::infrastructure::config::OutputConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Counts per status for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[CheckReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.total += 1;
            match report.status() {
                ReportStatus::Pass => summary.passed += 1,
                ReportStatus::Fail => summary.failed += 1,
                ReportStatus::Error => summary.errored += 1,
            }
            summary
        })
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing(s): {} passed, {} failed, {} error(s)",
            self.total, self.passed, self.failed, self.errored
        )
    }
}

#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub full_report: PathBuf,
    pub failed_report: Option<PathBuf>,
    pub summary: BatchSummary,
}

pub struct ReportWriter {
    directory: PathBuf,
    stem: String,
    include_evidence: bool,
}

impl ReportWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            stem: config.report_name.clone(),
            include_evidence: config.include_evidence,
        }
    }

    pub fn full_report_path(&self) -> PathBuf {
        self.directory.join(format!("{}.csv", self.stem))
    }

    pub fn failed_report_path(&self) -> PathBuf {
        self.directory.join(format!("{}_failed.csv", self.stem))
    }

    pub fn write(&self, reports: &[CheckReport]) -> Result<WrittenReports> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create report directory: {:?}", self.directory))?;

        let full_report = self.full_report_path();
        self.write_rows(&full_report, reports.iter())?;

        let failed_report = if reports.iter().all(CheckReport::is_pass) {
            None
        } else {
            let path = self.failed_report_path();
            self.write_rows(&path, reports.iter().filter(|r| !r.is_pass()))?;
            Some(path)
        };

        let summary = BatchSummary::from_reports(reports);
        info!("📝 Report written: {:?} ({})", full_report, summary);
        if let Some(path) = &failed_report {
            info!("📝 Failed-only report written: {:?}", path);
        }

        Ok(WrittenReports {
            full_report,
            failed_report,
            summary,
        })
    }

    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = ["Name", "URL", "Checked at", "Pass ratio", "Status"]
            .iter()
            .map(|h| (*h).to_string())
            .collect();
        header.extend(Category::ALL.iter().map(|c| c.label().to_string()));
        header.push("Error detail".to_string());
        if self.include_evidence {
            header.extend(Category::ALL.iter().map(|c| format!("{} evidence", c.label())));
        }
        header
    }

    fn row(&self, report: &CheckReport) -> Vec<String> {
        let verdicts = report.verdicts();
        let mut row = vec![
            report.listing_name().to_string(),
            report.source_url().to_string(),
            report.checked_at().format(TIMESTAMP_FORMAT).to_string(),
            report.pass_ratio(),
            report.status().label().to_string(),
        ];
        row.extend(Category::ALL.iter().map(|c| verdicts.get(*c).mark().to_string()));
        row.push(report.error_detail().unwrap_or_default().to_string());
        if self.include_evidence {
            row.extend(
                Category::ALL
                    .iter()
                    .map(|c| verdicts.get(*c).evidence.clone().unwrap_or_default()),
            );
        }
        row
    }

    fn write_rows<'a>(&self, path: &Path, reports: impl Iterator<Item = &'a CheckReport>) -> Result<()> {
        let mut writer =
            csv::Writer::from_path(path).with_context(|| format!("Failed to create report file: {path:?}"))?;
        writer.write_record(self.header())?;
        for report in reports {
            writer.write_record(self.row(report))?;
        }
        writer.flush().with_context(|| format!("Failed to flush report file: {path:?}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryVerdicts, DetectionResult, ListingReference};
    use tempfile::TempDir;

    fn all_passing() -> CategoryVerdicts {
        Category::ALL
            .iter()
            .fold(CategoryVerdicts::all_failed(), |v, c| v.with(*c, DetectionResult::pass("found")))
    }

    fn reports() -> Vec<CheckReport> {
        vec![
            CheckReport::classified(&ListingReference::new("小食堂", "https://x.test/r-1"), all_passing()),
            CheckReport::classified(
                &ListingReference::new("Bistro", "https://x.test/r-2"),
                all_passing().with(Category::Video, DetectionResult::fail()),
            ),
            CheckReport::acquisition_failed(
                &ListingReference::new("Gone", "https://x.test/r-3"),
                "GenericFetchError: HTTP error 404",
            ),
        ]
    }

    fn writer(dir: &TempDir, include_evidence: bool) -> ReportWriter {
        ReportWriter::new(&OutputConfig {
            directory: dir.path().join("out"),
            report_name: "audit".to_string(),
            include_evidence,
        })
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        csv::Reader::from_path(path)
            .unwrap()
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn summary_counts_each_status() {
        let summary = BatchSummary::from_reports(&reports());
        assert_eq!(
            summary,
            BatchSummary {
                total: 3,
                passed: 1,
                failed: 1,
                errored: 1
            }
        );
    }

    #[test]
    fn full_and_failed_reports_are_written() {
        let dir = TempDir::new().unwrap();
        let written = writer(&dir, false).write(&reports()).unwrap();

        let full = read_rows(&written.full_report);
        assert_eq!(full.len(), 3);
        assert_eq!(full[0][0], "小食堂");
        assert_eq!(full[0][3], "6/6");
        assert_eq!(full[0][4], "PASS");
        assert_eq!(full[1][10], "✗");
        assert_eq!(full[2][4], "ERROR");
        assert_eq!(full[2][11], "GenericFetchError: HTTP error 404");

        let failed_path = written.failed_report.unwrap();
        assert!(failed_path.ends_with("audit_failed.csv"));
        let failed = read_rows(&failed_path);
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().all(|row| row[4] != "PASS"));
    }

    #[test]
    fn no_failed_report_when_everything_passes() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir, false);
        let written = writer.write(&reports()[..1]).unwrap();
        assert!(written.failed_report.is_none());
        assert!(!writer.failed_report_path().exists());
    }

    #[test]
    fn evidence_columns_are_optional() {
        let dir = TempDir::new().unwrap();
        let written = writer(&dir, true).write(&reports()[..1]).unwrap();

        let mut reader = csv::Reader::from_path(&written.full_report).unwrap();
        let header = reader.headers().unwrap().clone();
        assert_eq!(header.len(), 18);
        assert_eq!(&header[12], "Localized name evidence");

        let rows = read_rows(&written.full_report);
        assert_eq!(rows[0][12], "found");
    }
}
