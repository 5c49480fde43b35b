//! Export renderers. Both are pure: they read a [`ReportResult`] and return
//! bytes, leaving persistence to the caller.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::report::ReportResult;

pub mod document;
pub mod spreadsheet;

pub use document::render_document;
pub use spreadsheet::render_spreadsheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Spreadsheet,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Spreadsheet => "csv",
        }
    }

    pub fn render(self, result: &ReportResult) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Pdf => render_document(result),
            ExportFormat::Spreadsheet => render_spreadsheet(result),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "pdf" => Ok(ExportFormat::Pdf),
            "spreadsheet" | "csv" => Ok(ExportFormat::Spreadsheet),
            other => Err(ReportError::Validation(format!(
                "unknown export format '{other}'"
            ))),
        }
    }
}

/// `report_<name>_<timestamp>.<ext>`, with spaces in the name replaced.
pub fn export_file_name(report_name: &str, format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "report_{}_{}.{}",
        report_name.replace(' ', "_"),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_replaces_spaces_and_stamps_time() {
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 14, 5, 9).unwrap();
        assert_eq!(
            export_file_name("January by worker", ExportFormat::Pdf, at),
            "report_January_by_worker_20260203_140509.pdf"
        );
        assert_eq!(
            export_file_name("Q1", ExportFormat::Spreadsheet, at),
            "report_Q1_20260203_140509.csv"
        );
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
