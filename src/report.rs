/*!
 * Run summaries for catdir
 *
 * Summaries go to stderr: stdout carries the stream itself when
 * serializing, so nothing else may be written there.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::reconstruct::ReconstructOutcome;
use crate::scanner::ScannerStatistics;
use crate::utils::format_file_size;

/// Summary of a serialization run
#[derive(Debug, Clone)]
pub struct CollectionReport {
    /// Directory that was collected
    pub target: String,
    /// Where the stream went
    pub destination: String,
    /// Time spent collecting and rendering
    pub duration: Duration,
    /// Scanner statistics
    pub statistics: ScannerStatistics,
    /// Size of the rendered stream in bytes
    pub stream_bytes: u64,
}

/// Summary of a reconstruction run
#[derive(Debug, Clone)]
pub struct ReconstructionReport {
    /// Directory written into
    pub target: String,
    /// Time spent parsing and writing
    pub duration: Duration,
    /// Outcome of the run
    pub outcome: ReconstructOutcome,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Report generator for run summaries
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    fn table(&self, rows: Vec<SummaryRow>) -> String {
        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    /// Summary table for a serialization run
    pub fn collection_summary(&self, report: &CollectionReport) -> String {
        let stats = &report.statistics;
        let rows = vec![
            SummaryRow::new("Target", report.target.clone()),
            SummaryRow::new("Output", report.destination.clone()),
            SummaryRow::new("Process Time", format!("{:.4?}", report.duration)),
            SummaryRow::new("Files Collected", self.format_number(stats.files_collected)),
            SummaryRow::new(
                "Text / Binary",
                format!(
                    "{} / {}",
                    self.format_number(stats.text_files),
                    self.format_number(stats.binary_files)
                ),
            ),
            SummaryRow::new("Entries Ignored", self.format_number(stats.entries_ignored)),
            SummaryRow::new("Read Failures", self.format_number(stats.read_failures)),
            SummaryRow::new("Content Size", format_file_size(stats.total_bytes)),
            SummaryRow::new("Stream Size", format_file_size(report.stream_bytes)),
        ];

        format!("COLLECTION COMPLETE\n{}", self.table(rows))
    }

    /// Summary table for a reconstruction run, with failures listed below it
    pub fn reconstruction_summary(&self, report: &ReconstructionReport) -> String {
        let outcome = &report.outcome;
        let rows = vec![
            SummaryRow::new("Target", report.target.clone()),
            SummaryRow::new("Process Time", format!("{:.4?}", report.duration)),
            SummaryRow::new("Files Written", self.format_number(outcome.written.len())),
            SummaryRow::new("Write Failures", self.format_number(outcome.failed.len())),
            SummaryRow::new("Entries Dropped", self.format_number(outcome.dropped)),
            SummaryRow::new("Bytes Written", format_file_size(outcome.total_bytes)),
        ];

        let mut summary = format!("RECONSTRUCTION COMPLETE\n{}", self.table(rows));

        if !outcome.failed.is_empty() {
            #[derive(Tabled)]
            struct FailureRow {
                #[tabled(rename = "File Path")]
                path: String,

                #[tabled(rename = "Error")]
                error: String,
            }

            let rows: Vec<FailureRow> = outcome
                .failed
                .iter()
                .map(|(path, error)| FailureRow {
                    path: path.clone(),
                    error: error.clone(),
                })
                .collect();

            let mut table = Table::new(rows);
            table
                .with(Style::rounded())
                .with(Padding::new(1, 1, 0, 0));
            summary.push_str("\n\nFAILED FILES\n");
            summary.push_str(&table.to_string());
        }

        summary
    }

    /// Print a summary to stderr
    pub fn print(&self, summary: &str) {
        eprintln!("\n{}", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        let reporter = Reporter::new();
        assert_eq!(reporter.format_number(999), "999");
        assert_eq!(reporter.format_number(1_500), "1.5K");
        assert_eq!(reporter.format_number(2_000_000), "2.0M");
    }

    #[test]
    fn test_collection_summary_contents() {
        let report = CollectionReport {
            target: "project".to_string(),
            destination: "stdout".to_string(),
            duration: Duration::from_millis(12),
            statistics: ScannerStatistics {
                files_collected: 3,
                text_files: 2,
                binary_files: 1,
                entries_ignored: 4,
                read_failures: 0,
                total_bytes: 2048,
            },
            stream_bytes: 4096,
        };
        let summary = Reporter::new().collection_summary(&report);
        assert!(summary.contains("COLLECTION COMPLETE"));
        assert!(summary.contains("Files Collected"));
        assert!(summary.contains("2 / 1"));
        assert!(summary.contains("2.00 KB"));
        assert!(summary.contains("4.00 KB"));
    }

    #[test]
    fn test_reconstruction_summary_lists_failures() {
        let report = ReconstructionReport {
            target: "out".to_string(),
            duration: Duration::from_millis(3),
            outcome: ReconstructOutcome {
                written: vec!["a.txt".to_string()],
                failed: vec![("../x".to_string(), "unsafe".to_string())],
                dropped: 1,
                total_bytes: 2,
            },
        };
        let summary = Reporter::new().reconstruction_summary(&report);
        assert!(summary.contains("Files Written"));
        assert!(summary.contains("FAILED FILES"));
        assert!(summary.contains("../x"));

        let clean = ReconstructionReport {
            outcome: ReconstructOutcome::default(),
            ..report
        };
        assert!(!Reporter::new()
            .reconstruction_summary(&clean)
            .contains("FAILED FILES"));
    }
}
