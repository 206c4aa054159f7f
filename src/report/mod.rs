use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::error::{HarvestError, Result};
use crate::harvest::ResultSet;

/// Summary of one finished run, written exactly once alongside the emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub query: String,
    pub started_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub total_emails: usize,
}

impl RunReport {
    pub fn new(
        query: &str,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        total_emails: usize,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query: query.to_string(),
            started_at,
            elapsed,
            total_emails,
        }
    }
}

pub trait ReportFormatter {
    fn format(&self, report: &RunReport, results: &ResultSet) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Plain-text record: header block, then one entry per email, sorted.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &RunReport, results: &ResultSet) -> Result<String> {
        let mut output = String::new();
        output.push_str("Email Scraping Results\n");
        output.push_str(&format!("Query: {}\n", report.query));
        output.push_str(&format!(
            "Date: {}\n",
            report.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        output.push_str(&format!("Total Emails Found: {}\n", report.total_emails));
        output.push_str(&format!("{}\n\n", "=".repeat(50)));

        for email in results.sorted() {
            output.push_str(&format!("Email: {}\n", email));
            output.push_str(&format!("{}\n", "-".repeat(30)));
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, results: &ResultSet) -> Result<String> {
        let document = serde_json::json!({
            "report": report,
            "emails": results.sorted(),
        });
        let formatted = serde_json::to_string_pretty(&document)
            .map_err(|e| HarvestError::StorageError(format!("JSON serialization failed: {}", e)))?;
        Ok(formatted)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

/// Persistence collaborator: consumes the final set, owns the on-disk format.
#[async_trait]
pub trait ReportSink {
    async fn persist(&self, report: &RunReport, results: &ResultSet) -> Result<PathBuf>;
}

pub struct FileReportWriter {
    output_dir: PathBuf,
    formatter: Box<dyn ReportFormatter + Send + Sync>,
}

impl FileReportWriter {
    pub fn new(output_dir: PathBuf, format: &str) -> Result<Self> {
        let formatter: Box<dyn ReportFormatter + Send + Sync> = match format {
            "text" => Box::new(TextFormatter),
            "json" => Box::new(JsonFormatter),
            _ => {
                return Err(HarvestError::ConfigError(format!(
                    "Unsupported report format: {}",
                    format
                ))
                .into())
            }
        };

        Ok(Self {
            output_dir,
            formatter,
        })
    }

    fn file_path(&self, report: &RunReport) -> PathBuf {
        let filename = format!(
            "emails_{}.{}",
            report.started_at.format("%Y%m%d_%H%M%S"),
            self.formatter.file_extension()
        );
        self.output_dir.join(filename)
    }
}

#[async_trait]
impl ReportSink for FileReportWriter {
    async fn persist(&self, report: &RunReport, results: &ResultSet) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            HarvestError::StorageError(format!("Failed to create output directory: {}", e))
        })?;

        let path = self.file_path(report);
        let content = self.formatter.format(report, results)?;

        fs::write(&path, content)
            .map_err(|e| HarvestError::StorageError(format!("Failed to write report: {}", e)))?;

        info!("Report saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn sample_report() -> RunReport {
        let started_at = DateTime::parse_from_rfc3339("2024-03-01T10:30:45Z")
            .unwrap()
            .with_timezone(&Utc);
        RunReport::new("dentists in Dubai", started_at, Duration::from_secs(90), 2)
    }

    fn sample_results() -> ResultSet {
        let mut results = ResultSet::new();
        results.merge(
            ["info@a.com".to_string(), "contact@b.org".to_string()]
                .into_iter()
                .collect::<HashSet<_>>(),
        );
        results
    }

    #[test]
    fn test_text_format_layout() {
        let output = TextFormatter
            .format(&sample_report(), &sample_results())
            .unwrap();

        assert!(output.starts_with("Email Scraping Results\n"));
        assert!(output.contains("Query: dentists in Dubai\n"));
        assert!(output.contains("Date: 2024-03-01 10:30:45\n"));
        assert!(output.contains("Total Emails Found: 2\n"));
        // sorted order
        let contact_pos = output.find("Email: contact@b.org").unwrap();
        let info_pos = output.find("Email: info@a.com").unwrap();
        assert!(contact_pos < info_pos);
    }

    #[test]
    fn test_text_format_empty_results() {
        let report = RunReport::new("nothing", Utc::now(), Duration::from_secs(1), 0);
        let output = TextFormatter.format(&report, &ResultSet::new()).unwrap();
        assert!(output.contains("Total Emails Found: 0"));
        assert!(!output.contains("Email: "));
    }

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&sample_report(), &sample_results())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["report"]["query"], "dentists in Dubai");
        assert_eq!(parsed["report"]["total_emails"], 2);
        assert_eq!(parsed["emails"][0], "contact@b.org");
        assert_eq!(parsed["emails"][1], "info@a.com");
    }

    #[test]
    fn test_report_roundtrip() {
        let report = sample_report();
        let serialized = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&serialized).unwrap();

        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.query, report.query);
        assert_eq!(parsed.elapsed, report.elapsed);
    }

    #[tokio::test]
    async fn test_file_writer_persists_report() {
        let temp_dir = tempdir().unwrap();
        let writer =
            FileReportWriter::new(temp_dir.path().to_path_buf(), "text").unwrap();

        let path = writer
            .persist(&sample_report(), &sample_results())
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("txt"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("info@a.com"));
    }

    #[tokio::test]
    async fn test_file_writer_json_extension() {
        let temp_dir = tempdir().unwrap();
        let writer =
            FileReportWriter::new(temp_dir.path().join("nested"), "json").unwrap();

        let path = writer
            .persist(&sample_report(), &sample_results())
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    }

    #[test]
    fn test_file_writer_rejects_unknown_format() {
        assert!(FileReportWriter::new(PathBuf::from("out"), "csv").is_err());
    }
}
