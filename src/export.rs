//! Result exporter: text, CSV and JSON renderings of a [`ComparisonResult`]

use crate::compare::ComparisonResult;
use crate::zone::DnsRecord;
use std::fmt;
use std::str::FromStr;
use tracing::error;

/// Base name of downloadable export files
pub const EXPORT_FILE_STEM: &str = "dns-comparison";

/// CSV header row
pub const CSV_HEADER: &str = "Status,Name,Type,TTL,Data,Source Value,Dest Value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Text,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// File name a download of this format is saved under
    pub fn file_name(&self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render a comparison result in the given format
pub fn export_results(results: &ComparisonResult, format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => generate_json(results),
        ExportFormat::Csv => generate_csv(results),
        ExportFormat::Text => generate_text(results),
    }
}

/// Render a comparison result for a format given by name.
///
/// Unknown format names produce an empty string.
pub fn export_named(results: &ComparisonResult, format: &str) -> String {
    match format.parse::<ExportFormat>() {
        Ok(format) => export_results(results, format),
        Err(_) => String::new(),
    }
}

fn ttl_field(record: &DnsRecord) -> String {
    record.ttl.map(|ttl| ttl.to_string()).unwrap_or_default()
}

fn generate_json(results: &ComparisonResult) -> String {
    // Serializing plain strings and integers cannot fail
    serde_json::to_string_pretty(results).unwrap_or_else(|e| {
        error!("Failed to serialize comparison result: {}", e);
        String::new()
    })
}

/// Fields are written as-is: commas or quotes inside record data are not
/// escaped and will shift columns for CSV readers.
fn generate_csv(results: &ComparisonResult) -> String {
    let mut lines = Vec::with_capacity(1 + results.summary().total);
    lines.push(CSV_HEADER.to_string());

    for record in &results.matching {
        lines.push(format!(
            "Matching,{},{},{},{},,",
            record.name,
            record.rtype,
            ttl_field(record),
            record.data
        ));
    }

    for record in &results.missing {
        lines.push(format!(
            "Missing,{},{},{},{},,",
            record.name,
            record.rtype,
            ttl_field(record),
            record.data
        ));
    }

    for diff in &results.different {
        lines.push(format!(
            "Different,{},{},{},,{},{}",
            diff.record.name,
            diff.record.rtype,
            ttl_field(&diff.record),
            diff.source_value,
            diff.dest_value
        ));
    }

    lines.join("\n")
}

fn record_line(record: &DnsRecord) -> String {
    format!(
        "{} {} {} {}",
        record.name,
        ttl_field(record),
        record.rtype,
        record.data
    )
}

fn generate_text(results: &ComparisonResult) -> String {
    let mut lines = Vec::new();

    lines.push("=== MATCHING RECORDS ===".to_string());
    lines.extend(results.matching.iter().map(record_line));

    lines.push("\n=== MISSING RECORDS ===".to_string());
    lines.extend(results.missing.iter().map(record_line));

    lines.push("\n=== DIFFERENT RECORDS ===".to_string());
    for diff in &results.different {
        lines.push(format!("{} {}", diff.record.name, diff.record.rtype));
        lines.push(format!("  Source: {}", diff.source_value));
        lines.push(format!("  Dest:   {}", diff.dest_value));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::RecordDiff;
    use crate::zone::RecordClass;

    fn sample() -> ComparisonResult {
        ComparisonResult {
            matching: vec![DnsRecord::new(
                "www.example.com.",
                Some(300),
                RecordClass::IN,
                "A",
                "192.0.2.1",
            )],
            missing: vec![DnsRecord::new(
                "mail.example.com.",
                None,
                RecordClass::IN,
                "MX",
                "10 mx.example.com.",
            )],
            different: vec![RecordDiff {
                record: DnsRecord::new("ftp.example.com.", Some(60), RecordClass::IN, "A", "192.0.2.5"),
                source_value: "192.0.2.5".to_string(),
                dest_value: "192.0.2.6".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_names() {
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.file_name(), "dns-comparison.csv");
        assert_eq!(ExportFormat::Text.file_name(), "dns-comparison.text");
    }

    #[test]
    fn test_csv() {
        let csv = export_results(&sample(), ExportFormat::Csv);
        let expected = "\
Status,Name,Type,TTL,Data,Source Value,Dest Value
Matching,www.example.com.,A,300,192.0.2.1,,
Missing,mail.example.com.,MX,,10 mx.example.com.,,
Different,ftp.example.com.,A,60,,192.0.2.5,192.0.2.6";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_text() {
        let text = export_results(&sample(), ExportFormat::Text);
        let expected = "\
=== MATCHING RECORDS ===
www.example.com. 300 A 192.0.2.1

=== MISSING RECORDS ===
mail.example.com.  MX 10 mx.example.com.

=== DIFFERENT RECORDS ===
ftp.example.com. A
  Source: 192.0.2.5
  Dest:   192.0.2.6";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_empty_result_keeps_sections() {
        let text = export_results(&ComparisonResult::default(), ExportFormat::Text);
        assert_eq!(
            text,
            "=== MATCHING RECORDS ===\n\n=== MISSING RECORDS ===\n\n=== DIFFERENT RECORDS ==="
        );
    }

    #[test]
    fn test_json_field_names() {
        let json = export_results(&sample(), ExportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["matching"][0]["type"], "A");
        assert_eq!(value["matching"][0]["ttl"], 300);
        assert!(value["missing"][0].get("ttl").is_none());
        assert_eq!(value["different"][0]["sourceValue"], "192.0.2.5");
        assert_eq!(value["different"][0]["destValue"], "192.0.2.6");
        assert!(json.contains("\n  \"matching\": ["));
    }

    #[test]
    fn test_unknown_format_name_is_empty() {
        assert_eq!(export_named(&sample(), "xml"), "");
        assert!(!export_named(&sample(), "csv").is_empty());
    }
}
