//! Record comparison engine
//!
//! Classifies every record of a source set against a destination set. The
//! comparison is driven by the source: records that only exist in the
//! destination are never reported.

use crate::zone::DnsRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A source record whose key exists in the destination with other data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDiff {
    pub record: DnsRecord,
    pub source_value: String,
    /// Data of the first destination record sharing the key
    pub dest_value: String,
}

/// Outcome of comparing a source record set against a destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub matching: Vec<DnsRecord>,
    pub missing: Vec<DnsRecord>,
    pub different: Vec<RecordDiff>,
}

/// Bucket sizes of a comparison result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub matching: usize,
    pub missing: usize,
    pub different: usize,
    pub total: usize,
}

impl ComparisonResult {
    pub fn summary(&self) -> ComparisonSummary {
        ComparisonSummary {
            matching: self.matching.len(),
            missing: self.missing.len(),
            different: self.different.len(),
            total: self.matching.len() + self.missing.len() + self.different.len(),
        }
    }

    /// True when every source record was found with equal data
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.different.is_empty()
    }
}

/// Compare source records (the source of truth) against destination records.
///
/// Records are correlated by [`DnsRecord::key`]. For each source record, in
/// source order:
/// - no destination record shares its key: `missing`
/// - some destination record with that key has equal normalized data:
///   `matching` (the first such record wins)
/// - otherwise `different`, reporting the data of the first destination
///   record under that key
pub fn compare_records(source: &[DnsRecord], destination: &[DnsRecord]) -> ComparisonResult {
    let mut dest_map: HashMap<String, Vec<&DnsRecord>> = HashMap::new();
    for record in destination {
        dest_map.entry(record.key()).or_default().push(record);
    }

    let mut result = ComparisonResult::default();

    for record in source {
        let candidates = match dest_map.get(&record.key()) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => {
                result.missing.push(record.clone());
                continue;
            }
        };

        let source_data = normalize_record_data(&record.data);
        let found = candidates
            .iter()
            .any(|dest| normalize_record_data(&dest.data) == source_data);

        if found {
            result.matching.push(record.clone());
        } else {
            result.different.push(RecordDiff {
                record: record.clone(),
                source_value: record.data.clone(),
                dest_value: candidates[0].data.clone(),
            });
        }
    }

    debug!(
        "Compared {} source records against {} destination records: {} matching, {} missing, {} different",
        source.len(),
        destination.len(),
        result.matching.len(),
        result.missing.len(),
        result.different.len()
    );

    result
}

/// Normalize record data for equality: trimmed, lowercased and without one
/// trailing dot. Internal whitespace and quoting are left alone.
pub fn normalize_record_data(data: &str) -> String {
    let data = data.trim().to_lowercase();
    match data.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::RecordClass;

    fn record(name: &str, rtype: &str, data: &str) -> DnsRecord {
        DnsRecord::new(name, Some(300), RecordClass::IN, rtype, data)
    }

    #[test]
    fn test_normalize_record_data() {
        assert_eq!(normalize_record_data(" 1.2.3.4. "), "1.2.3.4");
        assert_eq!(normalize_record_data("Mail.Example.COM."), "mail.example.com");
        assert_eq!(normalize_record_data("example.com.."), "example.com.");
        assert_eq!(normalize_record_data("10  mail"), "10  mail");
        assert_eq!(normalize_record_data(""), "");
    }

    #[test]
    fn test_empty_inputs() {
        let result = compare_records(&[], &[]);
        assert_eq!(result, ComparisonResult::default());
        assert!(result.is_clean());
    }

    #[test]
    fn test_first_match_in_bucket_wins() {
        let source = vec![record("@", "NS", "ns2.example.com.")];
        let destination = vec![
            record("@", "NS", "ns1.example.com."),
            record("@", "NS", "ns2.example.com"),
            record("@", "NS", "NS2.example.com."),
        ];

        let result = compare_records(&source, &destination);
        assert_eq!(result.matching, source);
        assert!(result.different.is_empty());
    }

    #[test]
    fn test_different_reports_first_bucket_entry() {
        let source = vec![record("@", "MX", "10 mail.example.com.")];
        let destination = vec![
            record("@", "MX", "20 backup.example.com."),
            record("@", "MX", "30 other.example.com."),
        ];

        let result = compare_records(&source, &destination);
        assert_eq!(result.different.len(), 1);
        assert_eq!(result.different[0].source_value, "10 mail.example.com.");
        assert_eq!(result.different[0].dest_value, "20 backup.example.com.");
    }

    #[test]
    fn test_txt_quoting_is_significant() {
        let source = vec![record("@", "TXT", "\"v=spf1 -all\"")];
        let destination = vec![record("@", "TXT", "v=spf1 -all")];

        let result = compare_records(&source, &destination);
        assert_eq!(result.different.len(), 1);
    }

    #[test]
    fn test_summary() {
        let source = vec![
            record("a", "A", "1.1.1.1"),
            record("b", "A", "2.2.2.2"),
            record("c", "A", "3.3.3.3"),
        ];
        let destination = vec![record("a", "A", "1.1.1.1"), record("b", "A", "9.9.9.9")];

        let summary = compare_records(&source, &destination).summary();
        assert_eq!(
            summary,
            ComparisonSummary {
                matching: 1,
                missing: 1,
                different: 1,
                total: 3,
            }
        );
    }
}
