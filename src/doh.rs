//! Live destination records from DNS-over-HTTPS
//!
//! The proxy (see [`crate::http_server`]) passes through the JSON format of
//! DNS-over-HTTPS gateways (`application/dns-json`). [`DohClient`] asks the
//! proxy about every distinct `(name, type)` of a source record set and maps
//! the answers into [`DnsRecord`] values for comparison.

use crate::config::ZoneDiffConfig;
use crate::dns::enums::type_name;
use crate::error::{QueryError, Result};
use crate::zone::{DnsRecord, RecordClass};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path of the query endpoint on the proxy
pub const QUERY_PATH: &str = "/api/query";

/// JSON DNS response as returned by DoH gateways
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DohResponse {
    #[serde(rename = "Status", default)]
    pub status: u16,
    #[serde(rename = "Answer", default, skip_serializing_if = "Vec::is_empty")]
    pub answer: Vec<DohAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DohAnswer {
    pub name: String,
    /// Numeric RR type code
    #[serde(rename = "type")]
    pub rtype: u16,
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,
    pub data: String,
}

impl DohAnswer {
    pub fn to_record(&self) -> DnsRecord {
        DnsRecord::new(
            self.name.as_str(),
            self.ttl,
            RecordClass::IN,
            &type_name(self.rtype),
            &self.data,
        )
    }
}

impl DohResponse {
    /// All answers as records, in answer order
    pub fn to_records(&self) -> Vec<DnsRecord> {
        self.answer.iter().map(DohAnswer::to_record).collect()
    }
}

/// Distinct `(name, type)` pairs of a record set, in order of first
/// occurrence. Names and types are compared exactly as written.
pub fn unique_queries(records: &[DnsRecord]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert((record.name.as_str(), record.rtype.as_str())))
        .map(|record| (record.name.clone(), record.rtype.clone()))
        .collect()
}

#[derive(Deserialize)]
struct ProxyError {
    error: String,
}

/// Client for the DNS query proxy
#[derive(Debug, Clone)]
pub struct DohClient {
    client: reqwest::Client,
    query_url: String,
    max_concurrent: usize,
}

impl DohClient {
    pub fn new(proxy_url: &str, timeout: Duration, max_concurrent: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zonediff/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            query_url: format!("{}{}", proxy_url.trim_end_matches('/'), QUERY_PATH),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn from_config(config: &ZoneDiffConfig) -> Self {
        Self::new(
            &config.proxy_url,
            config.upstream_timeout,
            config.max_concurrent_queries,
        )
    }

    /// Query the proxy for one name and type
    pub async fn query(&self, name: &str, rtype: &str) -> Result<Vec<DnsRecord>> {
        let response = self
            .client
            .get(&self.query_url)
            .query(&[("name", name), ("type", rtype)])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ProxyError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(QueryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let doh: DohResponse = serde_json::from_slice(&body)?;
        debug!(
            "{} {}: status {}, {} answers",
            name,
            rtype,
            doh.status,
            doh.answer.len()
        );

        Ok(doh.to_records())
    }

    /// Fetch live records for every distinct name and type in `source`.
    ///
    /// Failed queries are logged and skipped, so the result may be partial.
    /// Records come back grouped by query, in order of first occurrence.
    pub async fn fetch_records(&self, source: &[DnsRecord]) -> Vec<DnsRecord> {
        let queries = unique_queries(source);
        info!(
            "Querying {} distinct names via {}",
            queries.len(),
            self.query_url
        );

        let results: Vec<_> = stream::iter(queries)
            .map(|(name, rtype)| async move {
                let result = self.query(&name, &rtype).await;
                (name, rtype, result)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut records = Vec::new();
        for (name, rtype, result) in results {
            match result {
                Ok(answers) => records.extend(answers),
                Err(e) => warn!("Failed to query {} {}: {}", name, rtype, e),
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_doh_json() {
        let body = r#"{
            "Status": 0,
            "TC": false,
            "RD": true,
            "RA": true,
            "Question": [{"name": "example.com", "type": 15}],
            "Answer": [
                {"name": "example.com", "type": 15, "TTL": 300, "data": "10 mail.example.com."},
                {"name": "example.com", "type": 46, "TTL": 300, "data": "MX 13 2 300 ..."}
            ]
        }"#;

        let response: DohResponse = serde_json::from_str(body).unwrap();
        let records = response.to_records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "example.com");
        assert_eq!(records[0].rtype, "MX");
        assert_eq!(records[0].ttl, Some(300));
        assert_eq!(records[0].class, RecordClass::IN);
        assert_eq!(records[0].data, "10 mail.example.com.");
        assert_eq!(records[1].rtype, "46");
    }

    #[test]
    fn test_parse_doh_json_without_answer() {
        let response: DohResponse = serde_json::from_str(r#"{"Status": 3}"#).unwrap();
        assert_eq!(response.status, 3);
        assert!(response.to_records().is_empty());
    }

    #[test]
    fn test_unique_queries_keeps_first_occurrence_order() {
        let records = vec![
            DnsRecord::new("@", None, RecordClass::IN, "NS", "ns1."),
            DnsRecord::new("www", None, RecordClass::IN, "A", "1.1.1.1"),
            DnsRecord::new("@", None, RecordClass::IN, "NS", "ns2."),
            DnsRecord::new("WWW", None, RecordClass::IN, "A", "1.1.1.1"),
        ];

        assert_eq!(
            unique_queries(&records),
            vec![
                ("@".to_string(), "NS".to_string()),
                ("www".to_string(), "A".to_string()),
                ("WWW".to_string(), "A".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_url() {
        let client = DohClient::new("http://127.0.0.1:8080/", Duration::from_secs(1), 0);
        assert_eq!(client.query_url, "http://127.0.0.1:8080/api/query");
        assert_eq!(client.max_concurrent, 1);
    }
}
