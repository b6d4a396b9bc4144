pub mod compare;
pub mod config;
pub mod dns;
pub mod doh;
pub mod error;
pub mod export;
pub mod http_server;
pub mod zone;

pub use compare::{ComparisonResult, RecordDiff, compare_records};
pub use export::{ExportFormat, export_results};
pub use zone::{DnsRecord, RecordClass, ZoneParser, parse_zone};
