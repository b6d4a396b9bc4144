pub mod errors;
pub mod parser;
pub mod record;

pub use errors::{Result, ZoneError};
pub use parser::{ZoneParser, parse_zone};
pub use record::{DnsRecord, RecordClass};

/// Zone constants
pub mod constants {
    /// Default TTL until a `$TTL` directive is seen (1 hour)
    pub const DEFAULT_TTL: u32 = 3600;

    /// Origin used until a `$ORIGIN` directive is seen
    pub const DEFAULT_ORIGIN: &str = "@";

    /// Maximum zone file size (10MB)
    pub const MAX_ZONE_FILE_SIZE: u64 = 10 * 1024 * 1024;
}
