use thiserror::Error;

/// Errors raised while loading zone file content.
///
/// Parsing itself never fails; these only cover getting the text in.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Zone file too large
    #[error("Zone file exceeds maximum size ({size} bytes, limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, ZoneError>;
