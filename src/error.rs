//! Error taxonomy shared by every pipeline stage
//!
//! Each variant names the stage that failed. Whether a failure aborts the run
//! or only skips the current item is decided by the pipeline's
//! [`FailurePolicy`](crate::etl::FailurePolicy), not by the error itself.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required setting is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// The database or warehouse could not be reached or rejected the credentials
    #[error("connection error: {0}")]
    Connection(String),

    /// A SQL statement against the source failed
    #[error("query error: {0}")]
    Query(String),

    /// An input file could not be parsed into a dataset
    #[error("parse error: {0}")]
    Parse(String),

    /// Writing to (or counting rows in) the destination failed
    #[error("load error: {0}")]
    Load(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short label for the failing stage, used in run reports
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Connection(_) => "connection",
            Self::Query(_) => "query",
            Self::Parse(_) => "parse",
            Self::Load(_) => "load",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_stage() {
        let err = Error::Parse("bad.csv: found record with 3 fields".to_string());
        assert_eq!(
            err.to_string(),
            "parse error: bad.csv: found record with 3 fields"
        );
        assert_eq!(err.stage(), "parse");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert_eq!(err.stage(), "io");
        assert_eq!(err.to_string(), "denied");
    }
}
