//! Error types for the migration library.

use thiserror::Error;

use crate::endpoint::Endpoint;

/// Exit code for configuration errors (invalid YAML, bad fixtures).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for rejected or malformed connection strings.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for migrations whose source table holds no rows.
pub const EXIT_EMPTY_SOURCE: u8 = 3;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;
/// Exit code for anything else.
pub const EXIT_UNKNOWN_ERROR: u8 = 10;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Connection string is blank after trimming.
    #[error("Connection string cannot be empty")]
    EmptyConnection,

    /// Connection string lacks the postgres backend marker.
    #[error("Connection string must include postgres or postgresql")]
    UnsupportedScheme,

    /// Catalog or row request made against an unvalidated or rejected connection.
    #[error("Connection rejected for {endpoint}: {reason}")]
    ConnectionRejected { endpoint: Endpoint, reason: String },

    /// Migration attempted against a source table with zero rows.
    #[error("No data found in the source table {table}")]
    EmptySource { table: String },

    /// Unexpected failure from the I/O layer, carrying its original message.
    #[error("Unknown failure: {0}")]
    Unknown(String),

    /// Configuration error (invalid YAML, duplicate tables, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a ConnectionRejected error for an endpoint.
    pub fn rejected(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        MigrateError::ConnectionRejected {
            endpoint,
            reason: reason.into(),
        }
    }

    /// Wrap an unexpected failure message.
    pub fn unknown(message: impl Into<String>) -> Self {
        MigrateError::Unknown(message.into())
    }

    /// True for errors caused by the connection string or connection state.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            MigrateError::EmptyConnection
                | MigrateError::UnsupportedScheme
                | MigrateError::ConnectionRejected { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => EXIT_CONFIG_ERROR,
            e if e.is_connection_error() => EXIT_CONNECTION_ERROR,
            MigrateError::EmptySource { .. } => EXIT_EMPTY_SOURCE,
            MigrateError::Io(_) => EXIT_IO_ERROR,
            _ => EXIT_UNKNOWN_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::EmptyConnection.exit_code(), EXIT_CONNECTION_ERROR);
        assert_eq!(MigrateError::UnsupportedScheme.exit_code(), EXIT_CONNECTION_ERROR);
        assert_eq!(
            MigrateError::rejected(Endpoint::Target, "bad").exit_code(),
            EXIT_CONNECTION_ERROR
        );
        assert_eq!(
            MigrateError::EmptySource {
                table: "orders".into()
            }
            .exit_code(),
            EXIT_EMPTY_SOURCE
        );
        assert_eq!(MigrateError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(MigrateError::unknown("boom").exit_code(), EXIT_UNKNOWN_ERROR);
    }

    #[test]
    fn test_messages_name_the_failed_precondition() {
        let err = MigrateError::rejected(Endpoint::Source, "not connected");
        assert_eq!(err.to_string(), "Connection rejected for source: not connected");

        let err = MigrateError::EmptySource {
            table: "orders".into(),
        };
        assert!(err.to_string().contains("orders"));

        let err = MigrateError::unknown("socket closed");
        assert!(err.format_detailed().starts_with("Error: Unknown failure: socket closed"));
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.yaml");
        let err = MigrateError::Io(io);
        let detailed = err.format_detailed();
        assert!(detailed.contains("IO error: missing.yaml"));
    }
}
