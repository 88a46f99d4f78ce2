//! Error types for the migration engine

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error coming from a collaborator (store, encoder)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a migration run or its configuration
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The record source could not be acquired
    #[error("File {} could not be opened", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be read from an open source
    #[error("Failed to read record {record}")]
    SourceRead {
        record: u64,
        #[source]
        source: BoxError,
    },

    /// The fixture destination could not be opened for writing
    #[error("Fixture destination {} could not be opened", .path.display())]
    DestinationOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the encoded fixture failed after the destination was opened
    #[error("Failed to write fixture {}", .path.display())]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store refused an entity
    #[error("Failed to persist {type_name} from record {record}")]
    Persistence {
        type_name: String,
        record: u64,
        #[source]
        source: BoxError,
    },

    /// Fixture document could not be encoded
    #[error("Failed to encode fixture: {0}")]
    Encode(String),

    /// Writing to the dry-run report stream failed
    #[error("Failed to write fixture report")]
    Report(#[source] std::io::Error),

    /// No entity type registered under this name
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A mapped field has no setter on the entity type
    #[error("Entity type {type_name} has no setter for field '{field}'")]
    UnknownField { type_name: String, field: String },
}

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// True for failures at an I/O boundary (source, destination, store)
    pub fn is_io_boundary(&self) -> bool {
        matches!(
            self,
            MigrateError::SourceOpen { .. }
                | MigrateError::SourceRead { .. }
                | MigrateError::DestinationOpen { .. }
                | MigrateError::DestinationWrite { .. }
                | MigrateError::Persistence { .. }
                | MigrateError::Report(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_open_message_names_file() {
        let err = MigrateError::SourceOpen {
            path: PathBuf::from("people.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "File people.csv could not be opened");
        assert!(err.is_io_boundary());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_configuration_errors_are_not_io() {
        let err = MigrateError::UnknownField {
            type_name: "Person".to_string(),
            field: "age".to_string(),
        };
        assert!(!err.is_io_boundary());
        assert_eq!(err.to_string(), "Entity type Person has no setter for field 'age'");
    }
}
