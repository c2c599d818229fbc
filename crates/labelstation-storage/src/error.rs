use thiserror::Error;

/// Failures of the issuance record store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A query against the SQLite database failed
    #[error("issuance store query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// The embedded schema could not be applied
    #[error("issuance store schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A record was rejected before it reached the database
    #[error("invalid issuance record: {0}")]
    InvalidRecord(String),

    /// The database file could not be located or created
    #[error("cannot open issuance store at {path}: {reason}")]
    Location { path: String, reason: String },
}

impl StorageError {
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord(reason.into())
    }

    pub fn location(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Location {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the store could not be reached at all, as opposed to a
    /// query or record being refused.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Database(
                sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)
            ) | Self::Location { .. }
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_classification() {
        assert!(StorageError::Database(sqlx::Error::PoolClosed).is_unreachable());
        assert!(StorageError::location("/ro/station.db", "read-only").is_unreachable());
        assert!(!StorageError::invalid_record("empty barcode").is_unreachable());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_unreachable());
    }

    #[test]
    fn test_location_message_names_the_path() {
        let err = StorageError::location("/ro/station.db", "permission denied");
        assert_eq!(
            err.to_string(),
            "cannot open issuance store at /ro/station.db: permission denied"
        );
    }
}
