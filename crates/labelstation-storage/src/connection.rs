use crate::error::{StorageError, StorageResult};
use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Where the issuance store lives and how the station talks to it.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Pool size. A station issues one label at a time, so this stays small.
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long a statement waits on a database locked by another station process
    pub busy_timeout: Duration,
    pub create_if_missing: bool,
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("labelstation.db")
    }
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
            auto_migrate: true,
        }
    }

    pub fn max_connections(self, max_connections: u32) -> Self {
        Self { max_connections, ..self }
    }

    pub fn acquire_timeout(self, acquire_timeout: Duration) -> Self {
        Self { acquire_timeout, ..self }
    }

    /// Open an existing store only; never create the file.
    pub fn existing_only(self) -> Self {
        Self {
            create_if_missing: false,
            ..self
        }
    }

    /// Skip applying the embedded schema on open.
    pub fn without_migrations(self) -> Self {
        Self {
            auto_migrate: false,
            ..self
        }
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
            .disable_statement_logging()
    }
}

/// Handle on the issuance store's connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and by default create and migrate) the store described by `config`.
    ///
    /// ```no_run
    /// use labelstation_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::open(DatabaseConfig::new("/var/lib/labelstation/station.db")).await?;
    /// db.health_check().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(config: DatabaseConfig) -> StorageResult<Self> {
        if config.create_if_missing {
            ensure_parent_dir(&config.path)
                .map_err(|e| StorageError::location(config.display_path(), e))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| StorageError::location(config.display_path(), e))?;

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }

        info!(path = %config.display_path(), "Opened issuance store");
        Ok(db)
    }

    /// A private store that disappears when the handle is dropped.
    ///
    /// Backed by one connection that is never recycled; closing it would
    /// discard the data.
    pub async fn in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the schema under the workspace `migrations/` directory, embedded at compile time.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        debug!("Issuance store schema is current");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool. Queries made afterwards fail with `sqlx::Error::PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_defaults() {
        let config = DatabaseConfig::default();

        assert_eq!(config.path, PathBuf::from("labelstation.db"));
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert!(config.create_if_missing);
        assert!(config.auto_migrate);
    }

    #[test]
    fn test_builders_keep_other_settings() {
        let config = DatabaseConfig::new("station/test.db")
            .max_connections(2)
            .existing_only()
            .without_migrations();

        assert_eq!(config.path, PathBuf::from("station/test.db"));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
        assert!(!config.create_if_missing);
        assert!(!config.auto_migrate);
    }

    #[tokio::test]
    async fn test_missing_store_is_reported_by_location() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig::new(dir.path().join("absent").join("station.db"))
            .acquire_timeout(Duration::from_secs(2))
            .existing_only();

        let err = Database::open(config).await.unwrap_err();
        assert!(err.is_unreachable(), "{err}");
    }
}
