#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::{IssuanceRecord, NewIssuance};
use chrono::{Duration, Utc};
use labelstation_core::IssuanceStatus;
use labelstation_core::constants::MAX_RECENT_LIMIT;
use sqlx::SqlitePool;
use tracing::debug;

/// Repository trait for issuance records
///
/// Uses native async trait methods (Edition 2024), so implementations are
/// consumed through generics.
pub trait IssuanceRepository: Send + Sync {
    /// Insert or refresh the record for `issuance.barcode` with status
    /// `preready`, in one atomic statement.
    ///
    /// An existing row keeps its id and `created_at`; its scanner, station,
    /// timestamp and status are overwritten.
    async fn upsert_preready(&self, issuance: &NewIssuance) -> StorageResult<IssuanceRecord>;

    /// Find the record for a barcode
    async fn find_by_barcode(&self, barcode: &str) -> StorageResult<Option<IssuanceRecord>>;

    /// Records issued within the last `window_minutes`, newest first
    async fn list_recent(
        &self,
        limit: u32,
        window_minutes: u32,
    ) -> StorageResult<Vec<IssuanceRecord>>;

    /// Set the status of an existing record. Returns `false` if no record
    /// exists for the barcode.
    async fn update_status(&self, barcode: &str, status: &IssuanceStatus) -> StorageResult<bool>;

    /// Total number of records
    async fn count(&self) -> StorageResult<i64>;
}

/// SQLite implementation of IssuanceRepository
#[derive(Debug, Clone)]
pub struct SqliteIssuanceRepository {
    pool: SqlitePool,
}

impl SqliteIssuanceRepository {
    /// Create a new SQLite issuance repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl IssuanceRepository for SqliteIssuanceRepository {
    async fn upsert_preready(&self, issuance: &NewIssuance) -> StorageResult<IssuanceRecord> {
        if issuance.barcode.is_empty() {
            return Err(StorageError::invalid_record("barcode must not be empty"));
        }

        debug!(
            barcode = %issuance.barcode,
            station = %issuance.station_id,
            "Upserting preready issuance"
        );

        let record = sqlx::query_as::<_, IssuanceRecord>(
            r#"
            INSERT INTO ready_devices (
                barcode, scanner_id, scan_timestamp, station_id,
                status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (barcode) DO UPDATE SET
                scanner_id = excluded.scanner_id,
                scan_timestamp = excluded.scan_timestamp,
                station_id = excluded.station_id,
                status = excluded.status,
                updated_at = excluded.updated_at
            RETURNING id, barcode, scanner_id, scan_timestamp, station_id,
                      status, created_at, updated_at
            "#,
        )
        .bind(&issuance.barcode)
        .bind(&issuance.scanner_id)
        .bind(issuance.scan_timestamp)
        .bind(&issuance.station_id)
        .bind(IssuanceStatus::Preready.as_str())
        .bind(issuance.scan_timestamp)
        .bind(issuance.scan_timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_barcode(&self, barcode: &str) -> StorageResult<Option<IssuanceRecord>> {
        let record = sqlx::query_as::<_, IssuanceRecord>(
            r#"
            SELECT id, barcode, scanner_id, scan_timestamp, station_id,
                   status, created_at, updated_at
            FROM ready_devices
            WHERE barcode = ?
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_recent(
        &self,
        limit: u32,
        window_minutes: u32,
    ) -> StorageResult<Vec<IssuanceRecord>> {
        let since = Utc::now() - Duration::minutes(i64::from(window_minutes));
        let limit = limit.min(MAX_RECENT_LIMIT);

        let records = sqlx::query_as::<_, IssuanceRecord>(
            r#"
            SELECT id, barcode, scanner_id, scan_timestamp, station_id,
                   status, created_at, updated_at
            FROM ready_devices
            WHERE scan_timestamp >= ?
            ORDER BY scan_timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(since)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn update_status(&self, barcode: &str, status: &IssuanceStatus) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ready_devices
            SET status = ?, updated_at = ?
            WHERE barcode = ?
            "#,
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(barcode)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StorageResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ready_devices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
