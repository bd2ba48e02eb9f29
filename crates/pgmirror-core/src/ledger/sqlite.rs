//! SQLite-backed audit ledger.
//!
//! One append-only table keyed by an auto-incrementing id. Updates are
//! single statements so concurrent runs can never interleave a partial
//! write within one record; `extra` merges through SQLite's `json_patch`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::{BackupRecord, BackupStatus, ConnectionDescriptor, Ledger};
use crate::error::LedgerError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS backups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    host TEXT NOT NULL,
    port INTEGER NOT NULL,
    database TEXT NOT NULL,
    username TEXT NOT NULL,
    backup_path TEXT NOT NULL,
    size_bytes INTEGER,
    status TEXT NOT NULL,
    extra TEXT
)
"#;

/// SQLite-backed ledger.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Wrap an existing pool, applying the schema.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, LedgerError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Open (or create) the ledger database at `path`.
    ///
    /// Creates parent directories as needed and applies the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Storage {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Default ledger location: `$PG_MIRROR_HISTORY_DB` if set, otherwise
    /// `~/.pg_mirror/pg_mirror.db`.
    pub fn default_path() -> PathBuf {
        if let Some(overridden) = std::env::var_os("PG_MIRROR_HISTORY_DB") {
            return PathBuf::from(overridden);
        }
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(".pg_mirror").join("pg_mirror.db")
    }
}

#[async_trait::async_trait]
impl Ledger for SqliteLedger {
    async fn record_backup(
        &self,
        connection: &ConnectionDescriptor,
        backup_path: &str,
        size_bytes: Option<i64>,
        status: BackupStatus,
    ) -> Result<i64, LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO backups (created_at, host, port, database, username,
                                 backup_path, size_bytes, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Utc::now())
        .bind(&connection.host)
        .bind(connection.port as i64)
        .bind(&connection.database)
        .bind(&connection.username)
        .bind(backup_path)
        .bind(size_bytes)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_backup(
        &self,
        id: i64,
        status: Option<BackupStatus>,
        extra: Option<&Value>,
    ) -> Result<bool, LedgerError> {
        let result = match (status, extra) {
            (None, None) => return Ok(false),
            (Some(status), None) => {
                sqlx::query("UPDATE backups SET status = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            (None, Some(extra)) => {
                sqlx::query(
                    "UPDATE backups SET extra = json_patch(COALESCE(extra, '{}'), ?) WHERE id = ?",
                )
                .bind(extra.to_string())
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            (Some(status), Some(extra)) => {
                sqlx::query(
                    r#"
                    UPDATE backups
                    SET status = ?, extra = json_patch(COALESCE(extra, '{}'), ?)
                    WHERE id = ?
                    "#,
                )
                .bind(status.as_str())
                .bind(extra.to_string())
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    async fn get_backup(&self, id: i64) -> Result<Option<BackupRecord>, LedgerError> {
        let record = sqlx::query_as::<_, BackupRecord>(
            r#"
            SELECT id, created_at, host, port, database, username,
                   backup_path, size_bytes, status, extra
            FROM backups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
