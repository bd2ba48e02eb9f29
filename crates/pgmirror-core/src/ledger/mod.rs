//! Audit ledger for backup and provisioning outcomes.
//!
//! Every backup gets exactly one durable record, created right after the
//! dump and mutated in place as later stages complete. Records are never
//! deleted by this system. Independent workflow runs may share the store
//! concurrently; each run owns exactly one record by id.

pub mod sqlite;

pub use self::sqlite::SqliteLedger;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::LedgerError;

/// Lifecycle status of a backup record.
///
/// `created` -> {`hooks_skipped` | `hooks_completed` | `hooks_failed`}.
/// A record whose run never reaches provisioning stays `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    Created,
    HooksSkipped,
    HooksCompleted,
    HooksFailed,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::HooksSkipped => "hooks_skipped",
            Self::HooksCompleted => "hooks_completed",
            Self::HooksFailed => "hooks_failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "hooks_skipped" => Some(Self::HooksSkipped),
            "hooks_completed" => Some(Self::HooksCompleted),
            "hooks_failed" => Some(Self::HooksFailed),
            _ => None,
        }
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection descriptor stored with each record. The password is
/// deliberately not part of it.
#[derive(Debug, Clone)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
}

/// One row of the `backups` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BackupRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub host: String,
    pub port: i64,
    pub database: String,
    pub username: String,
    pub backup_path: String,
    pub size_bytes: Option<i64>,
    pub status: String,
    /// Open-ended key/value extra data, serialized as JSON text
    /// (provisioning correlation ids, error text).
    pub extra: Option<String>,
}

impl BackupRecord {
    /// The extra-data map, parsed. `None` when absent or unparsable.
    pub fn extra_json(&self) -> Option<Value> {
        self.extra
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Durable append/update store for backup records.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Create a record and return its identifier.
    async fn record_backup(
        &self,
        connection: &ConnectionDescriptor,
        backup_path: &str,
        size_bytes: Option<i64>,
        status: BackupStatus,
    ) -> Result<i64, LedgerError>;

    /// Merge the given fields into an existing record. `extra` merges
    /// key-by-key into the stored map. A call with neither field is a no-op
    /// returning false; so is an unknown id.
    async fn update_backup(
        &self,
        id: i64,
        status: Option<BackupStatus>,
        extra: Option<&Value>,
    ) -> Result<bool, LedgerError>;

    async fn get_backup(&self, id: i64) -> Result<Option<BackupRecord>, LedgerError>;
}
