// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backup adapter over `pg_dump`.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use pgmirror_core::config::SourceConfig;
use pgmirror_core::error::ToolError;
use pgmirror_core::ports::{BackupArtifact, BackupTool};

use crate::command;

/// Dumps the source database in PostgreSQL custom format (`-F c`), which is
/// what `pg_restore -j` requires.
pub struct PgDump {
    /// Directory the dump file is written into.
    output_dir: PathBuf,
}

impl PgDump {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Dump into the system temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    fn artifact_path(&self, database: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.output_dir
            .join(format!("pgmirror_{database}_{stamp}.dump"))
    }
}

#[async_trait]
impl BackupTool for PgDump {
    async fn create(&self, source: &SourceConfig) -> Result<BackupArtifact, ToolError> {
        let path = self.artifact_path(&source.database);

        let mut cmd = command::connect_command("pg_dump", &source.server);
        cmd.arg("-d")
            .arg(&source.database)
            .arg("-F")
            .arg("c")
            .arg("-f")
            .arg(&path);

        debug!(database = %source.database, path = %path.display(), "invoking pg_dump");
        let output = command::run("pg_dump", &mut cmd).await?;

        if let Err(e) = command::require_success("pg_dump", &output) {
            // pg_dump may leave a partial file behind on failure.
            match std::fs::remove_file(&path) {
                Ok(()) => warn!(path = %path.display(), "removed partial dump file"),
                Err(io) if io.kind() == std::io::ErrorKind::NotFound => {}
                Err(io) => warn!(path = %path.display(), error = %io, "could not remove partial dump file"),
            }
            return Err(e);
        }

        let metadata = std::fs::metadata(&path).map_err(|e| ToolError::Io {
            tool: "pg_dump",
            source: e,
        })?;
        let size_bytes = metadata.len() as i64;

        info!(
            database = %source.database,
            path = %path.display(),
            size_bytes,
            "pg_dump completed"
        );

        Ok(BackupArtifact {
            path,
            size_bytes,
            created_at: Utc::now(),
        })
    }
}
