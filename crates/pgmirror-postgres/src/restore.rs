// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Restore adapter over `pg_restore`.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use pgmirror_core::classify::{MAX_REPORTED_ERRORS, RestoreVerdict, classify};
use pgmirror_core::config::ServerConfig;
use pgmirror_core::error::ToolError;
use pgmirror_core::ports::RestoreTool;

use crate::command;

/// Restores a custom-format dump with `pg_restore -j`, dropping ownership
/// and ACL statements since the target server has a different role setup.
pub struct PgRestore;

#[async_trait]
impl RestoreTool for PgRestore {
    async fn restore(
        &self,
        artifact: &Path,
        server: &ServerConfig,
        database: &str,
        parallel_jobs: u32,
    ) -> Result<bool, ToolError> {
        let mut cmd = command::connect_command("pg_restore", server);
        cmd.arg("-d")
            .arg(database)
            .arg("-j")
            .arg(parallel_jobs.to_string())
            .arg("--no-owner")
            .arg("--no-acl")
            .arg(artifact);

        debug!(database, jobs = parallel_jobs, "invoking pg_restore");
        let output = command::run("pg_restore", &mut cmd).await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(exit_code, stderr = %stderr, "pg_restore finished");

        match classify(&stderr, exit_code) {
            RestoreVerdict::Ok => {
                info!(database, "restore clean");
                Ok(true)
            }
            RestoreVerdict::OkWithWarnings(count) => {
                warn!(
                    database,
                    ignored_errors = count,
                    "restore succeeded with ignored errors (ownership/permission noise)"
                );
                Ok(true)
            }
            RestoreVerdict::Critical(lines) => {
                for line in lines.iter().take(MAX_REPORTED_ERRORS) {
                    error!(database, "{line}");
                }
                if lines.len() > MAX_REPORTED_ERRORS {
                    error!(
                        database,
                        additional = lines.len() - MAX_REPORTED_ERRORS,
                        "further critical restore errors suppressed"
                    );
                }
                if lines.is_empty() {
                    error!(database, exit_code, "pg_restore failed without attributable errors");
                }
                Ok(false)
            }
        }
    }
}
