// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Target-server administration over `psql`.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use pgmirror_core::config::ServerConfig;
use pgmirror_core::error::ToolError;
use pgmirror_core::ports::DatabaseAdmin;

use crate::command;

/// Maintenance database used for statements that cannot run inside the
/// database they act on.
const ADMIN_DATABASE: &str = "postgres";

/// Create/drop/probe databases by driving `psql` against the maintenance
/// database.
pub struct PsqlAdmin;

impl PsqlAdmin {
    /// Run one SQL statement through `psql -tAc` and return trimmed stdout.
    async fn run_sql(
        &self,
        server: &ServerConfig,
        sql: &str,
    ) -> Result<std::process::Output, ToolError> {
        let mut cmd = command::connect_command("psql", server);
        cmd.arg("-d").arg(ADMIN_DATABASE).arg("-tAc").arg(sql);
        debug!(sql, "invoking psql");
        command::run("psql", &mut cmd).await
    }
}

#[async_trait]
impl DatabaseAdmin for PsqlAdmin {
    async fn database_exists(
        &self,
        server: &ServerConfig,
        database: &str,
    ) -> Result<bool, ToolError> {
        let sql = format!("SELECT 1 FROM pg_database WHERE datname = '{database}'");
        let output = self.run_sql(server, &sql).await?;
        // The probe trusts stdout, not the exit status: a row means the
        // database exists, anything else means it does not.
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim() == "1")
    }

    async fn create_database(
        &self,
        server: &ServerConfig,
        database: &str,
    ) -> Result<(), ToolError> {
        let output = self
            .run_sql(server, &format!("CREATE DATABASE \"{database}\""))
            .await?;
        command::require_success("psql", &output)?;
        info!(database, "database created");
        Ok(())
    }

    async fn recreate_database(
        &self,
        server: &ServerConfig,
        database: &str,
    ) -> Result<(), ToolError> {
        // Best-effort connection termination first; DROP fails on a busy
        // database otherwise. New connections can still slip in before the
        // drop, in which case the drop itself reports the failure.
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
             WHERE datname = '{database}' AND pid <> pg_backend_pid()"
        );
        match self.run_sql(server, &terminate).await {
            Ok(output) if output.status.success() => {}
            Ok(output) => warn!(
                database,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "could not terminate active connections"
            ),
            Err(e) => warn!(database, error = %e, "could not terminate active connections"),
        }

        let output = self
            .run_sql(server, &format!("DROP DATABASE IF EXISTS \"{database}\""))
            .await?;
        command::require_success("psql", &output)?;
        info!(database, "database dropped");

        self.create_database(server, database).await
    }
}
