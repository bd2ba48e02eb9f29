// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client tool availability checks.
//!
//! Run before a mirror starts so a missing `pg_restore` is reported up
//! front instead of after a multi-gigabyte dump.

use tokio::process::Command;
use tracing::{debug, info};

/// Client tools a mirror run depends on.
pub const REQUIRED_TOOLS: [&str; 3] = ["pg_dump", "pg_restore", "psql"];

/// Outcome of probing one tool with `--version`.
#[derive(Debug, Clone)]
pub struct ToolReport {
    pub tool: &'static str,
    /// First line of `--version` output when the tool responded.
    pub version: Option<String>,
}

impl ToolReport {
    pub fn available(&self) -> bool {
        self.version.is_some()
    }
}

/// Probe every required tool. Returns one report per tool; callers decide
/// whether a missing tool is fatal.
pub async fn verify_client_tools() -> Vec<ToolReport> {
    let mut reports = Vec::with_capacity(REQUIRED_TOOLS.len());
    for tool in REQUIRED_TOOLS {
        let version = probe(tool).await;
        match &version {
            Some(v) => info!(tool, version = %v, "client tool available"),
            None => debug!(tool, "client tool not found"),
        }
        reports.push(ToolReport { tool, version });
    }
    reports
}

async fn probe(tool: &'static str) -> Option<String> {
    let output = Command::new(tool).arg("--version").output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().next().map(|line| line.trim().to_string())
}

/// Human-oriented installation hint for the missing tools.
pub fn installation_hint(missing: &[&str]) -> String {
    format!(
        "missing PostgreSQL client tools: {}. Install the postgresql client \
         package (e.g. `apt install postgresql-client` or `brew install libpq`) \
         and make sure the binaries are on PATH.",
        missing.join(", ")
    )
}
