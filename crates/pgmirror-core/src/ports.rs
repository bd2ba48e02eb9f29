// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Collaborator ports consumed by the workflow controller.
//!
//! The controller only ever sees these traits; the pgmirror-postgres crate
//! implements the tool ports over pg_dump/pg_restore/psql, and the
//! pgmirror-provisioning crate implements [`ProvisioningHooks`] over the
//! remote subscriptions service. Tests inject fakes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::{ServerConfig, SourceConfig};
use crate::error::{HookError, ToolError};

/// A backup artifact written to local disk by the backup collaborator.
///
/// The workflow controller owns the artifact from creation until cleanup;
/// deletion is guaranteed on every exit path.
#[derive(Debug, Clone)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Dumps a source database to a local artifact.
#[async_trait]
pub trait BackupTool: Send + Sync {
    async fn create(&self, source: &SourceConfig) -> Result<BackupArtifact, ToolError>;
}

/// Existence probe and create/recreate operations against the target server.
#[async_trait]
pub trait DatabaseAdmin: Send + Sync {
    async fn database_exists(
        &self,
        server: &ServerConfig,
        database: &str,
    ) -> Result<bool, ToolError>;

    async fn create_database(&self, server: &ServerConfig, database: &str)
    -> Result<(), ToolError>;

    /// Terminate active connections, drop, and create from scratch.
    ///
    /// Termination is an advisory precondition, not a guarantee: new
    /// connections may arrive between the terminate and the drop, and a
    /// failing terminate is logged, not fatal.
    async fn recreate_database(
        &self,
        server: &ServerConfig,
        database: &str,
    ) -> Result<(), ToolError>;
}

/// Restores an artifact into a target database.
#[async_trait]
pub trait RestoreTool: Send + Sync {
    /// Returns the classifier's success boolean. Diagnostic detail is
    /// logged by the implementation; the controller only observes the
    /// boolean.
    async fn restore(
        &self,
        artifact: &Path,
        server: &ServerConfig,
        database: &str,
        parallel_jobs: u32,
    ) -> Result<bool, ToolError>;
}

/// In-memory result of one completed provisioning chain run. Discarded
/// after being folded into the audit record and the chosen target name.
#[derive(Debug, Clone)]
pub struct ProvisioningResult {
    /// Correlation key the chain ran for (production subscription id).
    pub prod_id: String,
    /// Id of the subscription cloned into the development environment.
    pub dev_id: i64,
    /// The remote subscription payload, as fetched.
    pub subscription: Value,
    /// Target database name derived from the clone's identity fields.
    pub target_database: String,
}

/// Terminal outcomes of the provisioning chain short of failure.
#[derive(Debug, Clone)]
pub enum ChainOutcome {
    /// The fetch returned an empty subscription; not an error, the restore
    /// proceeds against the original database name.
    Skipped,
    Completed(ProvisioningResult),
}

/// The remote provisioning chain and its post-restore identity update.
#[async_trait]
pub trait ProvisioningHooks: Send + Sync {
    /// Run the fetch -> clone -> link chain for a correlation key.
    async fn run_chain(&self, correlation_key: &str) -> Result<ChainOutcome, HookError>;

    /// Re-point the admin user of the restored database at `new_email`,
    /// scoping the call to `target_database` via the identity token.
    async fn update_admin_email(
        &self,
        new_email: &str,
        target_database: &str,
    ) -> Result<(), HookError>;

    /// Operator email used for the link step and the post-restore fix-up.
    fn operator_email(&self) -> Option<&str>;
}

/// Human-in-the-loop gate before the post-restore fix-up. Injected so
/// automated tests can bypass it deterministically.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Block until the operator confirms the prompt.
    async fn confirm(&self, prompt: &str);
}
