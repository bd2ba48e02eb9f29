// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the mirroring workflow.
//!
//! The taxonomy separates what the operator needs to know: which stage
//! failed (every [`MirrorError`] variant names one) from why it failed
//! (the wrapped source error). Advisory failures - audit writes without a
//! correlation key, connection termination during recreate, the
//! post-restore identity update - are logged where they occur and never
//! become a [`MirrorError`].

use std::fmt;

use thiserror::Error;

/// Stages of the mirroring workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Dumping the source database to a local artifact.
    Backup,
    /// Creating the audit ledger record.
    Audit,
    /// Running the remote provisioning chain.
    Provisioning,
    /// Deciding whether to create, recreate, or reuse the target database.
    TargetGate,
    /// Restoring the artifact into the target database.
    Restore,
    /// Post-restore admin identity update.
    PostFixup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Audit => "audit",
            Self::Provisioning => "provisioning",
            Self::TargetGate => "target-gate",
            Self::Restore => "restore",
            Self::PostFixup => "post-fixup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of an external PostgreSQL tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool binary could not be launched at all.
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    Failed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// Filesystem error around a tool run (e.g. sizing the dump file).
    #[error("io error during {tool} run: {source}")]
    Io {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the audit ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The ledger directory or file could not be prepared.
    #[error("failed to prepare ledger storage at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the provisioning chain or the identity-token rewriter.
#[derive(Debug, Error)]
pub enum HookError {
    /// A required credential is absent from the environment. Raised before
    /// any network call is made.
    #[error("missing required credential: {0}")]
    MissingCredential(&'static str),

    /// The remote service answered with a non-success status or the
    /// transport failed.
    #[error("remote call failed: {method} {url}: {reason}")]
    Remote {
        method: &'static str,
        url: String,
        reason: String,
    },

    /// The remote service answered 2xx but the body is not usable.
    #[error("unexpected response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    /// The identity token could not be rewritten for the target database.
    #[error("identity token error: {0}")]
    Token(String),
}

/// Fatal workflow errors. Each variant maps to the stage that failed, so
/// the exit message can distinguish "which stage" from "why".
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("backup failed: {0}")]
    Backup(#[source] ToolError),

    /// The audit record could not be created or updated while a correlation
    /// key is present. The provisioning chain cannot be tracked without it.
    #[error("audit record required for provisioning tracking: {reason}")]
    AuditRequired { reason: String },

    #[error("provisioning chain failed: {0}")]
    Provisioning(#[source] HookError),

    #[error("target database preparation failed: {0}")]
    TargetGate(#[source] ToolError),

    /// pg_restore could not be invoked at all.
    #[error("restore invocation failed: {0}")]
    RestoreTool(#[source] ToolError),

    /// pg_restore ran but the classifier found critical errors (or an
    /// unclassifiable nonzero exit). Detail is in the log.
    #[error("restore reported critical errors")]
    RestoreFailed,
}

impl MirrorError {
    /// The workflow stage this error aborted in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Backup(_) => Stage::Backup,
            Self::AuditRequired { .. } => Stage::Audit,
            Self::Provisioning(_) => Stage::Provisioning,
            Self::TargetGate(_) => Stage::TargetGate,
            Self::RestoreTool(_) | Self::RestoreFailed => Stage::Restore,
        }
    }
}
