// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! pgmirror-core - the mirroring workflow for pg-mirror.
//!
//! This crate holds everything that is not an external tool invocation:
//! - the workflow controller that sequences backup, audit, provisioning,
//!   target preparation, restore, and the post-restore fix-up
//!   ([`workflow::MirrorWorkflow`]),
//! - the restore diagnostic classifier ([`classify`]),
//! - the database-name resolver ([`naming`]),
//! - the audit ledger port and its SQLite backend ([`ledger`]),
//! - the collaborator ports implemented by the pgmirror-postgres and
//!   pgmirror-provisioning crates ([`ports`]).
//!
//! The workflow is strictly sequential: each stage fully completes before
//! the next begins, and a failed stage blocks everything after it. The only
//! parallelism is delegated to pg_restore's own worker jobs.

pub mod classify;
pub mod config;
pub mod error;
pub mod ledger;
pub mod naming;
pub mod ports;
pub mod workflow;

pub use classify::{RestoreVerdict, classify};
pub use config::{MirrorConfig, load_config};
pub use error::{HookError, LedgerError, MirrorError, Stage, ToolError};
pub use workflow::{MirrorReport, MirrorWorkflow};
