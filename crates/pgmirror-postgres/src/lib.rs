// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! pgmirror-postgres - adapters over the PostgreSQL client tools.
//!
//! Implements the pgmirror-core tool ports by shelling out to `pg_dump`,
//! `pg_restore`, and `psql`. Passwords travel to the children through the
//! `PGPASSWORD` environment variable and never appear on a command line.

pub mod admin;
pub mod backup;
pub mod checks;
pub mod restore;

mod command;

pub use admin::PsqlAdmin;
pub use backup::PgDump;
pub use checks::{ToolReport, verify_client_tools};
pub use restore::PgRestore;
