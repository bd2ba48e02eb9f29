// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The mirroring workflow controller.
//!
//! Sequences backup -> audit -> (conditional) provisioning chain -> target
//! gate -> restore -> (conditional) post-restore fix-up. Every stage is
//! attempt-once and gated on the previous one succeeding; a provisioning
//! failure always prevents restore. The backup artifact is removed on every
//! exit path, including panics, through a drop guard.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::config::MirrorConfig;
use crate::error::{LedgerError, MirrorError, Stage};
use crate::ledger::{BackupStatus, ConnectionDescriptor, Ledger};
use crate::naming;
use crate::ports::{
    BackupArtifact, BackupTool, ChainOutcome, ConfirmationGate, DatabaseAdmin, ProvisioningHooks,
    RestoreTool,
};

/// Deletes the backup artifact when dropped. Missing files are fine (the
/// backup tool may already have removed a partial dump).
struct ArtifactGuard {
    path: PathBuf,
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "removed backup artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not remove backup artifact")
            }
        }
    }
}

/// Report of a successful mirror run.
#[derive(Debug, Clone)]
pub struct MirrorReport {
    /// Database the backup was restored into. Equals the source database
    /// name unless the provisioning chain derived a new one.
    pub target_database: String,
    /// Audit record id, when one could be created.
    pub record_id: Option<i64>,
    /// Correlation key resolved from the source database name.
    pub correlation_key: Option<String>,
}

/// Top-level workflow controller over injected collaborator ports.
pub struct MirrorWorkflow {
    backup: Arc<dyn BackupTool>,
    admin: Arc<dyn DatabaseAdmin>,
    restore: Arc<dyn RestoreTool>,
    hooks: Arc<dyn ProvisioningHooks>,
    /// `None` behaves exactly like a ledger whose writes fail: advisory
    /// without a correlation key, fatal with one.
    ledger: Option<Arc<dyn Ledger>>,
    confirm: Arc<dyn ConfirmationGate>,
}

impl MirrorWorkflow {
    pub fn new(
        backup: Arc<dyn BackupTool>,
        admin: Arc<dyn DatabaseAdmin>,
        restore: Arc<dyn RestoreTool>,
        hooks: Arc<dyn ProvisioningHooks>,
        ledger: Option<Arc<dyn Ledger>>,
        confirm: Arc<dyn ConfirmationGate>,
    ) -> Self {
        Self {
            backup,
            admin,
            restore,
            hooks,
            ledger,
            confirm,
        }
    }

    /// Run the full mirror workflow for one configuration.
    pub async fn run(&self, config: &MirrorConfig) -> Result<MirrorReport, MirrorError> {
        let correlation_key = naming::extract_correlation_key(&config.source.database);
        match &correlation_key {
            Some(key) => {
                info!(key = %key, database = %config.source.database, "correlation key resolved")
            }
            None => warn!(
                database = %config.source.database,
                "database name carries no correlation key; provisioning chain will be skipped"
            ),
        }

        info!(
            stage = %Stage::Backup,
            database = %config.source.database,
            host = %config.source.server.host,
            "creating backup"
        );
        let artifact = self
            .backup
            .create(&config.source)
            .await
            .map_err(MirrorError::Backup)?;
        let _guard = ArtifactGuard {
            path: artifact.path.clone(),
        };
        info!(
            stage = %Stage::Backup,
            path = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            "backup created"
        );

        let record_id = self
            .create_audit_record(config, &artifact, correlation_key.as_deref())
            .await?;

        let mut target_database = config.source.database.clone();
        if let (Some(key), Some(record_id)) = (correlation_key.as_deref(), record_id) {
            target_database = self
                .run_provisioning(key, record_id, target_database)
                .await?;
        }

        self.prepare_target(config, &target_database).await?;

        info!(
            stage = %Stage::Restore,
            database = %target_database,
            jobs = config.options.parallel_jobs,
            "restoring backup"
        );
        let restored = self
            .restore
            .restore(
                &artifact.path,
                &config.target,
                &target_database,
                config.options.parallel_jobs,
            )
            .await
            .map_err(MirrorError::RestoreTool)?;
        if !restored {
            error!(stage = %Stage::Restore, database = %target_database, "restore failed");
            return Err(MirrorError::RestoreFailed);
        }
        info!(stage = %Stage::Restore, database = %target_database, "restore completed");

        if correlation_key.is_some() {
            self.post_restore_fixup(&target_database).await;
        }

        Ok(MirrorReport {
            target_database,
            record_id,
            correlation_key,
        })
    }

    /// Create the audit record. Failure is advisory unless a correlation
    /// key was resolved: the provisioning chain cannot be tracked without
    /// a record, so in that case the workflow aborts.
    async fn create_audit_record(
        &self,
        config: &MirrorConfig,
        artifact: &BackupArtifact,
        correlation_key: Option<&str>,
    ) -> Result<Option<i64>, MirrorError> {
        let descriptor = ConnectionDescriptor {
            host: config.source.server.host.clone(),
            port: config.source.server.port,
            database: config.source.database.clone(),
            username: config.source.server.user.clone(),
        };

        let attempt = match &self.ledger {
            Some(ledger) => ledger
                .record_backup(
                    &descriptor,
                    &artifact.path.to_string_lossy(),
                    Some(artifact.size_bytes),
                    BackupStatus::Created,
                )
                .await
                .map_err(|e| e.to_string()),
            None => Err("audit ledger unavailable".to_string()),
        };

        match attempt {
            Ok(id) => {
                info!(stage = %Stage::Audit, record_id = id, "audit record created");
                Ok(Some(id))
            }
            Err(reason) if correlation_key.is_some() => {
                error!(stage = %Stage::Audit, reason = %reason, "audit record creation failed");
                Err(MirrorError::AuditRequired { reason })
            }
            Err(reason) => {
                warn!(
                    stage = %Stage::Audit,
                    reason = %reason,
                    "could not create audit record; continuing without audit trail"
                );
                Ok(None)
            }
        }
    }

    /// Run the provisioning chain and fold its outcome into the audit
    /// record. Returns the restore target database name.
    async fn run_provisioning(
        &self,
        key: &str,
        record_id: i64,
        original_target: String,
    ) -> Result<String, MirrorError> {
        info!(stage = %Stage::Provisioning, key = %key, "running provisioning chain");

        match self.hooks.run_chain(key).await {
            Ok(ChainOutcome::Skipped) => {
                warn!(
                    stage = %Stage::Provisioning,
                    key = %key,
                    "subscription fetch returned empty; provisioning skipped"
                );
                self.update_record(record_id, BackupStatus::HooksSkipped, None)
                    .await?;
                Ok(original_target)
            }
            Ok(ChainOutcome::Completed(result)) => {
                info!(
                    stage = %Stage::Provisioning,
                    dev_id = result.dev_id,
                    target = %result.target_database,
                    "provisioning chain completed"
                );
                let email = self.hooks.operator_email();
                let extra = json!({
                    "assinatura_id_prod": key,
                    "assinatura_id_dev": result.dev_id,
                    "email_assinante": email,
                    "email_usuario": email,
                    "target_database": result.target_database,
                });
                self.update_record(record_id, BackupStatus::HooksCompleted, Some(&extra))
                    .await?;
                Ok(result.target_database)
            }
            Err(e) => {
                error!(
                    stage = %Stage::Provisioning,
                    error = %e,
                    "provisioning chain failed; restore will not run"
                );
                let extra = json!({ "error": e.to_string() });
                if let Err(ledger_err) = self
                    .try_update_record(record_id, BackupStatus::HooksFailed, Some(&extra))
                    .await
                {
                    error!(
                        record_id,
                        error = %ledger_err,
                        "could not mark audit record hooks_failed"
                    );
                }
                Err(MirrorError::Provisioning(e))
            }
        }
    }

    /// Update the audit record; only called while a correlation key is in
    /// play, where a lost update means an untrackable chain, so failures
    /// are fatal.
    async fn update_record(
        &self,
        id: i64,
        status: BackupStatus,
        extra: Option<&Value>,
    ) -> Result<(), MirrorError> {
        self.try_update_record(id, status, extra)
            .await
            .map_err(|e| MirrorError::AuditRequired {
                reason: e.to_string(),
            })
    }

    async fn try_update_record(
        &self,
        id: i64,
        status: BackupStatus,
        extra: Option<&Value>,
    ) -> Result<(), LedgerError> {
        if let Some(ledger) = &self.ledger {
            ledger.update_backup(id, Some(status), extra).await?;
        }
        Ok(())
    }

    /// Decide whether the target database must be created, recreated, or
    /// left alone.
    async fn prepare_target(
        &self,
        config: &MirrorConfig,
        target_database: &str,
    ) -> Result<(), MirrorError> {
        info!(stage = %Stage::TargetGate, database = %target_database, "preparing target database");

        let exists = self
            .admin
            .database_exists(&config.target, target_database)
            .await
            .map_err(MirrorError::TargetGate)?;

        if exists && config.options.drop_existing {
            warn!(database = %target_database, "target exists; recreating from scratch");
            self.admin
                .recreate_database(&config.target, target_database)
                .await
                .map_err(MirrorError::TargetGate)?;
        } else if !exists {
            info!(database = %target_database, "target does not exist; creating");
            self.admin
                .create_database(&config.target, target_database)
                .await
                .map_err(MirrorError::TargetGate)?;
        } else {
            info!(database = %target_database, "target exists; leaving untouched");
        }

        Ok(())
    }

    /// Out-of-band identity update after a successful restore. Advisory:
    /// restore has already succeeded, so failure here is logged and the
    /// overall outcome stands.
    async fn post_restore_fixup(&self, target_database: &str) {
        let Some(email) = self.hooks.operator_email().map(str::to_string) else {
            warn!(
                stage = %Stage::PostFixup,
                "operator email not configured; skipping post-restore identity update"
            );
            return;
        };

        let prompt = format!(
            "Verify that '{target_database}' migrated correctly, then confirm to continue"
        );
        self.confirm.confirm(&prompt).await;

        info!(stage = %Stage::PostFixup, database = %target_database, "updating admin user email");
        match self.hooks.update_admin_email(&email, target_database).await {
            Ok(()) => {
                info!(stage = %Stage::PostFixup, email = %email, "admin user email updated")
            }
            Err(e) => warn!(
                stage = %Stage::PostFixup,
                error = %e,
                "post-restore identity update failed; mirror outcome unchanged"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MirrorOptions, ServerConfig, SourceConfig};
    use crate::error::{HookError, ToolError};
    use crate::ledger::SqliteLedger;
    use crate::ports::ProvisioningResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::path::Path;
    use std::sync::Mutex;

    fn test_config(database: &str, drop_existing: bool) -> MirrorConfig {
        MirrorConfig {
            source: SourceConfig {
                server: ServerConfig {
                    host: "prod.db".to_string(),
                    port: 5432,
                    user: "postgres".to_string(),
                    password: "s3cret".to_string(),
                },
                database: database.to_string(),
            },
            target: ServerConfig {
                host: "localhost".to_string(),
                port: 5433,
                user: "postgres".to_string(),
                password: "dev".to_string(),
            },
            options: MirrorOptions {
                parallel_jobs: 4,
                drop_existing,
            },
        }
    }

    async fn memory_ledger() -> Arc<SqliteLedger> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        Arc::new(SqliteLedger::from_pool(pool).await.expect("schema"))
    }

    /// Writes a real file so artifact cleanup can be observed.
    struct FakeBackup {
        path: PathBuf,
    }

    #[async_trait]
    impl BackupTool for FakeBackup {
        async fn create(&self, _source: &SourceConfig) -> Result<BackupArtifact, ToolError> {
            std::fs::write(&self.path, b"dump").expect("write fake dump");
            Ok(BackupArtifact {
                path: self.path.clone(),
                size_bytes: 4,
                created_at: Utc::now(),
            })
        }
    }

    #[derive(Default)]
    struct FakeAdmin {
        exists: bool,
        created: Mutex<Vec<String>>,
        recreated: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DatabaseAdmin for FakeAdmin {
        async fn database_exists(
            &self,
            _server: &ServerConfig,
            _database: &str,
        ) -> Result<bool, ToolError> {
            Ok(self.exists)
        }

        async fn create_database(
            &self,
            _server: &ServerConfig,
            database: &str,
        ) -> Result<(), ToolError> {
            self.created.lock().unwrap().push(database.to_string());
            Ok(())
        }

        async fn recreate_database(
            &self,
            _server: &ServerConfig,
            database: &str,
        ) -> Result<(), ToolError> {
            self.recreated.lock().unwrap().push(database.to_string());
            Ok(())
        }
    }

    struct FakeRestore {
        succeed: bool,
        restored_into: Mutex<Vec<String>>,
    }

    impl FakeRestore {
        fn succeeding() -> Self {
            Self {
                succeed: true,
                restored_into: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                succeed: false,
                restored_into: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RestoreTool for FakeRestore {
        async fn restore(
            &self,
            artifact: &Path,
            _server: &ServerConfig,
            database: &str,
            _parallel_jobs: u32,
        ) -> Result<bool, ToolError> {
            assert!(artifact.exists(), "artifact must exist during restore");
            self.restored_into
                .lock()
                .unwrap()
                .push(database.to_string());
            Ok(self.succeed)
        }
    }

    enum ChainBehavior {
        Skip,
        Complete { dev_id: i64, target: String },
        Fail(String),
    }

    struct FakeHooks {
        behavior: ChainBehavior,
        email: Option<String>,
        email_updates: Mutex<Vec<(String, String)>>,
    }

    impl FakeHooks {
        fn new(behavior: ChainBehavior, email: Option<&str>) -> Self {
            Self {
                behavior,
                email: email.map(str::to_string),
                email_updates: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProvisioningHooks for FakeHooks {
        async fn run_chain(&self, correlation_key: &str) -> Result<ChainOutcome, HookError> {
            match &self.behavior {
                ChainBehavior::Skip => Ok(ChainOutcome::Skipped),
                ChainBehavior::Complete { dev_id, target } => {
                    Ok(ChainOutcome::Completed(ProvisioningResult {
                        prod_id: correlation_key.to_string(),
                        dev_id: *dev_id,
                        subscription: json!({ "id": dev_id }),
                        target_database: target.clone(),
                    }))
                }
                ChainBehavior::Fail(reason) => Err(HookError::Remote {
                    method: "POST",
                    url: "http://dev.example/api/v1/assinaturas/".to_string(),
                    reason: reason.clone(),
                }),
            }
        }

        async fn update_admin_email(
            &self,
            new_email: &str,
            target_database: &str,
        ) -> Result<(), HookError> {
            self.email_updates
                .lock()
                .unwrap()
                .push((new_email.to_string(), target_database.to_string()));
            Ok(())
        }

        fn operator_email(&self) -> Option<&str> {
            self.email.as_deref()
        }
    }

    struct AutoConfirm;

    #[async_trait]
    impl ConfirmationGate for AutoConfirm {
        async fn confirm(&self, _prompt: &str) {}
    }

    struct Harness {
        workflow: MirrorWorkflow,
        ledger: Arc<SqliteLedger>,
        admin: Arc<FakeAdmin>,
        restore: Arc<FakeRestore>,
        hooks: Arc<FakeHooks>,
        artifact_path: PathBuf,
        _tmp: tempfile::TempDir,
    }

    async fn harness(behavior: ChainBehavior, email: Option<&str>, restore: FakeRestore) -> Harness {
        let tmp = tempfile::tempdir().expect("tempdir");
        let artifact_path = tmp.path().join("backup.dump");
        let ledger = memory_ledger().await;
        let admin = Arc::new(FakeAdmin::default());
        let restore = Arc::new(restore);
        let hooks = Arc::new(FakeHooks::new(behavior, email));

        let workflow = MirrorWorkflow::new(
            Arc::new(FakeBackup {
                path: artifact_path.clone(),
            }),
            admin.clone(),
            restore.clone(),
            hooks.clone(),
            Some(ledger.clone()),
            Arc::new(AutoConfirm),
        );

        Harness {
            workflow,
            ledger,
            admin,
            restore,
            hooks,
            artifact_path,
            _tmp: tmp,
        }
    }

    #[tokio::test]
    async fn unencoded_name_skips_provisioning_and_keeps_target() {
        let h = harness(ChainBehavior::Skip, None, FakeRestore::succeeding()).await;
        let report = h
            .workflow
            .run(&test_config("banco_invalido", false))
            .await
            .expect("workflow should succeed");

        assert_eq!(report.target_database, "banco_invalido");
        assert!(report.correlation_key.is_none());

        // Record exists but never reached provisioning.
        let record = h
            .ledger
            .get_backup(report.record_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, "created");

        assert_eq!(
            *h.restore.restored_into.lock().unwrap(),
            vec!["banco_invalido".to_string()]
        );
        assert!(!h.artifact_path.exists(), "artifact must be cleaned up");
    }

    #[tokio::test]
    async fn empty_subscription_marks_hooks_skipped() {
        let h = harness(ChainBehavior::Skip, None, FakeRestore::succeeding()).await;
        let report = h
            .workflow
            .run(&test_config("sp_d1_123_acme", false))
            .await
            .expect("workflow should succeed");

        assert_eq!(report.target_database, "sp_d1_123_acme");
        let record = h
            .ledger
            .get_backup(report.record_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, "hooks_skipped");
    }

    #[tokio::test]
    async fn chain_failure_aborts_before_restore() {
        let h = harness(
            ChainBehavior::Fail("boom".to_string()),
            Some("dev@example.com"),
            FakeRestore::succeeding(),
        )
        .await;
        let err = h
            .workflow
            .run(&test_config("sp_d1_123_acme", false))
            .await
            .expect_err("workflow must abort");

        assert_eq!(err.stage(), Stage::Provisioning);
        assert!(
            h.restore.restored_into.lock().unwrap().is_empty(),
            "restore must never run after a chain failure"
        );

        let record = h.ledger.get_backup(1).await.unwrap().unwrap();
        assert_eq!(record.status, "hooks_failed");
        let extra = record.extra_json().unwrap();
        assert!(extra["error"].as_str().unwrap().contains("boom"));

        assert!(!h.artifact_path.exists(), "artifact must be cleaned up");
    }

    #[tokio::test]
    async fn provisioned_run_restores_into_derived_name() {
        let target = naming::derive_target_name("901", "Varejo Ltda", "RJ");
        assert_eq!(target, "rj_d1_901_varejo");

        let h = harness(
            ChainBehavior::Complete {
                dev_id: 901,
                target: target.clone(),
            },
            Some("dev@example.com"),
            FakeRestore::succeeding(),
        )
        .await;
        let report = h
            .workflow
            .run(&test_config("rj_d1_77_varejo", false))
            .await
            .expect("workflow should succeed");

        assert_eq!(report.target_database, "rj_d1_901_varejo");
        assert_eq!(report.correlation_key.as_deref(), Some("77"));
        assert_eq!(
            *h.restore.restored_into.lock().unwrap(),
            vec!["rj_d1_901_varejo".to_string()]
        );

        let record = h
            .ledger
            .get_backup(report.record_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, "hooks_completed");
        let extra = record.extra_json().unwrap();
        assert_eq!(extra["assinatura_id_prod"], "77");
        assert_eq!(extra["assinatura_id_dev"], 901);
        assert_eq!(extra["target_database"], "rj_d1_901_varejo");

        // Post-restore fix-up ran against the derived database.
        assert_eq!(
            *h.hooks.email_updates.lock().unwrap(),
            vec![(
                "dev@example.com".to_string(),
                "rj_d1_901_varejo".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn fixup_skipped_without_operator_email() {
        let h = harness(
            ChainBehavior::Complete {
                dev_id: 5,
                target: "sp_d1_5_acme".to_string(),
            },
            None,
            FakeRestore::succeeding(),
        )
        .await;
        h.workflow
            .run(&test_config("sp_d1_123_acme", false))
            .await
            .expect("workflow should succeed");

        assert!(h.hooks.email_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn restore_failure_is_fatal_and_cleans_artifact() {
        let h = harness(ChainBehavior::Skip, None, FakeRestore::failing()).await;
        let err = h
            .workflow
            .run(&test_config("banco_invalido", false))
            .await
            .expect_err("workflow must fail");

        assert!(matches!(err, MirrorError::RestoreFailed));
        assert_eq!(err.stage(), Stage::Restore);
        assert!(!h.artifact_path.exists(), "artifact must be cleaned up");
    }

    #[tokio::test]
    async fn audit_failure_without_key_is_advisory() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact_path = tmp.path().join("backup.dump");
        let restore = Arc::new(FakeRestore::succeeding());

        let workflow = MirrorWorkflow::new(
            Arc::new(FakeBackup {
                path: artifact_path.clone(),
            }),
            Arc::new(FakeAdmin::default()),
            restore.clone(),
            Arc::new(FakeHooks::new(ChainBehavior::Skip, None)),
            None, // no ledger at all
            Arc::new(AutoConfirm),
        );

        let report = workflow
            .run(&test_config("banco_invalido", false))
            .await
            .expect("loss of audit trail must not block mirroring");
        assert!(report.record_id.is_none());
        assert_eq!(restore.restored_into.lock().unwrap().len(), 1);
        assert!(!artifact_path.exists());
    }

    #[tokio::test]
    async fn audit_failure_with_key_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact_path = tmp.path().join("backup.dump");
        let restore = Arc::new(FakeRestore::succeeding());

        let workflow = MirrorWorkflow::new(
            Arc::new(FakeBackup {
                path: artifact_path.clone(),
            }),
            Arc::new(FakeAdmin::default()),
            restore.clone(),
            Arc::new(FakeHooks::new(ChainBehavior::Skip, None)),
            None,
            Arc::new(AutoConfirm),
        );

        let err = workflow
            .run(&test_config("sp_d1_123_acme", false))
            .await
            .expect_err("untrackable chain must abort");
        assert_eq!(err.stage(), Stage::Audit);
        assert!(restore.restored_into.lock().unwrap().is_empty());
        assert!(!artifact_path.exists(), "artifact must be cleaned up");
    }

    #[tokio::test]
    async fn existing_target_with_drop_policy_is_recreated() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact_path = tmp.path().join("backup.dump");
        let admin = Arc::new(FakeAdmin {
            exists: true,
            ..FakeAdmin::default()
        });
        let workflow = MirrorWorkflow::new(
            Arc::new(FakeBackup {
                path: artifact_path.clone(),
            }),
            admin.clone(),
            Arc::new(FakeRestore::succeeding()),
            Arc::new(FakeHooks::new(ChainBehavior::Skip, None)),
            Some(memory_ledger().await),
            Arc::new(AutoConfirm),
        );

        workflow
            .run(&test_config("banco_invalido", true))
            .await
            .expect("workflow should succeed");

        assert_eq!(
            *admin.recreated.lock().unwrap(),
            vec!["banco_invalido".to_string()]
        );
        assert!(admin.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_target_without_policy_is_left_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact_path = tmp.path().join("backup.dump");
        let admin = Arc::new(FakeAdmin {
            exists: true,
            ..FakeAdmin::default()
        });
        let workflow = MirrorWorkflow::new(
            Arc::new(FakeBackup {
                path: artifact_path.clone(),
            }),
            admin.clone(),
            Arc::new(FakeRestore::succeeding()),
            Arc::new(FakeHooks::new(ChainBehavior::Skip, None)),
            Some(memory_ledger().await),
            Arc::new(AutoConfirm),
        );

        workflow
            .run(&test_config("banco_invalido", false))
            .await
            .expect("workflow should succeed");

        assert!(admin.recreated.lock().unwrap().is_empty());
        assert!(admin.created.lock().unwrap().is_empty());
    }
}
