// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! pg-mirror - mirror a production PostgreSQL database into development.

use std::io::{BufRead, Write as _};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use pgmirror_core::ledger::SqliteLedger;
use pgmirror_core::ports::ConfirmationGate;
use pgmirror_core::{MirrorConfig, MirrorWorkflow, load_config};
use pgmirror_postgres::{PgDump, PgRestore, PsqlAdmin, checks};
use pgmirror_provisioning::{ForteplusClient, ProvisioningChain, ProvisioningSettings};

/// Mirror production PostgreSQL databases into development environments.
#[derive(Parser)]
#[command(name = "pg-mirror", version, about)]
struct Cli {
    /// Verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full mirror workflow
    Mirror {
        /// Path to the mirror configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Override the configured pg_restore parallel job count
        #[arg(short = 'j', long)]
        jobs: Option<u32>,

        /// Recreate the target database if it already exists
        #[arg(long)]
        drop_existing: bool,

        /// Skip the client tool availability checks
        #[arg(long)]
        skip_checks: bool,
    },

    /// Check that the required PostgreSQL client tools are installed
    Check,

    /// Validate a configuration file without running anything
    Validate {
        /// Path to the mirror configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },
}

/// Blocks on stdin; the operator confirms by pressing enter.
struct StdinConfirmation;

#[async_trait::async_trait]
impl ConfirmationGate for StdinConfirmation {
    async fn confirm(&self, prompt: &str) {
        let prompt = prompt.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{prompt} [press enter] ");
            let _ = stdout.flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)
        })
        .await;
        if let Err(e) = result {
            warn!(error = %e, "confirmation prompt interrupted; continuing");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pgmirror_core=debug,pgmirror_postgres=debug,pgmirror_provisioning=debug,pgmirror_cli=debug"
    } else {
        "pgmirror_core=info,pgmirror_postgres=info,pgmirror_provisioning=info,pgmirror_cli=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        info!("no .env file loaded: {e}");
    }

    match cli.command {
        Commands::Mirror {
            config,
            jobs,
            drop_existing,
            skip_checks,
        } => run_mirror(config, jobs, drop_existing, skip_checks).await,
        Commands::Check => run_check().await,
        Commands::Validate { config } => run_validate(config),
    }
}

async fn run_mirror(
    config_path: PathBuf,
    jobs: Option<u32>,
    drop_existing: bool,
    skip_checks: bool,
) -> anyhow::Result<()> {
    if skip_checks {
        warn!("client tool checks skipped on request");
    } else {
        ensure_client_tools().await?;
    }

    let mut config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(jobs) = jobs {
        config.options.parallel_jobs = jobs;
    }
    if drop_existing {
        config.options.drop_existing = true;
    }
    config.validate().context("validating configuration")?;

    banner(&config);

    let ledger = match SqliteLedger::open(SqliteLedger::default_path()).await {
        Ok(ledger) => Some(Arc::new(ledger) as Arc<dyn pgmirror_core::ledger::Ledger>),
        Err(e) => {
            warn!(error = %e, "audit ledger unavailable");
            None
        }
    };

    let settings = ProvisioningSettings::from_env();
    let operator_email = settings.operator_email.clone();
    let client = ForteplusClient::new(settings).context("building provisioning client")?;
    let hooks = ProvisioningChain::new(client, operator_email);

    let workflow = MirrorWorkflow::new(
        Arc::new(PgDump::in_temp_dir()),
        Arc::new(PsqlAdmin),
        Arc::new(PgRestore),
        Arc::new(hooks),
        ledger,
        Arc::new(StdinConfirmation),
    );

    match workflow.run(&config).await {
        Ok(report) => {
            info!(
                target = %report.target_database,
                record_id = report.record_id,
                "mirror completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(stage = %e.stage(), error = %e, "mirror failed");
            process::exit(1);
        }
    }
}

async fn run_check() -> anyhow::Result<()> {
    let reports = checks::verify_client_tools().await;
    let missing: Vec<&str> = reports
        .iter()
        .filter(|r| !r.available())
        .map(|r| r.tool)
        .collect();

    for report in &reports {
        match &report.version {
            Some(version) => println!("{:<12} {version}", report.tool),
            None => println!("{:<12} NOT FOUND", report.tool),
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        eprintln!("{}", checks::installation_hint(&missing));
        process::exit(1);
    }
}

fn run_validate(config_path: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    println!(
        "configuration ok: {} @ {}:{} -> {}:{}",
        config.source.database,
        config.source.server.host,
        config.source.server.port,
        config.target.host,
        config.target.port,
    );
    Ok(())
}

async fn ensure_client_tools() -> anyhow::Result<()> {
    let reports = checks::verify_client_tools().await;
    let missing: Vec<&str> = reports
        .iter()
        .filter(|r| !r.available())
        .map(|r| r.tool)
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(checks::installation_hint(&missing));
    }
    Ok(())
}

fn banner(config: &MirrorConfig) {
    let key = pgmirror_core::naming::extract_correlation_key(&config.source.database);
    info!(
        source = %format!(
            "{}@{}:{}/{}",
            config.source.server.user,
            config.source.server.host,
            config.source.server.port,
            config.source.database
        ),
        target = %format!("{}:{}", config.target.host, config.target.port),
        jobs = config.options.parallel_jobs,
        drop_existing = config.options.drop_existing,
        correlation_key = key.as_deref(),
        "starting mirror"
    );
}
