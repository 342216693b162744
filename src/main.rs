mod config;
mod domain;
mod infra;
mod usecase;


use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::config::task::TaskConfig;
use crate::config::{default_config_path, load_tasks};
use crate::infra::backup::csv_backup::CsvBackup;
use crate::infra::sheet::open_sheet;
use crate::infra::sqlite::warehouse::SqliteWarehouse;
use crate::usecase::services::sync_service::SyncService;

#[derive(Debug, Parser)]
#[command(
    name = "roster-sync",
    version,
    about = "Reconcile a scheduling spreadsheet with its warehouse table"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every configured task, or only the named one
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        task: Option<String>,
        /// Emit diagnostic traces for every task
        #[arg(short, long)]
        verbose: bool,
    },
    /// Validate the configuration without touching any data
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level_is_ours = init_logging();

    let result = match cli.command {
        Command::Run {
            config,
            task,
            verbose,
        } => run(config, task.as_deref(), verbose, level_is_ours),
        Command::Check { config } => check(config),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> bool {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp_secs()
        .init();
    if !from_env {
        log::set_max_level(LevelFilter::Info);
    }
    !from_env
}

fn task_level(verbose: bool, task: &TaskConfig) -> LevelFilter {
    if verbose || task.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn resolve_config(config: Option<PathBuf>) -> Result<PathBuf> {
    match config {
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}

fn build_service(task: &TaskConfig) -> Result<SyncService> {
    let sheet = open_sheet(&task.spreadsheet.path, task.spreadsheet.sheet.as_deref())?;
    let warehouse = SqliteWarehouse::new(task.warehouse.database.clone());
    let mut service = SyncService::new(sheet, Box::new(warehouse));
    if let Some(backup) = task.backup.enabled() {
        service = service.with_backup(Box::new(CsvBackup::new(
            backup.directory.clone(),
            backup.filename.clone(),
        )));
    }
    Ok(service)
}

fn run(
    config: Option<PathBuf>,
    only: Option<&str>,
    verbose: bool,
    level_is_ours: bool,
) -> Result<bool> {
    let config_path = resolve_config(config)?;
    let tasks = load_tasks(&config_path)?;
    let selected: Vec<&TaskConfig> = tasks
        .iter()
        .filter(|task| only.map_or(true, |name| task.task == name))
        .collect();
    if let (Some(name), true) = (only, selected.is_empty()) {
        bail!("no task named `{name}` in {}", config_path.display())
    }

    let mut failures = 0;
    for task in selected {
        if level_is_ours {
            log::set_max_level(task_level(verbose, task));
        }
        log::debug!("beginning {}", task.task);

        let outcome = build_service(task).and_then(|mut service| service.run_task(task));
        match outcome {
            Ok(report) => log::info!("{report}"),
            Err(err) => {
                failures += 1;
                log::error!("task `{}` failed: {err:#}", task.task);
            }
        }

        log::debug!("completed {}", task.task);
        if level_is_ours {
            log::set_max_level(LevelFilter::Info);
        }
    }

    Ok(failures == 0)
}

fn check(config: Option<PathBuf>) -> Result<bool> {
    let config_path = resolve_config(config)?;
    let tasks = load_tasks(&config_path)?;
    for task in &tasks {
        let stages: Vec<&str> = [
            ("backup", task.backup.is_enabled()),
            ("update_warehouse", task.update_warehouse.is_enabled()),
            ("update_spreadsheet", task.update_spreadsheet.is_enabled()),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect();
        println!("{}: {}", task.task, stages.join(", "));
    }
    println!("{} tasks ok in {}", tasks.len(), config_path.display());
    Ok(true)
}
