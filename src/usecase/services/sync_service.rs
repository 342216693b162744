use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::config::task::{TaskConfig, UpdateSpreadsheetConfig, UpdateWarehouseConfig};
use crate::domain::entities::instruction::{AppendPlan, UpdatePlan};
use crate::domain::entities::row_set::RowSet;
use crate::domain::reconcile::append_planner::{plan_appends, RowCursor};
use crate::domain::reconcile::diff_detector::{detect, DiffSet};
use crate::domain::reconcile::error::ReconcileError;
use crate::domain::reconcile::key_matcher::{match_rows, right_only, MatchMode};
use crate::domain::reconcile::update_planner::{plan_updates, AcceptancePolicy};
use crate::usecase::ports::backup::BackupSink;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::{Sheet, SheetSink};
use crate::usecase::ports::warehouse::Warehouse;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub task: String,
    pub backup: Option<PathBuf>,
    pub differing_keys: usize,
    pub updates_accepted: usize,
    pub updates_rejected: usize,
    pub rows_updated: Option<usize>,
    pub rows_appended: usize,
    pub cell_writes: usize,
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} differing, {} updates accepted, {} rejected, ",
            self.task, self.differing_keys, self.updates_accepted, self.updates_rejected
        )?;
        match self.rows_updated {
            Some(rows) => write!(f, "{rows} warehouse rows updated, ")?,
            None => f.write_str("no warehouse writes, ")?,
        }
        write!(
            f,
            "{} rows appended, {} cells written",
            self.rows_appended, self.cell_writes
        )?;
        if let Some(path) = &self.backup {
            write!(f, ", backup at {}", path.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub rows_appended: usize,
    pub cell_writes: usize,
}

pub fn find_updates(
    sheet_rows: &RowSet,
    warehouse_rows: &RowSet,
    config: &UpdateWarehouseConfig,
    policy: &AcceptancePolicy,
) -> Result<(DiffSet, UpdatePlan), ReconcileError> {
    let matched = match_rows(
        sheet_rows,
        warehouse_rows,
        &config.primary_key,
        MatchMode::Inner,
        config.duplicate_keys,
    )?;
    let diffs = detect(sheet_rows, warehouse_rows, &matched, &config.column_mapping)?;
    let plan = plan_updates(
        &diffs,
        sheet_rows,
        &config.primary_key,
        &config.update_columns,
        policy,
    )?;
    Ok((diffs, plan))
}

pub fn find_appends(
    sheet_rows: &RowSet,
    warehouse_rows: &RowSet,
    config: &UpdateSpreadsheetConfig,
) -> Result<AppendPlan, ReconcileError> {
    let matched = match_rows(
        sheet_rows,
        warehouse_rows,
        &config.merge_on,
        MatchMode::Outer,
        config.duplicate_keys,
    )?;
    plan_appends(
        warehouse_rows,
        &right_only(&matched),
        &config.warehouse_columns,
        &config.sheet_columns,
        &config.extra_writes,
    )
}

pub fn apply_appends(sink: &mut dyn SheetSink, plan: &AppendPlan) -> Result<AppendOutcome, PortError> {
    let mut outcome = AppendOutcome::default();
    let instructions = plan.instructions();
    if instructions.is_empty() {
        return Ok(outcome);
    }

    let mut cursor = RowCursor::new(sink.row_count()?);
    for instruction in instructions {
        sink.append_row(&instruction.values)?;
        let row_number = cursor.advance();
        outcome.rows_appended += 1;
        log::debug!("appended key {} at row {row_number}", instruction.key);

        for write in instruction.cell_writes(row_number) {
            sink.update_cell(write.row_number, &write.column, &write.value)?;
            outcome.cell_writes += 1;
        }
    }
    Ok(outcome)
}

pub struct SyncService {
    sheet: Box<dyn Sheet>,
    warehouse: Box<dyn Warehouse>,
    backup: Option<Box<dyn BackupSink>>,
}

impl SyncService {
    pub fn new(sheet: Box<dyn Sheet>, warehouse: Box<dyn Warehouse>) -> Self {
        Self {
            sheet,
            warehouse,
            backup: None,
        }
    }

    pub fn with_backup(mut self, backup: Box<dyn BackupSink>) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn run_task(&mut self, task: &TaskConfig) -> Result<TaskReport> {
        let mut report = TaskReport {
            task: task.task.clone(),
            ..TaskReport::default()
        };

        let sheet_rows = self
            .sheet
            .snapshot()
            .with_context(|| format!("failed to read spreadsheet {}", self.sheet.describe()))?;
        log::debug!(
            "spreadsheet {} has {} rows, columns {:?}",
            self.sheet.describe(),
            sheet_rows.len(),
            sheet_rows.columns()
        );
        let warehouse_rows = self
            .warehouse
            .select(&task.warehouse.select_query)
            .context("failed to read warehouse")?;
        log::debug!(
            "warehouse has {} rows, columns {:?}",
            warehouse_rows.len(),
            warehouse_rows.columns()
        );

        if let Some(backup) = &self.backup {
            match backup.save(&warehouse_rows) {
                Ok(path) => {
                    log::info!("saved warehouse backup to {}", path.display());
                    report.backup = Some(path);
                }
                Err(err) => log::error!("failed to save warehouse backup: {err}"),
            }
        }

        if let Some(update) = task.update_warehouse.enabled() {
            self.sync_warehouse(&sheet_rows, &warehouse_rows, update, &mut report)?;
        }

        if let Some(append) = task.update_spreadsheet.enabled() {
            let plan = find_appends(&sheet_rows, &warehouse_rows, append)?;
            if plan == AppendPlan::NothingToDo {
                log::info!("no new rows to add to the spreadsheet");
            } else {
                let describe = self.sheet.describe();
                let sink = self
                    .sheet
                    .as_sink()
                    .ok_or_else(|| anyhow!(PortError::ReadOnly(describe.clone())))?;
                let outcome = apply_appends(sink, &plan)
                    .with_context(|| format!("failed to update spreadsheet {describe}"))?;
                report.rows_appended = outcome.rows_appended;
                report.cell_writes = outcome.cell_writes;
            }
        }

        Ok(report)
    }

    fn sync_warehouse(
        &self,
        sheet_rows: &RowSet,
        warehouse_rows: &RowSet,
        config: &UpdateWarehouseConfig,
        report: &mut TaskReport,
    ) -> Result<()> {
        let policy = config.acceptance_policy()?;
        let (diffs, plan) = find_updates(sheet_rows, warehouse_rows, config, &policy)?;
        report.differing_keys = diffs.len();
        report.updates_accepted = plan.accepted.len();
        report.updates_rejected = plan.rejected.len();

        for rejected in &plan.rejected {
            log::warn!(
                "skipping update for key {}: {}={:?} is not accepted",
                rejected.key,
                rejected.column,
                rejected.value
            );
        }
        if plan.accepted.is_empty() {
            return Ok(());
        }

        if config.dry_run {
            for instruction in &plan.accepted {
                log::info!(
                    "dry run: {} with {:?}",
                    config.update_query,
                    instruction.params().collect::<Vec<_>>()
                );
            }
            return Ok(());
        }

        let updated = self
            .warehouse
            .apply_updates(&config.update_query, &plan.accepted)
            .context("failed to update warehouse")?;
        log::info!("updated {updated} warehouse rows");
        report.rows_updated = Some(updated);
        Ok(())
    }
}
