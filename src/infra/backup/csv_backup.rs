use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::domain::entities::row_set::RowSet;
use crate::usecase::ports::backup::BackupSink;
use crate::usecase::ports::error::PortError;

pub struct CsvBackup {
    pub directory: PathBuf,
    pub filename: String,
}

impl CsvBackup {
    pub fn new(directory: PathBuf, filename: String) -> Self {
        Self {
            directory,
            filename,
        }
    }

    pub fn target_path(&self, date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("{}_{}.csv", date.format("%Y%m%d"), self.filename))
    }
}

impl BackupSink for CsvBackup {
    fn save(&self, rows: &RowSet) -> Result<PathBuf, PortError> {
        let path = self.target_path(Local::now().date_naive());
        write_backup(&path, rows)?;
        Ok(path)
    }
}

pub fn write_backup(path: &Path, rows: &RowSet) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create backup dir: {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create backup: {}", path.display()))?;
    writer
        .write_record(rows.columns())
        .context("failed to write backup header")?;
    for row in rows.rows() {
        let record: Vec<String> = (0..rows.columns().len())
            .map(|col_idx| row.cell(col_idx).render())
            .collect();
        writer
            .write_record(&record)
            .context("failed to write backup row")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush backup: {}", path.display()))?;

    log::debug!("saved {} rows to {}", rows.len(), path.display());
    Ok(())
}
