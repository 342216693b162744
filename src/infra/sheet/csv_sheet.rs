use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::value::CellValue;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::{Sheet, SheetSink, SheetSource};

pub struct CsvSheet {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvSheet {
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("failed to open csv sheet: {}", path.display()))?;
        let header: Vec<String> = reader
            .headers()
            .with_context(|| format!("failed to read headers from csv: {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        if header.is_empty() || header.iter().all(String::is_empty) {
            anyhow::bail!("csv sheet needs a header row: {}", path.display())
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record
                .with_context(|| format!("failed to parse csv record in {}", path.display()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        // trailing blank rows are not part of the sheet
        while rows
            .last()
            .is_some_and(|row| row.iter().all(String::is_empty))
        {
            rows.pop();
        }

        Ok(Self {
            path: path.to_path_buf(),
            header,
            rows,
        })
    }

    fn column_index(&self, column: &str) -> Result<usize, PortError> {
        self.header
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| PortError::UnknownColumn(column.to_string()))
    }

    fn persist(&self) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("failed to open csv sheet for writing: {}", self.path.display()))?;
        writer
            .write_record(&self.header)
            .context("failed to write csv header")?;
        for row in &self.rows {
            writer.write_record(row).context("failed to write csv row")?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush csv sheet: {}", self.path.display()))?;
        Ok(())
    }
}

impl SheetSource for CsvSheet {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn snapshot(&self) -> Result<RowSet, PortError> {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| CellValue::numericise(cell)).collect())
            .collect();
        RowSet::from_table(self.header.clone(), rows)
            .map_err(|err| PortError::Message(format!("{}: {err}", self.describe())))
    }
}

impl SheetSink for CsvSheet {
    fn row_count(&self) -> Result<usize, PortError> {
        Ok(1 + self.rows.len())
    }

    fn append_row(&mut self, values: &[(String, CellValue)]) -> Result<(), PortError> {
        let mut row = vec![String::new(); self.header.len()];
        for (column, value) in values {
            let col_idx = self.column_index(column)?;
            row[col_idx] = value.render();
        }
        self.rows.push(row);
        self.persist()?;
        Ok(())
    }

    fn update_cell(
        &mut self,
        row_number: usize,
        column: &str,
        value: &str,
    ) -> Result<(), PortError> {
        let col_idx = self.column_index(column)?;
        if row_number < 2 {
            return Err(PortError::Message(format!(
                "row {row_number} is not a data row of {}",
                self.describe()
            )));
        }

        let row_idx = row_number - 2;
        if row_idx >= self.rows.len() {
            self.rows
                .resize(row_idx + 1, vec![String::new(); self.header.len()]);
        }
        let row = &mut self.rows[row_idx];
        if col_idx >= row.len() {
            row.resize(col_idx + 1, String::new());
        }
        row[col_idx] = value.to_string();
        self.persist()?;
        Ok(())
    }
}

impl Sheet for CsvSheet {
    fn as_sink(&mut self) -> Option<&mut dyn SheetSink> {
        Some(self)
    }
}
