use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::value::CellValue;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::{Sheet, SheetSink, SheetSource};

pub fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(v) => CellValue::numericise(v),
        Data::Float(v) => CellValue::number(*v),
        Data::Int(v) => CellValue::Integer(*v),
        Data::Bool(v) => CellValue::text(v.to_string().to_uppercase()),
        Data::DateTime(v) => CellValue::text(v.to_string()),
        Data::DateTimeIso(v) => CellValue::text(v.as_str()),
        Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(v) => CellValue::text(format!("{v:?}")),
        Data::Empty => CellValue::Empty,
    }
}

pub struct XlsxSheet {
    path: PathBuf,
    sheet: Option<String>,
}

impl XlsxSheet {
    pub fn open(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let workbook = open_workbook_auto(path)
            .with_context(|| format!("failed to open workbook: {}", path.display()))?;
        if let Some(name) = sheet {
            if !workbook.sheet_names().iter().any(|candidate| candidate == name) {
                anyhow::bail!("sheet `{name}` not found in {}", path.display())
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            sheet: sheet.map(str::to_string),
        })
    }

    fn read_rows(&self) -> Result<(Vec<String>, Vec<Vec<CellValue>>)> {
        let mut workbook = open_workbook_auto(&self.path)
            .with_context(|| format!("failed to open workbook: {}", self.path.display()))?;
        let sheet_name = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .with_context(|| format!("workbook has no sheets: {}", self.path.display()))?,
        };
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

        let mut rows = range.rows();
        let header = match rows.next() {
            Some(cells) => cells.iter().map(|cell| cell_to_value(cell).render()).collect(),
            None => Vec::new(),
        };
        let body = rows
            .map(|cells| cells.iter().map(cell_to_value).collect())
            .collect();
        Ok((header, body))
    }
}

impl SheetSource for XlsxSheet {
    fn describe(&self) -> String {
        match &self.sheet {
            Some(name) => format!("{}#{name}", self.path.display()),
            None => self.path.display().to_string(),
        }
    }

    fn snapshot(&self) -> Result<RowSet, PortError> {
        let (header, rows) = self.read_rows()?;
        RowSet::from_table(header, rows)
            .map_err(|err| PortError::Message(format!("{}: {err}", self.describe())))
    }
}

impl Sheet for XlsxSheet {
    fn as_sink(&mut self) -> Option<&mut dyn SheetSink> {
        None
    }
}
