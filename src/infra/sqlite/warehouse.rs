use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::types::{Value, ValueRef};

use crate::domain::entities::instruction::ApplyInstruction;
use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::value::CellValue;
use crate::infra::sqlite::connection::open_connection;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::warehouse::Warehouse;

const PARAM_PREFIXES: [char; 3] = [':', '@', '$'];

pub struct SqliteWarehouse {
    pub db_path: PathBuf,
}

impl SqliteWarehouse {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl Warehouse for SqliteWarehouse {
    fn select(&self, query: &str) -> Result<RowSet, PortError> {
        select_rows(&self.db_path, query).map_err(PortError::from)
    }

    fn apply_updates(
        &self,
        query: &str,
        instructions: &[ApplyInstruction],
    ) -> Result<usize, PortError> {
        apply_updates(&self.db_path, query, instructions).map_err(PortError::from)
    }
}

fn value_to_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Empty,
        ValueRef::Integer(v) => CellValue::Integer(v),
        ValueRef::Real(v) => CellValue::number(v),
        ValueRef::Text(v) | ValueRef::Blob(v) => CellValue::text(String::from_utf8_lossy(v)),
    }
}

fn cell_to_sql(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Text(v) => Value::Text(v.clone()),
        CellValue::Integer(v) => Value::Integer(*v),
        CellValue::Number(v) => Value::Real(*v),
    }
}

pub fn select_rows(db_path: &Path, query: &str) -> Result<RowSet> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(query)
        .with_context(|| format!("failed to prepare select query: {query}"))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query([]).context("failed to run select query")?;
    let mut data = Vec::new();
    while let Some(row) = rows.next().context("failed to read warehouse row")? {
        let mut cells = Vec::with_capacity(width);
        for col_idx in 0..width {
            let value = row
                .get_ref(col_idx)
                .with_context(|| format!("failed to read column {}", columns[col_idx]))?;
            cells.push(value_to_cell(value));
        }
        data.push(cells);
    }

    let row_set = RowSet::from_table(columns, data)?;
    log::debug!("warehouse returned {} rows", row_set.len());
    Ok(row_set)
}

/// Runs `query` once per instruction inside one transaction. Instruction
/// params bind by name (`:column`, `@column` or `$column`); params the
/// statement does not mention are skipped.
pub fn apply_updates(
    db_path: &Path,
    query: &str,
    instructions: &[ApplyInstruction],
) -> Result<usize> {
    if instructions.is_empty() {
        return Ok(0);
    }

    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start update transaction")?;

    let mut changed = 0;
    {
        let mut stmt = tx
            .prepare(query)
            .with_context(|| format!("failed to prepare update query: {query}"))?;

        let known: Vec<&str> = instructions[0].params().map(|(name, _)| name).collect();
        for param_idx in 1..=stmt.parameter_count() {
            let Some(name) = stmt.parameter_name(param_idx) else {
                anyhow::bail!("update query must use named parameters: {query}")
            };
            let bare = name.trim_start_matches(PARAM_PREFIXES);
            if !known.contains(&bare) {
                anyhow::bail!("update query parameter {name} is neither an id nor an update column")
            }
        }

        for instruction in instructions {
            for (name, value) in instruction.params() {
                for prefix in PARAM_PREFIXES {
                    let Some(param_idx) = stmt
                        .parameter_index(&format!("{prefix}{name}"))
                        .with_context(|| format!("failed to look up parameter {name}"))?
                    else {
                        continue;
                    };
                    stmt.raw_bind_parameter(param_idx, cell_to_sql(value))
                        .with_context(|| format!("failed to bind parameter {name}"))?;
                }
            }
            let updated = stmt
                .raw_execute()
                .with_context(|| format!("failed to update key {}", instruction.key))?;
            log::debug!("key {}: {updated} rows updated", instruction.key);
            changed += updated;
        }
    }

    tx.commit().context("failed to commit update transaction")?;
    Ok(changed)
}
