use crate::domain::entities::extra_write::ExtraWrites;
use crate::domain::entities::instruction::{AppendInstruction, AppendPlan};
use crate::domain::entities::row_set::{Row, RowSet};
use crate::domain::entities::value::Key;
use crate::domain::reconcile::error::{ReconcileError, Side};

pub fn plan_appends(
    warehouse: &RowSet,
    right_only: &[(Key, Row<'_>)],
    source_columns: &[String],
    target_columns: &[String],
    extra_writes: &ExtraWrites,
) -> Result<AppendPlan, ReconcileError> {
    if source_columns.len() != target_columns.len() {
        return Err(ReconcileError::ColumnCountMismatch {
            sources: source_columns.len(),
            targets: target_columns.len(),
        });
    }
    let source_idx = warehouse.require_columns(Side::Right, source_columns)?;

    if right_only.is_empty() {
        log::debug!("no new rows to append");
        return Ok(AppendPlan::NothingToDo);
    }

    let extra: Vec<_> = extra_writes.iter().cloned().collect();
    let instructions = right_only
        .iter()
        .map(|(key, row)| AppendInstruction {
            key: key.clone(),
            values: target_columns
                .iter()
                .zip(&source_idx)
                .map(|(target, col_idx)| (target.clone(), row.cell(*col_idx).clone()))
                .collect(),
            extra_writes: extra.clone(),
        })
        .collect::<Vec<_>>();

    log::debug!(
        "{} rows to append into columns {:?}",
        instructions.len(),
        target_columns
    );
    Ok(AppendPlan::Rows(instructions))
}

/// Seeded with the destination's row count (header included) before the first
/// append; each call to [`RowCursor::advance`] names the row the next append
/// lands on. Extra writes for that row must be issued before the next append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCursor {
    last_row: usize,
}

impl RowCursor {
    pub fn new(current_row_count: usize) -> Self {
        Self {
            last_row: current_row_count,
        }
    }

    pub fn advance(&mut self) -> usize {
        self.last_row += 1;
        self.last_row
    }

    #[allow(dead_code)]
    pub fn last_row(&self) -> usize {
        self.last_row
    }
}
