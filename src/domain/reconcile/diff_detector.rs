use std::collections::HashSet;

use crate::domain::entities::mapping::ColumnMapping;
use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::value::{CellValue, Key};
use crate::domain::reconcile::error::{ReconcileError, Side};
use crate::domain::reconcile::key_matcher::{MatchedRow, Pairing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRecord {
    pub key: Key,
    pub left_column: String,
    pub right_column: String,
    pub left_value: CellValue,
    pub right_value: CellValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSet {
    records: Vec<DiffRecord>,
    keys: HashSet<Key>,
}

impl DiffSet {
    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.records.iter().map(|record| &record.key)
    }

    #[allow(dead_code)]
    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    fn insert(&mut self, record: DiffRecord) {
        if self.keys.insert(record.key.clone()) {
            self.records.push(record);
        }
    }
}

/// Columns are compared in mapping order and the scan of a pair stops at the
/// first difference, so a record names one differing column, not all of them.
pub fn detect(
    left: &RowSet,
    right: &RowSet,
    matched: &[MatchedRow<'_>],
    mapping: &ColumnMapping,
) -> Result<DiffSet, ReconcileError> {
    let mut resolved = Vec::with_capacity(mapping.len());
    for (left_column, right_column) in mapping.pairs() {
        resolved.push((
            left_column,
            right_column,
            left.require_column(Side::Left, left_column)?,
            right.require_column(Side::Right, right_column)?,
        ));
    }

    let mut diffs = DiffSet::default();
    for entry in matched {
        let Pairing::Both {
            left: left_row,
            right: right_row,
        } = entry.pairing
        else {
            continue;
        };
        if diffs.contains(&entry.key) {
            continue;
        }

        for (left_column, right_column, left_idx, right_idx) in &resolved {
            let left_value = left_row.cell(*left_idx);
            let right_value = right_row.cell(*right_idx);
            if left_value != right_value {
                log::debug!(
                    "key {}: {left_column}={left_value:?} differs from {right_column}={right_value:?}",
                    entry.key
                );
                diffs.insert(DiffRecord {
                    key: entry.key.clone(),
                    left_column: left_column.to_string(),
                    right_column: right_column.to_string(),
                    left_value: left_value.clone(),
                    right_value: right_value.clone(),
                });
                break;
            }
        }
    }

    log::debug!("{} differing keys", diffs.len());
    Ok(diffs)
}
