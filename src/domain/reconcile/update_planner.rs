use regex::Regex;

use crate::domain::entities::instruction::{ApplyInstruction, RejectedRow, UpdatePlan};
use crate::domain::entities::row_set::RowSet;
use crate::domain::reconcile::diff_detector::DiffSet;
use crate::domain::reconcile::error::{ReconcileError, Side};

#[derive(Debug, Clone, Default)]
pub enum AcceptancePolicy {
    #[default]
    Alphanumeric,
    Pattern(Regex),
}

impl AcceptancePolicy {
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(AcceptancePolicy::Pattern)
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            AcceptancePolicy::Alphanumeric => value.chars().all(|c| c.is_ascii_alphanumeric()),
            AcceptancePolicy::Pattern(regex) => regex.is_match(value),
        }
    }
}

pub fn plan_updates(
    diffs: &DiffSet,
    source: &RowSet,
    id_columns: &[String],
    update_columns: &[String],
    policy: &AcceptancePolicy,
) -> Result<UpdatePlan, ReconcileError> {
    if id_columns.is_empty() {
        return Err(ReconcileError::EmptyKey);
    }
    let id_idx = source.require_columns(Side::Left, id_columns)?;
    let update_idx = source.require_columns(Side::Left, update_columns)?;

    let mut plan = UpdatePlan::default();
    if diffs.is_empty() {
        return Ok(plan);
    }

    'rows: for row in source.rows() {
        let key = row.key(&id_idx);
        if !diffs.contains(&key) {
            continue;
        }

        let fields = id_columns
            .iter()
            .zip(&id_idx)
            .chain(update_columns.iter().zip(&update_idx));
        for (column, col_idx) in fields {
            let rendered = row.cell(*col_idx).render();
            if !policy.accepts(&rendered) {
                log::debug!("skipping update for key {key}: {column}={rendered:?} is not accepted");
                plan.rejected.push(RejectedRow {
                    key,
                    column: column.clone(),
                    value: rendered,
                });
                continue 'rows;
            }
        }

        let pick = |names: &[String], indices: &[usize]| {
            names
                .iter()
                .zip(indices)
                .map(|(name, col_idx)| (name.clone(), row.cell(*col_idx).clone()))
                .collect::<Vec<_>>()
        };
        plan.accepted.push(ApplyInstruction {
            id: pick(id_columns, &id_idx),
            values: pick(update_columns, &update_idx),
            key,
        });
    }

    log::debug!(
        "{} updates accepted, {} rejected",
        plan.accepted.len(),
        plan.rejected.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::mapping::ColumnMapping;
    use crate::domain::entities::value::{CellValue, Key};
    use crate::domain::reconcile::diff_detector::detect;
    use crate::domain::reconcile::key_matcher::{match_rows, DuplicateKeys, MatchMode};
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn plan(sheet: &RowSet, warehouse: &RowSet, policy: &AcceptancePolicy) -> UpdatePlan {
        let keys = columns(&["id"]);
        let matched = match_rows(sheet, warehouse, &keys, MatchMode::Inner, DuplicateKeys::Expand)
            .expect("match should succeed");
        let mapping = ColumnMapping::identity(["name", "role"]);
        let diffs = detect(sheet, warehouse, &matched, &mapping).expect("detect should succeed");
        plan_updates(&diffs, sheet, &keys, &columns(&["name", "role"]), policy)
            .expect("plan should succeed")
    }

    fn staff(rows: &[(i64, &str, &str)]) -> RowSet {
        RowSet::from_records(rows.iter().map(|(id, name, role)| {
            vec![
                ("id", CellValue::from(*id)),
                ("name", CellValue::from(*name)),
                ("role", CellValue::from(*role)),
            ]
        }))
    }

    #[test]
    fn accepted_rows_carry_id_and_update_values() {
        let sheet = staff(&[(1, "Alicia", "RN"), (2, "Bob", "LPN")]);
        let warehouse = staff(&[(1, "Alice", "RN"), (2, "Bob", "LPN")]);

        let plan = plan(&sheet, &warehouse, &AcceptancePolicy::default());

        assert_eq!(
            plan.accepted,
            vec![ApplyInstruction {
                key: Key(vec![CellValue::from(1_i64)]),
                id: vec![("id".to_string(), CellValue::from(1_i64))],
                values: vec![
                    ("name".to_string(), CellValue::from("Alicia")),
                    ("role".to_string(), CellValue::from("RN")),
                ],
            }]
        );
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn one_unsafe_value_rejects_the_whole_row() {
        let sheet = staff(&[(1, "Ann Lee", "RN"), (2, "Bo", "night-shift"), (3, "Cy", "MD")]);
        let warehouse = staff(&[(1, "Ann", "RN"), (2, "Bob", "LPN"), (3, "Cyd", "MD")]);

        let plan = plan(&sheet, &warehouse, &AcceptancePolicy::default());

        assert_eq!(plan.accepted.len(), 1);
        assert_eq!(plan.accepted[0].key, Key(vec![CellValue::from(3_i64)]));
        let rejected: Vec<(&str, &str)> = plan
            .rejected
            .iter()
            .map(|row| (row.column.as_str(), row.value.as_str()))
            .collect();
        assert_eq!(rejected, vec![("name", "Ann Lee"), ("role", "night-shift")]);
    }

    #[test]
    fn blank_values_pass_the_gate() {
        let sheet = staff(&[(1, "", "RN")]);
        let warehouse = staff(&[(1, "Ann", "RN")]);

        let plan = plan(&sheet, &warehouse, &AcceptancePolicy::default());

        assert_eq!(plan.accepted.len(), 1);
        assert_eq!(plan.accepted[0].values[0].1, CellValue::Empty);
    }

    #[test]
    fn fractional_numbers_are_rejected_by_default() {
        let policy = AcceptancePolicy::default();
        assert!(policy.accepts("42"));
        assert!(!policy.accepts("4.2"));
        assert!(!policy.accepts("abc\n"));
        assert!(!policy.accepts("é"));
    }

    #[test]
    fn custom_pattern_must_match_the_whole_value() {
        let policy = AcceptancePolicy::pattern("[A-Za-z ]*").expect("pattern should compile");
        assert!(policy.accepts("Ann Lee"));
        assert!(!policy.accepts("Ann Lee 2"));

        let sheet = staff(&[(1, "Ann Lee", "RN")]);
        let warehouse = staff(&[(1, "Ann", "RN")]);
        let policy = AcceptancePolicy::pattern("[A-Za-z0-9 ]*").expect("pattern should compile");
        assert_eq!(plan(&sheet, &warehouse, &policy).accepted.len(), 1);
    }

    #[test]
    fn duplicate_source_rows_each_yield_an_instruction() {
        let sheet = staff(&[(1, "A", "RN"), (1, "B", "RN")]);
        let warehouse = staff(&[(1, "C", "RN")]);

        let plan = plan(&sheet, &warehouse, &AcceptancePolicy::default());

        let names: Vec<&CellValue> = plan.accepted.iter().map(|i| &i.values[0].1).collect();
        assert_eq!(names, vec![&CellValue::from("A"), &CellValue::from("B")]);
    }

    #[test]
    fn missing_update_column_fails_fast() {
        let sheet = staff(&[(1, "A", "RN")]);
        let err = plan_updates(
            &DiffSet::default(),
            &sheet,
            &columns(&["id"]),
            &columns(&["shift"]),
            &AcceptancePolicy::default(),
        )
        .expect_err("missing column should fail");

        assert_eq!(
            err,
            ReconcileError::MissingColumn {
                side: Side::Left,
                column: "shift".to_string()
            }
        );
    }
}
