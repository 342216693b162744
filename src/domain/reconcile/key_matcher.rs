use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::domain::entities::row_set::{Row, RowSet};
use crate::domain::entities::value::Key;
use crate::domain::reconcile::error::{ReconcileError, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Inner,
    Outer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKeys {
    #[default]
    Expand,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing<'a> {
    Both { left: Row<'a>, right: Row<'a> },
    LeftOnly(Row<'a>),
    RightOnly(Row<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRow<'a> {
    pub key: Key,
    pub pairing: Pairing<'a>,
}

pub fn match_rows<'a>(
    left: &'a RowSet,
    right: &'a RowSet,
    keys: &[String],
    mode: MatchMode,
    duplicates: DuplicateKeys,
) -> Result<Vec<MatchedRow<'a>>, ReconcileError> {
    if keys.is_empty() {
        return Err(ReconcileError::EmptyKey);
    }
    let left_cols = left.require_columns(Side::Left, keys)?;
    let right_cols = right.require_columns(Side::Right, keys)?;

    let left_keyed: Vec<(Key, Row<'a>)> = left.rows().map(|row| (row.key(&left_cols), row)).collect();
    let right_keyed: Vec<(Key, Row<'a>)> =
        right.rows().map(|row| (row.key(&right_cols), row)).collect();

    check_duplicates(Side::Left, &left_keyed, duplicates)?;
    check_duplicates(Side::Right, &right_keyed, duplicates)?;

    let mut right_index: HashMap<&Key, Vec<Row<'a>>> = HashMap::new();
    for (key, row) in &right_keyed {
        right_index.entry(key).or_default().push(*row);
    }

    let mut matched = Vec::new();
    for (key, left_row) in &left_keyed {
        match right_index.get(key) {
            Some(right_rows) => {
                for right_row in right_rows {
                    matched.push(MatchedRow {
                        key: key.clone(),
                        pairing: Pairing::Both {
                            left: *left_row,
                            right: *right_row,
                        },
                    });
                }
            }
            None if mode == MatchMode::Outer => matched.push(MatchedRow {
                key: key.clone(),
                pairing: Pairing::LeftOnly(*left_row),
            }),
            None => {}
        }
    }

    if mode == MatchMode::Outer {
        let left_keys: HashSet<&Key> = left_keyed.iter().map(|(key, _)| key).collect();
        for (key, right_row) in &right_keyed {
            if !left_keys.contains(key) {
                matched.push(MatchedRow {
                    key: key.clone(),
                    pairing: Pairing::RightOnly(*right_row),
                });
            }
        }
    }

    log::debug!(
        "matched {} left rows against {} right rows on {:?}: {} pairings",
        left.len(),
        right.len(),
        keys,
        matched.len()
    );

    Ok(matched)
}

pub fn right_only<'a>(matched: &[MatchedRow<'a>]) -> Vec<(Key, Row<'a>)> {
    matched
        .iter()
        .filter_map(|entry| match entry.pairing {
            Pairing::RightOnly(row) => Some((entry.key.clone(), row)),
            _ => None,
        })
        .collect()
}

fn check_duplicates(
    side: Side,
    keyed: &[(Key, Row<'_>)],
    policy: DuplicateKeys,
) -> Result<(), ReconcileError> {
    let mut seen: HashSet<&Key> = HashSet::new();
    let mut reported: HashSet<&Key> = HashSet::new();
    for (key, _) in keyed {
        if seen.insert(key) || !reported.insert(key) {
            continue;
        }
        match policy {
            DuplicateKeys::Reject => {
                return Err(ReconcileError::DuplicateKey {
                    side,
                    key: key.to_string(),
                })
            }
            DuplicateKeys::Expand => {
                log::warn!("key {key} is duplicated on the {side} side; pairing every combination")
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::value::CellValue;
    use pretty_assertions::assert_eq;

    fn people(rows: &[(i64, &str)]) -> RowSet {
        RowSet::from_records(rows.iter().map(|(id, name)| {
            vec![
                ("id", CellValue::from(*id)),
                ("name", CellValue::from(*name)),
            ]
        }))
    }

    fn keys() -> Vec<String> {
        vec!["id".to_string()]
    }

    fn key(id: i64) -> Key {
        Key(vec![CellValue::from(id)])
    }

    #[test]
    fn inner_match_keeps_only_shared_keys() {
        let left = people(&[(1, "Alice"), (2, "Bob"), (4, "Dee")]);
        let right = people(&[(1, "Alicia"), (2, "Bob"), (3, "Carl")]);

        let matched = match_rows(&left, &right, &keys(), MatchMode::Inner, DuplicateKeys::Expand)
            .expect("match should succeed");

        let matched_keys: Vec<Key> = matched.iter().map(|entry| entry.key.clone()).collect();
        assert_eq!(matched_keys, vec![key(1), key(2)]);
        assert!(matched
            .iter()
            .all(|entry| matches!(entry.pairing, Pairing::Both { .. })));
    }

    #[test]
    fn outer_match_tags_every_key() {
        let left = people(&[(1, "Alice"), (4, "Dee")]);
        let right = people(&[(1, "Alicia"), (3, "Carl")]);

        let matched = match_rows(&left, &right, &keys(), MatchMode::Outer, DuplicateKeys::Expand)
            .expect("match should succeed");

        let tags: Vec<(Key, &str)> = matched
            .iter()
            .map(|entry| {
                let tag = match entry.pairing {
                    Pairing::Both { .. } => "both",
                    Pairing::LeftOnly(_) => "left",
                    Pairing::RightOnly(_) => "right",
                };
                (entry.key.clone(), tag)
            })
            .collect();
        assert_eq!(
            tags,
            vec![(key(1), "both"), (key(4), "left"), (key(3), "right")]
        );

        let only_right = right_only(&matched);
        assert_eq!(only_right.len(), 1);
        assert_eq!(only_right[0].1.get("name"), Some(&CellValue::from("Carl")));
    }

    #[test]
    fn empty_row_sets_with_a_header_match_to_nothing() {
        let empty = RowSet::with_columns(["id", "name"], Vec::<Vec<(String, CellValue)>>::new());
        let right = people(&[(1, "Alicia")]);

        for mode in [MatchMode::Inner, MatchMode::Outer] {
            let matched = match_rows(&empty, &empty, &keys(), mode, DuplicateKeys::Reject)
                .expect("empty match should succeed");
            assert!(matched.is_empty());
        }

        let inner = match_rows(&empty, &right, &keys(), MatchMode::Inner, DuplicateKeys::Reject)
            .expect("inner match should succeed");
        assert!(inner.is_empty());

        let outer = match_rows(&empty, &right, &keys(), MatchMode::Outer, DuplicateKeys::Reject)
            .expect("outer match should succeed");
        assert_eq!(right_only(&outer).len(), 1);
        assert_eq!(outer[0].key, key(1));
    }

    #[test]
    fn duplicate_keys_expand_to_cross_product() {
        let left = people(&[(1, "a"), (1, "b")]);
        let right = people(&[(1, "x"), (1, "y"), (1, "z")]);

        let matched = match_rows(&left, &right, &keys(), MatchMode::Inner, DuplicateKeys::Expand)
            .expect("match should succeed");

        assert_eq!(matched.len(), 6);
    }

    #[test]
    fn duplicate_keys_can_be_rejected() {
        let left = people(&[(1, "a")]);
        let right = people(&[(1, "x"), (1, "y")]);

        let err = match_rows(&left, &right, &keys(), MatchMode::Inner, DuplicateKeys::Reject)
            .expect_err("duplicates should be rejected");

        assert_eq!(
            err,
            ReconcileError::DuplicateKey {
                side: Side::Right,
                key: "1".to_string()
            }
        );
    }

    #[test]
    fn missing_key_column_fails_fast() {
        let left = people(&[(1, "a")]);
        let right = RowSet::from_records(vec![vec![("schedule_id", 1_i64)]]);

        let err = match_rows(&left, &right, &keys(), MatchMode::Outer, DuplicateKeys::Expand)
            .expect_err("missing key column should fail");

        assert_eq!(
            err,
            ReconcileError::MissingColumn {
                side: Side::Right,
                column: "id".to_string()
            }
        );
    }

    #[test]
    fn empty_key_list_is_a_configuration_error() {
        let rows = people(&[(1, "a")]);
        let err = match_rows(&rows, &rows, &[], MatchMode::Inner, DuplicateKeys::Expand)
            .expect_err("empty key should fail");
        assert_eq!(err, ReconcileError::EmptyKey);
    }

    #[test]
    fn composite_keys_match_on_all_columns() {
        let left = RowSet::from_records(vec![
            vec![("site", CellValue::from("north")), ("shift", CellValue::from(1_i64))],
            vec![("site", CellValue::from("north")), ("shift", CellValue::from(2_i64))],
        ]);
        let right = RowSet::from_records(vec![vec![
            ("site", CellValue::from("north")),
            ("shift", CellValue::from(2_i64)),
        ]]);
        let keys = vec!["site".to_string(), "shift".to_string()];

        let matched = match_rows(&left, &right, &keys, MatchMode::Inner, DuplicateKeys::Reject)
            .expect("match should succeed");

        assert_eq!(matched.len(), 1);
        assert_eq!(
            matched[0].key,
            Key(vec![CellValue::from("north"), CellValue::from(2_i64)])
        );
    }
}
