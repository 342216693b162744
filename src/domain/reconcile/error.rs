use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left (spreadsheet)"),
            Side::Right => f.write_str("right (warehouse)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("missing column `{column}` on the {side} side")]
    MissingColumn { side: Side, column: String },
    #[error("column `{column}` appears more than once in the header")]
    DuplicateColumn { column: String },
    #[error("key {key} appears more than once on the {side} side")]
    DuplicateKey { side: Side, key: String },
    #[error("at least one key column is required")]
    EmptyKey,
    #[error("column lists differ in length: {sources} source columns, {targets} target columns")]
    ColumnCountMismatch { sources: usize, targets: usize },
    #[error("invalid row template `{template}`: {reason}")]
    Template { template: String, reason: String },
}
