use crate::domain::entities::extra_write::{ExtraWrite, WriteContent};
use crate::domain::entities::value::{CellValue, Key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyInstruction {
    pub key: Key,
    pub id: Vec<(String, CellValue)>,
    pub values: Vec<(String, CellValue)>,
}

impl ApplyInstruction {
    pub fn params(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values
            .iter()
            .chain(self.id.iter())
            .map(|(column, value)| (column.as_str(), value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub key: Key,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    pub accepted: Vec<ApplyInstruction>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub row_number: usize,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendInstruction {
    pub key: Key,
    pub values: Vec<(String, CellValue)>,
    pub extra_writes: Vec<ExtraWrite>,
}

impl AppendInstruction {
    pub fn cell_writes(&self, row_number: usize) -> Vec<CellWrite> {
        self.extra_writes
            .iter()
            .map(|write| CellWrite {
                row_number,
                column: write.column.clone(),
                value: match &write.content {
                    WriteContent::Literal(value) => value.render(),
                    WriteContent::Template(template) => template.render(row_number),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendPlan {
    NothingToDo,
    Rows(Vec<AppendInstruction>),
}

impl AppendPlan {
    pub fn instructions(&self) -> &[AppendInstruction] {
        match self {
            AppendPlan::NothingToDo => &[],
            AppendPlan::Rows(rows) => rows,
        }
    }
}
