use crate::domain::entities::value::{CellValue, Key};
use crate::domain::reconcile::error::{ReconcileError, Side};

// Every row holds one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RowSet {
    #[allow(dead_code)]
    pub fn from_records<I, R, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self::with_columns(Vec::<String>::new(), records)
    }

    #[allow(dead_code)]
    pub fn with_columns<C, I, R, K, V>(header: impl IntoIterator<Item = C>, records: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut columns: Vec<String> = Vec::new();
        for column in header {
            let column = column.into();
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        let mut staged: Vec<Vec<(usize, CellValue)>> = Vec::new();

        for record in records {
            let mut fields = Vec::new();
            for (name, value) in record {
                let name = name.into();
                let col_idx = match columns.iter().position(|col| *col == name) {
                    Some(idx) => idx,
                    None => {
                        columns.push(name);
                        columns.len() - 1
                    }
                };
                fields.push((col_idx, value.into()));
            }
            staged.push(fields);
        }

        let rows = staged
            .into_iter()
            .map(|fields| {
                let mut row = vec![CellValue::Empty; columns.len()];
                for (col_idx, value) in fields {
                    row[col_idx] = value;
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    // short rows are padded with blanks; cells beyond the header are dropped
    pub fn from_table(
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, ReconcileError> {
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].contains(column) {
                return Err(ReconcileError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn require_column(&self, side: Side, name: &str) -> Result<usize, ReconcileError> {
        self.column_index(name)
            .ok_or_else(|| ReconcileError::MissingColumn {
                side,
                column: name.to_string(),
            })
    }

    pub fn require_columns(
        &self,
        side: Side,
        names: &[String],
    ) -> Result<Vec<usize>, ReconcileError> {
        names
            .iter()
            .map(|name| self.require_column(side, name))
            .collect()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            index,
            cells,
            columns: &self.columns,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().enumerate().map(|(index, cells)| Row {
            index,
            cells,
            columns: &self.columns,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    cells: &'a [CellValue],
    columns: &'a [String],
}

impl<'a> Row<'a> {
    pub fn cell(&self, col_idx: usize) -> &'a CellValue {
        &self.cells[col_idx]
    }

    #[allow(dead_code)]
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|col_idx| &self.cells[col_idx])
    }

    pub fn key(&self, key_cols: &[usize]) -> Key {
        Key(key_cols
            .iter()
            .map(|col_idx| self.cells[*col_idx].clone())
            .collect())
    }
}

impl PartialEq for Row<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.cells == other.cells
    }
}

impl Eq for Row<'_> {}
