use crate::domain::entities::row_set::RowSet;
use crate::domain::entities::value::CellValue;
use crate::usecase::ports::error::PortError;

pub trait SheetSource {
    fn describe(&self) -> String;

    fn snapshot(&self) -> Result<RowSet, PortError>;
}

/// Row numbers are 1-based and count the header row.
pub trait SheetSink {
    fn row_count(&self) -> Result<usize, PortError>;

    fn append_row(&mut self, values: &[(String, CellValue)]) -> Result<(), PortError>;

    fn update_cell(&mut self, row_number: usize, column: &str, value: &str)
        -> Result<(), PortError>;
}

pub trait Sheet: SheetSource {
    fn as_sink(&mut self) -> Option<&mut dyn SheetSink>;
}
