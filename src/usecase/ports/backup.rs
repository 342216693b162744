use std::path::PathBuf;

use crate::domain::entities::row_set::RowSet;
use crate::usecase::ports::error::PortError;

pub trait BackupSink {
    fn save(&self, rows: &RowSet) -> Result<PathBuf, PortError>;
}
