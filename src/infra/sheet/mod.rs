pub mod csv_sheet;
pub mod xlsx;

use std::path::Path;

use anyhow::Result;

use crate::usecase::ports::sheet::Sheet;

pub fn is_writable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

pub fn open_sheet(path: &Path, sheet: Option<&str>) -> Result<Box<dyn Sheet>> {
    if is_writable(path) {
        Ok(Box::new(csv_sheet::CsvSheet::open(path)?))
    } else {
        Ok(Box::new(xlsx::XlsxSheet::open(path, sheet)?))
    }
}
