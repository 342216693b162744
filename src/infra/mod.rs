pub mod backup;
pub mod sheet;
pub mod sqlite;
