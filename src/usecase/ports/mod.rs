pub mod backup;
pub mod error;
pub mod sheet;
pub mod warehouse;
