pub mod extra_write;
pub mod instruction;
pub mod mapping;
pub mod row_set;
pub mod value;
