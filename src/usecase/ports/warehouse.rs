use crate::domain::entities::instruction::ApplyInstruction;
use crate::domain::entities::row_set::RowSet;
use crate::usecase::ports::error::PortError;

pub trait Warehouse {
    fn select(&self, query: &str) -> Result<RowSet, PortError>;

    fn apply_updates(
        &self,
        query: &str,
        instructions: &[ApplyInstruction],
    ) -> Result<usize, PortError>;
}
