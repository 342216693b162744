pub mod entities;
pub mod reconcile;
