pub mod connection;
pub mod warehouse;
