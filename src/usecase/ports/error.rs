#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    Message(String),
    #[error("{0} is read-only")]
    ReadOnly(String),
    #[error("unknown column `{0}` in the destination header")]
    UnknownColumn(String),
}

impl From<anyhow::Error> for PortError {
    fn from(err: anyhow::Error) -> Self {
        PortError::Message(format!("{err:#}"))
    }
}
