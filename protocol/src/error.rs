use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error(transparent)]
    Wire(#[from] bridge_wire::WireError),

    /// A oneof that is required to carry exactly one branch had none set.
    #[error("{0} had no oneof branch set")]
    MissingOneof(&'static str),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
