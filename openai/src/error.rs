use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("messages must be a non-empty array")]
    EmptyMessages,

    #[error("unsupported role {0:?}")]
    UnsupportedRole(String),

    #[error(transparent)]
    Session(#[from] bridge_core::SessionError),
}

impl AdapterError {
    /// HTTP status this error maps to; everything but a malformed request
    /// body is a 500 from the gateway's point of view.
    pub fn status_code(&self) -> u16 {
        match self {
            AdapterError::EmptyMessages | AdapterError::UnsupportedRole(_) => 400,
            AdapterError::Session(_) => 500,
        }
    }
}
