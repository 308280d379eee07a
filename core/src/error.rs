use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// The error taxonomy a session can surface. `Codec`/`Handler` errors are
/// recoverable by design — they turn into an error branch on a reply or a
/// soft flag, never a torn-down session. Everything else is fatal to the
/// current turn.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Wire(#[from] bridge_wire::WireError),

    #[error(transparent)]
    Protocol(#[from] bridge_protocol::ProtocolError),

    #[error("vendor call returned unexpected status {status}: {body}")]
    Transport {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("vendor trailer reported grpc-status {status}: {message}")]
    VendorTrailer { status: i32, message: String },

    #[error("local handler failed: {0}")]
    Handler(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("session exceeded its {0:?} budget")]
    Timeout(std::time::Duration),

    #[error("client disconnected")]
    ClientCancel,
}

impl SessionError {
    /// Whether this error should be surfaced to the OpenAI client as a
    /// terminal SSE error chunk (everything except client-initiated
    /// cancellation, which is silent by design).
    pub fn is_client_visible(&self) -> bool {
        !matches!(self, SessionError::ClientCancel)
    }
}
