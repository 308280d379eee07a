use thiserror::Error;

/// Errors surfaced by the low-level codec.
///
/// Per the protocol's design, a malformed wire type or a truncated nested
/// message is never fatal on its own: the frame reader keeps buffering until
/// more bytes arrive, and the field decoder drops only the offending field.
/// This type exists for the handful of cases that genuinely cannot be
/// recovered from inside a single field (e.g. an out-of-range wire type).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unknown wire type {0}")]
    UnknownWireType(u8),

    #[error("varint is longer than 10 bytes")]
    VarintTooLong,

    #[error("length-delimited field declares length {0} past end of buffer")]
    TruncatedLengthDelimited(u64),

    #[error("google.protobuf.Value had no oneof branch set")]
    EmptyProtoValue,
}

pub type Result<T> = std::result::Result<T, WireError>;
