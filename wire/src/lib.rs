//! Low-level wire codec for the vendor's protobuf dialect: varints, field
//! tag encode/decode, the `google.protobuf.Value` oneof, and the 5-byte
//! frame envelope. No I/O and no knowledge of any specific message schema
//! lives here — see `bridge-protocol` for that.

pub mod envelope;
pub mod error;
pub mod field;
pub mod varint;
pub mod value;

pub use envelope::ENVELOPE_HEADER_LEN;
pub use envelope::FLAG_ERROR;
pub use envelope::FLAG_TRAILER;
pub use envelope::Frame;
pub use envelope::FrameReader;
pub use envelope::encode_frame;
pub use error::Result;
pub use error::WireError;
pub use field::FieldValue;
pub use field::WireType;
pub use field::decode_fields;
pub use field::encode_bool_field;
pub use field::encode_bytes_field;
pub use field::encode_double_field;
pub use field::encode_fixed32_field;
pub use field::encode_fixed64_field;
pub use field::encode_string_field;
pub use field::encode_tag;
pub use field::encode_varint_field;
pub use value::ProtoValue;
pub use value::decode_value;
pub use value::encode_value;
