//! Field tags and per-wire-type payload encode/decode.

use bytes::Bytes;

use crate::error::Result;
use crate::error::WireError;
use crate::varint::decode_varint;
use crate::varint::encode_varint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub fn from_u8(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(WireError::UnknownWireType(other)),
        }
    }
}

/// A single decoded field: its number, wire type, and raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Bytes),
    Fixed32(u32),
}

/// Appends the `(field_number << 3) | wire_type` tag.
pub fn encode_tag(field_number: u32, wire_type: WireType, out: &mut Vec<u8>) {
    let tag = (u64::from(field_number) << 3) | (wire_type as u64);
    encode_varint(tag, out);
}

pub fn encode_varint_field(field_number: u32, value: u64, out: &mut Vec<u8>) {
    encode_tag(field_number, WireType::Varint, out);
    encode_varint(value, out);
}

pub fn encode_bool_field(field_number: u32, value: bool, out: &mut Vec<u8>) {
    encode_varint_field(field_number, u64::from(value), out);
}

pub fn encode_bytes_field(field_number: u32, value: &[u8], out: &mut Vec<u8>) {
    encode_tag(field_number, WireType::LengthDelimited, out);
    encode_varint(value.len() as u64, out);
    out.extend_from_slice(value);
}

pub fn encode_string_field(field_number: u32, value: &str, out: &mut Vec<u8>) {
    encode_bytes_field(field_number, value.as_bytes(), out);
}

pub fn encode_fixed64_field(field_number: u32, value: u64, out: &mut Vec<u8>) {
    encode_tag(field_number, WireType::Fixed64, out);
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed32_field(field_number: u32, value: u32, out: &mut Vec<u8>) {
    encode_tag(field_number, WireType::Fixed32, out);
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn encode_double_field(field_number: u32, value: f64, out: &mut Vec<u8>) {
    encode_fixed64_field(field_number, value.to_bits(), out);
}

/// Decodes every `(field_number, wire_type, payload)` triple in `buf` in
/// order. Unknown field numbers are not filtered here — callers ignore what
/// they don't recognize, per the forward-compatibility rule.
pub fn decode_fields(buf: &[u8]) -> Result<Vec<(u32, FieldValue)>> {
    let mut fields = Vec::new();
    let mut pos = 0usize;

    while pos < buf.len() {
        let (tag, tag_len) = decode_varint(&buf[pos..])?;
        if tag_len == 0 {
            break; // truncated tag, stop and let the caller treat this as partial
        }
        pos += tag_len;

        let field_number = (tag >> 3) as u32;
        let wire_type = WireType::from_u8((tag & 0x7) as u8)?;

        let value = match wire_type {
            WireType::Varint => {
                let (v, len) = decode_varint(&buf[pos..])?;
                if len == 0 {
                    break;
                }
                pos += len;
                FieldValue::Varint(v)
            }
            WireType::Fixed64 => {
                if buf.len() < pos + 8 {
                    break;
                }
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&buf[pos..pos + 8]);
                pos += 8;
                FieldValue::Fixed64(u64::from_le_bytes(bytes))
            }
            WireType::Fixed32 => {
                if buf.len() < pos + 4 {
                    break;
                }
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&buf[pos..pos + 4]);
                pos += 4;
                FieldValue::Fixed32(u32::from_le_bytes(bytes))
            }
            WireType::LengthDelimited => {
                let (len, len_bytes) = decode_varint(&buf[pos..])?;
                if len_bytes == 0 {
                    break;
                }
                pos += len_bytes;
                let len = len as usize;
                if buf.len() < pos + len {
                    return Err(WireError::TruncatedLengthDelimited(len as u64));
                }
                let payload = Bytes::copy_from_slice(&buf[pos..pos + len]);
                pos += len;
                FieldValue::LengthDelimited(payload)
            }
        };

        fields.push((field_number, value));
    }

    Ok(fields)
}

impl FieldValue {
    pub fn as_string(&self) -> Option<String> {
        match self {
            FieldValue::LengthDelimited(bytes) => String::from_utf8(bytes.to_vec()).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<Bytes> {
        match self {
            FieldValue::LengthDelimited(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Varint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_u64().map(|v| v != 0)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Fixed64(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<Result<Vec<(u32, FieldValue)>>> {
        match self {
            FieldValue::LengthDelimited(bytes) => Some(decode_fields(bytes)),
            _ => None,
        }
    }
}
