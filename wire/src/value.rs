//! `google.protobuf.Value` — the vendor's generic JSON-ish payload type.
//!
//! `Value` is itself a oneof wrapper, which makes it the one place in the
//! dialect where proto3's "elide the default" convention is actively wrong:
//! encoding the empty string or null still has to emit the field tag so the
//! server can tell "string set to ''" apart from "no branch set at all". Every
//! encoder below writes its tag unconditionally for that reason.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::error::WireError;
use crate::field::FieldValue;
use crate::field::decode_fields;
use crate::field::encode_bool_field;
use crate::field::encode_bytes_field;
use crate::field::encode_double_field;
use crate::field::encode_string_field;
use crate::field::encode_varint_field;

/// In-memory mirror of `google.protobuf.Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoValue {
    Null,
    Number(f64),
    String(String),
    Bool(bool),
    Struct(BTreeMap<String, ProtoValue>),
    List(Vec<ProtoValue>),
}

const FIELD_NULL: u32 = 1;
const FIELD_NUMBER: u32 = 2;
const FIELD_STRING: u32 = 3;
const FIELD_BOOL: u32 = 4;
const FIELD_STRUCT: u32 = 5;
const FIELD_LIST: u32 = 6;

/// Encodes the raw `Value` message body (no outer field tag — the caller
/// wraps this in `encode_bytes_field(field_number, &bytes, out)` wherever a
/// `Value` is embedded in a parent message).
pub fn encode_value(value: &ProtoValue) -> Vec<u8> {
    let mut out = Vec::new();
    match value {
        ProtoValue::Null => encode_varint_field(FIELD_NULL, 0, &mut out),
        ProtoValue::Number(n) => encode_double_field(FIELD_NUMBER, *n, &mut out),
        ProtoValue::String(s) => encode_string_field(FIELD_STRING, s, &mut out),
        ProtoValue::Bool(b) => encode_bool_field(FIELD_BOOL, *b, &mut out),
        ProtoValue::Struct(map) => {
            let mut fields_buf = Vec::new();
            for (key, v) in map {
                let mut entry = Vec::new();
                encode_string_field(1, key, &mut entry);
                encode_bytes_field(2, &encode_value(v), &mut entry);
                encode_bytes_field(1, &entry, &mut fields_buf);
            }
            encode_bytes_field(FIELD_STRUCT, &fields_buf, &mut out);
        }
        ProtoValue::List(items) => {
            let mut values_buf = Vec::new();
            for item in items {
                encode_bytes_field(1, &encode_value(item), &mut values_buf);
            }
            encode_bytes_field(FIELD_LIST, &values_buf, &mut out);
        }
    }
    out
}

/// Decodes a raw `Value` message body. Fails only if no oneof branch was
/// present at all — a genuinely malformed payload, not a truncation.
pub fn decode_value(buf: &[u8]) -> Result<ProtoValue> {
    let fields = decode_fields(buf)?;
    let (field_number, payload) = fields.last().ok_or(WireError::EmptyProtoValue)?;

    match *field_number {
        FIELD_NULL => Ok(ProtoValue::Null),
        FIELD_NUMBER => Ok(ProtoValue::Number(payload.as_f64().unwrap_or_default())),
        FIELD_STRING => Ok(ProtoValue::String(payload.as_string().unwrap_or_default())),
        FIELD_BOOL => Ok(ProtoValue::Bool(payload.as_bool().unwrap_or_default())),
        FIELD_STRUCT => {
            let mut map = BTreeMap::new();
            if let Some(entries) = payload.as_message() {
                for (_, entry_field) in entries? {
                    if let FieldValue::LengthDelimited(entry_bytes) = entry_field {
                        let entry_fields = decode_fields(&entry_bytes)?;
                        let key = entry_fields
                            .iter()
                            .find(|(n, _)| *n == 1)
                            .and_then(|(_, v)| v.as_string());
                        let value_bytes = entry_fields
                            .iter()
                            .find(|(n, _)| *n == 2)
                            .and_then(|(_, v)| v.as_bytes());
                        if let (Some(key), Some(value_bytes)) = (key, value_bytes) {
                            map.insert(key, decode_value(&value_bytes)?);
                        }
                    }
                }
            }
            Ok(ProtoValue::Struct(map))
        }
        FIELD_LIST => {
            let mut items = Vec::new();
            if let Some(entries) = payload.as_message() {
                for (_, entry_field) in entries? {
                    if let FieldValue::LengthDelimited(value_bytes) = entry_field {
                        items.push(decode_value(&value_bytes)?);
                    }
                }
            }
            Ok(ProtoValue::List(items))
        }
        other => Err(WireError::UnknownWireType(other as u8)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn round_trip(value: ProtoValue) {
        let encoded = encode_value(&value);
        assert!(!encoded.is_empty(), "oneof presence must be emitted");
        let decoded = decode_value(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn null_and_empty_string_still_emit_bytes() {
        round_trip(ProtoValue::Null);
        round_trip(ProtoValue::String(String::new()));
    }

    #[test]
    fn round_trips_scalars() {
        round_trip(ProtoValue::Number(3.5));
        round_trip(ProtoValue::Bool(true));
        round_trip(ProtoValue::Bool(false));
        round_trip(ProtoValue::String("hello".into()));
    }

    #[test]
    fn round_trips_struct_and_list() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), ProtoValue::Number(1.0));
        map.insert("b".to_string(), ProtoValue::String("x".into()));
        round_trip(ProtoValue::Struct(map));

        round_trip(ProtoValue::List(vec![
            ProtoValue::Bool(true),
            ProtoValue::Null,
            ProtoValue::String("nested".into()),
        ]));
    }

    #[test]
    fn rejects_a_value_with_no_branch_set() {
        assert_eq!(decode_value(&[]), Err(WireError::EmptyProtoValue));
    }
}
