//! `KvServerMessage` — the vendor's get/set blob back-channel.

use bridge_wire::decode_fields;

use crate::client_message::field_bytes;
use crate::client_message::field_u32;
use crate::error::ProtocolError;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct GetBlobArgs {
    pub blob_id: bytes::Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetBlobArgs {
    pub blob_id: bytes::Bytes,
    pub blob_data: bytes::Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KvRequestKind {
    Get(GetBlobArgs),
    Set(SetBlobArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KvRequest {
    pub id: u32,
    pub kind: KvRequestKind,
}

impl KvRequest {
    /// `id` lives at field 1 exclusively; `get_blob_args` at field 2,
    /// `set_blob_args` at field 3, mirroring `KvResultKind`'s own numbering.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;
        let id = field_u32(&fields, 1).unwrap_or(0);

        if let Some(body) = field_bytes(&fields, 2) {
            if let Ok(get_fields) = decode_fields(&body) {
                if let Some(blob_id) = field_bytes(&get_fields, 2) {
                    return Ok(Self {
                        id,
                        kind: KvRequestKind::Get(GetBlobArgs { blob_id }),
                    });
                }
            }
        }

        if let Some(body) = field_bytes(&fields, 3) {
            let set_fields = decode_fields(&body)?;
            let blob_id = field_bytes(&set_fields, 2).unwrap_or_default();
            let blob_data = field_bytes(&set_fields, 3)
                .ok_or(ProtocolError::MissingOneof("set_blob_args.blob_data"))?;
            return Ok(Self {
                id,
                kind: KvRequestKind::Set(SetBlobArgs { blob_id, blob_data }),
            });
        }

        Err(ProtocolError::MissingOneof("kv_server_message"))
    }
}

/// Hex-encodes a blob id the way the in-memory blob store keys it.
pub fn hex_blob_id(blob_id: &[u8]) -> String {
    blob_id.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use bridge_wire::encode_bytes_field;
    use bridge_wire::encode_varint_field;

    fn encode_kv_message(id: u32, variant_field: u32, variant_body: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint_field(1, u64::from(id), &mut buf);
        encode_bytes_field(variant_field, variant_body, &mut buf);
        buf
    }

    #[test]
    fn decodes_get_blob_args() {
        let mut get_body = Vec::new();
        encode_varint_field(1, 8, &mut get_body);
        encode_bytes_field(2, &[0xAB, 0xCD], &mut get_body);

        let buf = encode_kv_message(8, 2, &get_body);
        let request = KvRequest::decode(&buf).unwrap();
        assert_eq!(request.id, 8);
        match request.kind {
            KvRequestKind::Get(args) => assert_eq!(args.blob_id.as_ref(), &[0xAB, 0xCD]),
            other => panic!("expected Get, got {other:?}"),
        }
    }

    #[test]
    fn decodes_set_blob_args() {
        let mut set_body = Vec::new();
        encode_varint_field(1, 7, &mut set_body);
        encode_bytes_field(2, &[0xAB, 0xCD], &mut set_body);
        encode_bytes_field(3, &[0x01, 0x02, 0x03], &mut set_body);

        let buf = encode_kv_message(7, 3, &set_body);
        let request = KvRequest::decode(&buf).unwrap();
        assert_eq!(request.id, 7);
        match request.kind {
            KvRequestKind::Set(args) => {
                assert_eq!(args.blob_id.as_ref(), &[0xAB, 0xCD]);
                assert_eq!(args.blob_data.as_ref(), &[0x01, 0x02, 0x03]);
            }
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn hex_blob_id_is_lowercase_and_stable() {
        assert_eq!(hex_blob_id(&[0xAB, 0xCD]), "abcd");
        assert_eq!(hex_blob_id(&[]), "");
    }
}
