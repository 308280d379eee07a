//! Client -> server wire messages: the two top-level envelope payloads
//! (`BidiRequestId`, `BidiAppendRequest`) and the `AgentClientMessage` oneof
//! carried hex-encoded inside a `BidiAppendRequest.data`.

use bridge_wire::FieldValue;
use bridge_wire::decode_fields;
use bridge_wire::encode_bytes_field;
use bridge_wire::encode_string_field;
use bridge_wire::encode_varint_field;

use crate::error::Result;

/// The sole payload of the initial `RunSSE` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct BidiRequestId {
    pub request_id: String,
}

impl BidiRequestId {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_string_field(1, &self.request_id, &mut out);
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;
        let request_id = field_string(&fields, 1).unwrap_or_default();
        Ok(Self { request_id })
    }
}

/// The payload of every `BidiAppend` call: a hex-encoded `AgentClientMessage`
/// plus the request id it belongs to and its position in the append stream.
#[derive(Debug, Clone, PartialEq)]
pub struct BidiAppendRequest {
    pub data_hex: String,
    pub request_id: BidiRequestId,
    pub append_seqno: u64,
}

impl BidiAppendRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_string_field(1, &self.data_hex, &mut out);
        encode_bytes_field(2, &self.request_id.encode(), &mut out);
        encode_varint_field(3, self.append_seqno, &mut out);
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;
        let data_hex = field_string(&fields, 1).unwrap_or_default();
        let request_id = field_message(&fields, 2)
            .map(|b| BidiRequestId::decode(&b))
            .transpose()?
            .unwrap_or(BidiRequestId {
                request_id: String::new(),
            });
        let append_seqno = field_u64(&fields, 3).unwrap_or(0);
        Ok(Self {
            data_hex,
            request_id,
            append_seqno,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvDescriptor {
    pub os_version: String,
    pub workspace_path: String,
    pub shell: String,
    pub timezone: String,
    pub project_folder: String,
}

impl EnvDescriptor {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_string_field(1, &self.os_version, &mut out);
        encode_string_field(2, &self.workspace_path, &mut out);
        encode_string_field(3, &self.shell, &mut out);
        encode_string_field(4, &self.timezone, &mut out);
        encode_string_field(5, &self.project_folder, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserMessage {
    pub text: String,
    pub message_id: String,
    pub mode: String,
}

impl UserMessage {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_string_field(1, &self.text, &mut out);
        encode_string_field(2, &self.message_id, &mut out);
        encode_string_field(3, &self.mode, &mut out);
        out
    }
}

/// `conversation_action.user_message_action`, the only action kind the
/// bridge ever sends.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMessageAction {
    pub user_message: UserMessage,
    pub env: EnvDescriptor,
}

impl UserMessageAction {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_bytes_field(1, &self.user_message.encode(), &mut out);
        let mut ctx = Vec::new();
        encode_bytes_field(1, &self.env.encode(), &mut ctx);
        encode_bytes_field(2, &ctx, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationAction {
    pub user_message_action: UserMessageAction,
}

impl ConversationAction {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_bytes_field(1, &self.user_message_action.encode(), &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub conversation_action: ConversationAction,
    pub model_id: String,
    pub conversation_id: String,
}

impl RunRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_bytes_field(1, &[], &mut out); // conversation_state: empty, present
        encode_bytes_field(2, &self.conversation_action.encode(), &mut out);
        let mut model_details = Vec::new();
        encode_string_field(1, &self.model_id, &mut model_details);
        encode_bytes_field(3, &model_details, &mut out);
        encode_string_field(4, &self.conversation_id, &mut out);
        out
    }
}

/// Mirrors an `ExecRequest`'s field number in the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResultKind {
    Shell,
    Write,
    Grep,
    Read,
    Ls,
    RequestContext,
    Mcp,
    Unknown(u32),
}

impl ExecResultKind {
    pub fn field_number(self) -> u32 {
        match self {
            ExecResultKind::Shell => 2,
            ExecResultKind::Write => 3,
            ExecResultKind::Grep => 5,
            ExecResultKind::Read => 7,
            ExecResultKind::Ls => 8,
            ExecResultKind::RequestContext => 10,
            ExecResultKind::Mcp => 11,
            ExecResultKind::Unknown(n) => n,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecClientMessage {
    pub id: u32,
    pub exec_id: Option<String>,
    pub result_kind: ExecResultKind,
    pub result_body: Vec<u8>,
}

impl ExecClientMessage {
    /// Distinct from every `ExecResultKind::field_number()` value so an
    /// exec_id never collides with the result body it's attached to.
    const EXEC_ID_FIELD: u32 = 23;

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_varint_field(1, u64::from(self.id), &mut out);
        if let Some(exec_id) = &self.exec_id {
            encode_string_field(Self::EXEC_ID_FIELD, exec_id, &mut out);
        }
        encode_bytes_field(self.result_kind.field_number(), &self.result_body, &mut out);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvResultKind {
    GetBlob,
    SetBlob,
}

impl KvResultKind {
    fn field_number(self) -> u32 {
        match self {
            KvResultKind::GetBlob => 2,
            KvResultKind::SetBlob => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KvClientMessage {
    pub id: u32,
    pub result_kind: KvResultKind,
    pub result_body: Vec<u8>,
}

impl KvClientMessage {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_varint_field(1, u64::from(self.id), &mut out);
        encode_bytes_field(self.result_kind.field_number(), &self.result_body, &mut out);
        out
    }
}

/// `AgentClientMessage`, the top-level client -> server oneof (field numbers
/// per the wire contract: 1=run_request, 2=exec_client_message,
/// 3=kv_client_message, 4=conversation_action, 5=exec_client_control_message,
/// 6=interaction_response).
#[derive(Debug, Clone, PartialEq)]
pub enum AgentClientMessage {
    RunRequest(RunRequest),
    ExecClientMessage(ExecClientMessage),
    KvClientMessage(KvClientMessage),
    ConversationAction(ConversationAction),
    ExecClientControlMessage(Vec<u8>),
    InteractionResponse(Vec<u8>),
}

impl AgentClientMessage {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            AgentClientMessage::RunRequest(m) => encode_bytes_field(1, &m.encode(), &mut out),
            AgentClientMessage::ExecClientMessage(m) => {
                encode_bytes_field(2, &m.encode(), &mut out)
            }
            AgentClientMessage::KvClientMessage(m) => encode_bytes_field(3, &m.encode(), &mut out),
            AgentClientMessage::ConversationAction(m) => {
                encode_bytes_field(4, &m.encode(), &mut out)
            }
            AgentClientMessage::ExecClientControlMessage(raw) => {
                encode_bytes_field(5, raw, &mut out)
            }
            AgentClientMessage::InteractionResponse(raw) => encode_bytes_field(6, raw, &mut out),
        }
        out
    }
}

pub(crate) fn field_string(fields: &[(u32, FieldValue)], number: u32) -> Option<String> {
    fields
        .iter()
        .find(|(n, _)| *n == number)
        .and_then(|(_, v)| v.as_string())
}

pub(crate) fn field_bytes(fields: &[(u32, FieldValue)], number: u32) -> Option<bytes::Bytes> {
    fields
        .iter()
        .find(|(n, _)| *n == number)
        .and_then(|(_, v)| v.as_bytes())
}

pub(crate) fn field_message(fields: &[(u32, FieldValue)], number: u32) -> Option<bytes::Bytes> {
    field_bytes(fields, number)
}

pub(crate) fn field_u64(fields: &[(u32, FieldValue)], number: u32) -> Option<u64> {
    fields
        .iter()
        .find(|(n, _)| *n == number)
        .and_then(|(_, v)| v.as_u64())
}

pub(crate) fn field_u32(fields: &[(u32, FieldValue)], number: u32) -> Option<u32> {
    field_u64(fields, number).map(|v| v as u32)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn bidi_request_id_round_trips() {
        let value = BidiRequestId {
            request_id: "req-123".to_string(),
        };
        let decoded = BidiRequestId::decode(&value.encode()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn bidi_append_request_round_trips_nested_request_id() {
        let value = BidiAppendRequest {
            data_hex: "deadbeef".to_string(),
            request_id: BidiRequestId {
                request_id: "req-123".to_string(),
            },
            append_seqno: 7,
        };
        let decoded = BidiAppendRequest::decode(&value.encode()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn exec_client_message_mirrors_request_field_number() {
        let msg = ExecClientMessage {
            id: 42,
            exec_id: Some("exec-1".to_string()),
            result_kind: ExecResultKind::Read,
            result_body: vec![1, 2, 3],
        };
        let encoded = msg.encode();
        let fields = decode_fields(&encoded).unwrap();
        assert!(fields.iter().any(|(n, _)| *n == 7));
    }
}
