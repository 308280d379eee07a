//! `InteractionUpdate` — the inner oneof of `interaction_update`, and the
//! sibling `InteractionQuery` the vendor uses for informational prompts.

use bridge_wire::decode_fields;

use crate::client_message::field_message;
use crate::client_message::field_string;
use crate::client_message::field_u32;
use crate::error::Result;
use crate::tool_call::ToolCall;
use crate::tool_call::ToolKind;
use crate::tool_call::decode_tool_call_args;

/// Field numbers observed on the wire for the scalar-delta branches; the
/// tool-call branches (started/partial/completed) are not independently
/// numbered in the source material, so this table assigns them the next
/// free numbers above the documented heartbeat/turn_ended slots.
mod field_numbers {
    pub const TEXT_DELTA: u32 = 1;
    pub const THINKING_DELTA: u32 = 4;
    pub const TOKEN_DELTA: u32 = 8;
    pub const HEARTBEAT: u32 = 13;
    pub const TURN_ENDED: u32 = 14;
    pub const TOOL_CALL_STARTED: u32 = 20;
    pub const PARTIAL_TOOL_CALL: u32 = 21;
    pub const TOOL_CALL_COMPLETED: u32 = 22;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallStarted {
    pub call_id: String,
    pub model_call_id: String,
    pub tool_call: ToolCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialToolCall {
    pub call_id: String,
    pub args_delta: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallCompleted {
    pub call_id: String,
    pub model_call_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionUpdate {
    TextDelta(String),
    ThinkingDelta(String),
    TokenDelta(u32),
    Heartbeat,
    TurnEnded,
    ToolCallStarted(ToolCallStarted),
    PartialToolCall(PartialToolCall),
    ToolCallCompleted(ToolCallCompleted),
}

impl InteractionUpdate {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;

        if let Some(text) = field_string(&fields, field_numbers::TEXT_DELTA) {
            return Ok(InteractionUpdate::TextDelta(text));
        }
        if let Some(text) = field_string(&fields, field_numbers::THINKING_DELTA) {
            return Ok(InteractionUpdate::ThinkingDelta(text));
        }
        if let Some(tokens) = field_u32(&fields, field_numbers::TOKEN_DELTA) {
            return Ok(InteractionUpdate::TokenDelta(tokens));
        }
        if fields.iter().any(|(n, _)| *n == field_numbers::HEARTBEAT) {
            return Ok(InteractionUpdate::Heartbeat);
        }
        if fields.iter().any(|(n, _)| *n == field_numbers::TURN_ENDED) {
            return Ok(InteractionUpdate::TurnEnded);
        }
        if let Some(body) = field_message(&fields, field_numbers::TOOL_CALL_STARTED) {
            return Ok(InteractionUpdate::ToolCallStarted(decode_tool_call_started(
                &body,
            )?));
        }
        if let Some(body) = field_message(&fields, field_numbers::PARTIAL_TOOL_CALL) {
            let inner = decode_fields(&body)?;
            return Ok(InteractionUpdate::PartialToolCall(PartialToolCall {
                call_id: field_string(&inner, 1).unwrap_or_default(),
                args_delta: field_string(&inner, 2).unwrap_or_default(),
            }));
        }
        if let Some(body) = field_message(&fields, field_numbers::TOOL_CALL_COMPLETED) {
            let inner = decode_fields(&body)?;
            return Ok(InteractionUpdate::ToolCallCompleted(ToolCallCompleted {
                call_id: field_string(&inner, 1).unwrap_or_default(),
                model_call_id: field_string(&inner, 2).unwrap_or_default(),
            }));
        }

        // No recognized branch: treat the turn as over rather than hang the
        // session on an update it has no handler for.
        Ok(InteractionUpdate::TurnEnded)
    }
}

fn decode_tool_call_started(body: &[u8]) -> Result<ToolCallStarted> {
    let fields = decode_fields(body)?;
    let call_id = field_string(&fields, 1).unwrap_or_default();
    let model_call_id = field_string(&fields, 2).unwrap_or_default();

    let (kind_field, args_body) = fields
        .iter()
        .find(|(n, _)| !matches!(*n, 1 | 2))
        .map(|(n, v)| (*n, v.as_bytes().map(|b| b.to_vec()).unwrap_or_default()))
        .unwrap_or((0, Vec::new()));

    let kind = ToolKind::from_field_number(kind_field);
    let tool_call = decode_tool_call_args(kind, kind.name(), &args_body)?;

    Ok(ToolCallStarted {
        call_id,
        model_call_id,
        tool_call,
    })
}

/// Informational queries the vendor raises mid-turn. The core surfaces
/// these to the adapter but never answers them.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionQuery {
    pub query_type: String,
}

impl InteractionQuery {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;
        Ok(Self {
            query_type: field_string(&fields, 1).unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use bridge_wire::encode_bytes_field;
    use bridge_wire::encode_string_field;
    use bridge_wire::encode_varint_field;

    #[test]
    fn decodes_text_delta() {
        let mut buf = Vec::new();
        encode_string_field(field_numbers::TEXT_DELTA, "hello", &mut buf);
        assert_eq!(
            InteractionUpdate::decode(&buf).unwrap(),
            InteractionUpdate::TextDelta("hello".to_string())
        );
    }

    #[test]
    fn decodes_heartbeat_and_turn_ended() {
        let mut heartbeat = Vec::new();
        encode_bytes_field(field_numbers::HEARTBEAT, &[], &mut heartbeat);
        assert_eq!(
            InteractionUpdate::decode(&heartbeat).unwrap(),
            InteractionUpdate::Heartbeat
        );

        let mut turn_ended = Vec::new();
        encode_bytes_field(field_numbers::TURN_ENDED, &[], &mut turn_ended);
        assert_eq!(
            InteractionUpdate::decode(&turn_ended).unwrap(),
            InteractionUpdate::TurnEnded
        );
    }

    #[test]
    fn decodes_tool_call_started_with_nested_shell_args() {
        let mut shell_args = Vec::new();
        encode_string_field(1, "ls -la", &mut shell_args);

        let mut started = Vec::new();
        encode_string_field(1, "call-1", &mut started);
        encode_string_field(2, "model-call-1", &mut started);
        encode_bytes_field(1, &shell_args, &mut started); // ToolKind::Shell == field 1

        let mut buf = Vec::new();
        encode_bytes_field(field_numbers::TOOL_CALL_STARTED, &started, &mut buf);

        match InteractionUpdate::decode(&buf).unwrap() {
            InteractionUpdate::ToolCallStarted(started) => {
                assert_eq!(started.call_id, "call-1");
                assert_eq!(started.tool_call.kind, ToolKind::Shell);
                assert_eq!(
                    started.tool_call.args.get("command").unwrap(),
                    &bridge_wire::ProtoValue::String("ls -la".to_string())
                );
            }
            other => panic!("expected ToolCallStarted, got {other:?}"),
        }
    }

    #[test]
    fn token_delta_parses_as_u32() {
        let mut buf = Vec::new();
        encode_varint_field(field_numbers::TOKEN_DELTA, 42, &mut buf);
        assert_eq!(
            InteractionUpdate::decode(&buf).unwrap(),
            InteractionUpdate::TokenDelta(42)
        );
    }
}
