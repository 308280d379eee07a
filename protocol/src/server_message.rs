//! `AgentServerMessage` — the top-level server -> client oneof (field
//! numbers: 1=interaction_update, 2=exec_server_message,
//! 3=conversation_checkpoint_update, 4=kv_server_message,
//! 5=exec_server_control_message, 7=interaction_query).

use bridge_wire::decode_fields;

use crate::client_message::field_bytes;
use crate::error::Result;
use crate::exec::ExecRequest;
use crate::interaction::InteractionQuery;
use crate::interaction::InteractionUpdate;
use crate::kv::KvRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationCheckpointUpdate {
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentServerMessage {
    InteractionUpdate(InteractionUpdate),
    ExecServerMessage(ExecRequest),
    ConversationCheckpointUpdate(ConversationCheckpointUpdate),
    KvServerMessage(KvRequest),
    ExecServerControlMessage(Vec<u8>),
    InteractionQuery(InteractionQuery),
}

impl AgentServerMessage {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;

        if let Some(body) = field_bytes(&fields, 1) {
            return Ok(AgentServerMessage::InteractionUpdate(
                InteractionUpdate::decode(&body)?,
            ));
        }
        if let Some(body) = field_bytes(&fields, 2) {
            return Ok(AgentServerMessage::ExecServerMessage(ExecRequest::decode(
                &body,
            )?));
        }
        if let Some(body) = field_bytes(&fields, 3) {
            return Ok(AgentServerMessage::ConversationCheckpointUpdate(
                ConversationCheckpointUpdate {
                    raw: body.to_vec(),
                },
            ));
        }
        if let Some(body) = field_bytes(&fields, 4) {
            return Ok(AgentServerMessage::KvServerMessage(KvRequest::decode(
                &body,
            )?));
        }
        if let Some(body) = field_bytes(&fields, 5) {
            return Ok(AgentServerMessage::ExecServerControlMessage(body.to_vec()));
        }
        if let Some(body) = field_bytes(&fields, 7) {
            return Ok(AgentServerMessage::InteractionQuery(
                InteractionQuery::decode(&body)?,
            ));
        }

        // No recognized oneof branch set: treat like an interaction_update
        // carrying turn_ended so the session still terminates cleanly
        // instead of hanging on a message it can't interpret.
        Ok(AgentServerMessage::InteractionUpdate(
            InteractionUpdate::TurnEnded,
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use bridge_wire::encode_bytes_field;
    use bridge_wire::encode_string_field;

    #[test]
    fn decodes_interaction_update_branch() {
        let mut text_delta = Vec::new();
        encode_string_field(1, "hi", &mut text_delta);
        let mut buf = Vec::new();
        encode_bytes_field(1, &text_delta, &mut buf);

        match AgentServerMessage::decode(&buf).unwrap() {
            AgentServerMessage::InteractionUpdate(InteractionUpdate::TextDelta(text)) => {
                assert_eq!(text, "hi");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_checkpoint_branch() {
        let mut buf = Vec::new();
        encode_bytes_field(3, b"checkpoint-payload", &mut buf);
        match AgentServerMessage::decode(&buf).unwrap() {
            AgentServerMessage::ConversationCheckpointUpdate(update) => {
                assert_eq!(update.raw, b"checkpoint-payload");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
