//! Translates between vendor exec/tool-call semantics and OpenAI
//! `tool_calls` semantics, and owns the canonical `tool_call_id` codec so
//! the format never leaks into ad-hoc string-matching elsewhere.

use bridge_protocol::ExecRequest;
use bridge_protocol::ExecRequestKind;
use serde_json::Value;
use serde_json::json;

use crate::error::Result;
use crate::error::SessionError;

/// Pulls the 8-hex-char fragment out of a `chatcmpl-<24 hex>` completion id
/// that seeds every tool-call id minted during that completion.
pub fn session_fragment_from_completion_id(completion_id: &str) -> String {
    let hex_part = completion_id.strip_prefix("chatcmpl-").unwrap_or(completion_id);
    hex_part.chars().take(8).collect()
}

/// `call_<session_fragment>_<index>`.
pub fn make_tool_call_id(session_fragment: &str, index: u32) -> String {
    format!("call_{session_fragment}_{index}")
}

/// Inverse of [`make_tool_call_id`]: recovers the session fragment embedded
/// in a tool-call id, or `None` if it doesn't match the expected shape.
pub fn session_id_from_tool_call_id(tool_call_id: &str) -> Option<String> {
    let rest = tool_call_id.strip_prefix("call_")?;
    let (fragment, _index) = rest.rsplit_once('_')?;
    Some(fragment.to_string())
}

/// A tool call in OpenAI's `function` shape, ready to be wrapped in a
/// `tool_calls[]` SSE delta.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Maps a vendor exec request to the OpenAI tool name and argument shape
/// the client will see, per the fixed exec->tool table.
pub fn translate_exec_to_openai_tool(request: &ExecRequest) -> Result<BridgeToolCall> {
    let arguments = match request.kind {
        ExecRequestKind::Shell | ExecRequestKind::BgShell => {
            let args = request.parse_shell_args()?;
            json!({ "command": args.command, "cwd": args.cwd })
        }
        ExecRequestKind::Read => {
            let args = request.parse_read_args()?;
            json!({ "filePath": args.path })
        }
        ExecRequestKind::Ls => {
            let args = request.parse_ls_args()?;
            json!({ "path": args.path })
        }
        ExecRequestKind::Grep => {
            let args = request.parse_grep_args()?;
            if let Some(glob) = &args.glob {
                json!({ "pattern": glob, "path": args.path })
            } else {
                json!({ "pattern": args.pattern, "path": args.path })
            }
        }
        ExecRequestKind::Write => {
            let args = request.parse_write_args()?;
            json!({ "filePath": args.path, "content": args.content })
        }
        ExecRequestKind::Mcp => {
            let args = request.parse_mcp_args()?;
            return Ok(BridgeToolCall {
                name: args.tool,
                arguments: Value::String(String::from_utf8_lossy(&args.raw_args).into_owned()),
            });
        }
        other => {
            return Err(SessionError::ProtocolViolation(format!(
                "no OpenAI tool mapping for exec kind {other:?}"
            )));
        }
    };

    let name = match request.kind {
        ExecRequestKind::Shell | ExecRequestKind::BgShell => "bash",
        ExecRequestKind::Read => "read",
        ExecRequestKind::Ls => "list",
        ExecRequestKind::Grep => {
            if request.parse_grep_args()?.glob.is_some() {
                "glob"
            } else {
                "grep"
            }
        }
        ExecRequestKind::Write => "write",
        _ => unreachable!("handled above"),
    };

    Ok(BridgeToolCall {
        name: name.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn tool_call_ids_round_trip_their_session_fragment() {
        let fragment = session_fragment_from_completion_id("chatcmpl-0123456789abcdef01234567");
        assert_eq!(fragment, "01234567");
        let id = make_tool_call_id(&fragment, 3);
        assert_eq!(session_id_from_tool_call_id(&id).as_deref(), Some(fragment.as_str()));
    }

    #[test]
    fn tool_call_ids_within_a_session_are_distinct() {
        let fragment = "abcd1234".to_string();
        let a = make_tool_call_id(&fragment, 0);
        let b = make_tool_call_id(&fragment, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn glob_pattern_translates_to_the_glob_tool() {
        let mut buf = Vec::new();
        bridge_wire::encode_string_field(2, "*.rs", &mut buf);
        let request = ExecRequest {
            id: 1,
            exec_id: None,
            kind: ExecRequestKind::Grep,
            args_body: buf,
        };
        let translated = translate_exec_to_openai_tool(&request).unwrap();
        assert_eq!(translated.name, "glob");
        assert_eq!(translated.arguments["pattern"], "*.rs");
    }

    #[test]
    fn content_pattern_translates_to_the_grep_tool() {
        let mut buf = Vec::new();
        bridge_wire::encode_string_field(1, "needle", &mut buf);
        let request = ExecRequest {
            id: 1,
            exec_id: None,
            kind: ExecRequestKind::Grep,
            args_body: buf,
        };
        let translated = translate_exec_to_openai_tool(&request).unwrap();
        assert_eq!(translated.name, "grep");
        assert_eq!(translated.arguments["pattern"], "needle");
    }
}
