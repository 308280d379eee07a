//! The tool-call variant table: vendor field number -> tool name -> argument
//! schema. Kept as a closed, data-driven table (one function per lookup
//! direction) rather than runtime dispatch scattered across the codebase,
//! per the re-architecting note in the design docs.

use std::collections::BTreeMap;

use bridge_wire::FieldValue;
use bridge_wire::ProtoValue;
use bridge_wire::decode_fields;
use bridge_wire::decode_value;
use bridge_wire::encode_bool_field;
use bridge_wire::encode_bytes_field;
use bridge_wire::encode_string_field;
use bridge_wire::encode_value;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ArgType {
    String,
    Bool,
    Int,
    RepeatedString,
    Message,
    Value,
}

#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub field_number: u32,
    pub name: &'static str,
    pub arg_type: ArgType,
}

const fn spec(field_number: u32, name: &'static str, arg_type: ArgType) -> ArgSpec {
    ArgSpec {
        field_number,
        name,
        arg_type,
    }
}

/// A tool kind as carried in `tool_call_started`/`partial_tool_call`/
/// `tool_call_completed`. `Unknown` preserves the raw field number so an
/// unrecognized tool is forwarded opaquely instead of dropped (see the
/// spec's open question on tool-kind evolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Shell,
    Read,
    Write,
    List,
    Grep,
    Glob,
    Edit,
    ApplyDiff,
    Delete,
    TodoWrite,
    TodoRead,
    Mcp,
    SemanticSearch,
    WebSearch,
    CreatePlan,
    Task,
    Fetch,
    AskQuestion,
    SwitchMode,
    ListMcpResources,
    ReadMcpResource,
    ReadLints,
    ExaSearch,
    ExaFetch,
    GenerateImage,
    RecordScreen,
    ComputerUse,
    Unknown(u32),
}

/// (kind, field_number, wire name, argument schema) in one closed table.
const TOOL_TABLE: &[(ToolKind, u32, &str, &[ArgSpec])] = &[
    (
        ToolKind::Shell,
        1,
        "shell",
        &[
            spec(1, "command", ArgType::String),
            spec(2, "cwd", ArgType::String),
        ],
    ),
    (ToolKind::Read, 2, "read", &[spec(1, "filePath", ArgType::String)]),
    (
        ToolKind::Write,
        3,
        "write",
        &[
            spec(1, "filePath", ArgType::String),
            spec(2, "content", ArgType::String),
        ],
    ),
    (ToolKind::List, 4, "list", &[spec(1, "path", ArgType::String)]),
    (
        ToolKind::Grep,
        5,
        "grep",
        &[
            spec(1, "pattern", ArgType::String),
            spec(2, "path", ArgType::String),
        ],
    ),
    (
        ToolKind::Glob,
        6,
        "glob",
        &[
            spec(1, "pattern", ArgType::String),
            spec(2, "path", ArgType::String),
        ],
    ),
    (
        ToolKind::Edit,
        7,
        "edit",
        &[
            spec(1, "filePath", ArgType::String),
            spec(2, "oldString", ArgType::String),
            spec(3, "newString", ArgType::String),
        ],
    ),
    (
        ToolKind::ApplyDiff,
        8,
        "apply_diff",
        &[
            spec(1, "filePath", ArgType::String),
            spec(2, "diff", ArgType::String),
        ],
    ),
    (ToolKind::Delete, 9, "delete", &[spec(1, "path", ArgType::String)]),
    (
        ToolKind::TodoWrite,
        10,
        "todowrite",
        &[spec(1, "todos", ArgType::Value)],
    ),
    (ToolKind::TodoRead, 11, "todoread", &[]),
    (
        ToolKind::Mcp,
        12,
        "mcp",
        &[
            spec(1, "server", ArgType::String),
            spec(2, "tool", ArgType::String),
            spec(3, "args", ArgType::Value),
        ],
    ),
    (
        ToolKind::SemanticSearch,
        13,
        "semantic_search",
        &[spec(1, "query", ArgType::String)],
    ),
    (
        ToolKind::WebSearch,
        14,
        "web_search",
        &[spec(1, "query", ArgType::String)],
    ),
    (
        ToolKind::CreatePlan,
        15,
        "create_plan",
        &[spec(1, "plan", ArgType::String)],
    ),
    (ToolKind::Task, 16, "task", &[spec(1, "description", ArgType::String)]),
    (ToolKind::Fetch, 17, "fetch", &[spec(1, "url", ArgType::String)]),
    (
        ToolKind::AskQuestion,
        18,
        "ask_question",
        &[
            spec(1, "question", ArgType::String),
            spec(2, "options", ArgType::RepeatedString),
        ],
    ),
    (ToolKind::SwitchMode, 19, "switch_mode", &[spec(1, "mode", ArgType::String)]),
    (
        ToolKind::ListMcpResources,
        20,
        "list_mcp_resources",
        &[spec(1, "server", ArgType::String)],
    ),
    (
        ToolKind::ReadMcpResource,
        21,
        "read_mcp_resource",
        &[
            spec(1, "server", ArgType::String),
            spec(2, "uri", ArgType::String),
        ],
    ),
    (ToolKind::ReadLints, 22, "read_lints", &[spec(1, "path", ArgType::String)]),
    (
        ToolKind::ExaSearch,
        23,
        "exa_search",
        &[spec(1, "query", ArgType::String)],
    ),
    (ToolKind::ExaFetch, 24, "exa_fetch", &[spec(1, "url", ArgType::String)]),
    (
        ToolKind::GenerateImage,
        25,
        "generate_image",
        &[spec(1, "prompt", ArgType::String)],
    ),
    (
        ToolKind::RecordScreen,
        26,
        "record_screen",
        &[spec(1, "durationSeconds", ArgType::Int)],
    ),
    (
        ToolKind::ComputerUse,
        27,
        "computer_use",
        &[spec(1, "action", ArgType::String)],
    ),
];

impl ToolKind {
    pub fn field_number(self) -> u32 {
        match self {
            ToolKind::Unknown(n) => n,
            known => TOOL_TABLE
                .iter()
                .find(|(k, ..)| *k == known)
                .map(|(_, n, ..)| *n)
                .unwrap_or(0),
        }
    }

    pub fn from_field_number(field_number: u32) -> Self {
        TOOL_TABLE
            .iter()
            .find(|(_, n, ..)| *n == field_number)
            .map(|(k, ..)| *k)
            .unwrap_or(ToolKind::Unknown(field_number))
    }

    pub fn name(self) -> String {
        TOOL_TABLE
            .iter()
            .find(|(k, ..)| *k == self)
            .map(|(_, _, name, _)| name.to_string())
            .unwrap_or_else(|| match self {
                ToolKind::Unknown(n) => format!("unknown_tool_{n}"),
                _ => "unknown".to_string(),
            })
    }

    fn arg_schema(self) -> &'static [ArgSpec] {
        TOOL_TABLE
            .iter()
            .find(|(k, ..)| *k == self)
            .map(|(_, _, _, schema)| *schema)
            .unwrap_or(&[])
    }
}

/// A decoded vendor tool call: kind, the vendor-reported name (usually the
/// same as `kind.name()`, but the wire always carries it), and an argument
/// map keyed by semantic field name.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub kind: ToolKind,
    pub name: String,
    pub args: BTreeMap<String, ProtoValue>,
}

/// Decodes a tool call's argument list from its raw message body, using the
/// kind's schema to resolve field numbers to semantic names. Unknown field
/// numbers (including entire unknown tool kinds) are kept under a
/// `field_<n>` key rather than dropped.
pub fn decode_tool_call_args(kind: ToolKind, name: String, buf: &[u8]) -> Result<ToolCall> {
    let schema = kind.arg_schema();
    let fields = decode_fields(buf)?;
    let mut args = BTreeMap::new();

    for (field_number, value) in fields {
        let arg_spec = schema.iter().find(|s| s.field_number == field_number);
        let key = arg_spec
            .map(|s| s.name.to_string())
            .unwrap_or_else(|| format!("field_{field_number}"));
        let decoded = decode_arg_value(arg_spec.map(|s| s.arg_type), &value);

        if arg_spec.map(|s| s.arg_type) == Some(ArgType::RepeatedString) {
            match args.entry(key).or_insert_with(|| ProtoValue::List(Vec::new())) {
                ProtoValue::List(items) => items.push(decoded),
                slot => *slot = ProtoValue::List(vec![decoded]),
            }
        } else {
            args.insert(key, decoded);
        }
    }

    Ok(ToolCall { kind, name, args })
}

fn decode_arg_value(arg_type: Option<ArgType>, value: &FieldValue) -> ProtoValue {
    match (arg_type, value) {
        (Some(ArgType::String), v) => ProtoValue::String(v.as_string().unwrap_or_default()),
        (Some(ArgType::Bool), v) => ProtoValue::Bool(v.as_bool().unwrap_or_default()),
        (Some(ArgType::Int), v) => ProtoValue::Number(v.as_u64().unwrap_or_default() as f64),
        (Some(ArgType::RepeatedString), v) => {
            ProtoValue::String(v.as_string().unwrap_or_default())
        }
        (Some(ArgType::Message), FieldValue::LengthDelimited(bytes)) => {
            decode_value(bytes).unwrap_or(ProtoValue::Null)
        }
        (Some(ArgType::Value), FieldValue::LengthDelimited(bytes)) => {
            decode_value(bytes).unwrap_or_else(|_| ProtoValue::String(v_as_lossy_string(bytes)))
        }
        (None, FieldValue::LengthDelimited(bytes)) => decode_value(bytes)
            .unwrap_or_else(|_| ProtoValue::String(v_as_lossy_string(bytes))),
        (_, v) => ProtoValue::Number(v.as_u64().unwrap_or_default() as f64),
    }
}

fn v_as_lossy_string(bytes: &bytes::Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encodes a tool call's argument map back into a message body, for tests
/// and for the fresh-session tool bridge to round-trip fixture data.
pub fn encode_tool_call_args(kind: ToolKind, args: &BTreeMap<String, ProtoValue>) -> Vec<u8> {
    let schema = kind.arg_schema();
    let mut out = Vec::new();
    for (key, value) in args {
        let field_number = schema
            .iter()
            .find(|s| s.name == key)
            .map(|s| s.field_number)
            .unwrap_or_else(|| {
                key.strip_prefix("field_")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0)
            });
        if field_number == 0 {
            continue;
        }
        match value {
            ProtoValue::String(s) => encode_string_field(field_number, s, &mut out),
            ProtoValue::Bool(b) => encode_bool_field(field_number, *b, &mut out),
            ProtoValue::List(items)
                if items.iter().all(|item| matches!(item, ProtoValue::String(_))) =>
            {
                for item in items {
                    if let ProtoValue::String(s) = item {
                        encode_string_field(field_number, s, &mut out);
                    }
                }
            }
            other => encode_bytes_field(field_number, &encode_value(other), &mut out),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn unknown_field_numbers_pass_through_opaquely() {
        let kind = ToolKind::from_field_number(999);
        assert_eq!(kind, ToolKind::Unknown(999));
        assert_eq!(kind.field_number(), 999);
        assert_eq!(kind.name(), "unknown_tool_999");
    }

    #[test]
    fn decodes_shell_args_by_field_number_not_declaration_order() {
        let mut buf = Vec::new();
        encode_string_field(2, "/tmp", &mut buf);
        encode_string_field(1, "ls -la", &mut buf);
        let call = decode_tool_call_args(ToolKind::Shell, "shell".to_string(), &buf).unwrap();
        assert_eq!(
            call.args.get("command"),
            Some(&ProtoValue::String("ls -la".to_string()))
        );
        assert_eq!(
            call.args.get("cwd"),
            Some(&ProtoValue::String("/tmp".to_string()))
        );
    }

    #[test]
    fn repeated_string_accumulates_every_occurrence() {
        let mut buf = Vec::new();
        encode_string_field(1, "pick one", &mut buf);
        encode_string_field(2, "yes", &mut buf);
        encode_string_field(2, "no", &mut buf);
        encode_string_field(2, "maybe", &mut buf);
        let call =
            decode_tool_call_args(ToolKind::AskQuestion, "ask_question".to_string(), &buf).unwrap();
        assert_eq!(
            call.args.get("options"),
            Some(&ProtoValue::List(vec![
                ProtoValue::String("yes".to_string()),
                ProtoValue::String("no".to_string()),
                ProtoValue::String("maybe".to_string()),
            ]))
        );

        let re_encoded = encode_tool_call_args(ToolKind::AskQuestion, &call.args);
        let round_tripped =
            decode_tool_call_args(ToolKind::AskQuestion, "ask_question".to_string(), &re_encoded)
                .unwrap();
        assert_eq!(round_tripped.args, call.args);
    }

    #[test]
    fn every_named_tool_round_trips_its_field_number() {
        for (kind, field_number, name, _) in TOOL_TABLE {
            assert_eq!(ToolKind::from_field_number(*field_number), *kind);
            assert_eq!(kind.name(), *name);
        }
    }
}
