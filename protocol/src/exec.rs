//! `ExecServerMessage` — a vendor request that the client run a tool
//! locally and post the result back via `ExecClientMessage`.

use bridge_wire::decode_fields;

use crate::client_message::field_bytes;
use crate::client_message::field_message;
use crate::client_message::field_string;
use crate::client_message::field_u32;
use crate::error::Result;

/// The kind of local action requested, keyed by the oneof field number the
/// vendor used. Two field numbers (2 and 14) both denote a shell
/// invocation — observed as distinct call sites on the vendor side for the
/// same underlying action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRequestKind {
    Shell,
    Write,
    Grep,
    Read,
    Ls,
    Diagnostics,
    RequestContext,
    Mcp,
    BgShell,
    ListMcpResources,
    ReadMcpResource,
    Fetch,
    RecordScreen,
    ComputerUse,
    Unknown(u32),
}

impl ExecRequestKind {
    pub fn from_field_number(n: u32) -> Self {
        match n {
            2 | 14 => ExecRequestKind::Shell,
            3 => ExecRequestKind::Write,
            5 => ExecRequestKind::Grep,
            7 => ExecRequestKind::Read,
            8 => ExecRequestKind::Ls,
            9 => ExecRequestKind::Diagnostics,
            10 => ExecRequestKind::RequestContext,
            11 => ExecRequestKind::Mcp,
            16 => ExecRequestKind::BgShell,
            17 => ExecRequestKind::ListMcpResources,
            18 => ExecRequestKind::ReadMcpResource,
            20 => ExecRequestKind::Fetch,
            21 => ExecRequestKind::RecordScreen,
            22 => ExecRequestKind::ComputerUse,
            other => ExecRequestKind::Unknown(other),
        }
    }

    /// Always forwarded as a tool call, never handled locally, regardless of
    /// whether the client supplied tool definitions.
    pub fn is_always_forwarded(self) -> bool {
        matches!(self, ExecRequestKind::Mcp)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellArgs {
    pub command: String,
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LsArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrepArgs {
    pub pattern: Option<String>,
    pub glob: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct McpArgs {
    pub server: String,
    pub tool: String,
    pub raw_args: Vec<u8>,
}

/// A decoded exec request: its session-scoped id, the vendor's own exec id
/// (used for correlating background shells), its kind, and the raw
/// argument body — left undecoded past this point until a handler needs a
/// specific shape, since most kinds only need one or two string fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecRequest {
    pub id: u32,
    pub exec_id: Option<String>,
    pub kind: ExecRequestKind,
    pub args_body: Vec<u8>,
}

/// `exec_id`'s own field number, distinct from every documented kind field
/// number so it never collides with the kind-field search below.
const EXEC_ID_FIELD: u32 = 23;

impl ExecRequest {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let fields = decode_fields(buf)?;
        let id = field_u32(&fields, 1).unwrap_or(0);
        let exec_id = field_string(&fields, EXEC_ID_FIELD);

        let (kind_field, args_body) = fields
            .iter()
            .find(|(n, _)| *n != 1 && *n != EXEC_ID_FIELD)
            .map(|(n, v)| (*n, v.as_bytes().map(|b| b.to_vec()).unwrap_or_default()))
            .unwrap_or((0, Vec::new()));

        Ok(Self {
            id,
            exec_id,
            kind: ExecRequestKind::from_field_number(kind_field),
            args_body,
        })
    }

    pub fn parse_shell_args(&self) -> Result<ShellArgs> {
        let fields = decode_fields(&self.args_body)?;
        Ok(ShellArgs {
            command: field_string(&fields, 1).unwrap_or_default(),
            cwd: field_string(&fields, 2),
        })
    }

    pub fn parse_write_args(&self) -> Result<WriteArgs> {
        let fields = decode_fields(&self.args_body)?;
        Ok(WriteArgs {
            path: field_string(&fields, 1).unwrap_or_default(),
            content: field_string(&fields, 2).unwrap_or_default(),
        })
    }

    pub fn parse_read_args(&self) -> Result<ReadArgs> {
        let fields = decode_fields(&self.args_body)?;
        Ok(ReadArgs {
            path: field_string(&fields, 1).unwrap_or_default(),
        })
    }

    pub fn parse_ls_args(&self) -> Result<LsArgs> {
        let fields = decode_fields(&self.args_body)?;
        Ok(LsArgs {
            path: field_string(&fields, 1).unwrap_or_default(),
        })
    }

    pub fn parse_grep_args(&self) -> Result<GrepArgs> {
        let fields = decode_fields(&self.args_body)?;
        Ok(GrepArgs {
            pattern: field_string(&fields, 1),
            glob: field_string(&fields, 2),
            path: field_string(&fields, 3),
        })
    }

    pub fn parse_mcp_args(&self) -> Result<McpArgs> {
        let fields = decode_fields(&self.args_body)?;
        Ok(McpArgs {
            server: field_string(&fields, 1).unwrap_or_default(),
            tool: field_string(&fields, 2).unwrap_or_default(),
            raw_args: field_message(&fields, 3)
                .or_else(|| field_bytes(&fields, 3))
                .map(|b| b.to_vec())
                .unwrap_or_default(),
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
    fn decodes_a_shell_exec_request() {
        let mut shell_args = Vec::new();
        encode_string_field(1, "ls -la", &mut shell_args);

        let mut buf = Vec::new();
        encode_varint_field(1, 7, &mut buf);
        encode_bytes_field(2, &shell_args, &mut buf);

        let request = ExecRequest::decode(&buf).unwrap();
        assert_eq!(request.id, 7);
        assert_eq!(request.kind, ExecRequestKind::Shell);
        let parsed = request.parse_shell_args().unwrap();
        assert_eq!(parsed.command, "ls -la");
    }

    #[test]
    fn mcp_is_always_forwarded() {
        assert!(ExecRequestKind::Mcp.is_always_forwarded());
        assert!(!ExecRequestKind::Shell.is_always_forwarded());
    }

    #[test]
    fn both_shell_field_numbers_map_to_the_same_kind() {
        assert_eq!(ExecRequestKind::from_field_number(2), ExecRequestKind::Shell);
        assert_eq!(ExecRequestKind::from_field_number(14), ExecRequestKind::Shell);
    }
}
