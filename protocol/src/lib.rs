//! Field-number tables and typed wrappers for every message the agent bridge
//! produces or consumes. Builds on `bridge_wire` for the raw codec; has no
//! knowledge of HTTP or of how a session is driven — see `bridge-core`.

pub mod client_message;
pub mod error;
pub mod exec;
pub mod interaction;
pub mod kv;
pub mod server_message;
pub mod tool_call;

pub use client_message::AgentClientMessage;
pub use client_message::BidiAppendRequest;
pub use client_message::BidiRequestId;
pub use client_message::ConversationAction;
pub use client_message::EnvDescriptor;
pub use client_message::ExecClientMessage;
pub use client_message::ExecResultKind;
pub use client_message::KvClientMessage;
pub use client_message::KvResultKind;
pub use client_message::RunRequest;
pub use client_message::UserMessage;
pub use client_message::UserMessageAction;
pub use error::ProtocolError;
pub use error::Result;
pub use exec::ExecRequest;
pub use exec::ExecRequestKind;
pub use exec::GrepArgs;
pub use exec::LsArgs;
pub use exec::McpArgs;
pub use exec::ReadArgs;
pub use exec::ShellArgs;
pub use exec::WriteArgs;
pub use interaction::InteractionQuery;
pub use interaction::InteractionUpdate;
pub use interaction::PartialToolCall;
pub use interaction::ToolCallCompleted;
pub use interaction::ToolCallStarted;
pub use kv::GetBlobArgs;
pub use kv::KvRequest;
pub use kv::KvRequestKind;
pub use kv::SetBlobArgs;
pub use kv::hex_blob_id;
pub use server_message::AgentServerMessage;
pub use server_message::ConversationCheckpointUpdate;
pub use tool_call::ArgSpec;
pub use tool_call::ArgType;
pub use tool_call::ToolCall;
pub use tool_call::ToolKind;
pub use tool_call::decode_tool_call_args;
pub use tool_call::encode_tool_call_args;
