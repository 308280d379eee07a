//! The typed event sequence a session yields to the adapter. Mirrors the
//! asynchronous-generator pattern the vendor stream itself follows, but as
//! a closed tagged sum type instead of heterogeneous chunks.

use bridge_protocol::ExecRequest;
use bridge_protocol::InteractionQuery;
use bridge_protocol::ToolCall;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallStartedEvent {
    pub call_id: String,
    pub model_call_id: String,
    pub tool_call: ToolCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialToolCallEvent {
    pub call_id: String,
    pub args_delta: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallCompletedEvent {
    pub call_id: String,
    pub model_call_id: String,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    Text(String),
    Thinking(String),
    Heartbeat,
    ToolCallStarted(ToolCallStartedEvent),
    PartialToolCall(PartialToolCallEvent),
    ToolCallCompleted(ToolCallCompletedEvent),
    /// A request that the client run a tool locally. The adapter either
    /// forwards this as an OpenAI `tool_calls` delta or, for bare chat
    /// clients, the session has already resolved it locally and this
    /// variant is never emitted for that request.
    ExecRequest(ExecRequest),
    Checkpoint,
    InteractionQuery(InteractionQuery),
    Error(String),
    Done,
}
