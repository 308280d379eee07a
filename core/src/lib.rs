//! Root of the `bridge-core` library: drives one agent session end to end,
//! from opening `RunSSE` through streaming interaction updates, running
//! built-in tools locally or forwarding them to the OpenAI client, and
//! terminating on `turn_ended`, a checkpoint, or an error.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through tracing.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod client;
pub mod error;
pub mod events;
pub mod exec_handlers;
pub mod kv_store;
pub mod session;
pub mod tool_bridge;
pub mod util;

pub use client::VendorClient;
pub use error::Result;
pub use error::SessionError;
pub use events::PartialToolCallEvent;
pub use events::SessionEvent;
pub use events::ToolCallCompletedEvent;
pub use events::ToolCallStartedEvent;
pub use kv_store::BlobStore;
pub use kv_store::KvOutcome;
pub use session::AgentSession;
pub use session::Phase;
pub use session::TurnRequest;
pub use tool_bridge::BridgeToolCall;
pub use tool_bridge::make_tool_call_id;
pub use tool_bridge::session_fragment_from_completion_id;
pub use tool_bridge::session_id_from_tool_call_id;
pub use tool_bridge::translate_exec_to_openai_tool;
