//! Translates the OpenAI chat-completions wire protocol onto a
//! `bridge-core` agent session: request parsing, prompt flattening, session
//! event rendering, and the `/v1/models` listing.

pub mod adapter;
pub mod error;
pub mod models;
pub mod prompt;
pub mod request;
pub mod sse;

pub use adapter::aggregate_completion;
pub use adapter::new_completion_id;
pub use adapter::stream_completion;
pub use error::AdapterError;
pub use error::Result;
pub use models::infer_owner;
pub use models::list_models;
pub use prompt::flatten_prompt;
pub use request::ChatCompletionRequest;
pub use request::OaiMessage;
pub use sse::ChatCompletionChunk;
pub use sse::ChatCompletionResponse;
pub use sse::ModelsResponse;
