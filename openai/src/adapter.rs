//! Drives one [`bridge_core::AgentSession`] to completion and renders its
//! event stream as either an OpenAI streaming response or an aggregated
//! JSON completion.

use bridge_core::AgentSession;
use bridge_core::SessionEvent;
use bridge_core::make_tool_call_id;
use bridge_core::session_fragment_from_completion_id;
use bridge_core::translate_exec_to_openai_tool;

use crate::request::ChatCompletionRequest;
use crate::sse::ChatCompletionChunk;
use crate::sse::ChatCompletionResponse;
use crate::sse::Choice;
use crate::sse::ChunkChoice;
use crate::sse::ChunkDelta;
use crate::sse::DONE_EVENT;
use crate::sse::ErrorBody;
use crate::sse::ErrorEvent;
use crate::sse::OaiFunctionCallChunk;
use crate::sse::OaiToolCallChunk;
use crate::sse::ResponseMessage;
use crate::sse::Usage;
use crate::sse::format_event;

/// A unique `chatcmpl-<24 hex>` id minted once per completion; every tool
/// call synthesized during that completion is keyed off its fragment.
pub fn new_completion_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("chatcmpl-{}", &hex[..24.min(hex.len())])
}

/// Consumes the session's events and renders every chunk through `emit`,
/// in the order they're produced. Used by both the real SSE transport and
/// tests, which can collect into a `Vec<String>` instead of writing to a
/// socket.
pub async fn stream_completion<F>(
    mut session: AgentSession,
    request: &ChatCompletionRequest,
    completion_id: String,
    created: u64,
    mut emit: F,
) where
    F: FnMut(String),
{
    let session_fragment = session_fragment_from_completion_id(&completion_id);
    let mut tool_call_index = 0u32;

    emit(format_event(&ChatCompletionChunk {
        id: completion_id.clone(),
        object: "chat.completion.chunk",
        created,
        model: request.model.clone(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: ChunkDelta {
                role: Some("assistant".to_string()),
                content: None,
                tool_calls: None,
            },
            finish_reason: None,
        }],
    }));

    while let Some(event) = session.next_event().await {
        match event {
            SessionEvent::Text(text) | SessionEvent::Thinking(text) => {
                emit(format_event(&ChatCompletionChunk {
                    id: completion_id.clone(),
                    object: "chat.completion.chunk",
                    created,
                    model: request.model.clone(),
                    choices: vec![ChunkChoice {
                        index: 0,
                        delta: ChunkDelta {
                            role: None,
                            content: Some(text),
                            tool_calls: None,
                        },
                        finish_reason: None,
                    }],
                }));
            }
            SessionEvent::Heartbeat
            | SessionEvent::ToolCallStarted(_)
            | SessionEvent::PartialToolCall(_)
            | SessionEvent::ToolCallCompleted(_)
            | SessionEvent::InteractionQuery(_) => {}
            SessionEvent::ExecRequest(exec) => {
                let tool_call = match translate_exec_to_openai_tool(&exec) {
                    Ok(call) => call,
                    Err(err) => {
                        emit(format_event(&ErrorEvent {
                            error: ErrorBody {
                                message: err.to_string(),
                                error_type: "server_error",
                            },
                        }));
                        emit(DONE_EVENT.to_string());
                        session.close();
                        return;
                    }
                };
                let tool_call_id = make_tool_call_id(&session_fragment, tool_call_index);
                tool_call_index += 1;

                emit(format_event(&ChatCompletionChunk {
                    id: completion_id.clone(),
                    object: "chat.completion.chunk",
                    created,
                    model: request.model.clone(),
                    choices: vec![ChunkChoice {
                        index: 0,
                        delta: ChunkDelta {
                            role: None,
                            content: None,
                            tool_calls: Some(vec![OaiToolCallChunk {
                                index: 0,
                                id: Some(tool_call_id),
                                tool_type: Some("function".to_string()),
                                function: Some(OaiFunctionCallChunk {
                                    name: Some(tool_call.name),
                                    arguments: Some(tool_call.arguments.to_string()),
                                }),
                            }]),
                        },
                        finish_reason: None,
                    }],
                }));
                emit(format_event(&ChatCompletionChunk {
                    id: completion_id.clone(),
                    object: "chat.completion.chunk",
                    created,
                    model: request.model.clone(),
                    choices: vec![ChunkChoice {
                        index: 0,
                        delta: ChunkDelta::default(),
                        finish_reason: Some("tool_calls".to_string()),
                    }],
                }));
                emit(DONE_EVENT.to_string());
                session.close();
                return;
            }
            SessionEvent::Checkpoint => {}
            SessionEvent::Error(message) => {
                emit(format_event(&ErrorEvent {
                    error: ErrorBody {
                        message,
                        error_type: "server_error",
                    },
                }));
                emit(DONE_EVENT.to_string());
                return;
            }
            SessionEvent::Done => {
                emit(format_event(&ChatCompletionChunk {
                    id: completion_id.clone(),
                    object: "chat.completion.chunk",
                    created,
                    model: request.model.clone(),
                    choices: vec![ChunkChoice {
                        index: 0,
                        delta: ChunkDelta::default(),
                        finish_reason: Some("stop".to_string()),
                    }],
                }));
                emit(DONE_EVENT.to_string());
                return;
            }
        }
    }
}

/// Aggregates a full turn into a single JSON response, for clients that
/// didn't set `stream: true`. Tool-bridge turns still terminate early with
/// whatever text accumulated plus no further content, matching the
/// streaming path's `finish_reason`.
pub async fn aggregate_completion(
    mut session: AgentSession,
    request: &ChatCompletionRequest,
    prompt: &str,
    completion_id: String,
    created: u64,
) -> ChatCompletionResponse {
    let session_fragment = session_fragment_from_completion_id(&completion_id);
    let mut content = String::new();
    let mut finish_reason = "stop";
    let mut tool_calls = Vec::new();

    while let Some(event) = session.next_event().await {
        match event {
            SessionEvent::Text(text) | SessionEvent::Thinking(text) => content.push_str(&text),
            SessionEvent::ExecRequest(exec) => {
                if let Ok(tool_call) = translate_exec_to_openai_tool(&exec) {
                    let index = tool_calls.len() as u32;
                    tool_calls.push((
                        make_tool_call_id(&session_fragment, index),
                        tool_call.name,
                        tool_call.arguments.to_string(),
                    ));
                }
                finish_reason = "tool_calls";
                session.close();
                break;
            }
            SessionEvent::Error(message) => {
                content = message;
                break;
            }
            SessionEvent::Done => break,
            _ => {}
        }
    }

    let usage = Usage::estimate(prompt, &content);
    ChatCompletionResponse {
        id: completion_id,
        object: "chat.completion",
        created,
        model: request.model.clone(),
        choices: vec![Choice {
            index: 0,
            message: ResponseMessage {
                role: "assistant",
                content,
            },
            finish_reason,
        }],
        usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_distinct_completion_ids() {
        let a = new_completion_id();
        let b = new_completion_id();
        assert!(a.starts_with("chatcmpl-"));
        assert_ne!(a, b);
    }
}
