//! The agent session: owns exactly one vendor turn from `RunSSE` open to
//! `turn_ended`/checkpoint/error, and exposes the result as an asynchronous
//! sequence of [`SessionEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use bridge_protocol::AgentClientMessage;
use bridge_protocol::AgentServerMessage;
use bridge_protocol::ConversationAction;
use bridge_protocol::EnvDescriptor;
use bridge_protocol::ExecClientMessage;
use bridge_protocol::ExecRequest;
use bridge_protocol::ExecRequestKind;
use bridge_protocol::InteractionUpdate;
use bridge_protocol::KvClientMessage;
use bridge_protocol::KvResultKind;
use bridge_protocol::RunRequest;
use bridge_protocol::UserMessage;
use bridge_protocol::UserMessageAction;
use bridge_wire::FrameReader;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;

use crate::client::VendorClient;
use crate::error::Result;
use crate::error::SessionError;
use crate::events::PartialToolCallEvent;
use crate::events::SessionEvent;
use crate::events::ToolCallCompletedEvent;
use crate::events::ToolCallStartedEvent;
use crate::exec_handlers;
use crate::kv_store::BlobStore;
use crate::kv_store::KvOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Opening,
    Streaming,
    WaitingToolResult,
    Terminated,
}

/// Everything the opening protocol needs to build the initial `run_request`.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation_id: String,
    pub message_id: String,
    pub model_id: String,
    pub user_text: String,
    pub mode: String,
    pub env: EnvDescriptor,
    /// Whether the OpenAI client supplied `tools`; governs whether exec
    /// requests are forwarded as `tool_calls` or handled locally.
    pub tools_provided: bool,
}

struct AppendState {
    request_id: String,
    append_seqno: u64,
}

/// One vendor turn. Consumers drive it with [`AgentSession::next_event`]
/// until it yields [`SessionEvent::Done`] or an error.
pub struct AgentSession {
    events: mpsc::Receiver<SessionEvent>,
    task: tokio::task::JoinHandle<()>,
    phase: Arc<std::sync::Mutex<Phase>>,
}

impl AgentSession {
    pub async fn open(client: VendorClient, turn: TurnRequest, session_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let request_id = uuid::Uuid::new_v4().to_string();
        let phase = Arc::new(std::sync::Mutex::new(Phase::Opening));
        let task = tokio::spawn(run_session(
            client,
            turn,
            request_id,
            tx,
            session_timeout,
            phase.clone(),
        ));
        Self { events: rx, task, phase }
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    pub fn phase(&self) -> Phase {
        self.phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn close(&mut self) {
        self.task.abort();
        *self
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Phase::Terminated;
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_session(
    client: VendorClient,
    turn: TurnRequest,
    request_id: String,
    tx: mpsc::Sender<SessionEvent>,
    session_timeout: Duration,
    phase: Arc<std::sync::Mutex<Phase>>,
) {
    let body = async {
        match drive_turn(client, turn, request_id, tx.clone(), phase.clone()).await {
            Ok(()) => {}
            Err(err) if err.is_client_visible() => {
                let _ = tx.send(SessionEvent::Error(err.to_string())).await;
            }
            Err(_) => {}
        }
    };

    if tokio::time::timeout(session_timeout, body).await.is_err() {
        let _ = tx
            .send(SessionEvent::Error(format!(
                "session exceeded its {session_timeout:?} budget"
            )))
            .await;
    }
    set_phase(&phase, Phase::Terminated);
    let _ = tx.send(SessionEvent::Done).await;
}

fn set_phase(phase: &std::sync::Mutex<Phase>, value: Phase) {
    *phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
}

async fn drive_turn(
    client: VendorClient,
    turn: TurnRequest,
    request_id: String,
    tx: mpsc::Sender<SessionEvent>,
    phase: Arc<std::sync::Mutex<Phase>>,
) -> Result<()> {
    let run_request = build_run_request(&turn);
    let append_state = Arc::new(AsyncMutex::new(AppendState {
        request_id: request_id.clone(),
        append_seqno: 0,
    }));

    let mut attempt = 0u64;
    let response = loop {
        attempt += 1;
        match client.open_run_sse(&request_id).await {
            Ok(response) => break response,
            Err(err) if attempt < 3 => {
                tokio::time::sleep(crate::util::backoff(attempt)).await;
                tracing::debug!("retrying RunSSE open after error: {err}");
            }
            Err(err) => return Err(err),
        }
    };

    append(
        &client,
        &append_state,
        AgentClientMessage::RunRequest(run_request),
    )
    .await?;
    set_phase(&phase, Phase::Streaming);

    let mut reader = FrameReader::new();
    let mut byte_stream = response.bytes_stream();
    let mut blob_store = BlobStore::new();
    let mut edit_pending = false;

    while let Some(chunk) = byte_stream.next().await {
        let chunk = chunk?;
        reader.push(&chunk);

        for frame in reader.drain_frames() {
            if frame.is_trailer() {
                let text = String::from_utf8_lossy(&frame.payload);
                let status = parse_grpc_status(&text);
                if status != 0 {
                    return Err(SessionError::VendorTrailer {
                        status,
                        message: text.into_owned(),
                    });
                }
                return Ok(());
            }

            let message = AgentServerMessage::decode(&frame.payload)?;
            match message {
                AgentServerMessage::InteractionUpdate(update) => {
                    if handle_interaction_update(update, &tx, &mut edit_pending).await? {
                        return Ok(());
                    }
                }
                AgentServerMessage::ExecServerMessage(request) => {
                    if handle_exec_request(
                        &request,
                        &turn,
                        &client,
                        &append_state,
                        &tx,
                        &mut edit_pending,
                    )
                    .await?
                    {
                        set_phase(&phase, Phase::WaitingToolResult);
                        return Ok(());
                    }
                }
                AgentServerMessage::KvServerMessage(request) => {
                    handle_kv_request(&request, &mut blob_store, &client, &append_state).await?;
                }
                AgentServerMessage::ConversationCheckpointUpdate(_) => {
                    let _ = tx.send(SessionEvent::Checkpoint).await;
                    return Ok(());
                }
                AgentServerMessage::ExecServerControlMessage(_) => {}
                AgentServerMessage::InteractionQuery(query) => {
                    let _ = tx.send(SessionEvent::InteractionQuery(query)).await;
                }
            }
        }
    }

    Ok(())
}

/// Returns `Ok(true)` when the turn is over and the caller should stop
/// reading frames.
async fn handle_interaction_update(
    update: InteractionUpdate,
    tx: &mpsc::Sender<SessionEvent>,
    edit_pending: &mut bool,
) -> Result<bool> {
    match update {
        InteractionUpdate::TextDelta(text) => {
            let _ = tx.send(SessionEvent::Text(text)).await;
        }
        InteractionUpdate::ThinkingDelta(text) => {
            let _ = tx.send(SessionEvent::Thinking(text)).await;
        }
        InteractionUpdate::TokenDelta(tokens) => {
            let _ = tx.send(SessionEvent::Text(tokens.to_string())).await;
        }
        InteractionUpdate::Heartbeat => {
            let _ = tx.send(SessionEvent::Heartbeat).await;
        }
        InteractionUpdate::TurnEnded => {
            return Ok(true);
        }
        InteractionUpdate::ToolCallStarted(started) => {
            if matches!(
                started.tool_call.kind,
                bridge_protocol::ToolKind::Write
                    | bridge_protocol::ToolKind::Edit
                    | bridge_protocol::ToolKind::ApplyDiff
            ) {
                *edit_pending = true;
            }
            let _ = tx
                .send(SessionEvent::ToolCallStarted(ToolCallStartedEvent {
                    call_id: started.call_id,
                    model_call_id: started.model_call_id,
                    tool_call: started.tool_call,
                }))
                .await;
        }
        InteractionUpdate::PartialToolCall(partial) => {
            let _ = tx
                .send(SessionEvent::PartialToolCall(PartialToolCallEvent {
                    call_id: partial.call_id,
                    args_delta: partial.args_delta,
                }))
                .await;
        }
        InteractionUpdate::ToolCallCompleted(completed) => {
            *edit_pending = false;
            let _ = tx
                .send(SessionEvent::ToolCallCompleted(ToolCallCompletedEvent {
                    call_id: completed.call_id,
                    model_call_id: completed.model_call_id,
                }))
                .await;
        }
    }
    Ok(false)
}

/// Returns `Ok(true)` when the session must suspend here (fresh-session
/// tool-bridge mode: the turn forwards this exec as a `tool_calls` delta
/// and the HTTP response to the client closes).
async fn handle_exec_request(
    request: &ExecRequest,
    turn: &TurnRequest,
    client: &VendorClient,
    append_state: &Arc<AsyncMutex<AppendState>>,
    tx: &mpsc::Sender<SessionEvent>,
    edit_pending: &mut bool,
) -> Result<bool> {
    // mcp is always forwarded regardless of tools_provided, and the
    // edit-read coupling forces a locally-handled read even mid tool
    // bridge.
    let force_local_read = *edit_pending && request.kind == ExecRequestKind::Read;

    if request.kind.is_always_forwarded() && !force_local_read {
        if !turn.tools_provided {
            return Err(SessionError::ProtocolViolation(
                "vendor requested an mcp exec with no tools provided".to_string(),
            ));
        }
        let _ = tx.send(SessionEvent::ExecRequest(request.clone())).await;
        return Ok(true);
    }

    if turn.tools_provided && !force_local_read {
        let _ = tx.send(SessionEvent::ExecRequest(request.clone())).await;
        return Ok(true);
    }

    let reply = execute_locally(request, turn).await?;
    if force_local_read {
        *edit_pending = false;
    }
    append(
        client,
        append_state,
        AgentClientMessage::ExecClientMessage(reply),
    )
    .await?;
    Ok(false)
}

async fn execute_locally(request: &ExecRequest, turn: &TurnRequest) -> Result<ExecClientMessage> {
    let message = match request.kind {
        ExecRequestKind::Shell | ExecRequestKind::BgShell => {
            let args = request.parse_shell_args()?;
            exec_handlers::handle_shell(request.id, &args.command, args.cwd.as_deref()).await
        }
        ExecRequestKind::Read => {
            let args = request.parse_read_args()?;
            exec_handlers::handle_read(request.id, &args.path).await
        }
        ExecRequestKind::Ls => {
            let args = request.parse_ls_args()?;
            exec_handlers::handle_ls(request.id, &args.path).await
        }
        ExecRequestKind::Grep => {
            let args = request.parse_grep_args()?;
            let root = args.path.clone().unwrap_or_else(|| ".".to_string());
            let mode = match &args.glob {
                Some(glob) => exec_handlers::GrepMode::Glob(glob),
                None => exec_handlers::GrepMode::Content(args.pattern.as_deref().unwrap_or("")),
            };
            exec_handlers::handle_grep(request.id, mode, &root).await
        }
        ExecRequestKind::Write => {
            let args = request.parse_write_args()?;
            exec_handlers::handle_write(request.id, &args.path, &args.content, true).await
        }
        ExecRequestKind::RequestContext => {
            exec_handlers::handle_request_context(request.id, &turn.env)
        }
        other => {
            return Err(SessionError::Handler(format!(
                "no local handler for exec kind {other:?}"
            )));
        }
    };
    Ok(message)
}

async fn handle_kv_request(
    request: &bridge_protocol::KvRequest,
    blob_store: &mut BlobStore,
    client: &VendorClient,
    append_state: &Arc<AsyncMutex<AppendState>>,
) -> Result<()> {
    let outcome = blob_store.apply(request);
    let (result_kind, result_body) = match outcome {
        KvOutcome::Got(data) => {
            let mut body = Vec::new();
            if let Some(data) = data {
                bridge_wire::encode_bytes_field(1, &data, &mut body);
            }
            (KvResultKind::GetBlob, body)
        }
        KvOutcome::Set => (KvResultKind::SetBlob, Vec::new()),
    };

    let message = KvClientMessage {
        id: request.id,
        result_kind,
        result_body,
    };
    append(client, append_state, AgentClientMessage::KvClientMessage(message)).await
}

async fn append(
    client: &VendorClient,
    append_state: &Arc<AsyncMutex<AppendState>>,
    message: AgentClientMessage,
) -> Result<()> {
    let mut state = append_state.lock().await;
    let seqno = state.append_seqno;
    client
        .bidi_append(&state.request_id, seqno, &message.encode())
        .await?;
    state.append_seqno += 1;
    Ok(())
}

fn build_run_request(turn: &TurnRequest) -> RunRequest {
    RunRequest {
        conversation_action: ConversationAction {
            user_message_action: UserMessageAction {
                user_message: UserMessage {
                    text: turn.user_text.clone(),
                    message_id: turn.message_id.clone(),
                    mode: turn.mode.clone(),
                },
                env: turn.env.clone(),
            },
        },
        model_id: turn.model_id.clone(),
        conversation_id: turn.conversation_id.clone(),
    }
}

/// Parses the `grpc-status: N` line out of a trailer frame's text body.
fn parse_grpc_status(trailer_text: &str) -> i32 {
    trailer_text
        .lines()
        .find_map(|line| line.strip_prefix("grpc-status:"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grpc_status_from_trailer_text() {
        assert_eq!(parse_grpc_status("grpc-status: 7\r\ngrpc-message: boom"), 7);
        assert_eq!(parse_grpc_status("grpc-message: ok"), 0);
        assert_eq!(parse_grpc_status("grpc-status: 0"), 0);
    }
}
