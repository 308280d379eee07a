//! The HTTP surface: an OpenAI-compatible `/v1/chat/completions`, a
//! `/v1/models` listing, and the health checks used by process supervisors.

use std::convert::Infallible;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::sse::Event;
use axum::response::sse::Sse;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use bridge_core::AgentSession;
use bridge_core::TurnRequest;
use bridge_core::exec_handlers::current_env_descriptor;
use bridge_openai::ChatCompletionRequest;
use bridge_openai::adapter;
use bridge_openai::prompt::flatten_prompt;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_models() -> impl IntoResponse {
    Json(bridge_openai::list_models(now_unix()))
}

async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Response {
    if let Err(err) = request.validate() {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        return (
            status,
            Json(json!({ "error": { "message": err.to_string(), "type": "invalid_request_error" } })),
        )
            .into_response();
    }

    let prompt = flatten_prompt(&request.messages);
    let turn = TurnRequest {
        conversation_id: uuid::Uuid::new_v4().to_string(),
        message_id: uuid::Uuid::new_v4().to_string(),
        model_id: request.model.clone(),
        user_text: prompt.clone(),
        mode: "agent".to_string(),
        env: current_env_descriptor(&workspace_path()),
        tools_provided: request.tools_provided(),
    };

    let session = AgentSession::open(state.vendor_client(), turn, state.config.session_timeout).await;
    let completion_id = adapter::new_completion_id();
    let created = now_unix();

    if request.stream {
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(64);
        tokio::spawn(async move {
            adapter::stream_completion(session, &request, completion_id, created, |chunk| {
                let _ = tx.try_send(Ok(Event::default().data(
                    chunk
                        .trim_start_matches("data: ")
                        .trim_end_matches('\n')
                        .to_string(),
                )));
            })
            .await;
        });
        Sse::new(ReceiverStream::new(rx))
            .keep_alive(axum::response::sse::KeepAlive::default())
            .into_response()
    } else {
        let response =
            adapter::aggregate_completion(session, &request, &prompt, completion_id, created).await;
        Json(response).into_response()
    }
}

fn workspace_path() -> String {
    std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
