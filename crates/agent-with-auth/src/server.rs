//! HTTP shell: health check and a Server-Sent Events endpoint per turn.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use langgraph::{Message, StreamEvent, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::agent::{Agent, ForwardedProps};
use crate::identity::IdentityRecord;
use crate::state::{AgentState, TurnInput};

#[derive(Clone)]
pub struct AppState {
    pub agent: Agent,
}

/// Body of `POST /agent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    /// Thread to continue; a new one is started when absent.
    #[serde(default, alias = "threadId")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Caller-supplied tools for this turn.
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    #[serde(default)]
    pub proverbs: Option<Vec<String>>,
    #[serde(default, alias = "forwardedProps")]
    pub forwarded_props: ForwardedProps,
}

#[derive(Debug, Serialize)]
struct NodePayload<'a> {
    node: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Serialize)]
struct EndPayload<'a> {
    thread_id: &'a str,
    messages: &'a [Message],
    authorization: Option<&'a IdentityRecord>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/agent", post(agent_handler))
        .with_state(state)
}

/// Binds `host:port` (resolving host names) and serves until the listener fails.
pub async fn run_server(host: &str, port: u16, agent: Agent) -> std::io::Result<()> {
    let app = router(AppState { agent });
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn agent_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RunRequest>,
) -> Response {
    let header_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let thread_id = req
        .thread_id
        .filter(|t| !t.is_empty())
        .unwrap_or_else(new_thread_id);
    let input = TurnInput {
        messages: req.messages,
        tools: req.tools,
        proverbs: req.proverbs,
    };

    match state
        .agent
        .stream_turn(&thread_id, input, &req.forwarded_props, header_auth.as_deref())
        .await
    {
        Ok((history_len, events)) => Sse::new(sse_events(thread_id, history_len, events))
            .keep_alive(KeepAlive::default())
            .into_response(),
        Err(e) => {
            tracing::error!(thread_id = %thread_id, error = %e, "failed to start turn");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn new_thread_id() -> String {
    format!("thread-{}", Uuid::new_v4())
}

/// Maps graph events to SSE: `node` carries the messages that node appended,
/// then a single `end` or `error`.
fn sse_events(
    thread_id: String,
    history_len: usize,
    events: impl Stream<Item = StreamEvent<AgentState>> + Send + 'static,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let mut seen = history_len;
    events.map(move |event| {
        let (name, payload) = match event {
            StreamEvent::Node { id, state } => {
                let start = seen.min(state.messages.len());
                seen = state.messages.len();
                let payload = serde_json::to_string(&NodePayload {
                    node: &id,
                    messages: &state.messages[start..],
                });
                ("node", payload)
            }
            StreamEvent::End { state } => {
                tracing::info!(thread_id = %thread_id, messages = state.messages.len(), "turn complete");
                let payload = serde_json::to_string(&EndPayload {
                    thread_id: &thread_id,
                    messages: &state.messages,
                    authorization: state.authorization.as_ref(),
                });
                ("end", payload)
            }
            StreamEvent::Error { message } => {
                tracing::error!(thread_id = %thread_id, error = %message, "turn failed");
                ("error", serde_json::to_string(&json!({ "message": message })))
            }
        };
        let event = match payload {
            Ok(data) => Event::default().event(name).data(data),
            Err(e) => Event::default()
                .event("error")
                .data(json!({ "message": e.to_string() }).to_string()),
        };
        Ok(event)
    })
}
