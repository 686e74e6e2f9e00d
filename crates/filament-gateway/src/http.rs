use crate::engine::{BoxEventStream, ExecutionEngine};
use crate::sse::{spawn_frame_relay, sse_body_stream, sse_response};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use filament_contract::{gen_run_id, EngineEvent, RunRequest};
use filament_protocol_ag_ui::AgUiProtocolEncoder;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

const RUN_PATH: &str = "/agents/:agent_id/runs";

/// Shared state for the gateway routes.
#[derive(Clone)]
pub struct AppState {
    /// The opaque execution engine serving runs.
    pub engine: Arc<dyn ExecutionEngine>,
}

impl AppState {
    /// Create gateway state around an engine.
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self { engine }
    }
}

/// Build the gateway HTTP routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(RUN_PATH, post(run))
}

async fn run(
    State(st): State<AppState>,
    Path(agent_id): Path<String>,
    Json(req): Json<RunRequest>,
) -> Response {
    if let Err(err) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response();
    }

    // The session id doubles as the protocol thread id; each invocation is
    // one fresh run within that thread.
    let thread_id = req.session_id.clone();
    let run_id = gen_run_id();
    let streaming = req.stream;
    info!(agent_id = %agent_id, run_id = %run_id, stream = streaming, "starting run");

    let events = st
        .engine
        .execute(req, thread_id.clone(), run_id.clone())
        .await;

    if streaming {
        let encoder = AgUiProtocolEncoder::new(thread_id, run_id);
        let rx = spawn_frame_relay(events, encoder);
        sse_response(sse_body_stream(rx))
    } else {
        collect_response(events).await.into_response()
    }
}

/// Drain a native event stream into a single non-streaming response body.
async fn collect_response(mut events: BoxEventStream) -> Json<Value> {
    let mut content = String::new();
    while let Some(value) = events.next().await {
        match EngineEvent::from_value(value) {
            Ok(EngineEvent::TextDelta { delta }) => content.push_str(&delta),
            Ok(EngineEvent::RunFailed { message }) => {
                return Json(json!({"error": message}));
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "skipping unmappable engine event"),
        }
    }
    Json(json!({"content": content}))
}
