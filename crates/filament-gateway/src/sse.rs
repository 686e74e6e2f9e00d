use crate::engine::BoxEventStream;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use filament_contract::{EngineEvent, ProtocolOutputEncoder};
use filament_protocol_ag_ui::{frame, AgUiProtocolEncoder};
use futures::StreamExt;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const FRAME_CHANNEL_CAPACITY: usize = 32;

/// Relay one run's native events to a client as AG-UI frames.
///
/// Returns the receiving end of the frame channel. The relay task ends when
/// the engine stream is exhausted or the client stops reading — abandonment;
/// no cancel is sent upstream. Frames go out strictly in event order, one
/// frame per canonical event, never batched or reordered.
pub fn spawn_frame_relay(
    mut events: BoxEventStream,
    mut encoder: AgUiProtocolEncoder,
) -> mpsc::Receiver<Bytes> {
    let (tx, rx) = mpsc::channel::<Bytes>(FRAME_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        while let Some(value) = events.next().await {
            let engine_event = match EngineEvent::from_value(value) {
                Ok(event) => event,
                // Native shapes this layer does not know are skipped;
                // bridging continues with the next event.
                Err(err) => {
                    debug!(error = %err, "skipping unmappable engine event");
                    continue;
                }
            };
            for event in encoder.on_event(&engine_event) {
                let encoded = match frame::encode(&event) {
                    Ok(encoded) => encoded,
                    Err(err) => {
                        warn!(error = %err, "failed to encode protocol event");
                        continue;
                    }
                };
                if tx.send(Bytes::from(encoded)).await.is_err() {
                    // Client went away; stop reading the engine stream.
                    return;
                }
            }
        }
    });
    rx
}

/// Adapt a frame channel into an SSE body stream.
pub fn sse_body_stream(
    mut rx: mpsc::Receiver<Bytes>,
) -> impl futures::Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok::<Bytes, Infallible>(chunk);
        }
    }
}

/// Wrap a frame stream in an SSE response.
pub fn sse_response<S>(stream: S) -> Response
where
    S: futures::Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
{
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    (headers, Body::from_stream(stream)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn collect_frames(mut rx: mpsc::Receiver<Bytes>) -> String {
        let mut out = String::new();
        while let Some(chunk) = rx.recv().await {
            out.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn relay_frames_every_canonical_event_in_order() {
        let events: BoxEventStream = Box::pin(futures::stream::iter(vec![
            json!({"type": "run_started", "thread_id": "t1", "run_id": "r1"}),
            json!({"type": "text_delta", "delta": "hi"}),
            json!({"type": "run_completed"}),
        ]));
        let rx = spawn_frame_relay(events, AgUiProtocolEncoder::new("t1", "r1"));
        let body = collect_frames(rx).await;

        let kinds: Vec<&str> = body
            .split("\n\n")
            .filter(|f| !f.is_empty())
            .map(|f| {
                if f.contains("RUN_STARTED") {
                    "RUN_STARTED"
                } else if f.contains("TEXT_MESSAGE_START") {
                    "TEXT_MESSAGE_START"
                } else if f.contains("TEXT_MESSAGE_CONTENT") {
                    "TEXT_MESSAGE_CONTENT"
                } else if f.contains("TEXT_MESSAGE_END") {
                    "TEXT_MESSAGE_END"
                } else {
                    "RUN_FINISHED"
                }
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "RUN_FINISHED",
            ]
        );
        assert!(body.split("\n\n").filter(|f| !f.is_empty()).all(|f| f.starts_with("data: ")));
    }

    #[tokio::test]
    async fn relay_skips_unmappable_engine_events() {
        let events: BoxEventStream = Box::pin(futures::stream::iter(vec![
            json!({"type": "heartbeat", "ms": 5}),
            json!({"type": "text_delta", "delta": "still here"}),
            json!("not even an object"),
            json!({"type": "run_completed"}),
        ]));
        let rx = spawn_frame_relay(events, AgUiProtocolEncoder::new("t1", "r1"));
        let body = collect_frames(rx).await;

        assert!(body.contains("still here"));
        assert!(body.contains("RUN_FINISHED"));
        assert!(!body.contains("heartbeat"));
    }
}
