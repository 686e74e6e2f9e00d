//! HTTP invocation boundary: accepts run requests and relays engine events
//! to clients as AG-UI frames over SSE, or as a single response body in
//! non-streaming mode.

mod engine;
mod http;
mod sse;

pub use engine::{BoxEventStream, ExecutionEngine};
pub use http::{routes, AppState};
pub use sse::{spawn_frame_relay, sse_body_stream, sse_response};
