//! Client-side AG-UI stream consumption: frame reassembly from arbitrarily
//! chunked bytes, and reduction of the canonical event stream into
//! renderable per-run message state.

mod consumer;
mod error;
mod reducer;

pub use consumer::{consume, StreamConsumer};
pub use error::{ProtocolError, TransportError};
pub use reducer::{
    Message, RunKey, RunState, RunStatus, Segment, StateReducer, ToolCall, ToolCallStatus,
};
