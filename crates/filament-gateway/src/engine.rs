use filament_contract::RunRequest;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

/// Boxed stream of native engine events in emission order.
pub type BoxEventStream = Pin<Box<dyn Stream<Item = Value> + Send>>;

/// Opaque execution engine producing native events for one run.
///
/// The engine owns reasoning and tool execution; this layer only sees the
/// ordered event stream it emits and never inspects anything else.
#[async_trait::async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Start one run and stream its native events.
    async fn execute(
        &self,
        request: RunRequest,
        thread_id: String,
        run_id: String,
    ) -> BoxEventStream;
}
