use super::{AgUiEventContext, Event};
use filament_contract::{EngineEvent, ProtocolOutputEncoder};

/// AG-UI rendering of the protocol output seam.
pub struct AgUiProtocolEncoder {
    ctx: AgUiEventContext,
}

impl AgUiProtocolEncoder {
    /// Create an encoder for one run.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            ctx: AgUiEventContext::new(thread_id.into(), run_id.into()),
        }
    }
}

impl ProtocolOutputEncoder for AgUiProtocolEncoder {
    type InputEvent = EngineEvent;
    type Event = Event;

    fn on_event(&mut self, ev: &EngineEvent) -> Vec<Self::Event> {
        self.ctx.on_engine_event(ev)
    }
}
