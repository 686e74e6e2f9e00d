//! Shared protocol encoder seam.

use serde::Serialize;

/// Protocol output boundary: native engine event -> protocol event(s).
///
/// Implementations own whatever per-run state the mapping needs; one encoder
/// instance serves exactly one run.
pub trait ProtocolOutputEncoder {
    /// Engine event type consumed by this encoder.
    type InputEvent;
    /// Protocol-specific output event type.
    type Event: Serialize;

    /// Optional prologue events emitted before the engine stream starts.
    fn prologue(&mut self) -> Vec<Self::Event> {
        Vec::new()
    }

    /// Map one engine event to zero or more protocol events.
    fn on_event(&mut self, ev: &Self::InputEvent) -> Vec<Self::Event>;

    /// Optional epilogue events emitted after the engine stream ends.
    fn epilogue(&mut self) -> Vec<Self::Event> {
        Vec::new()
    }
}
