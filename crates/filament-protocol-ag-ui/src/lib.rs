//! AG-UI protocol support: canonical events, the engine-event bridge, and
//! wire framing.

mod context;
pub mod events;
pub mod frame;
mod output_encoder;

pub use context::AgUiEventContext;
pub use events::{BaseEvent, Event, Role};
pub use output_encoder::AgUiProtocolEncoder;
