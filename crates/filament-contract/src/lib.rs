//! Shared contracts between the execution engine, protocol encoders, and
//! transports.

mod event;
mod ids;
mod protocol;
mod request;

pub use event::{EngineEvent, MappingError};
pub use ids::{gen_run_id, gen_session_id};
pub use protocol::ProtocolOutputEncoder;
pub use request::{RequestError, RunRequest, SESSION_ID_MIN_LEN};
