/// A received frame failed JSON parsing or was missing required fields.
///
/// Always recovered locally: the offending frame is skipped and consumption
/// continues with the next one.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame carried no `data:` line.
    #[error("frame carried no data line")]
    MissingData,
    /// The payload was not a valid canonical event.
    #[error("invalid frame payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Transport-level failure for one stream; terminal for its run.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection closed before a terminal event arrived.
    #[error("stream closed before the run completed")]
    Closed,
    /// Underlying I/O failure reported by the byte stream.
    #[error("io: {0}")]
    Io(String),
}
