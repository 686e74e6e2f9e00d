use crate::error::{ProtocolError, TransportError};
use crate::reducer::StateReducer;
use bytes::Bytes;
use filament_protocol_ag_ui::frame::{self, DATA_PREFIX, FRAME_DELIMITER};
use filament_protocol_ag_ui::Event;
use futures::{pin_mut, Stream, StreamExt};
use tracing::{debug, warn};

/// Reassembles canonical events from an arbitrarily chunked byte stream.
///
/// Chunk boundaries carry no meaning: a frame, a JSON payload, even a single
/// UTF-8 sequence may be split across chunks, so the buffer accumulates raw
/// bytes and frames are cut at the `\n\n` delimiter only. One consumer serves
/// exactly one stream; instances are not shareable across streams.
#[derive(Debug, Default)]
pub struct StreamConsumer {
    buf: Vec<u8>,
    frames_dropped: u64,
}

impl StreamConsumer {
    /// Create a consumer for one stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames discarded so far due to parse failures.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Feed one chunk; returns every canonical event it completed.
    ///
    /// A malformed frame is logged and skipped without disturbing the frames
    /// around it.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = find_delimiter(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..pos + FRAME_DELIMITER.len()).collect();
            if let Some(event) = self.parse_frame(&frame[..pos]) {
                events.push(event);
            }
        }
        events
    }

    /// End of stream: one best-effort parse of any buffered tail.
    ///
    /// A trailing incomplete frame that does not parse is discarded silently.
    pub fn finish(mut self) -> Vec<Event> {
        let tail = std::mem::take(&mut self.buf);
        if tail.iter().all(u8::is_ascii_whitespace) {
            return Vec::new();
        }
        match self.parse_frame(&tail) {
            Some(event) => vec![event],
            None => Vec::new(),
        }
    }

    fn parse_frame(&mut self, frame: &[u8]) -> Option<Event> {
        let text = match std::str::from_utf8(frame) {
            Ok(text) => text,
            Err(err) => {
                self.frames_dropped += 1;
                warn!(error = %err, "discarding non-UTF-8 frame");
                return None;
            }
        };
        match parse_frame_text(text) {
            Ok(event) => Some(event),
            // Keepalive comments and bare field lines are normal SSE noise.
            Err(ProtocolError::MissingData) => {
                debug!("skipping frame with no data line");
                None
            }
            Err(err) => {
                self.frames_dropped += 1;
                warn!(error = %err, "discarding malformed frame");
                None
            }
        }
    }
}

/// Extract and decode the payload of one complete frame: the first line
/// starting with `data:`, leading whitespace trimmed.
fn parse_frame_text(frame: &str) -> Result<Event, ProtocolError> {
    let payload = frame
        .lines()
        .find_map(|line| line.strip_prefix(DATA_PREFIX))
        .map(str::trim_start)
        .filter(|payload| !payload.is_empty())
        .ok_or(ProtocolError::MissingData)?;
    frame::decode_payload(payload).map_err(ProtocolError::from)
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER.as_bytes())
}

/// Drive one byte stream to completion, applying every decoded event to the
/// reducer.
///
/// When the stream ends or fails before a terminal event arrives, the active
/// run is marked as permanently failed; no reconnect is attempted and no
/// cancel is sent upstream. Abandonment is simply dropping the returned
/// future — nothing further is dispatched after that.
pub async fn consume<S, E>(stream: S, reducer: &mut StateReducer) -> Result<(), TransportError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    pin_mut!(stream);
    let mut consumer = StreamConsumer::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                for event in consumer.push_chunk(&chunk) {
                    reducer.apply(&event);
                }
            }
            Err(err) => {
                reducer.mark_transport_closed();
                return Err(TransportError::Io(err.to_string()));
            }
        }
    }
    for event in consumer.finish() {
        reducer.apply(&event);
    }
    if !reducer.active_run_terminal() {
        reducer.mark_transport_closed();
        return Err(TransportError::Closed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_split_at_arbitrary_chunk_boundaries() {
        let mut consumer = StreamConsumer::new();
        let frame = frame::encode(&Event::text_message_content("m1", "hello")).unwrap();
        let (a, b) = frame.as_bytes().split_at(7);

        assert!(consumer.push_chunk(a).is_empty());
        let events = consumer.push_chunk(b);
        assert_eq!(events, vec![Event::text_message_content("m1", "hello")]);
    }

    #[test]
    fn multibyte_utf8_split_across_chunks_survives() {
        let mut consumer = StreamConsumer::new();
        let frame = frame::encode(&Event::text_message_content("m1", "héllo ✓")).unwrap();
        let mut events = Vec::new();
        for byte in frame.as_bytes() {
            events.extend(consumer.push_chunk(&[*byte]));
        }
        assert_eq!(events, vec![Event::text_message_content("m1", "héllo ✓")]);
    }

    #[test]
    fn keepalive_comment_frames_are_not_counted_as_drops() {
        let mut consumer = StreamConsumer::new();
        let events = consumer.push_chunk(b": keep-alive\n\n");
        assert!(events.is_empty());
        assert_eq!(consumer.frames_dropped(), 0);
    }

    #[test]
    fn finish_discards_an_incomplete_trailing_frame() {
        let mut consumer = StreamConsumer::new();
        assert!(consumer.push_chunk(b"data: {\"type\":\"TEXT_MES").is_empty());
        assert!(consumer.finish().is_empty());
    }

    #[test]
    fn finish_parses_a_complete_but_unterminated_frame() {
        let mut consumer = StreamConsumer::new();
        let frame = frame::encode(&Event::run_error("boom", None)).unwrap();
        let unterminated = frame.trim_end_matches('\n');
        assert!(consumer.push_chunk(unterminated.as_bytes()).is_empty());
        assert_eq!(consumer.finish(), vec![Event::run_error("boom", None)]);
    }
}
