//! Wire framing: one canonical event per `data: <json>\n\n` frame.

use crate::events::Event;
use serde_json::Value;

/// Field prefix of a frame's payload line.
pub const DATA_PREFIX: &str = "data:";

/// Delimiter terminating one frame.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Wire field spellings accepted on ingestion: legacy snake_case and the
/// canonical camelCase it normalizes to.
const LEGACY_FIELDS: [(&str, &str); 5] = [
    ("thread_id", "threadId"),
    ("run_id", "runId"),
    ("message_id", "messageId"),
    ("tool_call_id", "toolCallId"),
    ("tool_call_name", "toolCallName"),
];

/// Encode one canonical event as exactly one wire frame.
///
/// Frames must be emitted strictly in event order; ordering is the only
/// delivery guarantee consumers can rely on.
pub fn encode(event: &Event) -> Result<String, serde_json::Error> {
    Ok(format!(
        "{DATA_PREFIX} {}{FRAME_DELIMITER}",
        serde_json::to_string(event)?
    ))
}

/// Decode one frame payload (the JSON after `data:`) into a canonical event.
///
/// Legacy snake_case field spellings are normalized to camelCase here, once,
/// so downstream code never repeats fallback field access. When a payload
/// carries both spellings the camelCase one wins.
pub fn decode_payload(payload: &str) -> Result<Event, serde_json::Error> {
    let mut value: Value = serde_json::from_str(payload)?;
    normalize_fields(&mut value);
    serde_json::from_value(value)
}

fn normalize_fields(value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    for (legacy, canonical) in LEGACY_FIELDS {
        if let Some(v) = object.remove(legacy) {
            object.entry(canonical).or_insert(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_one_delimited_frame() {
        let frame = encode(&Event::text_message_content("m1", "Hello")).unwrap();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        assert_eq!(frame.matches("\n\n").count(), 1);
    }

    #[test]
    fn decode_accepts_camel_case() {
        let event =
            decode_payload(r#"{"type":"RUN_STARTED","threadId":"t1","runId":"r1"}"#).unwrap();
        assert_eq!(event, Event::run_started("t1", "r1"));
    }

    #[test]
    fn decode_accepts_legacy_snake_case() {
        let event =
            decode_payload(r#"{"type":"RUN_STARTED","thread_id":"t1","run_id":"r1"}"#).unwrap();
        assert_eq!(event, Event::run_started("t1", "r1"));

        let event = decode_payload(
            r#"{"type":"TOOL_CALL_START","tool_call_id":"tc1","tool_call_name":"lookup"}"#,
        )
        .unwrap();
        assert_eq!(event, Event::tool_call_start("tc1", "lookup", None));
    }

    #[test]
    fn unknown_wire_fields_are_tolerated() {
        let event = decode_payload(
            r#"{"type":"TOOL_CALL_RESULT","toolCallId":"tc1","content":"42","messageId":"result_tc1","role":"tool"}"#,
        )
        .unwrap();
        assert_eq!(event, Event::tool_call_result("tc1", "42"));
    }

    #[test]
    fn camel_case_wins_when_both_spellings_are_present() {
        let event = decode_payload(
            r#"{"type":"RUN_STARTED","threadId":"camel","thread_id":"snake","runId":"r1"}"#,
        )
        .unwrap();
        assert_eq!(event, Event::run_started("camel", "r1"));
    }

    #[test]
    fn round_trips_strings_with_quotes_backslashes_and_newlines() {
        let original = Event::text_message_content("m1", "a \"quoted\\\" line\nand another");
        let frame = encode(&original).unwrap();
        let payload = frame
            .trim_end_matches(FRAME_DELIMITER)
            .strip_prefix("data: ")
            .unwrap();
        assert_eq!(decode_payload(payload).unwrap(), original);
    }

    #[test]
    fn round_trips_timestamps() {
        let original = Event::run_error("boom", Some("ERR".into())).with_timestamp(42);
        let frame = encode(&original).unwrap();
        let payload = frame
            .trim_end_matches(FRAME_DELIMITER)
            .strip_prefix("data: ")
            .unwrap();
        assert_eq!(decode_payload(payload).unwrap(), original);
    }
}
