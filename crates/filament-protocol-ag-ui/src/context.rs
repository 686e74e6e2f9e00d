use crate::events::Event;
use filament_contract::EngineEvent;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

// AG-UI Context
// ============================================================================

/// Per-run state for converting native engine events to AG-UI events.
///
/// One context exists per run and owns all mapping state for it; independent
/// runs never share an instance, so concurrent runs are safe by construction.
#[derive(Debug, Clone)]
pub struct AgUiEventContext {
    /// Thread identifier (conversation context).
    pub thread_id: String,
    /// Current run identifier.
    pub run_id: String,
    /// Identifier of this run's assistant message.
    pub message_id: String,
    /// Whether the text message stream has started.
    text_started: bool,
    /// Tool call ids a TOOL_CALL_START has been emitted for.
    started_tool_calls: HashSet<String>,
    /// Tool call ids whose TOOL_CALL_RESULT/TOOL_CALL_END pair is out.
    finished_tool_calls: HashSet<String>,
    /// Whether a terminal event (RUN_FINISHED / RUN_ERROR) has been emitted.
    /// After this, all subsequent events are suppressed.
    stopped: bool,
}

impl AgUiEventContext {
    /// Create a new context for one run.
    pub fn new(thread_id: String, run_id: String) -> Self {
        let run_id_prefix: String = run_id.chars().take(8).collect();
        let message_id = format!("msg_{run_id_prefix}");
        Self {
            thread_id,
            run_id,
            message_id,
            text_started: false,
            started_tool_calls: HashSet::new(),
            finished_tool_calls: HashSet::new(),
            stopped: false,
        }
    }

    /// Mark the text stream as started and return whether this opened it.
    fn start_text(&mut self) -> bool {
        let was_started = self.text_started;
        self.text_started = true;
        !was_started
    }

    /// Mark the text stream as ended and return whether it was open.
    fn end_text(&mut self) -> bool {
        let was_started = self.text_started;
        self.text_started = false;
        was_started
    }

    /// Whether a text stream is currently open.
    pub fn is_text_open(&self) -> bool {
        self.text_started
    }

    /// Convert one engine event to AG-UI protocol events.
    ///
    /// Handles the full stream lifecycle: lazy TEXT_MESSAGE_START on the
    /// first text delta, tool-call ordering guards, and suppression of
    /// everything after a terminal event. The assistant message stays open
    /// across tool activity so tool calls interleave with its text segments;
    /// TEXT_MESSAGE_END goes out only when the run terminates.
    pub fn on_engine_event(&mut self, ev: &EngineEvent) -> Vec<Event> {
        // After a terminal event, suppress everything.
        if self.stopped {
            return Vec::new();
        }

        match ev {
            EngineEvent::RunStarted { thread_id, run_id } => {
                vec![Event::run_started(thread_id, run_id)]
            }

            EngineEvent::TextDelta { delta } => {
                let mut events = Vec::new();
                if self.start_text() {
                    events.push(Event::text_message_start(&self.message_id));
                }
                events.push(Event::text_message_content(&self.message_id, delta));
                events
            }

            EngineEvent::ToolUseStart { id, name } => {
                self.started_tool_calls.insert(id.clone());
                let parent = self.text_started.then(|| self.message_id.clone());
                vec![Event::tool_call_start(id, name, parent)]
            }
            EngineEvent::ToolUseDelta { id, args_delta } => {
                if !self.started_tool_calls.contains(id.as_str()) {
                    warn!(tool_call_id = %id, "dropping tool args with no matching start");
                    return Vec::new();
                }
                vec![Event::tool_call_args(id, args_delta)]
            }
            EngineEvent::ToolResult { id, content } => {
                if !self.started_tool_calls.contains(id.as_str()) {
                    warn!(tool_call_id = %id, "dropping tool result with no matching start");
                    return Vec::new();
                }
                // First write wins: RESULT goes out at most once per id,
                // immediately followed by END.
                if !self.finished_tool_calls.insert(id.clone()) {
                    warn!(tool_call_id = %id, "dropping duplicate tool result");
                    return Vec::new();
                }
                vec![
                    Event::tool_call_result(id, stringify_result(id, content)),
                    Event::tool_call_end(id),
                ]
            }

            EngineEvent::RunCompleted { result } => {
                self.stopped = true;
                let mut events = Vec::new();
                if self.end_text() {
                    events.push(Event::text_message_end(&self.message_id));
                }
                events.push(Event::run_finished(
                    &self.thread_id,
                    &self.run_id,
                    result.clone(),
                ));
                events
            }
            EngineEvent::RunFailed { message } => {
                self.stopped = true;
                vec![Event::run_error(message, None)]
            }
        }
    }
}

/// Tool results are strings on the wire: strings pass through verbatim,
/// other JSON values are serialized compactly.
fn stringify_result(tool_call_id: &str, content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        other => match serde_json::to_string(other) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, tool_call_id = %tool_call_id, "failed to serialize tool result");
                r#"{"error":"failed to serialize tool result"}"#.to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> AgUiEventContext {
        AgUiEventContext::new("t1".into(), "run_12345678".into())
    }

    #[test]
    fn first_text_delta_opens_the_message() {
        let mut ctx = ctx();
        let events = ctx.on_engine_event(&EngineEvent::TextDelta { delta: "Hi ".into() });
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::text_message_start("msg_run_1234"));
        assert_eq!(events[1], Event::text_message_content("msg_run_1234", "Hi "));

        let events = ctx.on_engine_event(&EngineEvent::TextDelta {
            delta: "there".into(),
        });
        assert_eq!(
            events,
            vec![Event::text_message_content("msg_run_1234", "there")]
        );
    }

    #[test]
    fn tool_call_keeps_the_message_open() {
        let mut ctx = ctx();
        ctx.on_engine_event(&EngineEvent::TextDelta { delta: "x".into() });
        let events = ctx.on_engine_event(&EngineEvent::ToolUseStart {
            id: "tc1".into(),
            name: "lookup".into(),
        });
        assert_eq!(
            events,
            vec![Event::tool_call_start(
                "tc1",
                "lookup",
                Some("msg_run_1234".into())
            )]
        );
        assert!(ctx.is_text_open());
    }

    #[test]
    fn string_tool_results_pass_through_verbatim() {
        let mut ctx = ctx();
        ctx.on_engine_event(&EngineEvent::ToolUseStart {
            id: "tc1".into(),
            name: "lookup".into(),
        });
        let events = ctx.on_engine_event(&EngineEvent::ToolResult {
            id: "tc1".into(),
            content: json!("plain text"),
        });
        assert_eq!(events[0], Event::tool_call_result("tc1", "plain text"));
        assert_eq!(events[1], Event::tool_call_end("tc1"));

        let mut ctx = AgUiEventContext::new("t1".into(), "run_2".into());
        ctx.on_engine_event(&EngineEvent::ToolUseStart {
            id: "tc2".into(),
            name: "lookup".into(),
        });
        let events = ctx.on_engine_event(&EngineEvent::ToolResult {
            id: "tc2".into(),
            content: json!({"rows": 3}),
        });
        assert_eq!(events[0], Event::tool_call_result("tc2", r#"{"rows":3}"#));
    }

    #[test]
    fn run_completed_closes_the_open_message_first() {
        let mut ctx = ctx();
        ctx.on_engine_event(&EngineEvent::TextDelta { delta: "x".into() });
        let events = ctx.on_engine_event(&EngineEvent::RunCompleted { result: None });
        assert_eq!(events[0], Event::text_message_end("msg_run_1234"));
        assert_eq!(
            events[1],
            Event::run_finished("t1", "run_12345678", None)
        );
    }
}
