use filament_protocol_ag_ui::{Event, Role};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Identity of one run: `(thread_id, run_id)`.
pub type RunKey = (String, String);

// ============================================================================
// Renderable state
// ============================================================================

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Created but no RUN_STARTED consumed yet.
    Pending,
    /// Actively receiving events.
    Streaming,
    /// Terminated by RUN_FINISHED.
    Finished,
    /// Terminated by RUN_ERROR or transport closure.
    Error,
}

impl RunStatus {
    /// Whether the run accepts no further events.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

/// Tool execution status as exposed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    /// Registered but not yet running.
    Pending,
    /// Started; arguments or result may still be streaming.
    Running,
    /// TOOL_CALL_END consumed.
    Completed,
    /// The run errored while this call was in flight.
    Error,
}

/// One tool invocation within a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    /// Tool call identifier.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw argument JSON, accumulated delta by delta.
    pub arguments: String,
    /// Execution status.
    pub status: ToolCallStatus,
    /// Result payload, once reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ToolCall {
    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: String::new(),
            status: ToolCallStatus::Pending,
            result: None,
        }
    }
}

/// An ordered unit of message content: literal text, or a reference to a
/// tool call rendered inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// Narrative text.
    Text {
        /// Accumulated text for this segment.
        text: String,
    },
    /// Tool activity anchor.
    Tool {
        /// Tool call rendered at this position.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
    },
}

/// One message reconstructed from the stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Message identifier.
    pub id: String,
    /// Author role.
    pub role: Role,
    /// Concatenation of all text segments.
    pub content: String,
    /// Whether content for this message is still streaming.
    #[serde(rename = "isStreaming")]
    pub is_streaming: bool,
    /// Narrative text and tool activity in arrival order.
    pub segments: Vec<Segment>,
    /// Tool calls owned by this message, by id.
    #[serde(rename = "toolCalls")]
    pub tool_calls: HashMap<String, ToolCall>,
}

impl Message {
    fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            content: String::new(),
            is_streaming: true,
            segments: Vec::new(),
            tool_calls: HashMap::new(),
        }
    }

    /// Append a text delta: extends the trailing text segment, or opens a
    /// new one when the last segment is a tool call.
    fn append_text(&mut self, delta: &str) {
        match self.segments.last_mut() {
            Some(Segment::Text { text }) => text.push_str(delta),
            _ => self.segments.push(Segment::Text {
                text: delta.to_string(),
            }),
        }
        self.content.push_str(delta);
    }
}

/// Renderable state of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
    /// Conversation/session identifier.
    #[serde(rename = "threadId")]
    pub thread_id: String,
    /// Run identifier.
    #[serde(rename = "runId")]
    pub run_id: String,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Terminal error description, when `status` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Messages in arrival order.
    pub messages: Vec<Message>,
}

impl RunState {
    fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            status: RunStatus::Pending,
            error: None,
            messages: Vec::new(),
        }
    }

    fn message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().rev().find(|m| m.id == message_id)
    }

    fn tool_call_mut(&mut self, tool_call_id: &str) -> Option<&mut ToolCall> {
        self.messages
            .iter_mut()
            .rev()
            .find_map(|m| m.tool_calls.get_mut(tool_call_id))
    }

    fn close_open_messages(&mut self) {
        for message in &mut self.messages {
            message.is_streaming = false;
        }
    }

    fn apply(&mut self, event: &Event) {
        match event {
            // Handled by the reducer before routing.
            Event::RunStarted { .. } => {}

            Event::RunFinished { .. } => {
                self.close_open_messages();
                self.status = RunStatus::Finished;
            }
            Event::RunError { message, .. } => {
                self.close_open_messages();
                // The engine reported the run dead; calls still in flight
                // will never complete.
                for call in self
                    .messages
                    .iter_mut()
                    .flat_map(|m| m.tool_calls.values_mut())
                {
                    if call.status == ToolCallStatus::Running {
                        call.status = ToolCallStatus::Error;
                    }
                }
                self.status = RunStatus::Error;
                self.error = Some(message.clone());
            }

            Event::TextMessageStart {
                message_id, role, ..
            } => {
                if self.messages.iter().any(|m| m.id == *message_id) {
                    warn!(message_id = %message_id, "ignoring duplicate TEXT_MESSAGE_START");
                    return;
                }
                self.close_open_messages();
                self.messages.push(Message::new(message_id, *role));
            }
            Event::TextMessageContent {
                message_id, delta, ..
            } => match self.message_mut(message_id) {
                Some(message) if message.is_streaming => message.append_text(delta),
                Some(_) => {
                    warn!(message_id = %message_id, "ignoring content for an ended message");
                }
                None => {
                    warn!(message_id = %message_id, "ignoring content for an unknown message");
                }
            },
            Event::TextMessageEnd { message_id, .. } => match self.message_mut(message_id) {
                Some(message) => message.is_streaming = false,
                None => {
                    warn!(message_id = %message_id, "ignoring end for an unknown message");
                }
            },

            Event::ToolCallStart {
                tool_call_id,
                tool_call_name,
                ..
            } => {
                // A tool call needs a message to anchor its segment; open an
                // implicit assistant message when the stream leads with tools.
                // The id is derived from the tool call id so replays stay
                // deterministic.
                if self.messages.is_empty() {
                    self.messages
                        .push(Message::new(format!("msg_for_{tool_call_id}"), Role::Assistant));
                }
                let Some(message) = self.messages.last_mut() else {
                    return;
                };
                // A tool call always opens a new segment, even for a reused
                // id; tool segments never merge into neighbors.
                message.segments.push(Segment::Tool {
                    tool_call_id: tool_call_id.clone(),
                });
                let call = message
                    .tool_calls
                    .entry(tool_call_id.clone())
                    .or_insert_with(|| ToolCall::new(tool_call_id, tool_call_name));
                call.name = tool_call_name.clone();
                call.status = ToolCallStatus::Running;
            }
            Event::ToolCallArgs {
                tool_call_id,
                delta,
                ..
            } => match self.tool_call_mut(tool_call_id) {
                Some(call) => call.arguments.push_str(delta),
                None => {
                    warn!(tool_call_id = %tool_call_id, "ignoring args for an unknown tool call");
                }
            },
            Event::ToolCallResult {
                tool_call_id,
                content,
                ..
            } => match self.tool_call_mut(tool_call_id) {
                // First write wins, mirroring the producer's policy.
                Some(call) if call.result.is_none() => call.result = Some(content.clone()),
                Some(_) => {
                    warn!(tool_call_id = %tool_call_id, "ignoring duplicate tool result");
                }
                None => {
                    warn!(tool_call_id = %tool_call_id, "ignoring result for an unknown tool call");
                }
            },
            Event::ToolCallEnd { tool_call_id, .. } => match self.tool_call_mut(tool_call_id) {
                Some(call) => call.status = ToolCallStatus::Completed,
                None => {
                    warn!(tool_call_id = %tool_call_id, "ignoring end for an unknown tool call");
                }
            },
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Consumes canonical events in order and maintains per-run message state.
///
/// One reducer serves one stream. State is keyed by `(thread_id, run_id)`;
/// concurrent streams each own an independent reducer, so runs never share
/// mutable state.
#[derive(Debug, Default)]
pub struct StateReducer {
    runs: HashMap<RunKey, RunState>,
    active: Option<RunKey>,
}

impl StateReducer {
    /// Create an empty reducer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The run currently receiving events.
    pub fn active_run(&self) -> Option<&RunState> {
        self.active.as_ref().and_then(|key| self.runs.get(key))
    }

    /// A run by identity, active or not.
    pub fn run(&self, thread_id: &str, run_id: &str) -> Option<&RunState> {
        self.runs
            .get(&(thread_id.to_string(), run_id.to_string()))
    }

    pub(crate) fn active_run_terminal(&self) -> bool {
        self.active_run()
            .map(|run| run.status.is_terminal())
            .unwrap_or(false)
    }

    /// Pure snapshot of the active run, callable after any event prefix.
    pub fn snapshot(&self) -> Option<RunState> {
        self.active_run().cloned()
    }

    /// Apply one canonical event.
    pub fn apply(&mut self, event: &Event) {
        if let Event::RunStarted {
            thread_id, run_id, ..
        } = event
        {
            let key = (thread_id.clone(), run_id.clone());
            let run = self
                .runs
                .entry(key.clone())
                .or_insert_with(|| RunState::new(thread_id, run_id));
            if run.status.is_terminal() {
                warn!(run_id = %run_id, "ignoring RUN_STARTED for a terminated run");
                return;
            }
            run.status = RunStatus::Streaming;
            self.active = Some(key);
            return;
        }

        let Some(run) = self.active.as_ref().and_then(|key| self.runs.get_mut(key)) else {
            warn!("ignoring event with no active run");
            return;
        };
        if run.status.is_terminal() {
            warn!(run_id = %run.run_id, "ignoring event for a terminated run");
            return;
        }
        run.apply(event);
    }

    /// Record an abrupt transport closure for the active run.
    ///
    /// With no reconnect protocol upstream, a run cut off before its
    /// terminal event is treated as permanently failed. Tool calls keep
    /// their last observed status — their true outcome is unknown — so the
    /// renderer can show what was in flight.
    pub fn mark_transport_closed(&mut self) {
        let Some(run) = self.active.as_ref().and_then(|key| self.runs.get_mut(key)) else {
            return;
        };
        if run.status.is_terminal() {
            return;
        }
        run.close_open_messages();
        run.status = RunStatus::Error;
        run.error = Some("stream closed before the run completed".to_string());
    }
}
