//! Canonical AG-UI event types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Base Event Fields
// ============================================================================

/// Common fields for all AG-UI events (BaseEvent).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BaseEvent {
    /// Event timestamp in milliseconds since epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// Role for text messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-authored content.
    System,
    /// Assistant-authored content; the role of every streamed message.
    #[default]
    Assistant,
    /// End-user content.
    User,
    /// Tool-result content.
    Tool,
}

// ============================================================================
// AG-UI Event Types
// ============================================================================

/// AG-UI Protocol Event Types.
///
/// These events follow the AG-UI specification for agent-to-frontend
/// communication. See: <https://docs.ag-ui.com/concepts/events>
///
/// Wire field names are camelCase; legacy snake_case spellings are accepted
/// on ingestion via [`crate::frame::decode_payload`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    // ========================================================================
    // Lifecycle Events
    // ========================================================================
    /// Signals the start of an agent run.
    #[serde(rename = "RUN_STARTED")]
    RunStarted {
        /// Conversation/session identifier.
        #[serde(rename = "threadId")]
        thread_id: String,
        /// Identifier for this run.
        #[serde(rename = "runId")]
        run_id: String,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Signals successful completion of an agent run.
    #[serde(rename = "RUN_FINISHED")]
    RunFinished {
        /// Conversation/session identifier.
        #[serde(rename = "threadId")]
        thread_id: String,
        /// Identifier for this run.
        #[serde(rename = "runId")]
        run_id: String,
        /// Optional structured result for the run.
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Indicates an error occurred during the run.
    #[serde(rename = "RUN_ERROR")]
    RunError {
        /// Human-readable failure description, rendered directly.
        message: String,
        /// Optional machine-readable error code.
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    // ========================================================================
    // Text Message Events
    // ========================================================================
    /// Indicates the beginning of a text message stream.
    #[serde(rename = "TEXT_MESSAGE_START")]
    TextMessageStart {
        /// Identifier of the message being streamed.
        #[serde(rename = "messageId")]
        message_id: String,
        /// Role is always "assistant" for TEXT_MESSAGE_START.
        role: Role,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Contains incremental text content.
    #[serde(rename = "TEXT_MESSAGE_CONTENT")]
    TextMessageContent {
        /// Identifier of the message being streamed.
        #[serde(rename = "messageId")]
        message_id: String,
        /// Text fragment in stream order.
        delta: String,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Indicates the end of a text message stream.
    #[serde(rename = "TEXT_MESSAGE_END")]
    TextMessageEnd {
        /// Identifier of the message being streamed.
        #[serde(rename = "messageId")]
        message_id: String,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    // ========================================================================
    // Tool Call Events
    // ========================================================================
    /// Signals the start of a tool call.
    #[serde(rename = "TOOL_CALL_START")]
    ToolCallStart {
        /// Tool call identifier.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Tool name.
        #[serde(rename = "toolCallName")]
        tool_call_name: String,
        /// Message this tool call belongs to, when one is open.
        #[serde(rename = "parentMessageId", skip_serializing_if = "Option::is_none")]
        parent_message_id: Option<String>,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Contains incremental tool arguments.
    #[serde(rename = "TOOL_CALL_ARGS")]
    ToolCallArgs {
        /// Tool call identifier.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Argument fragment in stream order.
        delta: String,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Contains the result of a tool execution.
    #[serde(rename = "TOOL_CALL_RESULT")]
    ToolCallResult {
        /// Tool call identifier.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Result payload as a string.
        content: String,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// Signals the end of a tool call.
    #[serde(rename = "TOOL_CALL_END")]
    ToolCallEnd {
        /// Tool call identifier.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Common event fields.
        #[serde(flatten)]
        base: BaseEvent,
    },
}

impl Event {
    // ========================================================================
    // Factory Methods - Lifecycle
    // ========================================================================

    /// Create a run-started event.
    pub fn run_started(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self::RunStarted {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            base: BaseEvent::default(),
        }
    }

    /// Create a run-finished event.
    pub fn run_finished(
        thread_id: impl Into<String>,
        run_id: impl Into<String>,
        result: Option<Value>,
    ) -> Self {
        Self::RunFinished {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            result,
            base: BaseEvent::default(),
        }
    }

    /// Create a run-error event.
    pub fn run_error(message: impl Into<String>, code: Option<String>) -> Self {
        Self::RunError {
            message: message.into(),
            code,
            base: BaseEvent::default(),
        }
    }

    // ========================================================================
    // Factory Methods - Text Message
    // ========================================================================

    /// Create a text-message-start event.
    pub fn text_message_start(message_id: impl Into<String>) -> Self {
        Self::TextMessageStart {
            message_id: message_id.into(),
            role: Role::Assistant,
            base: BaseEvent::default(),
        }
    }

    /// Create a text-message-content event.
    pub fn text_message_content(message_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::TextMessageContent {
            message_id: message_id.into(),
            delta: delta.into(),
            base: BaseEvent::default(),
        }
    }

    /// Create a text-message-end event.
    pub fn text_message_end(message_id: impl Into<String>) -> Self {
        Self::TextMessageEnd {
            message_id: message_id.into(),
            base: BaseEvent::default(),
        }
    }

    // ========================================================================
    // Factory Methods - Tool Call
    // ========================================================================

    /// Create a tool-call-start event.
    pub fn tool_call_start(
        tool_call_id: impl Into<String>,
        tool_call_name: impl Into<String>,
        parent_message_id: Option<String>,
    ) -> Self {
        Self::ToolCallStart {
            tool_call_id: tool_call_id.into(),
            tool_call_name: tool_call_name.into(),
            parent_message_id,
            base: BaseEvent::default(),
        }
    }

    /// Create a tool-call-args event.
    pub fn tool_call_args(tool_call_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::ToolCallArgs {
            tool_call_id: tool_call_id.into(),
            delta: delta.into(),
            base: BaseEvent::default(),
        }
    }

    /// Create a tool-call-result event.
    pub fn tool_call_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolCallResult {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            base: BaseEvent::default(),
        }
    }

    /// Create a tool-call-end event.
    pub fn tool_call_end(tool_call_id: impl Into<String>) -> Self {
        Self::ToolCallEnd {
            tool_call_id: tool_call_id.into(),
            base: BaseEvent::default(),
        }
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Set timestamp on the event.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        match &mut self {
            Self::RunStarted { base, .. }
            | Self::RunFinished { base, .. }
            | Self::RunError { base, .. }
            | Self::TextMessageStart { base, .. }
            | Self::TextMessageContent { base, .. }
            | Self::TextMessageEnd { base, .. }
            | Self::ToolCallStart { base, .. }
            | Self::ToolCallArgs { base, .. }
            | Self::ToolCallResult { base, .. }
            | Self::ToolCallEnd { base, .. } => {
                base.timestamp = Some(timestamp);
            }
        }
        self
    }

    /// Get current timestamp in milliseconds.
    pub fn now_millis() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_started_serializes_with_camel_case_fields() {
        let value = serde_json::to_value(Event::run_started("t1", "r1")).unwrap();
        assert_eq!(
            value,
            json!({"type": "RUN_STARTED", "threadId": "t1", "runId": "r1"})
        );
    }

    #[test]
    fn tool_call_start_omits_absent_optional_fields() {
        let value = serde_json::to_value(Event::tool_call_start("tc1", "lookup", None)).unwrap();
        assert_eq!(
            value,
            json!({"type": "TOOL_CALL_START", "toolCallId": "tc1", "toolCallName": "lookup"})
        );
    }

    #[test]
    fn text_message_start_carries_assistant_role() {
        let value = serde_json::to_value(Event::text_message_start("m1")).unwrap();
        assert_eq!(value["role"], "assistant");
    }

    #[test]
    fn with_timestamp_sets_the_base_field() {
        let value =
            serde_json::to_value(Event::text_message_end("m1").with_timestamp(1234)).unwrap();
        assert_eq!(value["timestamp"], 1234);
    }
}
