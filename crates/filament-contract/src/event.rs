use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Native execution-engine events for one run, in emission order.
///
/// The engine is opaque to this layer; these variants cover the shapes the
/// protocol bridge knows how to translate. Anything else the engine emits is
/// decoded leniently through [`EngineEvent::from_value`] and skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Run accepted by the engine.
    RunStarted {
        /// Conversation/session identifier.
        thread_id: String,
        /// Identifier for this run.
        run_id: String,
    },
    /// Incremental assistant text.
    TextDelta {
        /// Text fragment in stream order.
        delta: String,
    },
    /// Tool invocation opened.
    ToolUseStart {
        /// Tool call identifier.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Incremental tool arguments (raw JSON fragment).
    ToolUseDelta {
        /// Tool call identifier.
        id: String,
        /// Argument fragment in stream order.
        args_delta: String,
    },
    /// Tool execution result.
    ToolResult {
        /// Tool call identifier.
        id: String,
        /// Result payload; strings pass to the wire verbatim.
        content: Value,
    },
    /// Run completed successfully.
    RunCompleted {
        /// Optional structured result for the run.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
    /// Engine-reported failure; terminal for the run.
    RunFailed {
        /// Human-readable failure description.
        message: String,
    },
}

impl EngineEvent {
    /// Decode one native event from its loose JSON form.
    ///
    /// The native format evolves independently of this crate; a shape this
    /// version does not recognize surfaces as [`MappingError`] so callers
    /// can skip it without aborting the run.
    pub fn from_value(value: Value) -> Result<Self, MappingError> {
        serde_json::from_value(value)
            .map_err(|err| MappingError::UnrecognizedShape(err.to_string()))
    }
}

/// A native event could not be translated to a canonical event.
///
/// Always recovered locally: the offending event is skipped and bridging
/// continues with the next one.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The event's JSON shape did not match any known native event.
    #[error("unrecognized engine event shape: {0}")]
    UnrecognizedShape(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_shapes() {
        let ev = EngineEvent::from_value(json!({"type": "text_delta", "delta": "hi"})).unwrap();
        assert_eq!(ev, EngineEvent::TextDelta { delta: "hi".into() });

        let ev = EngineEvent::from_value(json!({
            "type": "tool_result",
            "id": "tc_1",
            "content": {"status": "ok"}
        }))
        .unwrap();
        assert!(matches!(ev, EngineEvent::ToolResult { .. }));
    }

    #[test]
    fn run_completed_result_is_optional() {
        let ev = EngineEvent::from_value(json!({"type": "run_completed"})).unwrap();
        assert_eq!(ev, EngineEvent::RunCompleted { result: None });
    }

    #[test]
    fn unrecognized_shape_is_an_error_not_a_panic() {
        let err = EngineEvent::from_value(json!({"type": "telemetry", "ms": 12})).unwrap_err();
        assert!(matches!(err, MappingError::UnrecognizedShape(_)));

        let err = EngineEvent::from_value(json!({"type": "text_delta"})).unwrap_err();
        assert!(matches!(err, MappingError::UnrecognizedShape(_)));
    }
}
