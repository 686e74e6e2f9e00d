use serde::{Deserialize, Serialize};

/// Minimum accepted session identifier length.
///
/// Session ids double as the upstream runtime's session key, which requires
/// at least 33 characters of high-entropy identifier.
pub const SESSION_ID_MIN_LEN: usize = 33;

/// One invocation of the bridge: resolved input, session binding, and the
/// response mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Resolved user input for this run.
    pub input: String,
    /// Session identifier; also used as the protocol thread id.
    #[serde(rename = "sessionId", alias = "session_id")]
    pub session_id: String,
    /// Optional end-user identifier forwarded to the engine.
    #[serde(
        rename = "userId",
        alias = "user_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    /// Streaming-protocol mode; when false the response is a single body.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

impl RunRequest {
    /// Create a streaming request with the required fields.
    pub fn new(input: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            session_id: session_id.into(),
            user_id: None,
            stream: true,
        }
    }

    /// Select the single non-streaming response mode.
    #[must_use]
    pub fn non_streaming(mut self) -> Self {
        self.stream = false;
        self
    }

    /// Set the end-user identifier.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.input.trim().is_empty() {
            return Err(RequestError::invalid_field("input cannot be empty"));
        }
        if self.session_id.chars().count() < SESSION_ID_MIN_LEN {
            return Err(RequestError::invalid_field(format!(
                "sessionId must be at least {SESSION_ID_MIN_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Error type for request processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestError {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl RequestError {
    /// Create an invalid field error.
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self {
            code: "INVALID_FIELD".into(),
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_ERROR".into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RequestError {}
