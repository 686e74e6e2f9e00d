use uuid::Uuid;

/// Generate a session identifier: readable prefix plus a high-entropy tail.
///
/// The result is 40 characters, above the 33-character minimum the upstream
/// runtime enforces for session keys.
pub fn gen_session_id() -> String {
    format!("session-{}", Uuid::new_v4().simple())
}

/// Generate a run identifier.
pub fn gen_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SESSION_ID_MIN_LEN;

    #[test]
    fn session_ids_are_prefixed_and_long_enough() {
        let id = gen_session_id();
        assert!(id.starts_with("session-"));
        assert!(id.len() >= SESSION_ID_MIN_LEN);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(gen_run_id(), gen_run_id());
        assert_ne!(gen_session_id(), gen_session_id());
    }
}
