//! The structured reply an LLM produces each executor iteration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four reply shapes the executor dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Evaluate `code`; on success, feed the result back and keep going.
    EvalAndContinue,
    /// Evaluate `code`; on success, terminate with the evaluated value.
    EvalAndComplete,
    /// Terminate immediately with `result`, no evaluation.
    Return,
    /// Terminate immediately with no value.
    Done,
}

/// A structured reply from the LLM, validated against the action schema
/// (C4) before the executor ever sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReply {
    pub action: ActionKind,
    /// Required by the schema for every variant; empty for `return`/`done`.
    #[serde(default)]
    pub code: String,
    /// Required by the schema; a default/placeholder value when unused by
    /// the variant (only meaningful for `return`).
    #[serde(default)]
    pub result: Value,
}

impl ActionReply {
    /// Whether this reply carries an evaluable, non-empty `code` body.
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_snake_case_action_names() {
        let reply: ActionReply = serde_json::from_str(
            r#"{"action":"eval_and_continue","code":"1+1","result":null}"#,
        )
        .unwrap();
        assert_eq!(reply.action, ActionKind::EvalAndContinue);
        assert!(reply.has_code());
    }

    #[test]
    fn empty_code_reports_no_code() {
        let reply = ActionReply { action: ActionKind::Done, code: String::new(), result: Value::Null };
        assert!(!reply.has_code());
    }
}
