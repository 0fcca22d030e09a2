//! A scripted mock LLM transport and an empty tool catalog, so `warden run`
//! can drive one full activation without a live model.
//!
//! The script deliberately includes one restricted call so the retry
//! feedback path is visible in the transcript, then a successful
//! `eval_and_complete`.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use warden_core::{ActionKind, ActionReply, Message, ToolCatalog};
use warden_core::{LlmTransport, TransportError};

/// Replays a fixed script of replies, one per call, regardless of the
/// conversation contents. Demo-only: a real transport inspects `messages`.
pub struct ScriptedTransport {
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn script(&self) -> Vec<ActionReply> {
        vec![
            ActionReply {
                action: ActionKind::EvalAndContinue,
                code: r#"File.read!("/etc/passwd")"#.to_owned(),
                result: Value::Null,
            },
            ActionReply { action: ActionKind::EvalAndComplete, code: "Numbers.add(2, 3)".to_owned(), result: Value::Null },
        ]
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmTransport for ScriptedTransport {
    async fn generate_structured(&self, _model: &str, _messages: &[Message], _schema: &Value) -> Result<ActionReply, TransportError> {
        let script = self.script();
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        script.into_iter().nth(idx).ok_or_else(|| TransportError::Failed("demo script exhausted".to_owned()))
    }
}

/// A tool catalog with nothing registered; the demo agent declares no tools.
pub struct EmptyCatalog;

impl ToolCatalog for EmptyCatalog {
    fn dynamic_doc(&self, _tool_name: &str, _options: &Value) -> Option<String> {
        None
    }

    fn aliases(&self, _tool_name: &str, _options: &Value) -> Vec<(String, String)> {
        vec![]
    }
}

/// The demo agent: no tools, the Default Allowlist, a one-field string
/// output schema.
pub fn demo_agent() -> warden_core::AgentDescriptor {
    let mut agent = warden_core::AgentDescriptor::new(
        "A small demo agent that performs arithmetic over sandboxed code.",
        vec![],
        warden_allowlist::default_allowlist(),
        warden_allowlist::default_module_registry(),
    );
    agent.output_schema = vec![("value".to_owned(), warden_core::OutputField { ty: warden_core::FieldType::String, required: true })];
    agent
}
