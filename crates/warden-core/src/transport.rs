//! External-collaborator traits: the LLM transport and the tool catalog.
//!
//! Both are out of scope for this crate's own implementation (§1) -- callers
//! supply concrete implementations and hand them to the executor.

use async_trait::async_trait;
use serde_json::Value;

use crate::action::ActionReply;
use crate::message::Message;

/// Errors a transport implementation may report. Any error here is fatal to
/// the executor activation (§7): it is never counted against `max_retries`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("llm transport error: {0}")]
    Failed(String),
}

/// A single "structured generation" operation: send a conversation plus a
/// strict JSON schema, get back an [`ActionReply`] already validated against
/// that schema.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    /// Request a structured reply. `schema` is produced by the action
    /// schema builder; a conforming implementation never returns a value
    /// that fails that schema's validation.
    async fn generate_structured(
        &self,
        model: &str,
        messages: &[Message],
        schema: &Value,
    ) -> Result<ActionReply, TransportError>;
}

/// Read-only, build-time-populated catalog of tool metadata.
///
/// The catalog supplies the prompt builder with everything it needs to
/// render tool documentation; it never executes a tool call itself (that
/// happens by the sandbox calling into tool-provided functions, which is
/// out of scope here).
pub trait ToolCatalog: Send + Sync {
    /// Human-friendly description shown above a tool's function list,
    /// optionally depending on that tool's resolved options.
    fn dynamic_doc(&self, tool_name: &str, options: &Value) -> Option<String>;

    /// Short-name aliases a tool wants recognized in generated code, e.g.
    /// `[("fs", "Files")]`.
    fn aliases(&self, tool_name: &str, options: &Value) -> Vec<(String, String)>;
}
