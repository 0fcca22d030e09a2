//! The executor loop (C6): request a structured action from the LLM,
//! dispatch it, feed the sandboxed result back, repeat until completion or
//! cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use warden_ast::{HumanInput, Value as EvalValue};
use warden_core::{AgentDescriptor, Config, LlmTransport, Message, ToolCatalog, VaultWriter};
use warden_sandbox::{EvalOptions, SandboxError, eval_sandboxed};

use crate::context::Context;
use crate::error::{ExecutorError, Result};
use crate::pretty::pretty_print;

/// Why an activation was cancelled rather than completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    ReachedMaxIterations,
    ReachedMaxRetries,
}

/// The value an activation terminates with.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeValue {
    /// Produced by `eval_and_complete`: the sandbox's evaluated result.
    Evaluated(EvalValue),
    /// Produced by `return`: the LLM's structured `result` field.
    Structured(JsonValue),
    /// Produced by `done`: no value.
    None,
}

/// The outcome of one `run`/`resume` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalResult {
    Ok(OutcomeValue),
    Cancel(CancelReason),
}

/// Start a fresh activation: `[system_prompt, user(task)]`, counters at
/// zero, vault populated from `agent.tool_options`. Returns the terminal
/// result together with the context it ran against, so a caller that needs
/// to suspend on [`CancelReason`] can hand the context back to [`resume`].
pub async fn run(
    agent: &AgentDescriptor,
    system_prompt: impl Into<String>,
    task: impl Into<String>,
    config: &Config,
    transport: &dyn LlmTransport,
    vault: &dyn VaultWriter,
    catalog: &dyn ToolCatalog,
    human_input: Arc<dyn HumanInput>,
) -> Result<(TerminalResult, Context)> {
    let aliases = setup_vault(agent, vault, catalog);
    let mut context = Context::fresh(system_prompt, task);
    let result = drive(agent, &mut context, &aliases, config, transport, human_input).await?;
    Ok((result, context))
}

/// Resume a suspended activation: append `message` if present, reset
/// `iteration`/`retry` to zero, then run the loop again. The vault is not
/// re-populated; it was already written by the `run` call that started this
/// activation.
pub async fn resume(
    agent: &AgentDescriptor,
    context: &mut Context,
    message: Option<&str>,
    config: &Config,
    transport: &dyn LlmTransport,
    catalog: &dyn ToolCatalog,
    human_input: Arc<dyn HumanInput>,
) -> Result<TerminalResult> {
    let aliases = collect_aliases(agent, catalog);
    context.resume(message.map(Message::user));
    drive(agent, context, &aliases, config, transport, human_input).await
}

/// Write every declared tool's resolved options into the vault and collect
/// the short-name aliases each tool wants recognized in generated code.
fn setup_vault(agent: &AgentDescriptor, vault: &dyn VaultWriter, catalog: &dyn ToolCatalog) -> HashMap<String, String> {
    for tool in &agent.tools {
        let options = agent.tool_options(&tool.name);
        vault.write(&tool.name, options);
    }
    collect_aliases(agent, catalog)
}

fn collect_aliases(agent: &AgentDescriptor, catalog: &dyn ToolCatalog) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    for tool in &agent.tools {
        let options = agent.tool_options(&tool.name);
        for (short_name, full_name) in catalog.aliases(&tool.name, &options) {
            aliases.insert(short_name, full_name);
        }
    }
    aliases
}

/// The per-iteration transition loop, shared by `run` and `resume`.
async fn drive(
    agent: &AgentDescriptor,
    context: &mut Context,
    aliases: &HashMap<String, String>,
    config: &Config,
    transport: &dyn LlmTransport,
    human_input: Arc<dyn HumanInput>,
) -> Result<TerminalResult> {
    tracing::info!("call.start");
    let result = drive_inner(agent, context, aliases, config, transport, human_input).await;
    match &result {
        Ok(_) => tracing::info!("call.stop"),
        Err(err) => tracing::warn!(%err, "call.exception"),
    }
    result
}

async fn drive_inner(
    agent: &AgentDescriptor,
    context: &mut Context,
    aliases: &HashMap<String, String>,
    config: &Config,
    transport: &dyn LlmTransport,
    human_input: Arc<dyn HumanInput>,
) -> Result<TerminalResult> {
    loop {
        if context.iteration >= config.max_iterations {
            tracing::info!(iteration = context.iteration, max = config.max_iterations, "cancelling: max iterations reached");
            return Ok(TerminalResult::Cancel(CancelReason::ReachedMaxIterations));
        }

        tracing::debug!(iteration = context.iteration, "iteration.start");

        let schema = warden_schema::build_action_schema(&agent.output_schema);
        let message_count = context.conversation.messages().len();
        tracing::debug!(model = config.model.as_str(), message_count, iteration = context.iteration, retry = context.retry, "llm.request.start");
        let reply = transport
            .generate_structured(&config.model, context.conversation.messages(), &schema)
            .await
            .map_err(ExecutorError::from)?;
        tracing::debug!(model = config.model.as_str(), action = ?reply.action, "llm.request.stop");

        context.conversation.push(Message::assistant(
            serde_json::to_string(&reply).unwrap_or_else(|_| "<unserializable reply>".to_owned()),
        ));

        match reply.action {
            warden_core::ActionKind::EvalAndContinue => {
                if !reply.has_code() {
                    fail_iteration(context, config, &invalid_action_message("code must be a non-empty string"))?;
                    if let Some(cancel) = check_cancelled(context, config) {
                        tracing::debug!(iteration = context.iteration, "iteration.stop");
                        return Ok(cancel);
                    }
                    tracing::debug!(iteration = context.iteration, "iteration.stop");
                    continue;
                }
                match evaluate(&reply.code, agent, aliases, config, human_input.clone()).await {
                    Ok(value) => {
                        tracing::debug!(iteration = context.iteration, "eval_and_continue succeeded");
                        context.conversation.push(Message::user(format!(
                            "Code executed successfully. Result:\n```\n{}\n```",
                            pretty_print(&value)
                        )));
                        context.iteration += 1;
                        context.retry = 0;
                    }
                    Err(err) => {
                        tracing::debug!(iteration = context.iteration, retry = context.retry, %err, "eval_and_continue failed, retrying");
                        fail_iteration(context, config, &format!("Code execution failed:\n\n{err}\n\nPlease fix the error and try again."))?;
                        if let Some(cancel) = check_cancelled(context, config) {
                            tracing::debug!(iteration = context.iteration, "iteration.stop");
                            return Ok(cancel);
                        }
                    }
                }
            }
            warden_core::ActionKind::EvalAndComplete => {
                if !reply.has_code() {
                    fail_iteration(context, config, &invalid_action_message("code must be a non-empty string"))?;
                    if let Some(cancel) = check_cancelled(context, config) {
                        tracing::debug!(iteration = context.iteration, "iteration.stop");
                        return Ok(cancel);
                    }
                    tracing::debug!(iteration = context.iteration, "iteration.stop");
                    continue;
                }
                match evaluate(&reply.code, agent, aliases, config, human_input.clone()).await {
                    Ok(value) => return Ok(TerminalResult::Ok(OutcomeValue::Evaluated(value))),
                    Err(err) => {
                        fail_iteration(context, config, &format!("Code execution failed:\n\n{err}\n\nPlease fix the error and try again."))?;
                        if let Some(cancel) = check_cancelled(context, config) {
                            tracing::debug!(iteration = context.iteration, "iteration.stop");
                            return Ok(cancel);
                        }
                    }
                }
            }
            warden_core::ActionKind::Return => return Ok(TerminalResult::Ok(OutcomeValue::Structured(reply.result))),
            warden_core::ActionKind::Done => return Ok(TerminalResult::Ok(OutcomeValue::None)),
        }
        tracing::debug!(iteration = context.iteration, "iteration.stop");
    }
}

async fn evaluate(
    code: &str,
    agent: &AgentDescriptor,
    aliases: &HashMap<String, String>,
    config: &Config,
    human_input: Arc<dyn HumanInput>,
) -> std::result::Result<EvalValue, SandboxError> {
    let opts = EvalOptions { timeout_ms: config.sandbox.timeout_ms, aliases: aliases.clone() };
    eval_sandboxed(code, &agent.allowlist, &agent.module_registry, &opts, human_input).await
}

/// The spec's fixed template for an `invalid_action` retry message.
fn invalid_action_message(detail: &str) -> String {
    format!("Invalid response format: {detail}. Please respond with valid JSON in the expected format.")
}

/// Record a recoverable-failure feedback message, without checking the
/// retry ceiling; the caller checks [`check_cancelled`] immediately after.
fn fail_iteration(context: &mut Context, _config: &Config, detail: &str) -> Result<()> {
    context.conversation.push(Message::user(detail.to_owned()));
    context.retry += 1;
    Ok(())
}

fn check_cancelled(context: &Context, config: &Config) -> Option<TerminalResult> {
    if context.retry > config.max_retries {
        tracing::info!(retry = context.retry, max = config.max_retries, "cancelling: max retries reached");
        Some(TerminalResult::Cancel(CancelReason::ReachedMaxRetries))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use warden_allowlist::default_allowlist;
    use warden_allowlist::default_module_registry;
    use warden_core::{ActionReply, TransportError};

    struct ScriptedTransport {
        replies: Mutex<Vec<ActionReply>>,
    }

    #[async_trait]
    impl LlmTransport for ScriptedTransport {
        async fn generate_structured(&self, _model: &str, _messages: &[Message], _schema: &JsonValue) -> std::result::Result<ActionReply, TransportError> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(TransportError::Failed("no more scripted replies".to_owned()));
            }
            Ok(replies.remove(0))
        }
    }

    struct NullVault;
    impl VaultWriter for NullVault {
        fn write(&self, _tool: &str, _options: JsonValue) {}
    }

    struct EmptyCatalog;
    impl ToolCatalog for EmptyCatalog {
        fn dynamic_doc(&self, _tool_name: &str, _options: &JsonValue) -> Option<String> {
            None
        }
        fn aliases(&self, _tool_name: &str, _options: &JsonValue) -> Vec<(String, String)> {
            vec![]
        }
    }

    fn agent() -> AgentDescriptor {
        AgentDescriptor::new("doc", vec![], default_allowlist(), default_module_registry())
    }

    fn config() -> Config {
        Config { max_iterations: 3, max_retries: 2, ..Config::default() }
    }

    fn null_input() -> Arc<dyn HumanInput> {
        Arc::new(warden_ast::NullHumanInput)
    }

    #[tokio::test]
    async fn eval_and_complete_terminates_with_evaluated_value() {
        let transport = ScriptedTransport {
            replies: Mutex::new(vec![ActionReply { action: warden_core::ActionKind::EvalAndComplete, code: "1 + 2".into(), result: json!(null) }]),
        };
        let (result, _context) = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap();
        assert_eq!(result, TerminalResult::Ok(OutcomeValue::Evaluated(EvalValue::Int(3))));
    }

    #[tokio::test]
    async fn return_action_terminates_with_structured_result() {
        let transport = ScriptedTransport {
            replies: Mutex::new(vec![ActionReply {
                action: warden_core::ActionKind::Return,
                code: String::new(),
                result: json!({"value": "done"}),
            }]),
        };
        let (result, _context) = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap();
        assert_eq!(result, TerminalResult::Ok(OutcomeValue::Structured(json!({"value": "done"}))));
    }

    #[tokio::test]
    async fn done_action_terminates_with_no_value() {
        let transport = ScriptedTransport {
            replies: Mutex::new(vec![ActionReply { action: warden_core::ActionKind::Done, code: String::new(), result: json!(null) }]),
        };
        let (result, _context) = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap();
        assert_eq!(result, TerminalResult::Ok(OutcomeValue::None));
    }

    #[tokio::test]
    async fn restricted_call_consumes_a_retry_then_recovers() {
        let transport = ScriptedTransport {
            replies: Mutex::new(vec![
                ActionReply { action: warden_core::ActionKind::EvalAndContinue, code: r#"File.read!("x")"#.into(), result: json!(null) },
                ActionReply { action: warden_core::ActionKind::EvalAndComplete, code: "1 + 1".into(), result: json!(null) },
            ]),
        };
        let (result, _context) = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap();
        assert_eq!(result, TerminalResult::Ok(OutcomeValue::Evaluated(EvalValue::Int(2))));
    }

    #[tokio::test]
    async fn exhausting_retries_cancels() {
        let bad = ActionReply { action: warden_core::ActionKind::EvalAndContinue, code: r#"File.read!("x")"#.into(), result: json!(null) };
        let transport = ScriptedTransport { replies: Mutex::new(vec![bad.clone(), bad.clone(), bad]) };
        let (result, _context) = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap();
        assert_eq!(result, TerminalResult::Cancel(CancelReason::ReachedMaxRetries));
    }

    #[tokio::test]
    async fn exhausting_iterations_cancels() {
        let ok = ActionReply { action: warden_core::ActionKind::EvalAndContinue, code: "1 + 1".into(), result: json!(null) };
        let transport = ScriptedTransport { replies: Mutex::new(vec![ok.clone(), ok.clone(), ok]) };
        let (result, _context) = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap();
        assert_eq!(result, TerminalResult::Cancel(CancelReason::ReachedMaxIterations));
    }

    #[tokio::test]
    async fn transport_failure_is_fatal_not_a_retry() {
        let transport = ScriptedTransport { replies: Mutex::new(vec![]) };
        let err = run(&agent(), "sys", "do it", &config(), &transport, &NullVault, &EmptyCatalog, null_input()).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Transport(_)));
    }
}
