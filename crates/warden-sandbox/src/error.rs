//! The sandbox's unified error type.
//!
//! Every pipeline stage (parse, analyze, evaluate) reports through
//! [`SandboxError`]; the executor classifies each variant by the recovery
//! policy in the error-handling design (all are recoverable, fed back to
//! the LLM as a retryable fix prompt).

/// Unified error type for one `eval` call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SandboxError {
    /// The source failed to parse.
    #[error("{0}")]
    Parsing(String),

    /// The analyzer rejected a call, module, or syntactic form.
    #[error("{0}")]
    Restricted(String),

    /// The evaluated program raised an unhandled exception.
    #[error("{0}")]
    Exception(String),

    /// The evaluated program threw a non-exceptional early termination.
    #[error("{0}")]
    Throw(String),

    /// The evaluation worker terminated abnormally.
    #[error("{0}")]
    Exit(String),

    /// The evaluation deadline expired before the worker completed.
    #[error("Execution timed out after {0}ms")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
