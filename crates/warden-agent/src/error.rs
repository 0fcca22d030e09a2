//! Agent server error types.

/// Unified error type for the agent server.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- Executor errors -------------------------------------------------
    /// Propagated from the executor loop: an LLM transport failure.
    #[error("executor error: {0}")]
    Executor(#[from] warden_executor::ExecutorError),

    // -- Server protocol errors --------------------------------------------
    /// `respond` was sent but no sandboxed `human_input` call is currently
    /// blocked waiting for one.
    #[error("no pending human-input request")]
    NoPendingRequest,

    /// `start` was sent while an activation is already running; the caller
    /// must wait for it to finish or `cancel` first.
    #[error("an activation is already running")]
    ActivationInProgress,

    /// The server was cancelled; it accepts no further `start`/`respond`.
    #[error("agent server was cancelled")]
    Cancelled,

    /// The server task has already shut down.
    #[error("agent server is no longer running")]
    ServerGone,
}

pub type Result<T> = std::result::Result<T, AgentError>;
