//! Executor-level errors.
//!
//! Only one class of failure is fatal to an activation: the LLM transport
//! itself. Every other failure (parse/restricted/exception/throw/exit/
//! timeout/invalid-action) is recoverable and handled inside the loop via
//! retry accounting, never propagated as an [`ExecutorError`].

use warden_core::TransportError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutorError {
    #[error("llm transport failed: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;
