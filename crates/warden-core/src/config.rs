//! Immutable per-activation configuration.
//!
//! [`Config`] is the fully-resolved settings bundle an executor activation
//! runs with. Resolution (the layered deep merge described in the config
//! resolver) lives in `warden-config`; this crate only owns the shape and
//! the hard-coded defaults.

use serde::{Deserialize, Serialize};

/// Resource limits enforced by the sandbox evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Wall-clock timeout for a single `eval` call, in milliseconds. The
    /// only limit actually enforced by the sandbox.
    pub timeout_ms: u64,
    /// Advisory passthrough only; never enforced by the evaluator.
    pub max_heap_size_units: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000, max_heap_size_units: 50_000 }
    }
}

/// Fully-resolved configuration for one executor activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model identifier passed to the LLM transport.
    pub model: String,
    /// Request timeout (milliseconds) passed to the LLM transport.
    pub timeout_ms: u64,
    /// Maximum successful iterations before the executor cancels.
    pub max_iterations: u32,
    /// Maximum consecutive recoverable failures before the executor
    /// cancels.
    pub max_retries: u32,
    /// Sandbox resource limits.
    pub sandbox: SandboxConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "openai:gpt-4o".to_owned(),
            timeout_ms: 30_000,
            max_iterations: 10,
            max_retries: 3,
            sandbox: SandboxConfig::default(),
        }
    }
}
