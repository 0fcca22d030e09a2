//! The write-side contract for the tool option vault (C8).
//!
//! The vault itself -- a per-agent-actor map written once at setup and read
//! lock-free thereafter -- lives with the agent server, which is the only
//! component that owns an actor's lifetime. This crate only defines the
//! interface the executor's pre-loop vault setup step writes through, so
//! that crate can depend on the vault without the vault's crate depending
//! back on the executor.

use serde_json::Value;

/// Write-only view of a tool option vault.
pub trait VaultWriter: Send + Sync {
    /// Record `tool`'s resolved options. Called once per tool, before the
    /// first LLM request of an activation; never called again afterward.
    fn write(&self, tool: &str, options: Value);
}
