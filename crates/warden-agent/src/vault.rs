//! The tool option vault (C8): a per-actor map of resolved tool options,
//! written once at activation setup and read lock-free afterward.
//!
//! The design notes recommend binding the vault to one actor rather than
//! sharing a single process-wide global: every [`AgentServer`](crate::server::AgentServer)
//! owns its own [`Vault`], so two concurrently running agents never observe
//! each other's tool options even if they happen to declare tools with the
//! same name.

use dashmap::DashMap;
use serde_json::Value;

use warden_core::VaultWriter;

/// Per-actor tool option store.
#[derive(Debug, Default)]
pub struct Vault {
    entries: DashMap<String, Value>,
}

impl Vault {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Read a tool's options, or an empty object if none were ever written.
    pub fn get(&self, tool: &str) -> Value {
        self.entries.get(tool).map(|entry| entry.clone()).unwrap_or_else(|| Value::Object(Default::default()))
    }
}

impl VaultWriter for Vault {
    fn write(&self, tool: &str, options: Value) {
        self.entries.insert(tool.to_owned(), options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_tool_reads_as_empty_object() {
        let vault = Vault::new();
        assert_eq!(vault.get("ghost"), Value::Object(Default::default()));
    }

    #[test]
    fn write_then_read_round_trips() {
        let vault = Vault::new();
        vault.write("files", serde_json::json!({"root": "/tmp"}));
        assert_eq!(vault.get("files"), serde_json::json!({"root": "/tmp"}));
    }

    #[test]
    fn rewrite_overwrites_previous_value() {
        let vault = Vault::new();
        vault.write("files", serde_json::json!({"root": "/tmp"}));
        vault.write("files", serde_json::json!({"root": "/var"}));
        assert_eq!(vault.get("files"), serde_json::json!({"root": "/var"}));
    }
}
