//! The "public surface" registry -- which functions a module actually
//! exports, independent of the allowlist permission granted for it.
//!
//! The default decision procedure treats a function as callable under an
//! `All` or `Except` permission only if it exists here; this sidesteps the
//! open question in the design notes about whether a target runtime can
//! distinguish "exported" from merely "defined" -- we never inspect
//! language-native visibility, we consult this explicit catalog instead.

use std::collections::{HashMap, HashSet};

/// A catalog of modules and the function names each one exports.
///
/// Cheap to construct and clone-free to query; callers typically build one
/// `ModuleRegistry` per process (or per tool catalog) and share it by
/// reference.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, HashSet<String>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { modules: HashMap::new() }
    }

    /// Register a module and its exported function names. Calling this
    /// again for the same module name overwrites the previous entry.
    pub fn register(&mut self, module: impl Into<String>, functions: impl IntoIterator<Item = impl Into<String>>) {
        self.modules.insert(module.into(), functions.into_iter().map(Into::into).collect());
    }

    /// Merge another registry's modules into this one (overwriting on
    /// module-name collision). Used to fold a tool's `allowlist_contribution`
    /// exported surface into an agent's combined registry.
    pub fn merge(&mut self, other: &ModuleRegistry) {
        for (module, fns) in &other.modules {
            self.modules.insert(module.clone(), fns.clone());
        }
    }

    /// Whether `module` is known to this registry at all.
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Whether `function` is an exported function of `module`.
    pub fn is_exported(&self, module: &str, function: &str) -> bool {
        self.modules.get(module).is_some_and(|fns| fns.contains(function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_exports_nothing() {
        let reg = ModuleRegistry::new();
        assert!(!reg.is_exported("Strings", "upcase"));
        assert!(!reg.has_module("Strings"));
    }

    #[test]
    fn register_and_query() {
        let mut reg = ModuleRegistry::new();
        reg.register("Strings", ["upcase", "downcase"]);
        assert!(reg.has_module("Strings"));
        assert!(reg.is_exported("Strings", "upcase"));
        assert!(!reg.is_exported("Strings", "secret_internal"));
    }

    #[test]
    fn re_register_overwrites() {
        let mut reg = ModuleRegistry::new();
        reg.register("Strings", ["upcase"]);
        reg.register("Strings", ["downcase"]);
        assert!(!reg.is_exported("Strings", "upcase"));
        assert!(reg.is_exported("Strings", "downcase"));
    }

    #[test]
    fn merge_overwrites_by_module_name() {
        let mut base = ModuleRegistry::new();
        base.register("Strings", ["upcase"]);
        base.register("Lists", ["reverse"]);

        let mut extra = ModuleRegistry::new();
        extra.register("Strings", ["trim"]);

        base.merge(&extra);
        assert!(!base.is_exported("Strings", "upcase"));
        assert!(base.is_exported("Strings", "trim"));
        assert!(base.is_exported("Lists", "reverse"));
    }
}
