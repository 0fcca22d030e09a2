//! The allowlist specification and its decision procedure.

use std::collections::{HashMap, HashSet};

use crate::registry::ModuleRegistry;

/// The permission granted to a single module.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Permission {
    /// Every exported function of the module may be called.
    All,
    /// Only the named exported functions may be called.
    Only(HashSet<String>),
    /// Every exported function except the named ones may be called.
    Except(HashSet<String>),
}

/// The outcome of the allowlist decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The call is permitted.
    Allowed,
    /// The call is not permitted.
    Restricted,
}

/// A materialized module -> permission map.
///
/// Built via [`AllowlistBuilder`]; immutable once constructed, matching the
/// "writers are quiescent during evaluation" invariant from the concurrency
/// model.
#[derive(Debug, Clone, Default)]
pub struct AllowlistSpec {
    entries: HashMap<String, Permission>,
}

impl AllowlistSpec {
    /// Borrow the materialized module -> permission map.
    pub fn spec(&self) -> &HashMap<String, Permission> {
        &self.entries
    }

    /// Look up the permission for a single module, if any is declared.
    pub fn permission_for(&self, module: &str) -> Option<&Permission> {
        self.entries.get(module)
    }
}

/// Builder for [`AllowlistSpec`].
///
/// Each `allow_*` call appends an entry; [`AllowlistBuilder::extend`]
/// records a parent spec whose entries are merged in underneath this
/// builder's own entries at `build()` time. Merge is at *module*
/// granularity: if both parent and child declare a permission for the same
/// module, the child's permission fully replaces the parent's -- function
/// sets are never unioned across the two.
#[derive(Debug, Default)]
pub struct AllowlistBuilder {
    entries: Vec<(String, Permission)>,
    parent: Option<AllowlistSpec>,
}

impl AllowlistBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `All` permission to `module`.
    pub fn allow_all(mut self, module: impl Into<String>) -> Self {
        self.entries.push((module.into(), Permission::All));
        self
    }

    /// Grant `Only(fns)` permission to `module`.
    pub fn allow_only(mut self, module: impl Into<String>, fns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entries.push((module.into(), Permission::Only(fns.into_iter().map(Into::into).collect())));
        self
    }

    /// Grant `Except(fns)` permission to `module`.
    pub fn allow_except(mut self, module: impl Into<String>, fns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entries.push((module.into(), Permission::Except(fns.into_iter().map(Into::into).collect())));
        self
    }

    /// Compose on top of a base spec. The base's entries are merged in
    /// first; this builder's own `allow_*` entries are then applied over
    /// them at module granularity.
    pub fn extend(mut self, base: AllowlistSpec) -> Self {
        self.parent = Some(base);
        self
    }

    /// Materialize the final [`AllowlistSpec`].
    pub fn build(self) -> AllowlistSpec {
        let mut entries = self.parent.map(|p| p.entries).unwrap_or_default();
        for (module, permission) in self.entries {
            entries.insert(module, permission);
        }
        AllowlistSpec { entries }
    }
}

/// The default decision procedure from the sandbox specification.
///
/// `arity` is accepted for authorization-surface symmetry with a captured
/// function reference, but the default procedure performs function-name-
/// level authorization only and does not consult it.
pub fn decide(spec: &AllowlistSpec, registry: &ModuleRegistry, module: &str, function: &str, _arity: u32) -> Decision {
    let Some(permission) = spec.permission_for(module) else {
        return Decision::Restricted;
    };

    match permission {
        Permission::All => {
            if registry.is_exported(module, function) {
                Decision::Allowed
            } else {
                Decision::Restricted
            }
        }
        Permission::Only(allowed) => {
            if allowed.contains(function) && registry.is_exported(module, function) {
                Decision::Allowed
            } else {
                Decision::Restricted
            }
        }
        Permission::Except(denied) => {
            if !denied.contains(function) && registry.is_exported(module, function) {
                Decision::Allowed
            } else {
                Decision::Restricted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModuleRegistry {
        let mut reg = ModuleRegistry::new();
        reg.register("Strings", ["upcase", "downcase", "trim"]);
        reg.register("Files", ["read", "write"]);
        reg
    }

    #[test]
    fn absent_module_is_restricted() {
        let spec = AllowlistBuilder::new().allow_all("Strings").build();
        assert_eq!(decide(&spec, &registry(), "Files", "read", 1), Decision::Restricted);
    }

    #[test]
    fn all_permission_requires_exported_function() {
        let spec = AllowlistBuilder::new().allow_all("Strings").build();
        let reg = registry();
        assert_eq!(decide(&spec, &reg, "Strings", "upcase", 1), Decision::Allowed);
        assert_eq!(decide(&spec, &reg, "Strings", "private_fn", 1), Decision::Restricted);
    }

    #[test]
    fn only_permission_restricts_to_named_set() {
        let spec = AllowlistBuilder::new().allow_only("Strings", ["upcase"]).build();
        let reg = registry();
        assert_eq!(decide(&spec, &reg, "Strings", "upcase", 1), Decision::Allowed);
        assert_eq!(decide(&spec, &reg, "Strings", "downcase", 1), Decision::Restricted);
    }

    #[test]
    fn only_with_nonexistent_function_is_restricted() {
        let spec = AllowlistBuilder::new().allow_only("Strings", ["ghost_fn"]).build();
        assert_eq!(decide(&spec, &registry(), "Strings", "ghost_fn", 1), Decision::Restricted);
    }

    #[test]
    fn except_permission_excludes_named_set() {
        let spec = AllowlistBuilder::new().allow_except("Strings", ["trim"]).build();
        let reg = registry();
        assert_eq!(decide(&spec, &reg, "Strings", "upcase", 1), Decision::Allowed);
        assert_eq!(decide(&spec, &reg, "Strings", "trim", 1), Decision::Restricted);
    }

    #[test]
    fn except_with_empty_set_behaves_like_all() {
        let spec = AllowlistBuilder::new().allow_except("Strings", Vec::<String>::new()).build();
        let reg = registry();
        assert_eq!(decide(&spec, &reg, "Strings", "upcase", 1), Decision::Allowed);
        assert_eq!(decide(&spec, &reg, "Strings", "trim", 1), Decision::Allowed);
    }

    #[test]
    fn extend_replaces_whole_module_permission_not_union() {
        let base = AllowlistBuilder::new().allow_only("Strings", ["upcase", "downcase"]).build();
        let child = AllowlistBuilder::new().allow_only("Strings", ["trim"]).extend(base).build();

        let reg = registry();
        // Child fully replaces the parent's permission for "Strings" -- the
        // parent's "upcase"/"downcase" grant does not survive.
        assert_eq!(decide(&child, &reg, "Strings", "trim", 1), Decision::Allowed);
        assert_eq!(decide(&child, &reg, "Strings", "upcase", 1), Decision::Restricted);
    }

    #[test]
    fn extend_preserves_untouched_modules_from_parent() {
        let base = AllowlistBuilder::new().allow_all("Strings").allow_all("Files").build();
        let child = AllowlistBuilder::new().allow_only("Strings", ["upcase"]).extend(base).build();

        let reg = registry();
        assert_eq!(decide(&child, &reg, "Files", "read", 1), Decision::Allowed);
        assert_eq!(decide(&child, &reg, "Strings", "downcase", 1), Decision::Restricted);
    }

    #[test]
    fn arity_does_not_affect_decision() {
        let spec = AllowlistBuilder::new().allow_all("Strings").build();
        let reg = registry();
        assert_eq!(decide(&spec, &reg, "Strings", "upcase", 1), decide(&spec, &reg, "Strings", "upcase", 99));
    }
}
