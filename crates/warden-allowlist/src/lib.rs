//! Composable module/function allowlist.
//!
//! [`AllowlistSpec`] answers one question for the AST analyzer: is
//! `(module, function, arity)` [`Decision::Allowed`] or
//! [`Decision::Restricted`]? Specs are built with [`AllowlistBuilder`] and
//! composed via [`AllowlistBuilder::extend`], which replaces a parent's
//! permission for a module wholesale rather than unioning function sets --
//! this is an observable contract, not an implementation detail, and tests
//! in this crate depend on it.
//!
//! - [`spec`] -- [`Permission`], [`AllowlistSpec`], [`AllowlistBuilder`], the
//!   decision procedure.
//! - [`registry`] -- [`ModuleRegistry`], the "public surface" catalog of
//!   which functions a module actually exports (arity is not consulted).
//! - [`default_allowlist`] -- the fixed Default Allowlist (DA) catalog.

pub mod default_allowlist;
pub mod registry;
pub mod spec;

pub use default_allowlist::{default_allowlist, default_module_registry};
pub use registry::ModuleRegistry;
pub use spec::{AllowlistBuilder, AllowlistSpec, Decision, Permission, decide};
