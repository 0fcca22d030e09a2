//! AST node shapes, alias resolution, a minimal parser, and a tree-walking
//! evaluator for the sandboxed scripting language.
//!
//! The analyzer and sandbox evaluator in `warden-sandbox` are written
//! against [`node::AstNode`] only; everything else here exists to give that
//! pipeline a concrete, in-process producer and runner of such trees, since
//! the real parser is an external collaborator this workspace does not own.

pub mod alias;
pub mod eval;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod value;

pub use alias::{inject_aliases, resolve_aliases};
pub use eval::{EvalError, HumanInput, NullHumanInput, eval};
pub use node::{AstNode, BinOp, CallTarget, CaptureTarget, DefinitionKind};
pub use parser::{ParseError, parse};
pub use value::Value;
