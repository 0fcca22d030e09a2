//! Tagged AST node shapes consumed by the analyzer and evaluator.
//!
//! These mirror the language-neutral shapes from the external interfaces:
//! a remote call's callee is either an already-resolved module name or a
//! raw alias path (a single segment) awaiting resolution; captures wrap one
//! of those two forms or a bare local function name; a handful of marker
//! tags stand in for syntactic forms the analyzer always rejects.

use serde::{Deserialize, Serialize};

/// The target module of a remote call, before or after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallTarget {
    /// Already resolved to a concrete module name.
    Module(String),
    /// A raw alias-path reference (always a single segment); resolved to
    /// [`CallTarget::Module`] by [`crate::alias::resolve_aliases`] before
    /// the analyzer ever sees it.
    Alias(String),
}

impl CallTarget {
    /// The module name this target currently names, resolved or not.
    pub fn name(&self) -> &str {
        match self {
            CallTarget::Module(m) => m,
            CallTarget::Alias(a) => a,
        }
    }
}

/// The target of a function capture (`&Mod.fun/arity` or `&fun/arity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureTarget {
    Remote { target: CallTarget, function: String },
    Local(String),
}

/// A definition form the analyzer always rejects, regardless of what it
/// defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionKind {
    Module,
    Function,
    Macro,
    Struct,
    Protocol,
    Impl,
}

/// A binary arithmetic or comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// A node of the parsed program tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),
    BoolLit(bool),
    NilLit,
    Var(String),
    BinOp { op: BinOp, lhs: Box<AstNode>, rhs: Box<AstNode> },
    Neg(Box<AstNode>),
    Not(Box<AstNode>),
    If { cond: Box<AstNode>, then_branch: Box<AstNode>, else_branch: Option<Box<AstNode>> },
    Assign { name: String, value: Box<AstNode> },
    /// A remote call, e.g. `Files.read(path)`.
    Call { target: CallTarget, function: String, args: Vec<AstNode> },
    /// A call to an implicit-core-library (local) function.
    Local { name: String, args: Vec<AstNode> },
    /// A function capture, e.g. `&apply/3`.
    Capture { target: CaptureTarget, arity: u32 },
    /// A sequence of statements; the whole program is one top-level block.
    Block(Vec<AstNode>),
    /// `receive do ... end`.
    Receive,
    Import(String),
    Require(String),
    /// `alias Path, as: name` -- blocked at top level, only introduced by
    /// the sandbox's own alias-injection step.
    Alias { path: String, as_name: String },
    Definition { kind: DefinitionKind, name: String },
}

impl AstNode {
    /// Convenience constructor for a remote call with an already-resolved
    /// module target.
    pub fn call(module: impl Into<String>, function: impl Into<String>, args: Vec<AstNode>) -> Self {
        AstNode::Call { target: CallTarget::Module(module.into()), function: function.into(), args }
    }
}
