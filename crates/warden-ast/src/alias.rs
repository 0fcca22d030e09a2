//! Alias injection and resolution (sandbox evaluator pipeline step 2).

use std::collections::HashMap;

use crate::node::{AstNode, CallTarget, CaptureTarget};

/// Rewrite every [`CallTarget::Alias`] reference in `node` to
/// [`CallTarget::Module`], consulting `aliases` (short name -> full module
/// name). A segment with no entry in `aliases` resolves to itself: it was
/// never an alias, just a direct reference to a module of that name.
///
/// Recurses into every node that can contain a call, including capture
/// targets, so `analyze` never has to see an unresolved alias.
pub fn resolve_aliases(node: AstNode, aliases: &HashMap<String, String>) -> AstNode {
    let resolve_target = |target: CallTarget| match target {
        CallTarget::Alias(seg) => {
            let resolved = aliases.get(&seg).cloned().unwrap_or(seg);
            CallTarget::Module(resolved)
        }
        CallTarget::Module(m) => CallTarget::Module(m),
    };

    match node {
        AstNode::Call { target, function, args } => AstNode::Call {
            target: resolve_target(target),
            function,
            args: args.into_iter().map(|a| resolve_aliases(a, aliases)).collect(),
        },
        AstNode::Capture { target, arity } => {
            let target = match target {
                CaptureTarget::Remote { target, function } => {
                    CaptureTarget::Remote { target: resolve_target(target), function }
                }
                CaptureTarget::Local(name) => CaptureTarget::Local(name),
            };
            AstNode::Capture { target, arity }
        }
        AstNode::BinOp { op, lhs, rhs } => AstNode::BinOp {
            op,
            lhs: Box::new(resolve_aliases(*lhs, aliases)),
            rhs: Box::new(resolve_aliases(*rhs, aliases)),
        },
        AstNode::Neg(inner) => AstNode::Neg(Box::new(resolve_aliases(*inner, aliases))),
        AstNode::Not(inner) => AstNode::Not(Box::new(resolve_aliases(*inner, aliases))),
        AstNode::If { cond, then_branch, else_branch } => AstNode::If {
            cond: Box::new(resolve_aliases(*cond, aliases)),
            then_branch: Box::new(resolve_aliases(*then_branch, aliases)),
            else_branch: else_branch.map(|b| Box::new(resolve_aliases(*b, aliases))),
        },
        AstNode::Assign { name, value } => {
            AstNode::Assign { name, value: Box::new(resolve_aliases(*value, aliases)) }
        }
        AstNode::Local { name, args } => {
            AstNode::Local { name, args: args.into_iter().map(|a| resolve_aliases(a, aliases)).collect() }
        }
        AstNode::Block(stmts) => AstNode::Block(stmts.into_iter().map(|s| resolve_aliases(s, aliases)).collect()),
        leaf => leaf,
    }
}

/// Wrap `body` in a top-level block that introduces alias bindings ahead of
/// user code, per the evaluator's alias-injection step. The injected
/// [`AstNode::Alias`] forms are produced here by the sandbox itself and are
/// exempt from the "alias is blocked" analyzer rule -- the analyzer is
/// never shown this wrapper, only the already-resolved `body` (resolution
/// happens via [`resolve_aliases`], not by leaving these markers in place).
pub fn inject_aliases(body: AstNode, aliases: &HashMap<String, String>) -> AstNode {
    if aliases.is_empty() {
        return body;
    }
    let mut stmts: Vec<AstNode> = aliases
        .iter()
        .map(|(short, full)| AstNode::Alias { path: full.clone(), as_name: short.clone() })
        .collect();
    stmts.push(body);
    AstNode::Block(stmts)
}
