//! Static pre-walk analyzer (C2).
//!
//! Rejects a fixed, closed set of dangerous primitives before the allowlist
//! is even consulted, then falls back to the allowlist decision procedure
//! for every other call node. The traversal is pre-order and returns on the
//! first violation.

use std::collections::HashSet;

use warden_allowlist::{AllowlistSpec, Decision, ModuleRegistry, decide};
use warden_ast::{AstNode, CallTarget, CaptureTarget, DefinitionKind};

use crate::error::SandboxError;

/// Local (implicit-core-library) function names that are always rejected,
/// independent of arity or allowlist. This list is closed: it is never
/// extended or overridden by caller configuration.
const BLOCKED_LOCAL_CALLS: &[&str] =
    &["apply", "spawn", "spawn_link", "spawn_monitor", "spawn_opt", "send", "send_nosuspend", "exit", "halt"];

/// Full-module denylist, irrespective of allowlist contents.
const BLOCKED_MODULES: &[&str] = &[
    "Os",
    "File",
    "Files",
    "Path",
    "Port",
    "Node",
    "Agent",
    "GenServer",
    "Supervisor",
    "Task",
    "Registry",
    "DynamicSupervisor",
    "Filelib",
    "Filename",
    "Net",
    "Tcp",
    "Udp",
    "Sctp",
    "Ssl",
    "HttpClient",
    "HttpServer",
    "Ssh",
    "Evaluator",
    "Parser",
    "Compiler",
];

fn blocked_modules() -> HashSet<&'static str> {
    BLOCKED_MODULES.iter().copied().collect()
}

/// Run the pre-order analysis pass. Returns `Ok(())` if every node is
/// permitted, or the first [`SandboxError::Restricted`] encountered.
pub fn analyze(node: &AstNode, spec: &AllowlistSpec, registry: &ModuleRegistry) -> Result<(), SandboxError> {
    let blocked = blocked_modules();
    walk(node, spec, registry, &blocked)
}

fn walk(node: &AstNode, spec: &AllowlistSpec, registry: &ModuleRegistry, blocked: &HashSet<&'static str>) -> Result<(), SandboxError> {
    match node {
        AstNode::Call { target, function, args } => {
            check_call(target, function, args.len() as u32, spec, registry, blocked)?;
            for arg in args {
                walk(arg, spec, registry, blocked)?;
            }
            Ok(())
        }
        AstNode::Local { name, args } => {
            check_local(name, args.len() as u32)?;
            for arg in args {
                walk(arg, spec, registry, blocked)?;
            }
            Ok(())
        }
        AstNode::Capture { target, arity } => check_capture(target, *arity, spec, registry, blocked),
        AstNode::Receive => Err(SandboxError::Restricted("receive is not allowed in sandbox".into())),
        AstNode::Import(name) => Err(SandboxError::Restricted(format!("import {name} is not allowed in sandbox"))),
        AstNode::Require(name) => Err(SandboxError::Restricted(format!("require {name} is not allowed in sandbox"))),
        AstNode::Alias { path, .. } => Err(SandboxError::Restricted(format!("alias {path} is not allowed in sandbox"))),
        AstNode::Definition { kind, name } => Err(SandboxError::Restricted(format!("{} is not allowed in sandbox", definition_label(*kind, name)))),
        AstNode::BinOp { lhs, rhs, .. } => {
            walk(lhs, spec, registry, blocked)?;
            walk(rhs, spec, registry, blocked)
        }
        AstNode::Neg(inner) | AstNode::Not(inner) => walk(inner, spec, registry, blocked),
        AstNode::If { cond, then_branch, else_branch } => {
            walk(cond, spec, registry, blocked)?;
            walk(then_branch, spec, registry, blocked)?;
            if let Some(else_branch) = else_branch {
                walk(else_branch, spec, registry, blocked)?;
            }
            Ok(())
        }
        AstNode::Assign { value, .. } => walk(value, spec, registry, blocked),
        AstNode::Block(stmts) => {
            for stmt in stmts {
                walk(stmt, spec, registry, blocked)?;
            }
            Ok(())
        }
        AstNode::IntLit(_) | AstNode::FloatLit(_) | AstNode::StrLit(_) | AstNode::BoolLit(_) | AstNode::NilLit | AstNode::Var(_) => Ok(()),
    }
}

fn definition_label(kind: DefinitionKind, name: &str) -> String {
    let kind_label = match kind {
        DefinitionKind::Module => "module definition",
        DefinitionKind::Function => "function definition",
        DefinitionKind::Macro => "macro definition",
        DefinitionKind::Struct => "struct definition",
        DefinitionKind::Protocol => "protocol definition",
        DefinitionKind::Impl => "impl definition",
    };
    format!("{kind_label} of {name}")
}

fn check_local(name: &str, _arity: u32) -> Result<(), SandboxError> {
    if BLOCKED_LOCAL_CALLS.contains(&name) {
        tracing::debug!(name, "call rejected: local function is always blocked");
        return Err(SandboxError::Restricted(format!("function {name} is restricted")));
    }
    Ok(())
}

fn check_call(
    target: &CallTarget,
    function: &str,
    arity: u32,
    spec: &AllowlistSpec,
    registry: &ModuleRegistry,
    blocked: &HashSet<&'static str>,
) -> Result<(), SandboxError> {
    let module = target.name();

    if blocked.contains(module) {
        tracing::debug!(module, function, arity, "call rejected: module is denylisted");
        return Err(SandboxError::Restricted(format!("module {module} is restricted")));
    }

    match decide(spec, registry, module, function, arity) {
        Decision::Allowed => Ok(()),
        Decision::Restricted => {
            tracing::debug!(module, function, arity, "call rejected: not in allowlist");
            Err(SandboxError::Restricted(format!("function {module}.{function}/{arity} is restricted")))
        }
    }
}

fn check_capture(
    target: &CaptureTarget,
    arity: u32,
    spec: &AllowlistSpec,
    registry: &ModuleRegistry,
    blocked: &HashSet<&'static str>,
) -> Result<(), SandboxError> {
    match target {
        CaptureTarget::Remote { target, function } => check_call(target, function, arity, spec, registry, blocked),
        CaptureTarget::Local(name) => check_local(name, arity),
    }
}
