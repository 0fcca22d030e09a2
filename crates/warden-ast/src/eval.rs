//! A tree-walking evaluator for already-analyzed AST trees.
//!
//! This evaluator never performs its own authorization check -- it assumes
//! the tree it is given already passed the analyzer. It exists to give the
//! sandbox something concrete to run: a small standard library covering the
//! default allowlist's pure modules, plus `Process.sleep` and the
//! `human_input` suspension primitive.

use std::collections::HashMap;
use thiserror::Error;

use crate::node::{AstNode, BinOp, CallTarget};
use crate::value::Value;

/// A runtime failure during evaluation, matching the sandbox's error taxonomy.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("{0}")]
    Exception(String),
    #[error("{0}")]
    Throw(String),
    #[error("{0}")]
    Exit(String),
}

type EResult<T> = Result<T, EvalError>;

/// How a `human_input(question, kind)` call reaches outside the evaluator.
///
/// `request` is invoked synchronously, on whatever thread is running the
/// evaluation (the sandbox always runs this on a dedicated blocking worker,
/// see `warden-sandbox::sandbox`), and blocks until an answer is available.
/// Implementations therefore MUST NOT assume an async runtime is reachable
/// from the calling thread.
pub trait HumanInput: Send + Sync {
    fn request(&self, question: &str, kind: &str) -> EResult<Value>;
}

/// A [`HumanInput`] for evaluations with no owning agent server to answer
/// `human_input` calls, e.g. a bare `warden_executor::run`/`resume` call.
#[derive(Debug, Default)]
pub struct NullHumanInput;

impl HumanInput for NullHumanInput {
    fn request(&self, _question: &str, _kind: &str) -> EResult<Value> {
        Err(EvalError::Exit("human_input has no agent server to answer it".into()))
    }
}

struct Env<'a> {
    vars: HashMap<String, Value>,
    human_input: &'a dyn HumanInput,
}

impl<'a> Env<'a> {
    fn new(human_input: &'a dyn HumanInput) -> Self {
        Self { vars: HashMap::new(), human_input }
    }
}

/// Evaluate a parsed, analyzed, alias-resolved tree to a single [`Value`].
pub fn eval(node: &AstNode, human_input: &dyn HumanInput) -> EResult<Value> {
    let mut env = Env::new(human_input);
    eval_node(node, &mut env)
}

fn eval_node(node: &AstNode, env: &mut Env<'_>) -> EResult<Value> {
    match node {
        AstNode::IntLit(n) => Ok(Value::Int(*n)),
        AstNode::FloatLit(n) => Ok(Value::Float(*n)),
        AstNode::StrLit(s) => Ok(Value::Str(s.clone())),
        AstNode::BoolLit(b) => Ok(Value::Bool(*b)),
        AstNode::NilLit => Ok(Value::Nil),
        AstNode::Var(name) => env
            .vars
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::Exception(format!("undefined variable \"{name}\""))),
        AstNode::Neg(inner) => match eval_node(inner, env)? {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(EvalError::Exception(format!("cannot negate {other}"))),
        },
        AstNode::Not(inner) => Ok(Value::Bool(!eval_node(inner, env)?.truthy())),
        AstNode::BinOp { op, lhs, rhs } => eval_binop(*op, lhs, rhs, env),
        AstNode::If { cond, then_branch, else_branch } => {
            if eval_node(cond, env)?.truthy() {
                eval_node(then_branch, env)
            } else if let Some(else_branch) = else_branch {
                eval_node(else_branch, env)
            } else {
                Ok(Value::Nil)
            }
        }
        AstNode::Assign { name, value } => {
            let v = eval_node(value, env)?;
            env.vars.insert(name.clone(), v.clone());
            Ok(v)
        }
        AstNode::Block(stmts) => {
            let mut result = Value::Nil;
            for stmt in stmts {
                result = eval_node(stmt, env)?;
            }
            Ok(result)
        }
        AstNode::Call { target, function, args } => {
            let values = args.iter().map(|a| eval_node(a, env)).collect::<EResult<Vec<_>>>()?;
            call_builtin(target.name(), function, &values)
        }
        AstNode::Local { name, args } => {
            let values = args.iter().map(|a| eval_node(a, env)).collect::<EResult<Vec<_>>>()?;
            call_local_builtin(name, &values, env.human_input)
        }
        AstNode::Capture { .. } => Err(EvalError::Exception("function captures are not directly evaluable".into())),
        AstNode::Receive
        | AstNode::Import(_)
        | AstNode::Require(_)
        | AstNode::Alias { .. }
        | AstNode::Definition { .. } => {
            Err(EvalError::Exception("syntactic form reached the evaluator unresolved".into()))
        }
    }
}

fn eval_binop(op: BinOp, lhs: &AstNode, rhs: &AstNode, env: &mut Env<'_>) -> EResult<Value> {
    let l = eval_node(lhs, env)?;
    if matches!(op, BinOp::And) && !l.truthy() {
        return Ok(l);
    }
    if matches!(op, BinOp::Or) && l.truthy() {
        return Ok(l);
    }
    let r = eval_node(rhs, env)?;

    match op {
        BinOp::And | BinOp::Or => Ok(r),
        BinOp::Eq => Ok(Value::Bool(l == r)),
        BinOp::NotEq => Ok(Value::Bool(l != r)),
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => numeric_binop(op, &l, &r),
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => comparison_binop(op, &l, &r),
    }
}

fn numeric_binop(op: BinOp, l: &Value, r: &Value) -> EResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        return match op {
            BinOp::Add => Ok(Value::Int(a + b)),
            BinOp::Sub => Ok(Value::Int(a - b)),
            BinOp::Mul => Ok(Value::Int(a * b)),
            BinOp::Div => {
                if *b == 0 {
                    Err(EvalError::Exception("division by zero".into()))
                } else {
                    Ok(Value::Int(a / b))
                }
            }
            BinOp::Rem => {
                if *b == 0 {
                    Err(EvalError::Exception("division by zero".into()))
                } else {
                    Ok(Value::Int(a % b))
                }
            }
            _ => unreachable!(),
        };
    }
    let (a, b) = (
        l.as_f64().ok_or_else(|| EvalError::Exception(format!("expected a number, got {l}")))?,
        r.as_f64().ok_or_else(|| EvalError::Exception(format!("expected a number, got {r}")))?,
    );
    match op {
        BinOp::Add => Ok(Value::Float(a + b)),
        BinOp::Sub => Ok(Value::Float(a - b)),
        BinOp::Mul => Ok(Value::Float(a * b)),
        BinOp::Div => Ok(Value::Float(a / b)),
        BinOp::Rem => Ok(Value::Float(a % b)),
        _ => unreachable!(),
    }
}

fn comparison_binop(op: BinOp, l: &Value, r: &Value) -> EResult<Value> {
    let (a, b) = (
        l.as_f64().ok_or_else(|| EvalError::Exception(format!("cannot compare {l}")))?,
        r.as_f64().ok_or_else(|| EvalError::Exception(format!("cannot compare {r}")))?,
    );
    let result = match op {
        BinOp::Lt => a < b,
        BinOp::LtEq => a <= b,
        BinOp::Gt => a > b,
        BinOp::GtEq => a >= b,
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn call_local_builtin(name: &str, args: &[Value], human_input: &dyn HumanInput) -> EResult<Value> {
    match name {
        "sleep" => call_builtin("Process", "sleep", args),
        "human_input" => match args {
            [Value::Str(question), Value::Str(kind)] => human_input.request(question, kind),
            _ => Err(bad_args("human_input", 2)),
        },
        other => Err(EvalError::Exception(format!("undefined function {other}/{}", args.len()))),
    }
}

fn call_builtin(module: &str, function: &str, args: &[Value]) -> EResult<Value> {
    match (module, function) {
        ("Numbers", "add") => binary_numeric(args, |a, b| a + b, |a, b| a + b),
        ("Numbers", "sub") => binary_numeric(args, |a, b| a - b, |a, b| a - b),
        ("Numbers", "mul") => binary_numeric(args, |a, b| a * b, |a, b| a * b),
        ("Numbers", "max") => binary_numeric(args, i64::max, f64::max),
        ("Numbers", "min") => binary_numeric(args, i64::min, f64::min),
        ("Numbers", "abs") => match args {
            [Value::Int(n)] => Ok(Value::Int(n.abs())),
            [Value::Float(n)] => Ok(Value::Float(n.abs())),
            _ => Err(bad_args("Numbers.abs", 1)),
        },
        ("Strings", "upcase") => one_string(args, "Strings.upcase", |s| s.to_uppercase()),
        ("Strings", "downcase") => one_string(args, "Strings.downcase", |s| s.to_lowercase()),
        ("Strings", "trim") => one_string(args, "Strings.trim", |s| s.trim().to_owned()),
        ("Strings", "reverse") => one_string(args, "Strings.reverse", |s| s.chars().rev().collect()),
        ("Strings", "length") => match args {
            [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
            _ => Err(bad_args("Strings.length", 1)),
        },
        ("Lists", "length") => match args {
            [Value::List(items)] => Ok(Value::Int(items.len() as i64)),
            _ => Err(bad_args("Lists.length", 1)),
        },
        ("Lists", "reverse") => match args {
            [Value::List(items)] => {
                let mut items = items.clone();
                items.reverse();
                Ok(Value::List(items))
            }
            _ => Err(bad_args("Lists.reverse", 1)),
        },
        ("Lists", "sum") => match args {
            [Value::List(items)] => {
                let mut total = 0.0;
                let mut all_int = true;
                for item in items {
                    match item {
                        Value::Int(n) => total += *n as f64,
                        Value::Float(n) => {
                            all_int = false;
                            total += n;
                        }
                        other => return Err(EvalError::Exception(format!("cannot sum non-numeric value {other}"))),
                    }
                }
                Ok(if all_int { Value::Int(total as i64) } else { Value::Float(total) })
            }
            _ => Err(bad_args("Lists.sum", 1)),
        },
        ("Process", "sleep") => match args {
            [Value::Int(ms)] if *ms >= 0 => {
                std::thread::sleep(std::time::Duration::from_millis(*ms as u64));
                Ok(Value::Nil)
            }
            _ => Err(bad_args("Process.sleep", 1)),
        },
        _ => Err(EvalError::Exception(format!("undefined function {module}.{function}/{}", args.len()))),
    }
}

fn bad_args(site: &str, expected: usize) -> EvalError {
    EvalError::Exception(format!("{site} expects {expected} argument(s) of the correct type"))
}

fn one_string(args: &[Value], site: &str, f: impl FnOnce(&str) -> String) -> EResult<Value> {
    match args {
        [Value::Str(s)] => Ok(Value::Str(f(s))),
        _ => Err(bad_args(site, 1)),
    }
}

fn binary_numeric(args: &[Value], int_op: impl FnOnce(i64, i64) -> i64, float_op: impl FnOnce(f64, f64) -> f64) -> EResult<Value> {
    match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(int_op(*a, *b))),
        [a, b] => {
            let (a, b) = (
                a.as_f64().ok_or_else(|| EvalError::Exception(format!("expected a number, got {a}")))?,
                b.as_f64().ok_or_else(|| EvalError::Exception(format!("expected a number, got {b}")))?,
            );
            Ok(Value::Float(float_op(a, b)))
        }
        _ => Err(bad_args("arithmetic function", 2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(src: &str) -> Value {
        eval(&parse(src).unwrap(), &NullHumanInput).unwrap()
    }

    #[test]
    fn evaluates_arithmetic() {
        assert_eq!(run("1 + 2 * 3"), Value::Int(7));
    }

    #[test]
    fn evaluates_if_else() {
        assert_eq!(run("if 1 < 2 do 10 else 20 end"), Value::Int(10));
    }

    #[test]
    fn evaluates_variable_assignment() {
        assert_eq!(run("x = 5; x + 1"), Value::Int(6));
    }

    #[test]
    fn evaluates_remote_call() {
        assert_eq!(run(r#"Strings.upcase("hi")"#), Value::Str("HI".into()));
    }

    #[test]
    fn division_by_zero_is_exception() {
        let err = eval(&parse("1 / 0").unwrap(), &NullHumanInput).unwrap_err();
        assert!(matches!(err, EvalError::Exception(_)));
    }

    #[test]
    fn undefined_variable_is_exception() {
        let err = eval(&parse("y").unwrap(), &NullHumanInput).unwrap_err();
        assert!(matches!(err, EvalError::Exception(_)));
    }

    struct FixedHumanInput(&'static str);

    impl HumanInput for FixedHumanInput {
        fn request(&self, _question: &str, _kind: &str) -> EResult<Value> {
            Ok(Value::Str(self.0.to_owned()))
        }
    }

    #[test]
    fn human_input_resolves_through_the_injected_handle() {
        let ast = parse(r#"human_input("go?", "ask")"#).unwrap();
        let result = eval(&ast, &FixedHumanInput("yes")).unwrap();
        assert_eq!(result, Value::Str("yes".into()));
    }

    #[test]
    fn human_input_without_a_handle_is_an_exit() {
        let ast = parse(r#"human_input("go?", "ask")"#).unwrap();
        let err = eval(&ast, &NullHumanInput).unwrap_err();
        assert!(matches!(err, EvalError::Exit(_)));
    }
}
