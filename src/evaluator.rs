use std::collections::VecDeque;

use tracing::trace;

use crate::Error;
use crate::ast::{Lambda, VARIADIC_MARKER, Value};
use crate::builtinops::{builtin_list, get_builtin_ops};

mod environment;

pub use environment::Environment;

/// Evaluate a value in `env`.
///
/// Symbols are looked up, S-expressions are reduced, and everything else
/// (including Q-expressions and error values) evaluates to itself.
pub fn eval(env: &Environment, value: Value) -> Value {
    match value {
        Value::Symbol(name) => env.get(&name),
        Value::SExpr(cells) => eval_sexpr(env, cells),
        other => other,
    }
}

fn eval_sexpr(env: &Environment, cells: Vec<Value>) -> Value {
    // Every cell is evaluated before any error is looked at
    let mut evaluated: Vec<Value> = cells.into_iter().map(|cell| eval(env, cell)).collect();

    if let Some(pos) = evaluated.iter().position(Value::is_error) {
        return evaluated.swap_remove(pos);
    }

    match evaluated.len() {
        0 => Value::SExpr(evaluated),
        1 => evaluated.remove(0),
        _ => {
            let args = evaluated.split_off(1);
            let func = evaluated.remove(0);
            call(env, func, args)
        }
    }
}

/// Apply a function value to already-evaluated arguments.
pub fn call(env: &Environment, func: Value, args: Vec<Value>) -> Value {
    match func {
        Value::Builtin(op) => op.invoke(env, args),
        Value::Lambda(lambda) => call_lambda(env, *lambda, args),
        other => Error::EvalError(format!(
            "S-expression does not start with a function, got {}",
            other.type_name()
        ))
        .into(),
    }
}

/// Bind arguments into the lambda's closure.
///
/// With formals left over the partially applied lambda is returned; once all formals
/// are bound the closure is attached to the caller's environment and the body runs in it.
fn call_lambda(env: &Environment, mut lambda: Lambda, args: Vec<Value>) -> Value {
    let given = args.len();
    let expected = lambda.formals.len();
    let mut formals: VecDeque<String> = std::mem::take(&mut lambda.formals).into();
    let mut args: VecDeque<Value> = args.into();

    while !args.is_empty() {
        let Some(formal) = formals.pop_front() else {
            return Error::EvalError(format!(
                "too many arguments, got {given} expected {expected}"
            ))
            .into();
        };

        if formal == VARIADIC_MARKER {
            let (Some(rest), true) = (formals.pop_front(), formals.is_empty()) else {
                return variadic_syntax_error();
            };
            lambda
                .closure
                .put(rest, builtin_list(args.drain(..).collect()), false);
            break;
        }

        if let Some(arg) = args.pop_front() {
            lambda.closure.put(formal, arg, false);
        }
    }

    // Arguments ran out right before `&`: the rest parameter is empty
    if formals.front().is_some_and(|f| f == VARIADIC_MARKER) {
        if formals.len() != 2 {
            return variadic_syntax_error();
        }
        formals.pop_front();
        if let Some(rest) = formals.pop_front() {
            lambda.closure.put(rest, builtin_list(Vec::new()), false);
        }
    }

    if formals.is_empty() {
        lambda.closure.set_parent(env.clone());
        eval(&lambda.closure, Value::SExpr(lambda.body))
    } else {
        lambda.formals = formals.into();
        Value::Lambda(Box::new(lambda))
    }
}

fn variadic_syntax_error() -> Value {
    Error::EvalError("expected a single symbol after '&'".into()).into()
}

/// Create the global environment with every builtin registered and protected.
pub fn create_global_env() -> Environment {
    let env = Environment::new();
    let ops = get_builtin_ops();
    for op in ops {
        env.put(op.id, Value::Builtin(op), true);
    }
    trace!(count = ops.len(), "registered builtins");
    env
}
