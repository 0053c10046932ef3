//! Built-in operations registry.
//!
//! Every native operation is described once by a [`BuiltinOp`]: the symbol it is bound
//! to in the global environment, its [`Arity`] and the Rust function implementing it.
//! The evaluator binds each entry into the global environment as a protected
//! `Value::Builtin`, so user code can pass builtins around like any other function
//! but cannot redefine them.
//!
//! ```text
//! (+ 1 2 3)              ; arithmetic
//! (== {1 2} {1 2})       ; structural equality
//! (head {1 2 3})         ; list operations
//! (def {x} 10)           ; global binding
//! ```
//!
//! ## Error Handling
//!
//! Builtins are written against `Result<Value, Error>` and use `?` freely. The
//! dispatcher ([`BuiltinOp::invoke`]) checks arity first and converts any `Err` into an
//! error value, which then propagates through evaluation like any other value.
//!
//! - **Type Safety**: operations reject incorrect types (e.g. `(! 1)` errors)
//! - **No Coercion**: `Int` and `Double` are never mixed
//! - **Overflow Detection**: integer arithmetic reports overflow
//! - **Arity Checking**: every operation declares and checks its argument count
//!
//! ## Adding New Operations
//!
//! 1. **Implement the function** with the signature of [`BuiltinFn`]
//! 2. **Add it to BUILTIN_OPS** with its identifier and arity
//! 3. **Add tests** covering edge cases and error conditions

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use tracing::{debug, info, warn};

use crate::ast::{IntType, Lambda, Value, unit};
use crate::evaluator::{Environment, eval};
use crate::reader::read_forms;
use crate::{Error, PRELUDE};

/// Expected number of arguments of a builtin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    /// Check if the given number of arguments is valid for `func`
    pub fn validate(&self, func: &str, got: usize) -> Result<(), Error> {
        let valid = match *self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Any => true,
        };
        if valid {
            Ok(())
        } else {
            Err(Error::ArityError {
                func: func.to_owned(),
                expected: *self,
                got,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Any => write!(f, "any number"),
        }
    }
}

/// Signature of a builtin: its own id (for messages), the calling environment and the
/// evaluated arguments
pub type BuiltinFn = fn(&'static str, &Environment, Vec<Value>) -> Result<Value, Error>;

/// Definition of a built-in operation
pub struct BuiltinOp {
    /// Symbol the operation is bound to in the global environment
    pub id: &'static str,
    pub arity: Arity,
    func: BuiltinFn,
}

impl fmt::Debug for BuiltinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinOp")
            .field("id", &self.id)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl BuiltinOp {
    /// Check arity, run the operation and fold any failure into an error value.
    pub fn invoke(&self, env: &Environment, args: Vec<Value>) -> Value {
        self.arity
            .validate(self.id, args.len())
            .and_then(|()| (self.func)(self.id, env, args))
            .unwrap_or_else(Value::from)
    }
}

//
// Argument helpers
//

/// Destructure exactly `N` arguments
fn take_args<const N: usize>(id: &str, args: Vec<Value>) -> Result<[Value; N], Error> {
    let got = args.len();
    <[Value; N]>::try_from(args).map_err(|_| Error::ArityError {
        func: id.to_owned(),
        expected: Arity::Exact(N),
        got,
    })
}

fn expect_qexpr(id: &str, position: usize, value: Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::QExpr(cells) => Ok(cells),
        other => Err(Error::type_error(id, position, "q-expression", &other)),
    }
}

/// A Q-expression argument that must have at least one element
fn expect_nonempty_qexpr(id: &str, value: Value) -> Result<Vec<Value>, Error> {
    let cells = expect_qexpr(id, 1, value)?;
    if cells.is_empty() {
        return Err(Error::EvalError(format!(
            "'{id}' received an empty q-expression"
        )));
    }
    Ok(cells)
}

fn expect_symbol(id: &str, position: usize, value: Value) -> Result<String, Error> {
    match value {
        Value::Symbol(name) => Ok(name),
        other => Err(Error::type_error(id, position, "symbol", &other)),
    }
}

fn expect_bool(id: &str, position: usize, value: Value) -> Result<bool, Error> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(Error::type_error(id, position, "bool", &other)),
    }
}

fn expect_string(id: &str, position: usize, value: Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::type_error(id, position, "string", &other)),
    }
}

/// Error for an operand that does not match the numeric variant of the first operand
fn numeric_operand_error(id: &str, position: usize, expected: &'static str, got: &Value) -> Error {
    match got {
        Value::Int(_) | Value::Double(_) => Error::NumericMismatch {
            func: id.to_owned(),
            expected,
            got: got.type_name(),
        },
        other => Error::type_error(id, position, expected, other),
    }
}

//
// Arithmetic
//

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Min,
    Max,
}

fn int_step(op: ArithOp, id: &str, acc: IntType, n: IntType) -> Result<IntType, Error> {
    let overflow = || Error::EvalError(format!("integer overflow in '{id}'"));
    match op {
        ArithOp::Add => acc.checked_add(n).ok_or_else(overflow),
        ArithOp::Sub => acc.checked_sub(n).ok_or_else(overflow),
        ArithOp::Mul => acc.checked_mul(n).ok_or_else(overflow),
        ArithOp::Div if n == 0 => Err(Error::DivisionByZero),
        ArithOp::Div => acc.checked_div(n).ok_or_else(overflow),
        ArithOp::Rem if n == 0 => Err(Error::DivisionByZero),
        // Only MIN % -1 overflows, and its remainder is 0
        ArithOp::Rem => Ok(acc.wrapping_rem(n)),
        ArithOp::Pow if n < 0 => Err(Error::EvalError(format!(
            "negative exponent {n} in '{id}'"
        ))),
        // Bases whose powers never grow, for exponents beyond u32
        ArithOp::Pow if acc == 0 || acc == 1 => Ok(if n == 0 { 1 } else { acc }),
        ArithOp::Pow if acc == -1 => Ok(if n % 2 == 0 { 1 } else { -1 }),
        ArithOp::Pow => u32::try_from(n)
            .ok()
            .and_then(|exp| acc.checked_pow(exp))
            .ok_or_else(overflow),
        ArithOp::Min => Ok(acc.min(n)),
        ArithOp::Max => Ok(acc.max(n)),
    }
}

fn double_step(op: ArithOp, acc: f64, n: f64) -> Result<f64, Error> {
    match op {
        ArithOp::Add => Ok(acc + n),
        ArithOp::Sub => Ok(acc - n),
        ArithOp::Mul => Ok(acc * n),
        ArithOp::Div | ArithOp::Rem if n == 0.0 => Err(Error::DivisionByZero),
        ArithOp::Div => Ok(acc / n),
        ArithOp::Rem => Ok(acc % n),
        ArithOp::Pow => Ok(acc.powf(n)),
        ArithOp::Min => Ok(acc.min(n)),
        ArithOp::Max => Ok(acc.max(n)),
    }
}

/// Left fold over operands that must all share the numeric variant of the first one
fn arithmetic(op: ArithOp, id: &'static str, args: Vec<Value>) -> Result<Value, Error> {
    let mut args = args.into_iter();
    match args.next() {
        Some(Value::Int(first)) => {
            let rest = args
                .enumerate()
                .map(|(i, arg)| match arg {
                    Value::Int(n) => Ok(n),
                    other => Err(numeric_operand_error(id, i + 2, "int", &other)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if rest.is_empty() && op == ArithOp::Sub {
                return first
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| Error::EvalError(format!("integer overflow in '{id}'")));
            }
            rest.into_iter()
                .try_fold(first, |acc, n| int_step(op, id, acc, n))
                .map(Value::Int)
        }
        Some(Value::Double(first)) => {
            let rest = args
                .enumerate()
                .map(|(i, arg)| match arg {
                    Value::Double(d) => Ok(d),
                    other => Err(numeric_operand_error(id, i + 2, "double", &other)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if rest.is_empty() && op == ArithOp::Sub {
                return Ok(Value::Double(-first));
            }
            rest.into_iter()
                .try_fold(first, |acc, n| double_step(op, acc, n))
                .map(Value::Double)
        }
        Some(other) => Err(Error::type_error(id, 1, "number", &other)),
        None => Err(Error::ArityError {
            func: id.to_owned(),
            expected: Arity::AtLeast(1),
            got: 0,
        }),
    }
}

// Macro to generate one builtin per arithmetic operator
macro_rules! arithmetic_op {
    ($name:ident, $op:expr) => {
        fn $name(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
            arithmetic($op, id, args)
        }
    };
}

arithmetic_op!(builtin_add, ArithOp::Add);
arithmetic_op!(builtin_sub, ArithOp::Sub);
arithmetic_op!(builtin_mul, ArithOp::Mul);
arithmetic_op!(builtin_div, ArithOp::Div);
arithmetic_op!(builtin_rem, ArithOp::Rem);
arithmetic_op!(builtin_pow, ArithOp::Pow);
arithmetic_op!(builtin_min, ArithOp::Min);
arithmetic_op!(builtin_max, ArithOp::Max);

//
// Comparison and boolean logic
//

// Macro to generate numeric ordering comparisons
macro_rules! numeric_comparison {
    ($name:ident, $op:tt) => {
        fn $name(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
            let [a, b] = take_args(id, args)?;
            match (&a, &b) {
                (Value::Int(x), Value::Int(y)) => Ok(Value::Bool(x $op y)),
                (Value::Double(x), Value::Double(y)) => Ok(Value::Bool(x $op y)),
                (Value::Int(_) | Value::Double(_), other) => {
                    Err(numeric_operand_error(id, 2, a.type_name(), other))
                }
                (other, _) => Err(Error::type_error(id, 1, "number", other)),
            }
        }
    };
}

numeric_comparison!(builtin_lt, <);
numeric_comparison!(builtin_gt, >);
numeric_comparison!(builtin_le, <=);
numeric_comparison!(builtin_ge, >=);

fn builtin_eq(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [a, b] = take_args(id, args)?;
    Ok(Value::Bool(a == b))
}

fn builtin_ne(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [a, b] = take_args(id, args)?;
    Ok(Value::Bool(a != b))
}

// Macro to generate boolean folds; every operand is type-checked
macro_rules! boolean_logic_op {
    ($name:ident, $op:tt, $identity:expr) => {
        fn $name(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
            let values = args
                .into_iter()
                .enumerate()
                .map(|(i, arg)| expect_bool(id, i + 1, arg))
                .collect::<Result<Vec<_>, _>>()?;
            let result = values.into_iter().reduce(|acc, b| acc $op b);
            Ok(Value::Bool(result.unwrap_or($identity)))
        }
    };
}

boolean_logic_op!(builtin_and, &&, true);
boolean_logic_op!(builtin_or, ||, false);

fn builtin_not(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [b] = take_args(id, args)?;
    Ok(Value::Bool(!expect_bool(id, 1, b)?))
}

fn builtin_if(id: &'static str, env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [cond, then_branch, else_branch] = take_args(id, args)?;
    let cond = expect_bool(id, 1, cond)?;
    let then_cells = expect_qexpr(id, 2, then_branch)?;
    let else_cells = expect_qexpr(id, 3, else_branch)?;
    let chosen = if cond { then_cells } else { else_cells };
    Ok(eval(env, Value::SExpr(chosen)))
}

//
// Lists
//

/// Re-tag evaluated arguments as a Q-expression
pub(crate) fn builtin_list(args: Vec<Value>) -> Value {
    Value::QExpr(args)
}

fn builtin_head(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [list] = take_args(id, args)?;
    let mut cells = expect_nonempty_qexpr(id, list)?;
    cells.truncate(1);
    Ok(Value::QExpr(cells))
}

fn builtin_tail(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [list] = take_args(id, args)?;
    let mut cells = expect_nonempty_qexpr(id, list)?;
    cells.remove(0);
    Ok(Value::QExpr(cells))
}

fn builtin_init(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [list] = take_args(id, args)?;
    let mut cells = expect_nonempty_qexpr(id, list)?;
    cells.pop();
    Ok(Value::QExpr(cells))
}

fn builtin_join(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let mut joined = Vec::new();
    for (i, arg) in args.into_iter().enumerate() {
        joined.extend(expect_qexpr(id, i + 1, arg)?);
    }
    Ok(Value::QExpr(joined))
}

fn builtin_cons(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [first, list] = take_args(id, args)?;
    let mut cells = expect_qexpr(id, 2, list)?;
    cells.insert(0, first);
    Ok(Value::QExpr(cells))
}

fn builtin_len(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [list] = take_args(id, args)?;
    let cells = expect_qexpr(id, 1, list)?;
    Ok(Value::Int(IntType::try_from(cells.len()).unwrap_or(IntType::MAX)))
}

fn builtin_eval(id: &'static str, env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [expr] = take_args(id, args)?;
    let cells = expect_qexpr(id, 1, expr)?;
    Ok(eval(env, Value::SExpr(cells)))
}

//
// Binding
//

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Global,
    Local,
}

/// Shared body of `def` and `=`: `{symbols...}` followed by one value per symbol.
///
/// All names are checked before anything is bound, so a rejected call binds nothing.
fn bind_symbols(
    id: &'static str,
    env: &Environment,
    scope: Scope,
    args: Vec<Value>,
) -> Result<Value, Error> {
    let mut args = args.into_iter();
    let Some(symbols) = args.next() else {
        return Err(Error::ArityError {
            func: id.to_owned(),
            expected: Arity::AtLeast(1),
            got: 0,
        });
    };
    let names = expect_qexpr(id, 1, symbols)?
        .into_iter()
        .map(|symbol| expect_symbol(id, 1, symbol))
        .collect::<Result<Vec<_>, _>>()?;
    let values: Vec<Value> = args.collect();

    if names.len() != values.len() {
        return Err(Error::EvalError(format!(
            "'{id}' needs the same number of values as symbols, got {} symbols and {} values",
            names.len(),
            values.len()
        )));
    }

    let target = match scope {
        Scope::Global => env.root(),
        Scope::Local => env.clone(),
    };
    if let Some(name) = names.iter().find(|name| target.is_builtin(name)) {
        return Err(Error::BuiltinRedefinition(name.clone()));
    }

    for (name, value) in names.iter().zip(values) {
        match scope {
            Scope::Global => env.def(name, value)?,
            Scope::Local => env.assign(name, value)?,
        }
    }
    Ok(unit())
}

fn builtin_def(id: &'static str, env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    bind_symbols(id, env, Scope::Global, args)
}

fn builtin_assign(id: &'static str, env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    bind_symbols(id, env, Scope::Local, args)
}

/// `\` and `fun`: build a lambda from `{formals}` and `{body}`
fn builtin_lambda(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [formals, body] = take_args(id, args)?;
    let formals = expect_qexpr(id, 1, formals)?
        .into_iter()
        .map(|formal| expect_symbol(id, 1, formal))
        .collect::<Result<Vec<_>, _>>()?;
    let body = expect_qexpr(id, 2, body)?;
    Ok(Value::Lambda(Box::new(Lambda::new(formals, body))))
}

//
// I/O
//

/// The line `print` writes: arguments in printed form, separated by spaces
fn print_line(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn builtin_print(_id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    println!("{}", print_line(&args));
    Ok(unit())
}

fn builtin_error(id: &'static str, _env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [message] = take_args(id, args)?;
    Ok(Value::Error(expect_string(id, 1, message)?))
}

fn builtin_load(id: &'static str, env: &Environment, args: Vec<Value>) -> Result<Value, Error> {
    let [path] = take_args(id, args)?;
    let path = expect_string(id, 1, path)?;
    Ok(load_file(env, Path::new(&path)))
}

fn builtin_exit(_id: &'static str, _env: &Environment, _args: Vec<Value>) -> Result<Value, Error> {
    info!("exit requested");
    // Nothing useful can be done if stdout is already gone
    let _ = std::io::stdout().flush();
    std::process::exit(0)
}

/// Evaluate every form of `source` in `env`.
///
/// A form that evaluates to an error is reported and skipped; the remaining forms
/// still run. Returns the empty S-expression.
pub fn load_source(env: &Environment, source: &str) -> Value {
    let forms = read_forms(source);
    debug!(forms = forms.len(), "evaluating source");
    for form in forms {
        let result = eval(env, form);
        if let Value::Error(msg) = &result {
            warn!(error = %msg, "form evaluated to an error");
            println!("{result}");
        }
    }
    unit()
}

/// Read the file at `path` and evaluate it with [`load_source`].
pub fn load_file(env: &Environment, path: &Path) -> Value {
    info!(path = %path.display(), "loading file");
    match std::fs::read_to_string(path) {
        Ok(source) => load_source(env, &source),
        Err(e) => Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into(),
    }
}

/// Evaluate the embedded standard library in `env`.
pub fn load_prelude(env: &Environment) -> Value {
    debug!("loading prelude");
    load_source(env, PRELUDE)
}

/// Global registry of all built-in operations.
static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    vec![
        // Arithmetic
        BuiltinOp {
            id: "+",
            arity: Arity::AtLeast(1),
            func: builtin_add,
        },
        BuiltinOp {
            id: "-",
            arity: Arity::AtLeast(1),
            func: builtin_sub,
        },
        BuiltinOp {
            id: "*",
            arity: Arity::AtLeast(1),
            func: builtin_mul,
        },
        BuiltinOp {
            id: "/",
            arity: Arity::AtLeast(1),
            func: builtin_div,
        },
        BuiltinOp {
            id: "%",
            arity: Arity::AtLeast(1),
            func: builtin_rem,
        },
        BuiltinOp {
            id: "^",
            arity: Arity::AtLeast(1),
            func: builtin_pow,
        },
        BuiltinOp {
            id: "min",
            arity: Arity::AtLeast(1),
            func: builtin_min,
        },
        BuiltinOp {
            id: "max",
            arity: Arity::AtLeast(1),
            func: builtin_max,
        },
        // Comparison
        BuiltinOp {
            id: "==",
            arity: Arity::Exact(2),
            func: builtin_eq,
        },
        BuiltinOp {
            id: "!=",
            arity: Arity::Exact(2),
            func: builtin_ne,
        },
        BuiltinOp {
            id: "<",
            arity: Arity::Exact(2),
            func: builtin_lt,
        },
        BuiltinOp {
            id: ">",
            arity: Arity::Exact(2),
            func: builtin_gt,
        },
        BuiltinOp {
            id: "<=",
            arity: Arity::Exact(2),
            func: builtin_le,
        },
        BuiltinOp {
            id: ">=",
            arity: Arity::Exact(2),
            func: builtin_ge,
        },
        // Boolean logic
        BuiltinOp {
            id: "&&",
            arity: Arity::AtLeast(1),
            func: builtin_and,
        },
        BuiltinOp {
            id: "||",
            arity: Arity::AtLeast(1),
            func: builtin_or,
        },
        BuiltinOp {
            id: "!",
            arity: Arity::Exact(1),
            func: builtin_not,
        },
        // Control
        BuiltinOp {
            id: "if",
            arity: Arity::Exact(3),
            func: builtin_if,
        },
        // Lists
        BuiltinOp {
            id: "list",
            arity: Arity::Any,
            func: |_, _, args| Ok(builtin_list(args)),
        },
        BuiltinOp {
            id: "head",
            arity: Arity::Exact(1),
            func: builtin_head,
        },
        BuiltinOp {
            id: "tail",
            arity: Arity::Exact(1),
            func: builtin_tail,
        },
        BuiltinOp {
            id: "join",
            arity: Arity::AtLeast(1),
            func: builtin_join,
        },
        BuiltinOp {
            id: "cons",
            arity: Arity::Exact(2),
            func: builtin_cons,
        },
        BuiltinOp {
            id: "len",
            arity: Arity::Exact(1),
            func: builtin_len,
        },
        BuiltinOp {
            id: "init",
            arity: Arity::Exact(1),
            func: builtin_init,
        },
        BuiltinOp {
            id: "eval",
            arity: Arity::Exact(1),
            func: builtin_eval,
        },
        // Binding
        BuiltinOp {
            id: "def",
            arity: Arity::AtLeast(1),
            func: builtin_def,
        },
        BuiltinOp {
            id: "=",
            arity: Arity::AtLeast(1),
            func: builtin_assign,
        },
        BuiltinOp {
            id: "\\",
            arity: Arity::Exact(2),
            func: builtin_lambda,
        },
        BuiltinOp {
            id: "fun",
            arity: Arity::Exact(2),
            func: builtin_lambda,
        },
        // I/O
        BuiltinOp {
            id: "print",
            arity: Arity::Any,
            func: builtin_print,
        },
        BuiltinOp {
            id: "error",
            arity: Arity::Exact(1),
            func: builtin_error,
        },
        BuiltinOp {
            id: "load",
            arity: Arity::Exact(1),
            func: builtin_load,
        },
        BuiltinOp {
            id: "exit",
            arity: Arity::Any,
            func: builtin_exit,
        },
    ]
});

/// Lazy static map from id to BuiltinOp (private - use find_builtin_op)
static BUILTIN_BY_ID: LazyLock<HashMap<&'static str, &'static BuiltinOp>> = LazyLock::new(|| {
    let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
    ops.iter().map(|op| (op.id, op)).collect()
});

/// Get all builtin operations (for internal use by evaluator)
pub(crate) fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

/// Find a builtin operation by the symbol it is bound to
pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_ID.get(id).copied()
}
