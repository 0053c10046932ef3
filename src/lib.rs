//! Lispy - a small homoiconic Lisp
//!
//! This crate provides a tree-walking interpreter for a Lisp dialect built around two
//! kinds of list: S-expressions, which evaluate by applying their head to their tail,
//! and Q-expressions, which are inert data. Source text is read straight into the
//! same [`Value`](ast::Value) type that the evaluator reduces, so code and data share
//! one representation.
//!
//! ```text
//! (+ 1 2 3)                       ; arithmetic
//! {1 2 3}                         ; a q-expression stays as it is
//! (head {1 2 3})                  ; list operations work on q-expressions
//! (def {square} (\ {x} {* x x}))  ; lambdas take {formals} and {body}
//! (def {add} (\ {a b} {+ a b}))
//! ((add 1) 2)                     ; partial application curries
//! ((\ {x & rest} {rest}) 1 2 3)   ; `&` collects the remaining arguments
//! ```
//!
//! ## Strict Typing
//!
//! - `Int` and `Double` never convert into each other; mixing them is an error
//! - Conditions and boolean operators require actual booleans
//! - Integer overflow and division by zero are reported, not wrapped
//! - Every builtin checks its argument count
//!
//! ## Errors are values
//!
//! Inside the language every fault, including malformed input, is a
//! `Value::Error`. The first error produced while evaluating an S-expression wins
//! and is returned as the result. On the Rust side builtins are written against
//! [`Error`] and converted into error values at the call boundary.
//!
//! ## Modules
//!
//! - `ast`: the value model, equality and printing
//! - `reader`: text to values, including embedded error recovery
//! - `evaluator`: reduction rules, the call protocol and environments
//! - `builtinops`: the builtin registry and file loading
//! - `config`: settings for the interactive interpreter

use std::fmt;

use crate::ast::Value;
use crate::builtinops::Arity;
use crate::evaluator::Environment;

/// Standard library written in the language itself, loaded by [`builtinops::load_prelude`].
pub const PRELUDE: &str = include_str!("prelude.lspy");

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An error value produced inside the language, carried out verbatim
    Raised(String),
    EvalError(String),
    TypeError {
        func: String,
        position: usize,
        expected: &'static str,
        got: &'static str,
    },
    /// Numeric operands of different variants (`Int` mixed with `Double`)
    NumericMismatch {
        func: String,
        expected: &'static str,
        got: &'static str,
    },
    ArityError {
        func: String,
        expected: Arity,
        got: usize,
    },
    UnboundSymbol(String),
    DivisionByZero,
    BuiltinRedefinition(String),
    Io {
        path: String,
        message: String,
    },
    Config(String),
}

impl Error {
    /// Create a TypeError for the argument at `position` (1-based)
    pub fn type_error(func: &str, position: usize, expected: &'static str, got: &Value) -> Self {
        Error::TypeError {
            func: func.to_owned(),
            position,
            expected,
            got: got.type_name(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Raised(msg) | Error::EvalError(msg) => write!(f, "{msg}"),
            Error::TypeError {
                func,
                position,
                expected,
                got,
            } => write!(
                f,
                "incorrect type for argument {position} of '{func}': expected {expected}, got {got}"
            ),
            Error::NumericMismatch {
                func,
                expected,
                got,
            } => write!(
                f,
                "mismatched numeric types in '{func}': expected {expected}, got {got}"
            ),
            Error::ArityError {
                func,
                expected,
                got,
            } => write!(
                f,
                "incorrect argument count for '{func}': expected {expected}, got {got}"
            ),
            Error::UnboundSymbol(name) => write!(f, "unbound symbol '{name}'"),
            Error::DivisionByZero => write!(f, "division by zero"),
            Error::BuiltinRedefinition(name) => write!(f, "cannot redefine builtin '{name}'"),
            Error::Io { path, message } => write!(f, "could not load file '{path}': {message}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod ast;
pub mod builtinops;
pub mod config;
pub mod evaluator;
pub mod reader;

/// Read `input` as one line of source and evaluate it in `env`.
///
/// This mirrors what the REPL does with a line: all top-level forms are wrapped in a
/// single S-expression, so `"+ 1 2"` and `"(+ 1 2)"` both give `3`. An error value
/// coming out of evaluation is returned as [`Error::Raised`].
///
/// ```
/// use lispy::{eval_str, evaluator::create_global_env, ast::Value};
///
/// let env = create_global_env();
/// assert_eq!(eval_str("(* 6 7)", &env), Ok(Value::Int(42)));
/// assert!(eval_str("(head {})", &env).is_err());
/// ```
pub fn eval_str(input: &str, env: &Environment) -> Result<Value, Error> {
    match evaluator::eval(env, reader::read(input)) {
        Value::Error(msg) => Err(Error::Raised(msg)),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_data_driven() {
        let test_cases = vec![
            (Error::Raised("boom".into()), "boom"),
            (Error::UnboundSymbol("x".into()), "unbound symbol 'x'"),
            (Error::DivisionByZero, "division by zero"),
            (
                Error::BuiltinRedefinition("head".into()),
                "cannot redefine builtin 'head'",
            ),
            (
                Error::TypeError {
                    func: "head".into(),
                    position: 1,
                    expected: "q-expression",
                    got: "int",
                },
                "incorrect type for argument 1 of 'head': expected q-expression, got int",
            ),
            (
                Error::NumericMismatch {
                    func: "+".into(),
                    expected: "int",
                    got: "double",
                },
                "mismatched numeric types in '+': expected int, got double",
            ),
            (
                Error::ArityError {
                    func: "if".into(),
                    expected: Arity::Exact(3),
                    got: 2,
                },
                "incorrect argument count for 'if': expected 3, got 2",
            ),
            (
                Error::ArityError {
                    func: "join".into(),
                    expected: Arity::AtLeast(1),
                    got: 0,
                },
                "incorrect argument count for 'join': expected at least 1, got 0",
            ),
            (
                Error::Io {
                    path: "missing.lspy".into(),
                    message: "not found".into(),
                },
                "could not load file 'missing.lspy': not found",
            ),
        ];

        for (i, (error, expected)) in test_cases.iter().enumerate() {
            assert_eq!(error.to_string(), *expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_eval_str_reports_raised_errors() {
        let env = evaluator::create_global_env();
        assert_eq!(eval_str("+ 1 2", &env), Ok(Value::Int(3)));
        assert_eq!(
            eval_str("(error \"custom\")", &env),
            Err(Error::Raised("custom".into()))
        );
        assert_eq!(
            eval_str("undefined-thing", &env),
            Err(Error::Raised("unbound symbol 'undefined-thing'".into()))
        );
    }
}
