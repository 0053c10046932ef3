//! This module defines the core value type shared by the reader and the evaluator.
//! The main enum, [`Value`], covers every datum of the language: numbers, booleans,
//! strings, symbols, error values, the two list forms (S-expressions and Q-expressions),
//! builtin operations and user lambdas. Source code is read directly into `Value`s, so
//! the same type is both syntax tree and runtime data.
//!
//! Ownership rules follow the language semantics: containers own their children, and
//! `clone()` is a deep structural copy, including the captured environment of a
//! lambda. Equality is structural and ignores captured environments. `Display` renders
//! the canonical surface syntax that the reader accepts back.

use crate::Error;
use crate::builtinops::BuiltinOp;
use crate::evaluator::Environment;

/// Type alias for integer values in the interpreter
pub type IntType = i64;

/// Formal parameter that makes the following formal collect the remaining arguments
pub const VARIADIC_MARKER: &str = "&";

/// Core value type of the interpreter
///
/// To build values in code and tests, use the helper functions:
/// - `val(42)`, `val(2.5)`, `val("text")` for literals
/// - `sym("name")` for symbols
/// - `val([1, 2, 3])` or `qexpr(vec![...])` for Q-expressions
/// - `sexpr(vec![sym("+"), val(1), val(2)])` for S-expressions
#[derive(Debug, Clone)]
pub enum Value {
    Int(IntType),
    Double(f64),
    Bool(bool),
    String(String),
    Symbol(String),
    /// Parse-time or evaluation-time fault, propagated as data
    Error(String),
    /// Evaluates by applying the head to the tail
    SExpr(Vec<Value>),
    /// Quoted list; evaluates to itself
    QExpr(Vec<Value>),
    /// Native operation from the builtin registry, compared by id
    Builtin(&'static BuiltinOp),
    Lambda(Box<Lambda>),
}

/// A user-defined function.
///
/// The closure starts out empty. Arguments are bound into it one call at a time, so a
/// partially applied lambda carries its already-bound arguments here.
#[derive(Debug)]
pub struct Lambda {
    pub formals: Vec<String>,
    pub body: Vec<Value>,
    pub closure: Environment,
}

impl Lambda {
    pub fn new(formals: Vec<String>, body: Vec<Value>) -> Self {
        Lambda {
            formals,
            body,
            closure: Environment::new(),
        }
    }
}

impl Clone for Lambda {
    fn clone(&self) -> Self {
        Lambda {
            formals: self.formals.clone(),
            body: self.body.clone(),
            closure: self.closure.deep_copy(),
        }
    }
}

// From trait implementations for Value - enables .into() conversion
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Int(IntType::from(n))
            }
        }
    };
}

// Generate From implementations for all lossless integer types
impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(IntType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::QExpr(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::QExpr(arr.into_iter().map(Into::into).collect())
    }
}

impl From<Error> for Value {
    fn from(error: Error) -> Self {
        Value::Error(error.to_string())
    }
}

///   Helper function for creating symbols - works great in mixed lists!
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Values from Rust literals
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating Q-expressions from mixed values
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn qexpr(cells: Vec<Value>) -> Value {
    Value::QExpr(cells)
}

/// Helper function for creating S-expressions from mixed values
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sexpr(cells: Vec<Value>) -> Value {
    Value::SExpr(cells)
}

/// The empty S-expression, returned by operations that have nothing to return
pub fn unit() -> Value {
    Value::SExpr(Vec::new())
}

impl Value {
    /// Name of the variant as it appears in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Error(_) => "error",
            Value::SExpr(_) => "s-expression",
            Value::QExpr(_) => "q-expression",
            Value::Builtin(_) | Value::Lambda(_) => "function",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Builtin(_) | Value::Lambda(_))
    }
}

fn write_escaped(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '\u{07}' => write!(f, "\\a")?,
            '\u{08}' => write!(f, "\\b")?,
            '\u{0c}' => write!(f, "\\f")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            '\u{0b}' => write!(f, "\\v")?,
            '\\' => write!(f, "\\\\")?,
            '\'' => write!(f, "\\'")?,
            '"' => write!(f, "\\\"")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

fn write_cells(
    f: &mut std::fmt::Formatter<'_>,
    open: char,
    cells: &[Value],
    close: char,
) -> std::fmt::Result {
    write!(f, "{open}")?;
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{cell}")?;
    }
    write!(f, "{close}")
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d:.6}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write_escaped(f, s),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Error(msg) => write!(f, "Error: {msg}"),
            Value::SExpr(cells) => write_cells(f, '(', cells, ')'),
            Value::QExpr(cells) => write_cells(f, '{', cells, '}'),
            Value::Builtin(_) => write!(f, "<builtin>"),
            Value::Lambda(lambda) => {
                write!(f, "(\\ {{{}}} ", lambda.formals.join(" "))?;
                write_cells(f, '{', &lambda.body, '}')?;
                write!(f, ")")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b))
            | (Value::Symbol(a), Value::Symbol(b))
            | (Value::Error(a), Value::Error(b)) => a == b,
            (Value::SExpr(a), Value::SExpr(b)) | (Value::QExpr(a), Value::QExpr(b)) => a == b,
            // Compare builtins by id string, not function pointer
            (Value::Builtin(a), Value::Builtin(b)) => a.id == b.id,
            // Captured environments do not take part in equality
            (Value::Lambda(a), Value::Lambda(b)) => a.formals == b.formals && a.body == b.body,
            _ => false,
        }
    }
}

#[cfg(test)]
mod helper_function_tests {
    use super::*;
    use crate::builtinops::find_builtin_op;

    #[test]
    fn test_helper_functions_data_driven() {
        // Test cases as (Value, Value) tuples: (helper_result, expected_value)
        let test_cases = vec![
            (val(42), Value::Int(42)),
            (val(-17), Value::Int(-17)),
            (val(4294967295u32), Value::Int(4294967295)),
            (val(-128i8), Value::Int(-128)),
            (val(IntType::MAX), Value::Int(IntType::MAX)),
            (val(2.5), Value::Double(2.5)),
            (val(true), Value::Bool(true)),
            (val("hello"), Value::String("hello".to_owned())),
            (sym("head"), Value::Symbol("head".to_owned())),
            (sym(String::from("&")), Value::Symbol("&".to_owned())),
            (unit(), Value::SExpr(vec![])),
            (
                val([1, 2, 3]),
                Value::QExpr(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            ),
            (
                qexpr(vec![sym("x"), val("y"), val([1])]),
                Value::QExpr(vec![
                    Value::Symbol("x".to_owned()),
                    Value::String("y".to_owned()),
                    Value::QExpr(vec![Value::Int(1)]),
                ]),
            ),
            (
                sexpr(vec![sym("+"), val(1)]),
                Value::SExpr(vec![Value::Symbol("+".to_owned()), Value::Int(1)]),
            ),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_display_data_driven() {
        let square = Value::Lambda(Box::new(Lambda::new(
            vec!["x".into()],
            vec![sym("*"), sym("x"), sym("x")],
        )));
        let test_cases = vec![
            (val(42), "42"),
            (val(-7), "-7"),
            (val(2.5), "2.500000"),
            (val(-0.125), "-0.125000"),
            (val(true), "true"),
            (val(false), "false"),
            (val("plain"), "\"plain\""),
            (val("tab\there"), "\"tab\\there\""),
            (val("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\""),
            (val("it's \\ \u{07}\u{0b}"), "\"it\\'s \\\\ \\a\\v\""),
            (sym("head"), "head"),
            (Value::Error("boom".into()), "Error: boom"),
            (unit(), "()"),
            (val([1, 2, 3]), "{1 2 3}"),
            (
                sexpr(vec![sym("+"), val(1), qexpr(vec![sym("x")])]),
                "(+ 1 {x})",
            ),
            (square, "(\\ {x} {* x x})"),
        ];

        for (i, (value, expected)) in test_cases.iter().enumerate() {
            assert_eq!(value.to_string(), *expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_builtin_display_and_equality() {
        let (Some(head), Some(tail)) = (find_builtin_op("head"), find_builtin_op("tail")) else {
            panic!("list builtins should be registered");
        };
        assert_eq!(Value::Builtin(head).to_string(), "<builtin>");
        assert_eq!(Value::Builtin(head), Value::Builtin(head));
        assert_ne!(Value::Builtin(head), Value::Builtin(tail));
        assert_eq!(Value::Builtin(head).type_name(), "function");
    }

    #[test]
    fn test_structural_equality() {
        // Same contents, different list kinds
        assert_ne!(sexpr(vec![val(1)]), qexpr(vec![val(1)]));
        // No numeric coercion
        assert_ne!(val(1), val(1.0));
        assert_ne!(val("x"), sym("x"));
        assert_eq!(val([val([1]), val([2])]), val([val([1]), val([2])]));
    }

    #[test]
    fn test_lambda_equality_ignores_closure() {
        let plain = Lambda::new(vec!["b".into()], vec![sym("+"), sym("a"), sym("b")]);
        let bound = plain.clone();
        bound.closure.put("a", val(1), false);

        assert_eq!(
            Value::Lambda(Box::new(plain)),
            Value::Lambda(Box::new(bound))
        );
    }

    #[test]
    fn test_lambda_clone_copies_closure() {
        let original = Lambda::new(vec!["y".into()], vec![sym("x")]);
        original.closure.put("x", val(1), false);

        let copy = original.clone();
        copy.closure.put("x", val(2), false);

        assert_eq!(original.closure.get("x"), val(1));
        assert_eq!(copy.closure.get("x"), val(2));
    }

    #[test]
    fn test_type_names() {
        let test_cases = vec![
            (val(1), "int"),
            (val(1.5), "double"),
            (val(true), "bool"),
            (val("s"), "string"),
            (sym("s"), "symbol"),
            (Value::Error("e".into()), "error"),
            (unit(), "s-expression"),
            (val([1]), "q-expression"),
            (
                Value::Lambda(Box::new(Lambda::new(vec![], vec![]))),
                "function",
            ),
        ];
        for (value, expected) in test_cases {
            assert_eq!(value.type_name(), expected, "type of {value}");
        }
    }
}
