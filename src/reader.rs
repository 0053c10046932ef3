//! Reader: turns source text into [`Value`] trees.
//!
//! Token recognition is done with `nom` combinators; the overall structure is a
//! recursive descent that never fails. A malformed construct becomes a
//! [`Value::Error`] at the position where it was found and reading carries on, so a
//! line with one bad token still yields all of its other forms.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, opt, recognize, value},
    multi::many0,
    sequence::pair,
};

use crate::ast::{IntType, Value};

/// Non-alphanumeric characters allowed in atoms (symbols and numbers)
pub(crate) const ATOM_SPECIAL_CHARS: &str = "_+-*/\\=<>!&|%^.";

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATOM_SPECIAL_CHARS.contains(c)
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0b}' | '\u{0c}')
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while1(is_whitespace).parse(input)
}

/// `;` up to (not including) the end of the line
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char(';'), take_till(|c: char| c == '\n'))).parse(input)
}

fn trivia(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((whitespace, comment)))).parse(input)
}

fn skip_trivia(input: &str) -> &str {
    match trivia(input) {
        Ok((rest, ())) => rest,
        Err(_) => input,
    }
}

fn atom(input: &str) -> IResult<&str, &str> {
    take_while1(is_atom_char).parse(input)
}

fn integer_literal(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1)).parse(input)
}

fn double_literal(input: &str) -> IResult<&str, &str> {
    recognize((opt(char('-')), digit1, char('.'), digit1)).parse(input)
}

/// Run of string characters up to the next quote or backslash
fn string_chunk(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c == '"' || c == '\\').parse(input)
}

/// Classify a maximal run of atom characters
fn classify_atom(token: &str) -> Value {
    if all_consuming(integer_literal).parse(token).is_ok() {
        return token.parse::<IntType>().map_or_else(
            |_| Value::Error(format!("integer literal '{token}' is out of range")),
            Value::Int,
        );
    }
    if all_consuming(double_literal).parse(token).is_ok() {
        return token.parse::<f64>().map_or_else(
            |_| Value::Error(format!("invalid double literal '{token}'")),
            Value::Double,
        );
    }
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if token.contains('.') => Value::Error(format!("invalid token '{token}'")),
        _ => Value::Symbol(token.to_owned()),
    }
}

fn unescape(c: char) -> Option<char> {
    match c {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0b}'),
        '\\' | '\'' | '"' => Some(c),
        _ => None,
    }
}

/// Read a string literal; `input` starts just after the opening quote.
///
/// An unknown escape does not stop the scan: the rest of the literal is consumed so
/// that reading resumes after the closing quote, and the whole literal becomes an error.
fn read_string(input: &str) -> (&str, Value) {
    let mut text = String::new();
    let mut invalid_escape = None;
    let mut rest = input;

    loop {
        let (after, chunk) = string_chunk(rest).unwrap_or((rest, ""));
        text.push_str(chunk);

        let mut chars = after.chars();
        match (chars.next(), chars.next()) {
            (Some('"'), _) => {
                let value = match invalid_escape {
                    Some(c) => {
                        Value::Error(format!("invalid escape sequence '\\{c}' in string literal"))
                    }
                    None => Value::String(text),
                };
                // Only the quote is consumed
                return (&after[1..], value);
            }
            (Some('\\'), Some(escaped)) => {
                match unescape(escaped) {
                    Some(c) => text.push(c),
                    None => {
                        invalid_escape.get_or_insert(escaped);
                    }
                }
                rest = chars.as_str();
            }
            _ => return ("", Value::Error("unterminated string literal".into())),
        }
    }
}

/// Read the cells of a list; `input` starts just after the opening delimiter.
fn read_sequence(input: &str, close: char, build: fn(Vec<Value>) -> Value) -> (&str, Value) {
    let mut cells = Vec::new();
    let mut rest = skip_trivia(input);

    loop {
        let mut chars = rest.chars();
        match chars.next() {
            None => {
                return (
                    rest,
                    Value::Error(format!("missing '{close}' before end of input")),
                );
            }
            Some(c) if c == close => return (chars.as_str(), build(cells)),
            Some(_) => {
                let (next, cell) = read_form(rest);
                cells.push(cell);
                rest = skip_trivia(next);
            }
        }
    }
}

/// Read one form from non-empty input that does not start with trivia
fn read_form(input: &str) -> (&str, Value) {
    let mut chars = input.chars();
    match chars.next() {
        Some('(') => read_sequence(chars.as_str(), ')', Value::SExpr),
        Some('{') => read_sequence(chars.as_str(), '}', Value::QExpr),
        Some('"') => read_string(chars.as_str()),
        Some(close @ (')' | '}')) => (
            chars.as_str(),
            Value::Error(format!("unexpected '{close}'")),
        ),
        Some(c) => match atom(input) {
            Ok((rest, token)) => (rest, classify_atom(token)),
            Err(_) => (
                chars.as_str(),
                Value::Error(format!("unknown character '{}'", c.escape_default())),
            ),
        },
        None => (input, Value::Error("unexpected end of input".into())),
    }
}

/// Read every top-level form in `input`, in order.
pub fn read_forms(input: &str) -> Vec<Value> {
    let mut forms = Vec::new();
    let mut rest = skip_trivia(input);
    while !rest.is_empty() {
        let (next, form) = read_form(rest);
        forms.push(form);
        rest = skip_trivia(next);
    }
    forms
}

/// Read `input` into a single S-expression holding all top-level forms.
///
/// ```
/// use lispy::reader::read;
///
/// assert_eq!(read("+ 1 2").to_string(), "(+ 1 2)");
/// assert_eq!(read("(head {1 2}) ; comment").to_string(), "((head {1 2}))");
/// ```
pub fn read(input: &str) -> Value {
    Value::SExpr(read_forms(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{qexpr, sexpr, sym, val};

    /// Test result variants for comprehensive reader tests
    #[derive(Debug)]
    enum ReadTestResult {
        Success(Value),              // Input should read as exactly this one form
        SpecificError(&'static str), // Input should read as one error value containing this string
    }
    use ReadTestResult::*;

    fn success<T: Into<Value>>(value: T) -> ReadTestResult {
        Success(value.into())
    }

    /// Run reader tests, checking that successful reads survive a display round trip
    fn run_read_tests(test_cases: Vec<(&str, ReadTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Read test #{} ({input:?})", i + 1);
            let forms = read_forms(input);
            assert_eq!(forms.len(), 1, "{test_id}: expected one form, got {forms:?}");
            let actual = &forms[0];

            match expected {
                Success(expected_val) => {
                    assert_eq!(actual, expected_val, "{test_id}: value mismatch");

                    let displayed = format!("{actual}");
                    let reread = read_forms(&displayed);
                    assert_eq!(
                        reread.as_slice(),
                        std::slice::from_ref(actual),
                        "{test_id}: round trip through '{displayed}' failed"
                    );
                }
                SpecificError(expected_text) => match actual {
                    Value::Error(msg) => assert!(
                        msg.contains(expected_text),
                        "{test_id}: error should contain '{expected_text}', got '{msg}'"
                    ),
                    other => panic!("{test_id}: expected error, got {other:?}"),
                },
            }
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_reader_comprehensive() {
        let test_cases = vec![
            // ===== NUMBERS =====
            ("42", success(42)),
            ("-5", success(-5)),
            ("0", success(0)),
            ("007", success(7)),
            ("9223372036854775807", success(IntType::MAX)),
            ("-9223372036854775808", success(IntType::MIN)),
            ("9223372036854775808", SpecificError("out of range")),
            ("2.5", success(2.5)),
            ("-0.25", success(-0.25)),
            ("10.0", success(10.0)),
            ("1.", SpecificError("invalid token")),
            (".5", SpecificError("invalid token")),
            ("1.2.3", SpecificError("invalid token")),
            // ===== BOOLEANS =====
            ("true", success(true)),
            ("false", success(false)),
            ("truthy", success(sym("truthy"))),
            // ===== SYMBOLS =====
            ("head", success(sym("head"))),
            ("+", success(sym("+"))),
            ("-", success(sym("-"))),
            ("--5", success(sym("--5"))),
            ("5-", success(sym("5-"))),
            ("\\", success(sym("\\"))),
            ("&", success(sym("&"))),
            ("||", success(sym("||"))),
            ("==", success(sym("=="))),
            ("%", success(sym("%"))),
            ("^", success(sym("^"))),
            ("add_one", success(sym("add_one"))),
            ("a.b", SpecificError("invalid token")),
            // ===== STRINGS =====
            ("\"hello\"", success("hello")),
            ("\"\"", success("")),
            ("\"a b ( ) { }\"", success("a b ( ) { }")),
            ("\"line\\nbreak\"", success("line\nbreak")),
            ("\"tab\\there\"", success("tab\there")),
            ("\"q\\\"uote\"", success("q\"uote")),
            ("\"back\\\\slash\"", success("back\\slash")),
            ("\"it\\'s\"", success("it's")),
            ("\"\\a\\b\\f\\r\\v\"", success("\u{07}\u{08}\u{0c}\r\u{0b}")),
            ("\"; not a comment\"", success("; not a comment")),
            ("\"bad \\q escape\"", SpecificError("invalid escape sequence '\\q'")),
            ("\"never closed", SpecificError("unterminated string")),
            ("\"ends in backslash\\", SpecificError("unterminated string")),
            // ===== LISTS =====
            ("()", success(sexpr(vec![]))),
            ("{}", success(qexpr(vec![]))),
            ("(+ 1 2)", success(sexpr(vec![sym("+"), val(1), val(2)]))),
            ("{1 2 3}", success([1, 2, 3])),
            (
                "( head   {1\t2}\n)",
                success(sexpr(vec![sym("head"), val([1, 2])])),
            ),
            (
                "{\\ {x} {* x x}}",
                success(qexpr(vec![
                    sym("\\"),
                    qexpr(vec![sym("x")]),
                    qexpr(vec![sym("*"), sym("x"), sym("x")]),
                ])),
            ),
            (
                "(def {s} \"str\" 2.5)",
                success(sexpr(vec![sym("def"), qexpr(vec![sym("s")]), val("str"), val(2.5)])),
            ),
            (
                "(1 ; inner comment\n 2)",
                success(sexpr(vec![val(1), val(2)])),
            ),
            // ===== MALFORMED LISTS =====
            ("(+ 1 2", SpecificError("missing ')'")),
            ("{1 2", SpecificError("missing '}'")),
            ("(1 {2 3)", SpecificError("missing ')'")),
            (")", SpecificError("unexpected ')'")),
            ("}", SpecificError("unexpected '}'")),
            ("#", SpecificError("unknown character '#'")),
            ("@", SpecificError("unknown character")),
        ];

        run_read_tests(test_cases);
    }

    #[test]
    fn test_read_wraps_top_level_forms() {
        assert_eq!(read(""), sexpr(vec![]));
        assert_eq!(read("   ; only a comment"), sexpr(vec![]));
        assert_eq!(read("+ 1 2"), sexpr(vec![sym("+"), val(1), val(2)]));
        assert_eq!(
            read("(def {x} 1)\n(+ x 1)"),
            sexpr(vec![
                sexpr(vec![sym("def"), qexpr(vec![sym("x")]), val(1)]),
                sexpr(vec![sym("+"), sym("x"), val(1)]),
            ])
        );
    }

    #[test]
    fn test_errors_are_spliced_in_place() {
        // A bad token inside a list does not stop the rest of the list being read
        assert_eq!(
            read_forms("(1 # 2) 3"),
            vec![
                sexpr(vec![val(1), Value::Error("unknown character '#'".into()), val(2)]),
                val(3),
            ]
        );

        // Reading resumes after a literal with a bad escape
        let forms = read_forms("\"x\\q\" after");
        assert_eq!(forms.len(), 2);
        assert!(forms[0].is_error());
        assert_eq!(forms[1], sym("after"));

        // Stray closers become errors between other forms
        let forms = read_forms("1 ) 2");
        assert_eq!(forms.len(), 3);
        assert_eq!(forms[0], val(1));
        assert!(forms[1].is_error());
        assert_eq!(forms[2], val(2));
    }

    #[test]
    fn test_atoms_run_into_each_other() {
        // No whitespace is needed between an atom and a delimiter
        assert_eq!(
            read_forms("(+ 1 2){x}"),
            vec![
                sexpr(vec![sym("+"), val(1), val(2)]),
                qexpr(vec![sym("x")]),
            ]
        );
        // A sign only belongs to a number when digits follow it directly
        assert_eq!(read_forms("+1"), vec![sym("+1")]);
        assert_eq!(read_forms("a\"s\""), vec![sym("a"), val("s")]);
    }
}
