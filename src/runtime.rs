//! Tree-walking evaluation of a parsed Resolution. Errors are values: an
//! expression that goes wrong evaluates to `Value::Error`, which propagates
//! outward and stops the whole Resolution at the statement that produced it.

use std::fmt::{self, Display, Formatter};
use std::io::Write;

use log::debug;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::numeral;
use crate::parser::{
    BinaryPrefixOp, Expr, InfixOp, PostfixOp, Relation, Resolution, ResolvedStmt, UnaryPrefixOp,
    WhereasStmt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    String(String),
    Error(String),
}

impl Value {
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => f.write_str(&numeral::render(*n)),
            Value::String(s) => f.write_str(s),
            Value::Error(message) => f.write_str(message),
        }
    }
}

/// Evaluates a Resolution: binds each Whereas declaration, then performs each
/// Resolved action in order. Published lines are written to `out`; the
/// evaluator itself never touches the console.
pub fn eval(resolution: &Resolution, env: &mut Environment, out: &mut dyn Write) -> Result<()> {
    for stmt in &resolution.whereas_stmts {
        let WhereasStmt::Decl { name, value } = stmt;
        if let Some(value) = eval_expr(value, env) {
            if let Value::Error(message) = value {
                return Err(Error::Runtime(message));
            }
            debug!("binding {} = {}", name, value);
            env.insert(name.clone(), value);
        }
    }
    for stmt in &resolution.resolved_stmts {
        eval_resolved_stmt(stmt, env, out)?;
    }
    Ok(())
}

fn eval_resolved_stmt(
    stmt: &ResolvedStmt,
    env: &mut Environment,
    out: &mut dyn Write,
) -> Result<()> {
    match stmt {
        ResolvedStmt::Assume { name, value } => {
            if let Some(value) = eval_expr(value, env) {
                if let Value::Error(message) = value {
                    return Err(Error::Runtime(message));
                }
                debug!("rebinding {} = {}", name, value);
                env.insert(name.clone(), value);
            }
        }
        ResolvedStmt::Publish { value } => {
            if let Some(value) = eval_expr(value, env) {
                if let Value::Error(message) = value {
                    return Err(Error::Runtime(message));
                }
                writeln!(out, "{}", value)?;
            }
        }
        ResolvedStmt::If {
            left,
            relation,
            right,
            consequence,
        } => {
            let (Some(left), Some(right)) = (eval_expr(left, env), eval_expr(right, env)) else {
                return Ok(());
            };
            if let Value::Error(message) = left {
                return Err(Error::Runtime(message));
            }
            if let Value::Error(message) = right {
                return Err(Error::Runtime(message));
            }
            let holds = match relation {
                Relation::Equals => left == right,
                Relation::Exceeds => match (&left, &right) {
                    (Value::Integer(l), Value::Integer(r)) => l > r,
                    (Value::Integer(_), _) => {
                        return Err(Error::Runtime(non_numeric(&right)));
                    }
                    _ => return Err(Error::Runtime(non_numeric(&left))),
                },
            };
            if holds {
                eval_resolved_stmt(consequence, env, out)?;
            }
        }
    }
    Ok(())
}

/// Evaluates one expression. An identifier with no binding yields no value at
/// all, and the absence propagates; statements treat it as a no-op.
pub fn eval_expr(expr: &Expr, env: &Environment) -> Option<Value> {
    match expr {
        Expr::Integer(n) => Some(Value::Integer(*n)),
        Expr::String(s) => Some(Value::String(s.clone())),
        Expr::Identifier(name) => env.get(name).cloned(),
        Expr::UnaryPrefix { op, operand } => {
            let operand = eval_expr(operand, env)?;
            if operand.is_error() {
                return Some(operand);
            }
            Some(eval_unary_prefix(*op, operand))
        }
        Expr::BinaryPrefix { op, first, second } => {
            let first = eval_expr(first, env)?;
            if first.is_error() {
                return Some(first);
            }
            let second = eval_expr(second, env)?;
            if second.is_error() {
                return Some(second);
            }
            Some(eval_binary_prefix(*op, first, second))
        }
        Expr::Infix { op, left, right } => {
            let left = eval_expr(left, env)?;
            if left.is_error() {
                return Some(left);
            }
            let right = eval_expr(right, env)?;
            if right.is_error() {
                return Some(right);
            }
            Some(eval_infix(*op, left, right))
        }
        Expr::Postfix { op, operand } => {
            let operand = eval_expr(operand, env)?;
            if operand.is_error() {
                return Some(operand);
            }
            Some(eval_postfix(*op, operand))
        }
    }
}

// Runtime arithmetic deliberately wraps: only literals are range-checked.

fn eval_unary_prefix(op: UnaryPrefixOp, operand: Value) -> Value {
    let Value::Integer(n) = operand else {
        return Value::Error(non_numeric(&operand));
    };
    match op {
        UnaryPrefixOp::Double => Value::Integer(n.wrapping_mul(2)),
        UnaryPrefixOp::Triple => Value::Integer(n.wrapping_mul(3)),
    }
}

fn eval_binary_prefix(op: BinaryPrefixOp, first: Value, second: Value) -> Value {
    let Value::Integer(a) = first else {
        return Value::Error(non_numeric(&first));
    };
    let Value::Integer(b) = second else {
        return Value::Error(non_numeric(&second));
    };
    match op {
        BinaryPrefixOp::Sum => Value::Integer(a.wrapping_add(b)),
        BinaryPrefixOp::Product => Value::Integer(a.wrapping_mul(b)),
        BinaryPrefixOp::Quotient | BinaryPrefixOp::Remainder if b == 0 => {
            Value::Error("division by zero".to_string())
        }
        BinaryPrefixOp::Quotient => Value::Integer(a.wrapping_div(b)),
        BinaryPrefixOp::Remainder => Value::Integer(a.wrapping_rem(b)),
    }
}

fn eval_infix(op: InfixOp, left: Value, right: Value) -> Value {
    let Value::Integer(l) = left else {
        return Value::Error(non_numeric(&left));
    };
    let Value::Integer(r) = right else {
        return Value::Error(non_numeric(&right));
    };
    match op {
        InfixOp::Subtract => Value::Integer(l.wrapping_sub(r)),
    }
}

fn eval_postfix(op: PostfixOp, operand: Value) -> Value {
    let Value::Integer(n) = operand else {
        return Value::Error(non_numeric(&operand));
    };
    match op {
        PostfixOp::Square => Value::Integer(n.wrapping_mul(n)),
        PostfixOp::Cube => Value::Integer(n.wrapping_mul(n).wrapping_mul(n)),
    }
}

// Records that a value occurs in a context that requires an integer.
fn non_numeric(value: &Value) -> String {
    format!("non-numeric {} in numeric context", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{self, Parser, Precedence};
    use crate::tokenizer::Lexer;

    fn eval_expression(input: &str) -> Option<Value> {
        let mut parser = Parser::new(Lexer::new(input)).unwrap();
        let expr = parser.parse_expr(Precedence::Lowest).unwrap();
        eval_expr(&expr, &Environment::new())
    }

    fn run(input: &str) -> Result<String> {
        let resolution = parser::parse(input).map_err(Error::Parse)?;
        let mut out = Vec::new();
        eval(&resolution, &mut Environment::new(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_eval_integer_expr() {
        let mut values: Vec<i64> = (-1000..=1000).collect();
        values.extend([21_101, 1_000_001, 1_000_001_000, i64::MIN, i64::MAX]);
        for n in values {
            let rendered = numeral::render(n);
            assert_eq!(
                eval_expression(&rendered),
                Some(Value::Integer(n)),
                "{}",
                rendered
            );
        }
    }

    #[test]
    fn test_eval_string_expr() {
        for s in ["", "WHEREAS", "zero (0)", "Greetings, Assembly."] {
            let input = format!("\"{}\"", s);
            assert_eq!(
                eval_expression(&input),
                Some(Value::String(s.to_string())),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_eval_identifier_miss() {
        assert_eq!(
            eval_expr(&Expr::Identifier("Unbound".to_string()), &Environment::new()),
            None
        );
    }

    #[test]
    fn test_eval_arithmetic() {
        for (input, n) in [
            ("twice three (3)", 6),
            ("thrice negative three (-3)", -9),
            ("sum two (2) three (3)", 5),
            ("sum two (2) negative three (-3)", -1),
            ("product four (4) five (5)", 20),
            ("quotient nine (9) two (2)", 4),
            ("quotient negative nine (-9) two (2)", -4),
            ("remainder nine (9) two (2)", 1),
            ("remainder negative nine (-9) two (2)", -1),
            ("ten (10) less six (6)", 4),
            ("ten (10) less six (6) less one (1)", 3),
            ("three (3) squared", 9),
            ("negative three (-3) cubed", -27),
            ("product three (3) four (4) less two (2)", 10),
            ("product three (3) less two (2) four (4)", 4),
            ("remainder twice eight (8) five (5)", 1),
            ("twice three (3) squared", 18),
            ("ten (10) cubed squared", 1_000_000),
        ] {
            assert_eq!(
                eval_expression(input),
                Some(Value::Integer(n)),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_eval_wrapping() {
        let max = numeral::render(i64::MAX);
        let min = numeral::render(i64::MIN);
        for (input, n) in [
            (format!("sum {} one (1)", max), i64::MIN),
            (format!("{} less one (1)", min), i64::MAX),
            (format!("twice {}", max), -2),
            (format!("quotient {} negative one (-1)", min), i64::MIN),
            (format!("remainder {} negative one (-1)", min), 0),
        ] {
            assert_eq!(eval_expression(&input), Some(Value::Integer(n)), "{}", input);
        }
    }

    #[test]
    fn test_eval_division_by_zero() {
        for input in [
            "quotient one (1) zero (0)",
            "remainder one (1) zero (0)",
        ] {
            assert_eq!(
                eval_expression(input),
                Some(Value::Error("division by zero".to_string())),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_eval_non_numeric() {
        for (input, message) in [
            (
                "twice \"four\"",
                "non-numeric four in numeric context",
            ),
            (
                "sum one (1) \"two\"",
                "non-numeric two in numeric context",
            ),
            (
                "\"ten\" less six (6)",
                "non-numeric ten in numeric context",
            ),
            (
                "\"three\" squared",
                "non-numeric three in numeric context",
            ),
        ] {
            assert_eq!(
                eval_expression(input),
                Some(Value::Error(message.to_string())),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_eval_error_propagation() {
        // The inner error short-circuits the outer operation.
        assert_eq!(
            eval_expression("twice quotient one (1) zero (0)"),
            Some(Value::Error("division by zero".to_string()))
        );
    }

    #[test]
    fn test_eval_hello_world() {
        for input in [
            "title whereas the Customary Greeting (hereinafter Greeting) \
             is \"Hello, World!\" resolved publish Greeting",
            "title whereas resolved publish \"Hello, World!\"",
        ] {
            assert_eq!(run(input).unwrap(), "Hello, World!\n", "{}", input);
        }
    }

    #[test]
    fn test_eval_publish_integer() {
        assert_eq!(
            run("title whereas resolved publish sum two (2) two (2)").unwrap(),
            "four (4)\n"
        );
        assert_eq!(
            run("title whereas resolved publish negative one thousand (-1,000)").unwrap(),
            "negative one thousand (-1,000)\n"
        );
    }

    #[test]
    fn test_eval_assume_and_if() {
        let input = "title whereas the running count (hereinafter the Count) \
                     is one (1) resolved the Count assume sum the Count one (1) \
                     resolved if the Count equals two (2) then publish the Count \
                     resolved if the Count exceeds two (2) then publish \"no\"";
        assert_eq!(run(input).unwrap(), "two (2)\n");
    }

    #[test]
    fn test_eval_nested_if() {
        let input = "title whereas the value (hereinafter A) is one (1) \
                     resolved if A equals one (1) then if A exceeds zero (0) \
                     then publish A";
        assert_eq!(run(input).unwrap(), "one (1)\n");
    }

    #[test]
    fn test_eval_equals_mixed_types() {
        // Values of different kinds are unequal, not an error.
        let input = "title whereas the value (hereinafter A) is \"one\" \
                     resolved if A equals one (1) then publish A";
        assert_eq!(run(input).unwrap(), "");
    }

    #[test]
    fn test_eval_exceeds_non_integer() {
        let input = "title whereas the value (hereinafter A) is \"one\" \
                     resolved if A exceeds one (1) then publish A";
        match run(input) {
            Err(Error::Runtime(message)) => {
                assert_eq!(message, "non-numeric one in numeric context");
            }
            other => panic!("got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_eval_runtime_error_stops_resolution() {
        let input = "title whereas resolved \
                     publish quotient one (1) zero (0) resolved publish \"x\"";
        match run(input) {
            Err(Error::Runtime(message)) => assert_eq!(message, "division by zero"),
            other => panic!("got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_eval_decl_error_surfaces() {
        let input = "title whereas the value (hereinafter A) is \
                     quotient one (1) zero (0) resolved publish A";
        match run(input) {
            Err(Error::Runtime(message)) => assert_eq!(message, "division by zero"),
            other => panic!("got {:?}", other.map(|_| ())),
        }
    }
}
