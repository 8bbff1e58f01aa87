use core::fmt;

use itertools::Itertools;

use crate::{
    builtin::Builtin,
    environment::Bindings,
    error::{LispError, FUNCTION_DEFINITION, VARARGS_DEFINITION},
    parser::{Node, NodeKind},
    stack::ensure_sufficient_stack,
};

const VARARGS_MARKER: &str = "&";

/// Every datum the language can produce or hold.
///
/// Containers own their children outright, so dropping a value releases the
/// whole tree beneath it. Cloning is a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i64),
    Decimal(f64),
    Boolean(bool),
    String(String),
    Symbol(String),
    Error(LispError),
    Builtin(Builtin),
    Function(Lambda),
    SExpr(Vec<Value>),
    QExpr(Vec<Value>),
    Root(Vec<Value>),
}

impl Value {
    /// The empty S-expression, returned by operations that have nothing to say.
    pub fn unit() -> Self {
        Self::SExpr(Vec::new())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Error(_) => "Error",
            Self::Number(_) => "Number",
            Self::Decimal(_) => "Decimal",
            Self::Symbol(_) => "Symbol",
            Self::SExpr(_) => "S-expression",
            Self::Root(_) => "Root-expression",
            Self::QExpr(_) => "Q-expression",
            Self::Builtin(_) => "Built-in",
            Self::Function(_) => "Function",
            Self::Boolean(_) => "Boolean",
            Self::String(_) => "String",
        }
    }

    /// Truth value of a condition operand. Only numbers and booleans qualify.
    pub(crate) fn truthiness(&self) -> Option<bool> {
        match self {
            Self::Number(number) => Some(*number != 0),
            Self::Boolean(boolean) => Some(*boolean),
            _ => None,
        }
    }

    /// Folds a parsed tree into a value. Comments are dropped from containers;
    /// a node that cannot stand on its own as a value yields `None`.
    pub fn from_node(node: &Node<'_>) -> Option<Self> {
        let children = |node: &Node<'_>| -> Option<Vec<Self>> {
            node.children.iter()
                .filter(|child| child.kind != NodeKind::Comment)
                .map(Self::from_node)
                .collect()
        };

        ensure_sufficient_stack(|| match node.kind {
            NodeKind::Number => Some(node.text.parse()
                .map(Self::Number)
                .unwrap_or_else(|_| Self::Error(LispError::bad_numeric_value()))),
            NodeKind::Decimal => Some(node.text.parse()
                .map(Self::Decimal)
                .unwrap_or_else(|_| Self::Error(LispError::bad_numeric_value()))),
            NodeKind::Boolean => Some(Self::Boolean(node.text == "true")),
            NodeKind::String => {
                let inner = node.text.strip_prefix('"')?.strip_suffix('"')?;
                Some(Self::String(unescape(inner)))
            }
            NodeKind::Symbol => Some(Self::symbol(node.text)),
            NodeKind::Comment => None,
            NodeKind::SExpr => children(node).map(Self::SExpr),
            NodeKind::QExpr => children(node).map(Self::QExpr),
            NodeKind::Root => children(node).map(Self::Root),
        })
    }
}

/// A user defined function.
///
/// `captured` holds arguments already supplied through partial application;
/// they are installed in every call frame before the remaining formals.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub(crate) formals: Vec<String>,
    pub(crate) variadic: Option<String>,
    pub(crate) body: Vec<Value>,
    pub(crate) captured: Bindings,
}

impl Lambda {
    /// Builds a function from the contents of its formal argument and body
    /// Q-expressions. A variadic tail is written `& name` at the end of the
    /// formals.
    pub fn new(formals: Vec<Value>, body: Vec<Value>) -> Result<Self, LispError> {
        let mut names = formals.into_iter()
            .map(|formal| match formal {
                Value::Symbol(name) => Ok(name),
                _ => Err(LispError::definition(FUNCTION_DEFINITION)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let markers = names.iter().positions(|name| name == VARARGS_MARKER).collect_vec();
        let variadic = match markers.as_slice() {
            [] => None,
            [index] if *index + 2 == names.len() => {
                let variadic = names.pop();
                names.pop();
                variadic
            }
            _ => return Err(LispError::definition(VARARGS_DEFINITION)),
        };

        Ok(Self { formals: names, variadic, body, captured: Bindings::default() })
    }

    pub fn formals(&self) -> &[String] {
        &self.formals
    }

    pub fn variadic(&self) -> Option<&str> {
        self.variadic.as_deref()
    }
}

// Functions are equal when their signatures and bodies are; whatever they
// have captured does not take part.
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.formals == other.formals && self.variadic == other.variadic && self.body == other.body
    }
}

// Non-finite values are spelled the way C's `%f` spells them
fn write_decimal(f: &mut fmt::Formatter<'_>, decimal: f64) -> fmt::Result {
    let sign = if decimal.is_sign_negative() { "-" } else { "" };
    if decimal.is_nan() {
        write!(f, "{}nan", sign)
    } else if decimal.is_infinite() {
        write!(f, "{}inf", sign)
    } else {
        write!(f, "{:.6}", decimal)
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[Value], open: char, close: char) -> fmt::Result {
    write!(f, "{}{}{}", open, children.iter().join(" "), close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Self::Error(error) => write!(f, "error: {}", error),
            Self::Number(number) => write!(f, "{}", number),
            Self::Decimal(decimal) => write_decimal(f, *decimal),
            Self::Symbol(symbol) => write!(f, "{}", symbol),
            Self::SExpr(children) | Self::Root(children) => write_children(f, children, '(', ')'),
            Self::QExpr(children) => write_children(f, children, '{', '}'),
            Self::Builtin(builtin) => write!(f, "builtin: {}", builtin.name()),
            Self::Function(lambda) => write!(f, "{}", lambda),
            Self::Boolean(boolean) => write!(f, "{}", boolean),
            Self::String(string) => write!(f, "\"{}\"", escape(string)),
        })
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variadic = self.variadic.iter()
            .flat_map(|name| [VARARGS_MARKER, name.as_str()]);
        let formals = self.formals.iter().map(String::as_str).chain(variadic).join(" ");
        write!(f, "(\\ {{{}}} {{{}}})", formals, self.body.iter().join(" "))
    }
}

fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('a') => result.push('\x07'),
            Some('b') => result.push('\x08'),
            Some('f') => result.push('\x0c'),
            Some('v') => result.push('\x0b'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\0' => result.push_str("\\0"),
            '\x07' => result.push_str("\\a"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            '\x0b' => result.push_str("\\v"),
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            other => result.push(other),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    use super::*;

    fn fold(input: &str) -> anyhow::Result<Value> {
        let node = parse(input)?;
        Value::from_node(&node).ok_or_else(|| anyhow::anyhow!("could not fold {:?}", input))
    }

    fn symbols(names: &[&str]) -> Vec<Value> {
        names.iter().map(|name| Value::symbol(*name)).collect()
    }

    #[test]
    fn folds_literals_and_skips_comments() -> anyhow::Result<()> {
        let value = fold("1 2.5 true \"a\\tb\" x ; trailing\n{y ; inner\n}")?;
        assert_eq!(value, Value::Root(vec![
            Value::Number(1),
            Value::Decimal(2.5),
            Value::Boolean(true),
            Value::String("a\tb".to_owned()),
            Value::symbol("x"),
            Value::QExpr(vec![Value::symbol("y")]),
        ]));
        Ok(())
    }

    #[test]
    fn out_of_range_literal_becomes_an_embedded_error() -> anyhow::Result<()> {
        let value = fold("{99999999999999999999}")?;
        assert_eq!(value, Value::Root(vec![Value::QExpr(vec![Value::Error(LispError::bad_numeric_value())])]));
        Ok(())
    }

    #[test]
    fn lone_comment_node_has_no_value() -> anyhow::Result<()> {
        let root = parse("; nothing here")?;
        assert_eq!(Value::from_node(&root.children[0]), None);
        Ok(())
    }

    #[test]
    fn displays_like_the_repl() {
        assert_eq!(Value::Decimal(1.5).to_string(), "1.500000");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::String("say \"hi\"\n".to_owned()).to_string(), r#""say \"hi\"\n""#);
        assert_eq!(Value::QExpr(vec![Value::Number(1), Value::unit()]).to_string(), "{1 ()}");
        assert_eq!(Value::Builtin(Builtin::Add).to_string(), "builtin: +");
        assert_eq!(Value::Error(LispError::division_by_zero()).to_string(), "error: Division by zero");
    }

    #[test]
    fn lambda_splits_off_variadic_tail() -> anyhow::Result<()> {
        let lambda = Lambda::new(symbols(&["x", "&", "xs"]), symbols(&["xs"]))?;
        assert_eq!(lambda.formals(), ["x".to_owned()]);
        assert_eq!(lambda.variadic(), Some("xs"));
        assert_eq!(lambda.to_string(), "(\\ {x & xs} {xs})");
        Ok(())
    }

    #[test]
    fn lambda_rejects_malformed_formals() {
        let misplaced = Lambda::new(symbols(&["&", "xs", "y"]), vec![]);
        assert_eq!(misplaced.map_err(|e| e.message), Err(VARARGS_DEFINITION.to_owned()));

        let twice = Lambda::new(symbols(&["&", "&"]), vec![]);
        assert_eq!(twice.map_err(|e| e.message), Err(VARARGS_DEFINITION.to_owned()));

        let not_symbol = Lambda::new(vec![Value::Number(1)], vec![]);
        assert_eq!(not_symbol.map_err(|e| e.message), Err(FUNCTION_DEFINITION.to_owned()));
    }

    #[test]
    fn lambda_equality_ignores_captured_arguments() -> anyhow::Result<()> {
        let plain = Lambda::new(symbols(&["a"]), symbols(&["a"]))?;
        let mut bound = plain.clone();
        bound.captured.set("b", Value::Number(2));
        assert_eq!(plain, bound);
        Ok(())
    }

    #[test]
    fn non_finite_decimals_print_like_c() {
        assert_eq!(Value::Decimal(f64::NAN).to_string(), "nan");
        assert_eq!(Value::Decimal(-f64::NAN).to_string(), "-nan");
        assert_eq!(Value::Decimal(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Decimal(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::Decimal(-0.0).to_string(), "-0.000000");
    }
}
