use std::{io::Write, path::Path, rc::Rc};

use itertools::Itertools;
use tracing::{debug, info};

use crate::{
    environment::Environment,
    error::{ErrorKind, LispError, FUNCTION_DEFINITION},
    interpreter::{evaluate, EvaluationResult},
    parser::parse,
    value::{Lambda, Value},
};

/// The primitive operations, each bound in the global scope under its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Min,
    Max,
    List,
    Head,
    Tail,
    Join,
    Eval,
    Cons,
    Len,
    Init,
    Def,
    LocalDef,
    Lambda,
    Fun,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Eq,
    NotEq,
    If,
    Or,
    OrWord,
    And,
    AndWord,
    Not,
    NotWord,
    Load,
    Print,
    Error,
}

impl Builtin {
    pub const ALL: [Builtin; 36] = [
        Self::Add, Self::Subtract, Self::Multiply, Self::Divide, Self::Modulo, Self::Power,
        Self::Min, Self::Max,
        Self::List, Self::Head, Self::Tail, Self::Join, Self::Eval, Self::Cons, Self::Len, Self::Init,
        Self::Def, Self::LocalDef, Self::Lambda, Self::Fun,
        Self::Greater, Self::GreaterEq, Self::Less, Self::LessEq, Self::Eq, Self::NotEq,
        Self::If,
        Self::Or, Self::OrWord, Self::And, Self::AndWord, Self::Not, Self::NotWord,
        Self::Load, Self::Print, Self::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "^",
            Self::Min => "min",
            Self::Max => "max",
            Self::List => "list",
            Self::Head => "head",
            Self::Tail => "tail",
            Self::Join => "join",
            Self::Eval => "eval",
            Self::Cons => "cons",
            Self::Len => "len",
            Self::Init => "init",
            Self::Def => "def",
            Self::LocalDef => "=",
            Self::Lambda => "\\",
            Self::Fun => "fun",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::If => "if",
            Self::Or => "||",
            Self::OrWord => "or",
            Self::And => "&&",
            Self::AndWord => "and",
            Self::Not => "!",
            Self::NotWord => "not",
            Self::Load => "load",
            Self::Print => "print",
            Self::Error => "error",
        }
    }

    /// Runs the builtin over already evaluated arguments.
    pub(crate) fn call(self, arguments: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide
            | Self::Modulo | Self::Power | Self::Min | Self::Max => builtin_numeric(self, arguments),
            Self::List => Ok(Value::QExpr(arguments)),
            Self::Head => builtin_head(arguments),
            Self::Tail => builtin_tail(arguments),
            Self::Join => builtin_join(arguments),
            Self::Eval => builtin_eval(arguments, environment),
            Self::Cons => builtin_cons(arguments),
            Self::Len => builtin_len(arguments),
            Self::Init => builtin_init(arguments),
            Self::Def => {
                let global = environment.global_of().ok_or_else(LispError::unbound_symbol)?;
                builtin_define(self, arguments, &global)
            }
            Self::LocalDef => builtin_define(self, arguments, environment),
            Self::Lambda => builtin_lambda(arguments),
            Self::Fun => builtin_fun(arguments, environment),
            Self::Greater | Self::GreaterEq | Self::Less | Self::LessEq => builtin_ordering(self, arguments),
            Self::Eq | Self::NotEq => builtin_equality(self, arguments),
            Self::If => builtin_if(arguments, environment),
            Self::Not | Self::NotWord => builtin_not(self, arguments),
            Self::Or | Self::OrWord | Self::And | Self::AndWord => builtin_logical(self, arguments),
            Self::Load => builtin_load(self, arguments, environment),
            Self::Print => builtin_print(arguments, &mut std::io::stdout()),
            Self::Error => builtin_error(self, arguments),
        }
    }
}

pub(crate) fn builtin_environment() -> Rc<Environment> {
    let environment = Environment::global();
    for builtin in Builtin::ALL {
        environment.define(builtin.name(), Value::Builtin(builtin));
    }
    environment
}

#[derive(Debug, Clone, Copy)]
enum Numeric {
    Number(i64),
    Decimal(f64),
}

fn number_operation(operation: Builtin, a: i64, b: i64) -> Result<i64, LispError> {
    match operation {
        Builtin::Add => Ok(a.wrapping_add(b)),
        Builtin::Subtract => Ok(a.wrapping_sub(b)),
        Builtin::Multiply => Ok(a.wrapping_mul(b)),
        Builtin::Divide if b == 0 => Err(LispError::division_by_zero()),
        Builtin::Divide => Ok(a.wrapping_div(b)),
        Builtin::Modulo if b == 0 => Err(LispError::division_by_zero()),
        Builtin::Modulo => Ok(a.wrapping_rem(b)),
        // Computed in floating point and truncated
        Builtin::Power => Ok((a as f64).powf(b as f64) as i64),
        Builtin::Min => Ok(a.min(b)),
        Builtin::Max => Ok(a.max(b)),
        _ => Err(LispError::invalid_operator()),
    }
}

fn decimal_operation(operation: Builtin, a: f64, b: f64) -> Result<f64, LispError> {
    match operation {
        Builtin::Add => Ok(a + b),
        Builtin::Subtract => Ok(a - b),
        Builtin::Multiply => Ok(a * b),
        Builtin::Divide if b == 0.0 => Err(LispError::division_by_zero()),
        Builtin::Divide => Ok(a / b),
        Builtin::Modulo => Err(LispError::incompatible_types()),
        Builtin::Power => Ok(a.powf(b)),
        Builtin::Min => Ok(if a < b { a } else { b }),
        Builtin::Max => Ok(if a > b { a } else { b }),
        _ => Err(LispError::invalid_operator()),
    }
}

fn builtin_numeric(operation: Builtin, arguments: Vec<Value>) -> EvaluationResult {
    let name = operation.name();
    if arguments.is_empty() { return Err(LispError::at_least_one(name)); }

    // One decimal operand turns the whole computation decimal
    let decimal = arguments.iter().any(|argument| matches!(argument, Value::Decimal(_)));
    let monomorphic = matches!(operation, Builtin::Min | Builtin::Max);

    let mut previous_decimal = None;
    let mut result = None;
    for (index, argument) in arguments.iter().enumerate() {
        let operand = match (argument, decimal) {
            (Value::Number(number), false) => Numeric::Number(*number),
            (Value::Number(number), true) => Numeric::Decimal(*number as f64),
            (Value::Decimal(value), _) => Numeric::Decimal(*value),
            (other, _) => return Err(LispError::argument_type(index + 1, name, "Number or Decimal", other.type_name())),
        };

        let is_decimal = matches!(argument, Value::Decimal(_));
        if monomorphic && previous_decimal.is_some_and(|previous| previous != is_decimal) {
            return Err(LispError::incompatible_types());
        }
        previous_decimal = Some(is_decimal);

        result = Some(match (result, operand) {
            (None, operand) => operand,
            (Some(Numeric::Number(a)), Numeric::Number(b)) => Numeric::Number(number_operation(operation, a, b)?),
            (Some(Numeric::Decimal(a)), Numeric::Decimal(b)) => Numeric::Decimal(decimal_operation(operation, a, b)?),
            _ => return Err(LispError::incompatible_types()),
        });
    }

    let negate = operation == Builtin::Subtract && arguments.len() == 1;
    match result {
        Some(Numeric::Number(number)) => Ok(Value::Number(if negate { number.wrapping_neg() } else { number })),
        Some(Numeric::Decimal(value)) => Ok(Value::Decimal(if negate { -value } else { value })),
        None => Err(LispError::at_least_one(name)),
    }
}

fn builtin_ordering(operation: Builtin, arguments: Vec<Value>) -> EvaluationResult {
    let [first, second] = <[Value; 2]>::try_from(arguments)
        .map_err(|_| LispError::exactly(2, operation.name()))?;

    let ordering = match (&first, &second) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
        (a, b) if a.type_name() != b.type_name() => {
            return Err(LispError::new(ErrorKind::IncompatibleTypes, "arguments must be of same type"))
        }
        _ => {
            return Err(LispError::new(
                ErrorKind::IncompatibleTypes,
                "arguments must be of numeric type(Number or Decimal)",
            ))
        }
    };

    let holds = ordering.is_some_and(|ordering| match operation {
        Builtin::Greater => ordering.is_gt(),
        Builtin::GreaterEq => ordering.is_ge(),
        Builtin::Less => ordering.is_lt(),
        _ => ordering.is_le(),
    });
    Ok(Value::Number(holds as i64))
}

fn builtin_equality(operation: Builtin, arguments: Vec<Value>) -> EvaluationResult {
    let [first, second] = <[Value; 2]>::try_from(arguments)
        .map_err(|_| LispError::exactly(2, operation.name()))?;

    let equal = first == second;
    Ok(Value::Boolean(if operation == Builtin::NotEq { !equal } else { equal }))
}

/// Unpacks the argument list of a builtin taking exactly one Q-expression.
fn single_qexpr(operation: Builtin, arguments: Vec<Value>) -> Result<Vec<Value>, LispError> {
    let [argument] = <[Value; 1]>::try_from(arguments)
        .map_err(|arguments| LispError::argument_count(operation.name(), 1, arguments.len()))?;

    match argument {
        Value::QExpr(children) => Ok(children),
        other => Err(LispError::argument_type(1, operation.name(), "Q-expression", other.type_name())),
    }
}

fn builtin_head(arguments: Vec<Value>) -> EvaluationResult {
    let children = single_qexpr(Builtin::Head, arguments)?;
    Ok(Value::QExpr(children.into_iter().take(1).collect()))
}

fn builtin_tail(arguments: Vec<Value>) -> EvaluationResult {
    let children = single_qexpr(Builtin::Tail, arguments)?;
    Ok(Value::QExpr(children.into_iter().skip(1).collect()))
}

fn builtin_init(arguments: Vec<Value>) -> EvaluationResult {
    let mut children = single_qexpr(Builtin::Init, arguments)?;
    children.pop();
    Ok(Value::QExpr(children))
}

fn builtin_len(arguments: Vec<Value>) -> EvaluationResult {
    let children = single_qexpr(Builtin::Len, arguments)?;
    Ok(Value::Number(children.len() as i64))
}

fn builtin_join(arguments: Vec<Value>) -> EvaluationResult {
    if arguments.is_empty() { return Err(LispError::at_least_one(Builtin::Join.name())); }

    let mut joined = Vec::new();
    for (index, argument) in arguments.into_iter().enumerate() {
        match argument {
            Value::QExpr(children) => joined.extend(children),
            other => return Err(LispError::argument_type(index + 1, Builtin::Join.name(), "Q-expression", other.type_name())),
        }
    }
    Ok(Value::QExpr(joined))
}

fn builtin_cons(arguments: Vec<Value>) -> EvaluationResult {
    let [head, list] = <[Value; 2]>::try_from(arguments)
        .map_err(|arguments| LispError::argument_count(Builtin::Cons.name(), 2, arguments.len()))?;

    match list {
        Value::QExpr(mut children) => {
            children.insert(0, head);
            Ok(Value::QExpr(children))
        }
        other => Err(LispError::argument_type(2, Builtin::Cons.name(), "Q-expression", other.type_name())),
    }
}

/// Turns quoted data into code: the Q-expression is re-tagged as an
/// S-expression and evaluated in the current scope.
fn builtin_eval(arguments: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    let children = single_qexpr(Builtin::Eval, arguments)?;
    evaluate(Value::SExpr(children), environment)
}

fn builtin_define(operation: Builtin, arguments: Vec<Value>, target: &Environment) -> EvaluationResult {
    let name = operation.name();
    let mut arguments = arguments.into_iter();

    let symbols = match arguments.next() {
        Some(Value::QExpr(symbols)) => symbols,
        Some(other) => return Err(LispError::argument_type(1, name, "Q-expression", other.type_name())),
        None => return Err(LispError::at_least_one(name)),
    };
    let values = arguments.collect_vec();

    if symbols.len() != values.len() {
        return Err(LispError::new(
            ErrorKind::ArityMismatch,
            format!("Invalid number of values for defining variables: expected {}, got {}", symbols.len(), values.len()),
        ));
    }

    let names = symbols.into_iter()
        .map(|symbol| match symbol {
            Value::Symbol(symbol) => match target.lookup(&symbol) {
                Ok(Value::Builtin(builtin)) => Err(LispError::new(
                    ErrorKind::BuiltinRedefinition,
                    format!("Builtin {} not allowed to be redefined", builtin.name()),
                )),
                _ => Ok(symbol),
            },
            other => Err(LispError::new(
                ErrorKind::InvalidDefinition,
                format!("Invalid type for variable name: expected Symbol, got {}", other.type_name()),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (symbol, value) in names.into_iter().zip(values) {
        target.define(&symbol, value);
    }

    Ok(Value::unit())
}

fn builtin_lambda(arguments: Vec<Value>) -> EvaluationResult {
    match <[Value; 2]>::try_from(arguments) {
        Ok([Value::QExpr(formals), Value::QExpr(body)]) => Ok(Value::Function(Lambda::new(formals, body)?)),
        _ => Err(LispError::definition(FUNCTION_DEFINITION)),
    }
}

/// `fun {name formals...} {body}`: builds the function and binds it globally.
fn builtin_fun(arguments: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    let (mut signature, body) = match <[Value; 2]>::try_from(arguments) {
        Ok([Value::QExpr(signature), Value::QExpr(body)]) if !signature.is_empty() => (signature, body),
        _ => return Err(LispError::definition(FUNCTION_DEFINITION)),
    };

    let name = match signature.remove(0) {
        Value::Symbol(name) => name,
        _ => return Err(LispError::definition(FUNCTION_DEFINITION)),
    };

    let function = Lambda::new(signature, body)?;
    debug!(function = %name, "defining function");
    Builtin::Def.call(
        vec![Value::QExpr(vec![Value::Symbol(name)]), Value::Function(function)],
        environment,
    )
}

fn builtin_if(arguments: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    let [condition, consequent, alternative] = <[Value; 3]>::try_from(arguments)
        .map_err(|_| LispError::new(ErrorKind::ArityMismatch, "if: required 3 arguments"))?;

    let condition = condition.truthiness().ok_or_else(|| LispError::new(
        ErrorKind::IncompatibleTypes,
        "if: argument 0 should be Number or Boolean",
    ))?;

    let branch = match (consequent, alternative) {
        (Value::QExpr(consequent), Value::QExpr(alternative)) => if condition { consequent } else { alternative },
        (Value::QExpr(_), _) => return Err(LispError::new(ErrorKind::IncompatibleTypes, "if: argument 2 should be Q-expression")),
        _ => return Err(LispError::new(ErrorKind::IncompatibleTypes, "if: argument 1 should be Q-expression")),
    };

    evaluate(Value::SExpr(branch), environment)
}

fn builtin_not(operation: Builtin, arguments: Vec<Value>) -> EvaluationResult {
    let [argument] = <[Value; 1]>::try_from(arguments)
        .map_err(|arguments| LispError::argument_count(operation.name(), 1, arguments.len()))?;

    argument.truthiness()
        .map(|truth| Value::Boolean(!truth))
        .ok_or_else(|| LispError::argument_type(1, operation.name(), "Number or Boolean", argument.type_name()))
}

// Stops looking, including type checking, once the outcome is known
fn builtin_logical(operation: Builtin, arguments: Vec<Value>) -> EvaluationResult {
    if arguments.is_empty() { return Err(LispError::at_least_one(operation.name())); }

    let conjunction = matches!(operation, Builtin::And | Builtin::AndWord);
    for (index, argument) in arguments.iter().enumerate() {
        let truth = argument.truthiness()
            .ok_or_else(|| LispError::argument_type(index + 1, operation.name(), "Number or Boolean", argument.type_name()))?;

        if truth != conjunction {
            return Ok(Value::Boolean(truth));
        }
    }

    Ok(Value::Boolean(conjunction))
}

fn builtin_load(operation: Builtin, arguments: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    let [argument] = <[Value; 1]>::try_from(arguments)
        .map_err(|arguments| LispError::argument_count(operation.name(), 1, arguments.len()))?;

    match argument {
        Value::String(path) => {
            let global = environment.global_of().ok_or_else(LispError::unbound_symbol)?;
            load_path(Path::new(&path), &global, &mut std::io::stdout())
        }
        other => Err(LispError::argument_type(1, operation.name(), "String", other.type_name())),
    }
}

/// Reads, parses and evaluates a file expression by expression in `global`.
/// Failures of single expressions are reported to `out` and do not stop the
/// load.
pub(crate) fn load_path(path: &Path, global: &Rc<Environment>, out: &mut impl Write) -> EvaluationResult {
    info!(path = %path.display(), "loading file");

    let source = std::fs::read_to_string(path).map_err(|error| LispError::new(
        ErrorKind::Load,
        format!("{}: {}", path.display(), error),
    ))?;
    let root = parse(&source).map_err(|error| LispError::new(
        ErrorKind::Load,
        format!("{}: {}", path.display(), error),
    ))?;

    let expressions = match Value::from_node(&root) {
        Some(Value::Root(expressions)) => expressions,
        _ => return Err(LispError::new(ErrorKind::Load, format!("{}: invalid root lisp value", path.display()))),
    };

    for expression in expressions {
        if let Err(error) = evaluate(expression, global) {
            debug!(path = %path.display(), %error, "expression failed while loading");
            writeln!(out, "error: {}", error).map_err(LispError::io)?;
        }
    }

    Ok(Value::unit())
}

fn builtin_print(arguments: Vec<Value>, out: &mut impl Write) -> EvaluationResult {
    writeln!(out, "{}", arguments.iter().join(" ")).map_err(LispError::io)?;
    Ok(Value::unit())
}

fn builtin_error(operation: Builtin, arguments: Vec<Value>) -> EvaluationResult {
    let [argument] = <[Value; 1]>::try_from(arguments)
        .map_err(|arguments| LispError::argument_count(operation.name(), 1, arguments.len()))?;

    match argument {
        Value::String(message) => Err(LispError::user(message)),
        other => Err(LispError::argument_type(1, operation.name(), "String", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Interpreter;

    use super::*;

    fn source_file(lines: &[&str]) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(".lisp").tempfile()?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(file)
    }

    fn numbers(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Number).collect()
    }

    #[test]
    fn names_are_unique() {
        let names = Builtin::ALL.iter().map(|builtin| builtin.name()).collect_vec();
        assert_eq!(names.iter().unique().count(), names.len());
    }

    #[test]
    fn integer_arithmetic_wraps_and_truncates() -> anyhow::Result<()> {
        assert_eq!(builtin_numeric(Builtin::Add, numbers(&[i64::MAX, 1]))?, Value::Number(i64::MIN));
        assert_eq!(builtin_numeric(Builtin::Power, numbers(&[2, -1]))?, Value::Number(0));
        assert_eq!(builtin_numeric(Builtin::Modulo, numbers(&[-7, 3]))?, Value::Number(-1));
        Ok(())
    }

    #[test]
    fn unary_forms() -> anyhow::Result<()> {
        assert_eq!(builtin_numeric(Builtin::Subtract, numbers(&[4]))?, Value::Number(-4));
        assert_eq!(builtin_numeric(Builtin::Divide, numbers(&[4]))?, Value::Number(4));
        assert_eq!(builtin_numeric(Builtin::Max, vec![Value::Decimal(0.5)])?, Value::Decimal(0.5));
        Ok(())
    }

    #[test]
    fn promotion_happens_before_folding() -> anyhow::Result<()> {
        let result = builtin_numeric(Builtin::Divide, vec![Value::Number(7), Value::Number(2), Value::Decimal(1.0)])?;
        assert_eq!(result, Value::Decimal(3.5));
        Ok(())
    }

    #[test]
    fn numeric_errors() {
        let empty = builtin_numeric(Builtin::Add, vec![]);
        assert_eq!(empty.map_err(|e| e.message), Err("Expected at least one argument for +".to_owned()));

        let zero = builtin_numeric(Builtin::Modulo, numbers(&[1, 0]));
        assert_eq!(zero.map_err(|e| e.kind), Err(ErrorKind::DivisionByZero));

        let symbol = builtin_numeric(Builtin::Multiply, vec![Value::Number(1), Value::symbol("x")]);
        assert_eq!(symbol.map_err(|e| e.kind), Err(ErrorKind::IncompatibleTypes));
    }

    #[test]
    fn ordering_returns_numbers() -> anyhow::Result<()> {
        assert_eq!(builtin_ordering(Builtin::Less, numbers(&[1, 2]))?, Value::Number(1));
        assert_eq!(builtin_ordering(Builtin::Greater, vec![Value::Decimal(1.0), Value::Decimal(2.0)])?, Value::Number(0));
        Ok(())
    }

    #[test]
    fn list_builtins_take_ownership() -> anyhow::Result<()> {
        let list = Value::QExpr(numbers(&[1, 2, 3]));
        assert_eq!(builtin_tail(vec![list.clone()])?, Value::QExpr(numbers(&[2, 3])));
        assert_eq!(builtin_init(vec![Value::QExpr(vec![])])?, Value::QExpr(vec![]));
        assert_eq!(builtin_cons(vec![Value::Number(0), list])?, Value::QExpr(numbers(&[0, 1, 2, 3])));
        Ok(())
    }

    #[test]
    fn definition_is_all_or_nothing() {
        let global = builtin_environment();
        let arguments = vec![
            Value::QExpr(vec![Value::symbol("fresh"), Value::symbol("min")]),
            Value::Number(1),
            Value::Number(2),
        ];

        let result = builtin_define(Builtin::Def, arguments, &global);
        assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::BuiltinRedefinition));
        assert!(!global.exists("fresh"));
    }

    #[test]
    fn fun_binds_in_the_global_scope() -> anyhow::Result<()> {
        let global = builtin_environment();
        let frame = Environment::child(&global, Default::default());
        let arguments = vec![
            Value::QExpr(vec![Value::symbol("id"), Value::symbol("x")]),
            Value::QExpr(vec![Value::symbol("x")]),
        ];

        assert_eq!(builtin_fun(arguments, &frame)?, Value::unit());
        assert!(matches!(global.lookup("id")?, Value::Function(_)));
        Ok(())
    }

    #[test]
    fn logical_builtins_short_circuit_type_checks() -> anyhow::Result<()> {
        let skipped = vec![Value::Boolean(false), Value::symbol("never checked")];
        assert_eq!(builtin_logical(Builtin::AndWord, skipped)?, Value::Boolean(false));

        let all_true = vec![Value::Number(2), Value::Boolean(true)];
        assert_eq!(builtin_logical(Builtin::And, all_true)?, Value::Boolean(true));

        let none = builtin_logical(Builtin::Or, vec![]);
        assert_eq!(none.map_err(|e| e.kind), Err(ErrorKind::ArityMismatch));
        Ok(())
    }

    #[test]
    fn error_builtin_raises_user_errors() {
        let result = builtin_error(Builtin::Error, vec![Value::String("custom".to_owned())]);
        assert!(result.is_err_and(|error| error.is_user_raised() && error.message == "custom"));
    }

    #[test]
    fn print_writes_one_space_separated_line() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let arguments = vec![
            Value::String("a b".to_owned()),
            Value::Number(1),
            Value::QExpr(numbers(&[2, 3])),
            Value::Decimal(0.5),
        ];

        assert_eq!(builtin_print(arguments, &mut out)?, Value::unit());
        assert_eq!(String::from_utf8(out)?, "\"a b\" 1 {2 3} 0.500000\n");

        let mut out = Vec::new();
        builtin_print(vec![], &mut out)?;
        assert_eq!(out, b"\n");
        Ok(())
    }

    #[test]
    fn load_reports_each_failing_expression() -> anyhow::Result<()> {
        let file = source_file(&[
            "(def {a} 1)",
            "(/ a 0)",
            "(undefined)",
            "(error \"custom\") ; user error",
            "(def {b} (+ a 1))",
        ])?;

        let global = builtin_environment();
        let mut out = Vec::new();
        assert_eq!(load_path(file.path(), &global, &mut out)?, Value::unit());
        assert_eq!(
            String::from_utf8(out)?,
            "error: Division by zero\nerror: Unbound symbol\nerror: custom\n",
        );
        assert_eq!(global.lookup("b")?, Value::Number(2));
        Ok(())
    }

    #[test]
    fn load_fails_on_unparsable_files() -> anyhow::Result<()> {
        let file = source_file(&["(def {a} 1", "(def {b} 2)"])?;

        let global = builtin_environment();
        let mut out = Vec::new();
        let result = load_path(file.path(), &global, &mut out);
        assert_eq!(result.map_err(|e| e.kind), Err(ErrorKind::Load));
        assert!(out.is_empty());
        assert!(!global.exists("b"));
        Ok(())
    }

    #[test]
    fn load_from_a_call_frame_binds_globally() -> anyhow::Result<()> {
        let file = source_file(&["(= {loaded} 5)", "(fun {from-file x} {* x loaded})"])?;
        let path = file.path().display().to_string();

        let mut interpreter = Interpreter::new();
        interpreter.evaluate_str("fun {load-it p} {load p}")?;
        assert_eq!(interpreter.evaluate_str(&format!("load-it \"{}\"", path))?, Value::unit());

        assert!(interpreter.exists("loaded"));
        assert!(!interpreter.exists("p"));
        assert_eq!(interpreter.evaluate_str("from-file 3")?, Value::Number(15));
        Ok(())
    }
}
