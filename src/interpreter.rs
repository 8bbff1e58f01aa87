use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    environment::Environment,
    error::{ErrorKind, LispError, FUNCTION_EVALUATION},
    stack::ensure_sufficient_stack,
    value::{Lambda, Value},
};

pub(crate) type EvaluationResult = Result<Value, LispError>;

/// Evaluates `value` in `environment`, consuming it.
///
/// Symbols are looked up, S-expressions are evaluated child by child from left
/// to right and then applied. The first failing child stops the whole
/// expression, later children are never evaluated. Everything else, including
/// Q-expressions, evaluates to itself.
pub(crate) fn evaluate(value: Value, environment: &Rc<Environment>) -> EvaluationResult {
    ensure_sufficient_stack(|| match value {
        Value::Symbol(symbol) => environment.lookup(&symbol),
        Value::Error(error) => Err(error),
        Value::SExpr(children) | Value::Root(children) => evaluate_expression(children, environment),
        other => Ok(other),
    })
}

fn evaluate_expression(children: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    if children.len() < 2 {
        return match children.into_iter().next() {
            Some(child) => evaluate(child, environment),
            None => Ok(Value::unit()),
        }
    }

    let evaluated = children.into_iter()
        .map(|child| evaluate(child, environment))
        .collect::<Result<Vec<_>, _>>()?;

    apply(evaluated, environment)
}

/// Calls the first element of `expression` with the rest as its arguments.
fn apply(mut expression: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    let arguments = expression.split_off(1);
    let Some(operator) = expression.pop() else { return Err(LispError::invalid_operator()) };

    match operator {
        Value::Builtin(builtin) => {
            trace!(builtin = builtin.name(), arguments = arguments.len(), "calling builtin");
            builtin.call(arguments, environment)
        }
        Value::Function(lambda) => call(lambda, arguments, environment),
        _ => Err(LispError::invalid_operator()),
    }
}

/// Binds `arguments` to the formals of `lambda` and runs its body in a new
/// frame below the calling environment.
///
/// Too few arguments yields a new function with the supplied ones captured.
/// Too many is an error unless the function takes a variadic tail, which then
/// receives the surplus as a Q-expression.
fn call(lambda: Lambda, arguments: Vec<Value>, environment: &Rc<Environment>) -> EvaluationResult {
    let Lambda { mut formals, variadic, body, mut captured } = lambda;

    if arguments.len() > formals.len() && variadic.is_none() {
        return Err(LispError::new(ErrorKind::ArityMismatch, FUNCTION_EVALUATION));
    }

    let supplied = arguments.len().min(formals.len());
    let mut arguments = arguments.into_iter();
    for (formal, argument) in formals.drain(..supplied).zip(arguments.by_ref()) {
        captured.set(&formal, argument);
    }

    if !formals.is_empty() {
        debug!(remaining = formals.len(), "partially applied function");
        return Ok(Value::Function(Lambda { formals, variadic, body, captured }));
    }

    if let Some(variadic) = variadic {
        captured.set(&variadic, Value::QExpr(arguments.collect()));
    }

    debug!(bound = captured.len(), "calling function");
    evaluate(Value::SExpr(body), &Environment::child(environment, captured))
}

/// Evaluates a whole session line, which behaves as one S-expression without
/// the surrounding parentheses.
pub(crate) fn evaluate_root(root: Value, global: &Rc<Environment>) -> EvaluationResult {
    match root {
        Value::Root(_) => evaluate(root, global),
        _ => Err(LispError::new(ErrorKind::InvalidOperator, "invalid root lisp value")),
    }
}
