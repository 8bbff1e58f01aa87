use thiserror::Error;

/// Failures that surface at the host boundary: the REPL, the batch loader and
/// anything else that drives an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LispyError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{0}")]
    Evaluation(String),
}

impl From<LispError> for LispyError {
    fn from(error: LispError) -> Self {
        Self::Evaluation(error.message)
    }
}

pub(crate) const INVALID_OPERATOR: &str = "Invalid Operator";
pub(crate) const DIVISION_BY_ZERO: &str = "Division by zero";
pub(crate) const BAD_NUMERIC_VALUE: &str = "Bad numeric value";
pub(crate) const INCOMPATIBLE_TYPES: &str = "Incompatible types for operation";
pub(crate) const UNBOUND_SYMBOL: &str = "Unbound symbol";
pub(crate) const FUNCTION_DEFINITION: &str = "error defining function";
pub(crate) const VARARGS_DEFINITION: &str = "error defining function: invalid varargs definition";
pub(crate) const FUNCTION_EVALUATION: &str = "error evaluating function";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidOperator,
    DivisionByZero,
    BadNumericLiteral,
    IncompatibleTypes,
    ArityMismatch,
    UnboundSymbol,
    InvalidDefinition,
    BuiltinRedefinition,
    Load,
    Io,
    UserRaised,
}

/// An error as the language sees it.
///
/// Internal errors short-circuit evaluation and are reported at the session
/// boundary. Errors produced by the `error` builtin are flagged as user raised
/// and travel through evaluation with their text untouched.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LispError {
    pub kind: ErrorKind,
    pub message: String,
}

impl LispError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserRaised, message)
    }

    pub fn is_user_raised(&self) -> bool {
        self.kind == ErrorKind::UserRaised
    }

    pub(crate) fn invalid_operator() -> Self {
        Self::new(ErrorKind::InvalidOperator, INVALID_OPERATOR)
    }

    pub(crate) fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, DIVISION_BY_ZERO)
    }

    pub(crate) fn bad_numeric_value() -> Self {
        Self::new(ErrorKind::BadNumericLiteral, BAD_NUMERIC_VALUE)
    }

    pub(crate) fn incompatible_types() -> Self {
        Self::new(ErrorKind::IncompatibleTypes, INCOMPATIBLE_TYPES)
    }

    pub(crate) fn unbound_symbol() -> Self {
        Self::new(ErrorKind::UnboundSymbol, UNBOUND_SYMBOL)
    }

    pub(crate) fn argument_type(position: usize, operation: &str, expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::IncompatibleTypes,
            format!("Incompatible type for argument {position} of {operation}: expected {expected}, got {got}"),
        )
    }

    pub(crate) fn argument_count(operation: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("Invalid number of arguments for {operation}: expected: {expected}, got {got}"),
        )
    }

    pub(crate) fn at_least_one(operation: &str) -> Self {
        Self::new(ErrorKind::ArityMismatch, format!("Expected at least one argument for {operation}"))
    }

    pub(crate) fn exactly(count: usize, operation: &str) -> Self {
        Self::new(ErrorKind::ArityMismatch, format!("Expected exactly {count} argument for {operation}"))
    }

    pub(crate) fn definition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefinition, message)
    }

    pub(crate) fn io(error: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, error.to_string())
    }
}

// Errors compare by text only, which is what `==` between two error values means.
impl PartialEq for LispError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_compare_by_message() {
        let a = LispError::new(ErrorKind::Load, "boom");
        let b = LispError::user("boom");
        assert_eq!(a, b);
        assert_ne!(a, LispError::division_by_zero());
    }

    #[test]
    fn host_errors_render_their_message() {
        let raised = LispError::user("boom");
        assert_eq!(raised.to_string(), "boom");
        assert!(std::error::Error::source(&raised).is_none());

        let error: LispyError = LispError::unbound_symbol().into();
        assert_eq!(error.to_string(), "Unbound symbol");
        assert_eq!(LispyError::Syntax("unexpected `)`".into()).to_string(), "syntax error: unexpected `)`");
    }
}
