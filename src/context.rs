use std::{path::Path, rc::Rc};

use tracing::debug;

use crate::{
    builtin::{builtin_environment, load_path},
    environment::Environment,
    error::{LispError, LispyError},
    interpreter::{evaluate_root, EvaluationResult},
    parser::parse,
    value::Value,
};

/// A session: the global environment with every builtin bound, and the
/// entry points the REPL and the batch loader drive it through.
///
/// Definitions made by one call are visible to every later call.
pub struct Interpreter {
    global: Rc<Environment>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self { global: builtin_environment() }
    }

    /// Evaluates an already folded line. Only a Root value is accepted.
    pub fn evaluate_root(&mut self, root: Value) -> Result<Value, LispError> {
        evaluate_root(root, &self.global)
    }

    pub fn evaluate_str(&mut self, source: &str) -> Result<Value, LispyError> {
        let root = parse(source)?;
        let root = Value::from_node(&root)
            .ok_or_else(|| LispyError::Syntax("nothing to evaluate".to_owned()))?;

        debug!(source, "evaluating line");
        Ok(self.evaluate_root(root)?)
    }

    /// Loads a source file into the global scope. Failing expressions are
    /// reported on stdout and skipped; an unreadable or unparsable file is an
    /// error value.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Value {
        let result: EvaluationResult = load_path(path.as_ref(), &self.global, &mut std::io::stdout());
        result.unwrap_or_else(Value::Error)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.global.exists(name)
    }

    /// The global bindings in the order they were first made.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.global.bindings()
    }
}
