mod builtin;
mod context;
mod environment;
mod error;
mod interpreter;
mod parser;
mod stack;
mod value;

#[cfg(test)]
mod test_utils;

pub use builtin::Builtin;
pub use context::Interpreter;
pub use environment::{Bindings, Environment};
pub use error::{ErrorKind, LispError, LispyError};
pub use parser::{parse, Node, NodeKind};
pub use value::{Lambda, Value};
