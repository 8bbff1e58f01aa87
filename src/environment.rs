use std::{cell::RefCell, rc::{Rc, Weak}};

use tracing::trace;

use crate::{error::LispError, value::Value};

/// Ordered symbol to value mapping. Rebinding a name replaces its value in
/// place, a new name is appended.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter()
            .find(|(symbol, _)| symbol == name)
            .map(|(_, value)| value)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        match self.entries.iter_mut().find(|(symbol, _)| symbol == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_owned(), value)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(symbol, value)| (symbol.as_str(), value))
    }
}

#[derive(Debug)]
enum Parent {
    // Marks the true global scope
    Global,
    Frame(Weak<Environment>),
}

/// A scope in the chain from a call frame up to the global environment.
///
/// The parent link never owns: a frame only lives while the code that created
/// it, and therefore its caller's scope, is still running.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<Bindings>,
    parent: Parent,
}

impl Environment {
    pub fn global() -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(Bindings::default()),
            parent: Parent::Global,
        })
    }

    pub fn child(parent: &Rc<Self>, bindings: Bindings) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(bindings),
            parent: Parent::Frame(Rc::downgrade(parent)),
        })
    }

    fn parent(&self) -> Option<Rc<Self>> {
        match &self.parent {
            Parent::Global => None,
            Parent::Frame(parent) => parent.upgrade(),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.parent, Parent::Global)
    }

    pub fn define(&self, name: &str, value: Value) {
        trace!(symbol = name, global = self.is_global(), "binding symbol");
        self.bindings.borrow_mut().set(name, value);
    }

    /// Returns a copy of the nearest binding of `name`, searching outwards.
    pub fn lookup(&self, name: &str) -> Result<Value, LispError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone())
        }

        let mut scope = self.parent();
        while let Some(environment) = scope {
            if let Some(value) = environment.bindings.borrow().get(name) {
                return Ok(value.clone())
            }
            scope = environment.parent();
        }

        Err(LispError::unbound_symbol())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// The outermost scope of the chain, where `def` binds.
    pub fn global_of(self: &Rc<Self>) -> Option<Rc<Self>> {
        let mut environment = Rc::clone(self);
        while !environment.is_global() {
            environment = environment.parent()?;
        }
        Some(environment)
    }

    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.bindings.borrow().iter()
            .map(|(symbol, value)| (symbol.to_owned(), value.clone()))
            .collect()
    }
}
