// Environment for variable bindings and scope management

use crate::ast::Symbol;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of the scope chain. Frames are shared through `Rc` so that
/// closures and child frames keep their ancestors alive; bindings sit behind
/// a `RefCell` because `define` and `set!` mutate shared frames.
#[derive(Debug, Default)]
pub struct Environment {
    parent: Option<Rc<Environment>>,
    bindings: RefCell<HashMap<String, Value>>,
}

impl Environment {
    /// Creates a new, empty root environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new child environment that inherits from a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Self {
        Environment {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        }
    }

    pub fn child(self: &Rc<Self>) -> Rc<Environment> {
        Rc::new(Environment::with_parent(Rc::clone(self)))
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Looks up a symbol in this frame, then in its ancestors.
    pub fn lookup(&self, name: &Symbol) -> RuntimeResult<Value> {
        self.try_lookup(name)
            .ok_or_else(|| RuntimeError::UndefinedSymbol(name.clone()))
    }

    pub fn try_lookup(&self, name: &Symbol) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(&name.0) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.try_lookup(name))
    }

    /// Binds `name` in this frame, shadowing any ancestor binding.
    pub fn define(&self, name: &Symbol, value: Value) -> Value {
        self.bindings
            .borrow_mut()
            .insert(name.0.clone(), value.clone());
        value
    }

    /// Rebinds `name` in the nearest frame that already binds it.
    pub fn set(&self, name: &Symbol, value: Value) -> RuntimeResult<Value> {
        if let Some(slot) = self.bindings.borrow_mut().get_mut(&name.0) {
            *slot = value.clone();
            return Ok(value);
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => Err(RuntimeError::UndefinedSymbol(name.clone())),
        }
    }

    /// Whether this frame (ignoring ancestors) binds `name`.
    pub fn contains(&self, name: &Symbol) -> bool {
        self.bindings.borrow().contains_key(&name.0)
    }

    pub fn symbol_names(&self) -> Vec<String> {
        let mut names = self.bindings.borrow().keys().cloned().collect::<Vec<_>>();

        if let Some(parent) = &self.parent {
            names.append(&mut parent.symbol_names());
        }

        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    #[test]
    fn test_lookup_walks_ancestors() {
        let root = Rc::new(Environment::new());
        root.define(&sym("x"), Value::from(1));
        let child = root.child();
        let grandchild = child.child();

        assert_eq!(grandchild.lookup(&sym("x")), Ok(Value::from(1)));
        assert_eq!(
            grandchild.lookup(&sym("y")),
            Err(RuntimeError::UndefinedSymbol(sym("y")))
        );
    }

    #[test]
    fn test_define_shadows_without_touching_parent() {
        let root = Rc::new(Environment::new());
        root.define(&sym("x"), Value::from(1));
        let child = root.child();
        child.define(&sym("x"), Value::from(2));

        assert_eq!(child.lookup(&sym("x")), Ok(Value::from(2)));
        assert_eq!(root.lookup(&sym("x")), Ok(Value::from(1)));
    }

    #[test]
    fn test_set_mutates_nearest_binding_frame() {
        let root = Rc::new(Environment::new());
        root.define(&sym("x"), Value::from(1));
        let child = root.child();

        assert_eq!(child.set(&sym("x"), Value::from(5)), Ok(Value::from(5)));
        assert_eq!(root.lookup(&sym("x")), Ok(Value::from(5)));
        assert!(!child.contains(&sym("x")));
    }

    #[test]
    fn test_set_unbound_is_error() {
        let root = Rc::new(Environment::new());
        assert_eq!(
            root.child().set(&sym("nope"), Value::Nil),
            Err(RuntimeError::UndefinedSymbol(sym("nope")))
        );
        assert!(root.symbol_names().is_empty());
    }
}
