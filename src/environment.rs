//! Lexical environments: a parent-linked chain of scopes, mirroring
//! `original_source/interpreter/enviroment.c`'s `Eps_Env`.
//!
//! Function calls are parented to the *caller's* environment, not the
//! environment in effect where the function was declared; there are no
//! closures over mutable locals here, only the dynamic-scoping-like chain
//! the original interpreter implements.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::FuncDecl;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Block,
    Func,
}

#[derive(Debug, Clone)]
pub enum Binding {
    Var(Value),
    Func(Rc<FuncDecl>),
}

pub struct Environment {
    pub kind: ScopeKind,
    variables: RefCell<HashMap<String, Binding>>,
    enclosing: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new_global() -> Rc<Environment> {
        Rc::new(Environment {
            kind: ScopeKind::Global,
            variables: RefCell::new(HashMap::new()),
            enclosing: None,
        })
    }

    pub fn new_child(parent: &Rc<Environment>, kind: ScopeKind) -> Rc<Environment> {
        Rc::new(Environment {
            kind,
            variables: RefCell::new(HashMap::new()),
            enclosing: Some(Rc::clone(parent)),
        })
    }

    /// Defines a new binding in this scope, shadowing one of the same name
    /// in an enclosing scope. Redefinition within the same scope overwrites.
    pub fn define(&self, name: impl Into<String>, binding: Binding) {
        self.variables.borrow_mut().insert(name.into(), binding);
    }

    /// Looks up `name` in this scope only (no walk to enclosing scopes).
    pub fn get_local(&self, name: &str) -> Option<Binding> {
        self.variables.borrow().get(name).cloned()
    }

    /// Looks up `name` in this scope, then each enclosing scope in turn.
    pub fn get(&self, name: &str) -> Option<Binding> {
        if let Some(binding) = self.get_local(name) {
            return Some(binding);
        }

        self.enclosing.as_ref().and_then(|parent| parent.get(name))
    }

    /// Reassigns an existing binding, walking up to whichever scope defined
    /// it. Returns `false` if `name` is not bound anywhere in the chain.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if self.variables.borrow().contains_key(name) {
            self.variables
                .borrow_mut()
                .insert(name.to_owned(), Binding::Var(value));
            return true;
        }

        match &self.enclosing {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_sees_global_bindings() {
        let global = Environment::new_global();
        global.define("x", Binding::Var(Value::real(1.0, true)));

        let child = Environment::new_child(&global, ScopeKind::Block);
        assert!(matches!(child.get("x"), Some(Binding::Var(_))));
    }

    #[test]
    fn shadowing_does_not_touch_parent() {
        let global = Environment::new_global();
        global.define("x", Binding::Var(Value::real(1.0, true)));

        let child = Environment::new_child(&global, ScopeKind::Block);
        child.define("x", Binding::Var(Value::real(2.0, true)));

        assert_eq!(global.get_local("x").unwrap().as_var_real(), Some(1.0));
        assert_eq!(child.get_local("x").unwrap().as_var_real(), Some(2.0));
    }

    #[test]
    fn assign_walks_up_to_defining_scope() {
        let global = Environment::new_global();
        global.define("x", Binding::Var(Value::real(1.0, true)));

        let child = Environment::new_child(&global, ScopeKind::Block);
        assert!(child.assign("x", Value::real(9.0, true)));
        assert_eq!(global.get_local("x").unwrap().as_var_real(), Some(9.0));
    }

    #[test]
    fn assign_to_unbound_name_fails() {
        let global = Environment::new_global();
        assert!(!global.assign("missing", Value::real(1.0, true)));
    }
}

impl Binding {
    #[cfg(test)]
    fn as_var_real(&self) -> Option<f64> {
        match self {
            Binding::Var(v) => v.as_real(),
            Binding::Func(_) => None,
        }
    }
}
