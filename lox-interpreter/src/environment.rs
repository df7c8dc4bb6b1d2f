use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use lox_core::lexer::Token;

use crate::value::{RuntimeError, Value};

#[derive(Debug, Default)]
struct EnvironmentCore {
    values: HashMap<Rc<str>, Value>,
    enclosing: Option<Environment>,
}

/// A handle to one scope in the chain of lexical scopes.
///
/// Cloning the handle shares the scope. A scope keeps its enclosing scope
/// alive; nothing points from a scope to its children, so the chain can never
/// form a cycle.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    core: Rc<RefCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_enclosed(enclosing: &Environment) -> Self {
        Environment {
            core: Rc::new(RefCell::new(EnvironmentCore {
                values: HashMap::new(),
                enclosing: Some(enclosing.clone()),
            })),
        }
    }

    #[cfg(test)]
    pub(crate) fn enclosing(&self) -> Option<Environment> {
        self.core.borrow().enclosing.clone()
    }

    /// Binds `name` in this scope, replacing any binding it already had here.
    /// Bindings of the same name in enclosing scopes are left untouched.
    pub fn define(&self, name: Rc<str>, value: Value) {
        self.core.borrow_mut().values.insert(name, value);
    }

    /// Looks `name` up from this scope outwards.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        let mut scope = self.clone();
        loop {
            let enclosing = {
                let core = scope.core.borrow();
                if let Some(value) = core.values.get(name.lexeme.as_ref()) {
                    return Ok(value.clone());
                }
                core.enclosing.clone()
            };

            match enclosing {
                Some(enclosing) => scope = enclosing,
                None => return Err(RuntimeError::undefined_variable(name)),
            }
        }
    }

    /// Overwrites the innermost existing binding of `name`. Never creates one.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut scope = self.clone();
        loop {
            let enclosing = {
                let mut core = scope.core.borrow_mut();
                if let Some(slot) = core.values.get_mut(name.lexeme.as_ref()) {
                    *slot = value;
                    return Ok(());
                }
                core.enclosing.clone()
            };

            match enclosing {
                Some(enclosing) => scope = enclosing,
                None => return Err(RuntimeError::undefined_variable(name)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lox_core::lexer::TokenKind;

    use super::*;
    use crate::value::RuntimeErrorKind;

    fn name(lexeme: &str) -> Token {
        Token::new(TokenKind::Ident, lexeme, None, 1)
    }

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("a".into(), Value::Number(1.0));
        env.define("a".into(), Value::Number(2.0));

        assert_eq!(env.get(&name("a")), Ok(Value::Number(2.0)));
    }

    #[test]
    fn test_get_walks_outwards() {
        let globals = Environment::new();
        globals.define("a".into(), Value::Boolean(true));
        let inner = Environment::new_enclosed(&Environment::new_enclosed(&globals));

        assert_eq!(inner.get(&name("a")), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_shadowing_leaves_outer_binding() {
        let outer = Environment::new();
        outer.define("x".into(), Value::Number(1.0));
        let inner = Environment::new_enclosed(&outer);
        inner.define("x".into(), Value::Number(2.0));

        assert_eq!(inner.get(&name("x")), Ok(Value::Number(2.0)));
        assert_eq!(outer.get(&name("x")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_assign_updates_nearest_binding() {
        let outer = Environment::new();
        outer.define("x".into(), Value::Number(1.0));
        let inner = Environment::new_enclosed(&outer);

        inner.assign(&name("x"), Value::Nil).unwrap();

        assert_eq!(outer.get(&name("x")), Ok(Value::Nil));
        assert!(inner.core.borrow().values.is_empty());
    }

    #[test]
    fn test_assign_undefined_does_not_create_binding() {
        let outer = Environment::new();
        let inner = Environment::new_enclosed(&outer);

        let error = inner.assign(&name("y"), Value::Nil).unwrap_err();

        assert_eq!(error.kind, RuntimeErrorKind::UndefinedVariable("y".into()));
        assert!(inner.get(&name("y")).is_err());
        assert!(outer.get(&name("y")).is_err());
    }

    #[test]
    fn test_enclosing() {
        let outer = Environment::new();
        let inner = Environment::new_enclosed(&outer);

        assert!(outer.enclosing().is_none());
        assert!(Rc::ptr_eq(&inner.enclosing().unwrap().core, &outer.core));
    }
}
