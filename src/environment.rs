use std::collections::HashMap;
use std::fmt;

use gc::{Finalize, Gc, GcCell, Trace};

use crate::error::Error;
use crate::expr::Expr;

/// Symbol-to-value bindings. Cloning shares the same bindings; use
/// [`Environment::snapshot`] for an independent copy.
#[derive(Clone, Finalize, Trace)]
pub struct Environment(Gc<GcCell<HashMap<String, Expr>>>);

impl Environment {
    pub fn new() -> Environment {
        Environment::from_hashmap(HashMap::new())
    }

    pub fn from_hashmap(hmap: HashMap<String, Expr>) -> Environment {
        Environment(Gc::new(GcCell::new(hmap)))
    }

    pub fn lookup(&self, variable: &str) -> Option<Expr> {
        self.0.borrow().get(variable).cloned()
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.0.borrow().contains_key(variable)
    }

    /// Unconditional insert. Parameter binding relies on this to shadow.
    pub fn bind(&self, variable: &str, val: Expr) {
        self.0.borrow_mut().insert(variable.to_string(), val);
    }

    /// Insert that refuses to replace an existing binding.
    pub fn define(&self, variable: &str, val: Expr) -> Result<(), Error> {
        let mut local = self.0.borrow_mut();
        if local.contains_key(variable) {
            return Err(Error::Redefinition(variable.to_string()));
        }
        local.insert(variable.to_string(), val);
        Ok(())
    }

    /// Overlays `other` onto `self`; `other` wins on conflicts.
    pub fn merge(&self, other: &Environment) {
        if Gc::ptr_eq(&self.0, &other.0) {
            return;
        }
        let theirs = other.0.borrow();
        let mut ours = self.0.borrow_mut();
        for (variable, val) in theirs.iter() {
            ours.insert(variable.clone(), val.clone());
        }
    }

    /// A new environment holding a copy of the current bindings.
    pub fn snapshot(&self) -> Environment {
        Environment::from_hashmap(self.0.borrow().clone())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Gc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::new()
    }
}

// Identity, not contents: an environment may contain itself.
impl PartialEq for Environment {
    fn eq(&self, other: &Environment) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<environment with {} bindings>", self.len())
    }
}

#[cfg(test)]
mod test {
    use super::Environment;
    use crate::error::Error;
    use crate::expr::Expr;

    #[test]
    fn test_define_once() {
        let env = Environment::new();
        env.define("x", Expr::int(5)).unwrap();
        assert_eq!(env.define("x", Expr::int(6)),
            Err(Error::Redefinition("x".to_string())));
        assert_eq!(env.lookup("x"), Some(Expr::int(5)));
    }

    #[test]
    fn test_bind_shadows() {
        let env = Environment::new();
        env.bind("x", Expr::int(1));
        env.bind("x", Expr::int(2));
        assert_eq!(env.lookup("x"), Some(Expr::int(2)));
    }

    #[test]
    fn test_merge_other_wins() {
        let base = Environment::new();
        base.bind("a", Expr::int(1));
        base.bind("b", Expr::int(2));
        let overlay = Environment::new();
        overlay.bind("b", Expr::int(20));
        overlay.bind("c", Expr::int(30));

        base.merge(&overlay);
        assert_eq!(base.lookup("a"), Some(Expr::int(1)));
        assert_eq!(base.lookup("b"), Some(Expr::int(20)));
        assert_eq!(base.lookup("c"), Some(Expr::int(30)));
        assert_eq!(overlay.lookup("a"), None);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let env = Environment::new();
        env.bind("a", Expr::int(1));
        let frozen = env.snapshot();
        env.bind("b", Expr::int(2));
        assert_eq!(frozen.lookup("b"), None);
        assert!(!frozen.ptr_eq(&env));
        assert!(env.clone().ptr_eq(&env));
    }
}
