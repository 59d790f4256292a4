use std::borrow;
use std::iter::DoubleEndedIterator;

use gc::{Finalize, Gc, Trace};

use crate::environment::Environment;
use crate::number::Number;
use crate::port::Port;
use crate::runtime::{Lambda, Native};

/// The closed set of values an expression can take.
///
/// There is no separate empty-list variant: nil is a `Pair` with both slots
/// absent, and every other pair has both slots filled.
#[derive(Debug, Finalize, PartialEq, Trace)]
pub enum ExprData {
    Number(Number),
    String(String),
    Symbol(String),
    Boolean(bool),
    Pair(Option<Expr>, Option<Expr>),
    Lambda(Lambda),
    Native(Native),
    Environment(Environment),
    Port(Port),
    Unspecified,
    Eof,
}

#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub struct Expr(Gc<ExprData>);

impl Expr {
    fn from_data(data: ExprData) -> Expr {
        Expr(Gc::new(data))
    }

    pub fn data(&self) -> &ExprData {
        &self.0
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Gc::ptr_eq(&self.0, &other.0)
    }

    pub fn number(n: Number) -> Expr {
        Expr::from_data(ExprData::Number(n))
    }

    pub fn int(n: i64) -> Expr {
        Expr::number(Number::from(n))
    }

    pub fn as_number(&self) -> Option<&Number> {
        if let ExprData::Number(ref n) = *self.data() {
            Some(n)
        } else {
            None
        }
    }

    pub fn string<S: ToString>(s: S) -> Expr {
        Expr::from_data(ExprData::String(s.to_string()))
    }

    pub fn as_string(&self) -> Option<&str> {
        if let ExprData::String(ref s) = *self.data() {
            Some(s)
        } else {
            None
        }
    }

    pub fn symbol<S: ToString>(s: S) -> Expr {
        Expr::from_data(ExprData::Symbol(s.to_string()))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        if let ExprData::Symbol(ref s) = *self.data() {
            Some(s)
        } else {
            None
        }
    }

    pub fn boolean(b: bool) -> Expr {
        Expr::from_data(ExprData::Boolean(b))
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let ExprData::Boolean(b) = *self.data() {
            Some(b)
        } else {
            None
        }
    }

    /// Only the boolean `#t` selects the consequent of an `if`.
    pub fn is_true(&self) -> bool {
        self.as_boolean() == Some(true)
    }

    pub fn nil() -> Expr {
        Expr::from_data(ExprData::Pair(None, None))
    }

    pub fn is_nil(&self) -> bool {
        matches!(*self.data(), ExprData::Pair(None, None))
    }

    pub fn cons(first: Expr, rest: Expr) -> Expr {
        Expr::from_data(ExprData::Pair(Some(first), Some(rest)))
    }

    /// The two halves of a non-nil pair.
    pub fn as_pair(&self) -> Option<(&Expr, &Expr)> {
        if let ExprData::Pair(Some(ref first), Some(ref rest)) = *self.data() {
            Some((first, rest))
        } else {
            None
        }
    }

    /// Anything that is not a pair, nil excluded.
    pub fn is_atom(&self) -> bool {
        !matches!(*self.data(), ExprData::Pair(..))
    }

    /// A chain of pairs ending in nil.
    pub fn is_list(&self) -> bool {
        let mut head = self;
        while let Some((_, rest)) = head.as_pair() {
            head = rest;
        }
        head.is_nil()
    }

    pub(crate) fn lambda(lambda: Lambda) -> Expr {
        Expr::from_data(ExprData::Lambda(lambda))
    }

    pub fn native(native: Native) -> Expr {
        Expr::from_data(ExprData::Native(native))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(*self.data(), ExprData::Lambda(_) | ExprData::Native(_))
    }

    pub fn environment(env: Environment) -> Expr {
        Expr::from_data(ExprData::Environment(env))
    }

    pub fn as_environment(&self) -> Option<&Environment> {
        if let ExprData::Environment(ref env) = *self.data() {
            Some(env)
        } else {
            None
        }
    }

    pub fn port(port: Port) -> Expr {
        Expr::from_data(ExprData::Port(port))
    }

    pub fn as_port(&self) -> Option<&Port> {
        if let ExprData::Port(ref port) = *self.data() {
            Some(port)
        } else {
            None
        }
    }

    pub fn unspecified() -> Expr {
        Expr::from_data(ExprData::Unspecified)
    }

    pub fn eof() -> Expr {
        Expr::from_data(ExprData::Eof)
    }

    pub fn is_eof(&self) -> bool {
        matches!(*self.data(), ExprData::Eof)
    }

    /// The elements of a proper list, `None` for anything else.
    pub fn to_vec(&self) -> Option<Vec<Expr>> {
        let mut elems = Vec::new();
        let mut head = self;
        while let Some((first, rest)) = head.as_pair() {
            elems.push(first.clone());
            head = rest;
        }
        if head.is_nil() {
            Some(elems)
        } else {
            None
        }
    }

    pub fn list<E: borrow::Borrow<Expr>, I: IntoIterator<Item = E>>(iter: I) -> Expr
    where
        I::IntoIter: DoubleEndedIterator,
    {
        Expr::list_with_tail(iter, Expr::nil())
    }

    /// Conses `iter` onto `tail`, so a non-nil atom tail yields a dotted list.
    pub fn list_with_tail<E: borrow::Borrow<Expr>, I: IntoIterator<Item = E>>(
        iter: I,
        tail: Expr,
    ) -> Expr
    where
        I::IntoIter: DoubleEndedIterator,
    {
        let mut res = tail;
        for elem in iter.into_iter().rev() {
            res = Expr::cons(elem.borrow().clone(), res);
        }
        res
    }
}

#[cfg(test)]
mod test {
    use super::Expr;

    #[test]
    fn test_nil_is_a_pair_but_not_a_cons() {
        let nil = Expr::nil();
        assert!(nil.is_nil());
        assert!(!nil.is_atom());
        assert!(nil.as_pair().is_none());
        assert!(nil.is_list());
    }

    #[test]
    fn test_list_shapes() {
        let proper = Expr::list(vec![Expr::int(1), Expr::int(2)]);
        assert!(proper.is_list());
        assert_eq!(proper.to_vec(), Some(vec![Expr::int(1), Expr::int(2)]));

        let dotted = Expr::cons(Expr::int(1), Expr::int(2));
        assert!(!dotted.is_list());
        assert_eq!(dotted.to_vec(), None);
    }

    #[test]
    fn test_symbols_compare_by_text() {
        assert_eq!(Expr::symbol("foo"), Expr::symbol("foo".to_string()));
        assert!(!Expr::symbol("foo").ptr_eq(&Expr::symbol("foo")));
        assert_ne!(Expr::symbol("foo"), Expr::string("foo"));
    }

    #[test]
    fn test_only_true_is_true() {
        assert!(Expr::boolean(true).is_true());
        assert!(!Expr::boolean(false).is_true());
        assert!(!Expr::int(1).is_true());
        assert!(!Expr::nil().is_true());
    }
}
