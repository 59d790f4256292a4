use crate::expr::{Expr, ExprData};

/// The two equality predicates exposed as `eq?` and `equal?`.
pub trait Equivalence {
    /// Identity, except that atoms with value semantics compare by value.
    fn eqv(&self, other: &Self) -> bool;

    /// Structural equality.
    fn equal(&self, other: &Self) -> bool {
        self.eqv(other)
    }
}

impl Equivalence for Expr {
    fn eqv(&self, other: &Expr) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.data(), other.data()) {
            (ExprData::Number(a), ExprData::Number(b)) => a == b,
            (ExprData::Symbol(a), ExprData::Symbol(b)) => a == b,
            (ExprData::Boolean(a), ExprData::Boolean(b)) => a == b,
            (ExprData::Native(a), ExprData::Native(b)) => a == b,
            (ExprData::Environment(a), ExprData::Environment(b)) => a.ptr_eq(b),
            (ExprData::Unspecified, ExprData::Unspecified) => true,
            (ExprData::Eof, ExprData::Eof) => true,
            _ => self.is_nil() && other.is_nil(),
        }
    }

    fn equal(&self, other: &Expr) -> bool {
        let (mut a, mut b) = (self, other);
        // Iterate down the spine, recurse on the heads.
        loop {
            match (a.as_pair(), b.as_pair()) {
                (Some((a_first, a_rest)), Some((b_first, b_rest))) => {
                    if !a_first.equal(b_first) {
                        return false;
                    }
                    a = a_rest;
                    b = b_rest;
                }
                _ => break,
            }
        }
        match (a.data(), b.data()) {
            (ExprData::String(x), ExprData::String(y)) => x == y,
            _ => a.eqv(b),
        }
    }
}
