use std::fmt;
use std::io::{self, Write};

use crate::expr::{Expr, ExprData};

const UNSPECIFIED: &str = "<unspecified>";

/// Writes the textual form of `expr`; `None` stands for an absent value.
pub fn print<W: Write>(expr: Option<&Expr>, out: &mut W) -> io::Result<()> {
    match expr {
        Some(expr) => write!(out, "{}", expr),
        None => write!(out, "{}", UNSPECIFIED),
    }
}

fn write_slot(f: &mut fmt::Formatter, slot: &Option<Expr>) -> fmt::Result {
    match slot {
        Some(expr) => write!(f, "{}", expr),
        None => write!(f, "{}", UNSPECIFIED),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.data() {
            ExprData::Pair(None, None) => write!(f, "()"),
            ExprData::Pair(ref first, ref rest) => {
                write!(f, "(")?;
                write_slot(f, first)?;
                let mut head = rest;
                // Walk the spine; stop at nil or at a non-pair tail.
                loop {
                    match head {
                        Some(expr) => match *expr.data() {
                            ExprData::Pair(None, None) => break,
                            ExprData::Pair(ref first, ref rest) => {
                                write!(f, " ")?;
                                write_slot(f, first)?;
                                head = rest;
                            }
                            _ => {
                                write!(f, " . {}", expr)?;
                                break;
                            }
                        },
                        None => {
                            write!(f, " . {}", UNSPECIFIED)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            ExprData::Number(ref n) => write!(f, "{}", n),
            ExprData::String(ref s) => write!(f, "\"{}\"", s),
            ExprData::Symbol(ref s) => write!(f, "{}", s),
            ExprData::Boolean(b) => write!(f, "#{}", if b { 't' } else { 'f' }),
            ExprData::Lambda(_) => write!(f, "#<lambda>"),
            ExprData::Native(ref native) => write!(f, "#<procedure {}>", native.name()),
            ExprData::Environment(_) => write!(f, "#<environment>"),
            ExprData::Port(_) => write!(f, "#<port>"),
            ExprData::Unspecified => write!(f, "{}", UNSPECIFIED),
            ExprData::Eof => write!(f, "#<eof>"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::print;
    use crate::expr::Expr;
    use crate::read::read;

    fn printed(expr: &Expr) -> String {
        let mut out = Vec::new();
        print(Some(expr), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_print_atoms() {
        assert_eq!(printed(&Expr::int(-12)), "-12");
        assert_eq!(printed(&Expr::string("a b")), "\"a b\"");
        assert_eq!(printed(&Expr::symbol("x")), "x");
        assert_eq!(printed(&Expr::boolean(true)), "#t");
        assert_eq!(printed(&Expr::boolean(false)), "#f");
        assert_eq!(printed(&Expr::unspecified()), "<unspecified>");
        assert_eq!(printed(&Expr::eof()), "#<eof>");
    }

    #[test]
    fn test_print_absent() {
        let mut out = Vec::new();
        print(None, &mut out).unwrap();
        assert_eq!(out, b"<unspecified>");
    }

    #[test]
    fn test_print_lists() {
        assert_eq!(printed(&Expr::nil()), "()");
        assert_eq!(printed(&Expr::list(vec![Expr::int(1), Expr::int(2),
            Expr::int(3)])), "(1 2 3)");
        assert_eq!(printed(&Expr::cons(Expr::int(1), Expr::int(2))), "(1 . 2)");
        assert_eq!(printed(&Expr::list_with_tail(vec![Expr::int(1), Expr::int(2)],
            Expr::int(3))), "(1 2 . 3)");
        assert_eq!(printed(&Expr::list(vec![Expr::nil()])), "(())");
    }

    #[test]
    fn test_round_trip() {
        for text in &["0", "123456789012345678901234567890", "\"some text\"",
                "#t", "#f", "sym", "()", "(1 2 3)", "(1 . 2)", "(a (b . c) \"d\" #t)",
                "((1 2) (3 (4 . 5)) ())"] {
            let expr = read(text).unwrap();
            assert_eq!(&printed(&expr), text);
            assert_eq!(read(&printed(&expr)).unwrap(), expr);
        }
    }

    #[test]
    fn test_whitespace_normalized() {
        let expr = read("(  1\n\t2   ( 3 ) )").unwrap();
        assert_eq!(printed(&expr), "(1 2 (3))");
    }
}
