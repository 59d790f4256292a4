mod stream;

use std::io::BufRead;

use crate::error::Error;
use crate::expr::Expr;
use crate::number::Number;
pub use self::stream::CharStream;

/// Reads the first expression in `input`.
pub fn read(input: &str) -> Result<Expr, Error> {
    Reader::new(input.as_bytes()).read_expr()
}

/// Reads every expression in `input`.
pub fn read_all(input: &str) -> Result<Vec<Expr>, Error> {
    let mut reader = Reader::new(input.as_bytes());
    let mut exprs = Vec::new();
    loop {
        let expr = reader.read_expr()?;
        if expr.is_eof() {
            return Ok(exprs);
        }
        exprs.push(expr);
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || "#()\";".contains(c)
}

/// Recursive-descent parser over a character stream. Each call to
/// [`Reader::read_expr`] consumes exactly one top-level expression.
#[derive(Debug)]
pub struct Reader<R> {
    stream: CharStream<R>,
}

impl<R: BufRead> Reader<R> {
    pub fn new(input: R) -> Self {
        Reader {
            stream: CharStream::new(input),
        }
    }

    /// Returns [`Expr::eof`] once the stream is used up.
    pub fn read_expr(&mut self) -> Result<Expr, Error> {
        match self.skip_atmosphere()? {
            None => Ok(Expr::eof()),
            Some(')') => {
                self.stream.next_char()?;
                Err(Error::syntax("unmatched close paren"))
            }
            Some(_) => self.read_datum(),
        }
    }

    pub fn skip_line(&mut self) {
        self.stream.skip_line();
    }

    /// Skips whitespace and comments, returning the next character.
    fn skip_atmosphere(&mut self) -> Result<Option<char>, Error> {
        loop {
            match self.stream.peek()? {
                Some(';') => self.skip_comment()?,
                Some(c) if c.is_whitespace() => {
                    self.stream.next_char()?;
                }
                other => return Ok(other),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), Error> {
        while let Some(c) = self.stream.next_char()? {
            if c == '\n' {
                break;
            }
        }
        Ok(())
    }

    fn read_datum(&mut self) -> Result<Expr, Error> {
        match self.stream.peek()? {
            Some('#') => self.read_boolean(),
            Some('"') => self.read_string(),
            Some('(') => self.read_list(),
            Some(')') => Err(Error::syntax("unmatched close paren")),
            Some(c) if c.is_ascii_digit() => self.read_number(),
            Some(_) => self.read_symbol(),
            None => Err(Error::syntax("unexpected end of input")),
        }
    }

    fn read_boolean(&mut self) -> Result<Expr, Error> {
        self.stream.next_char()?;
        match self.stream.next_char()? {
            Some('t') => Ok(Expr::boolean(true)),
            Some('f') => Ok(Expr::boolean(false)),
            Some(c) => Err(Error::syntax(format!("bad boolean literal #{}", c))),
            None => Err(Error::syntax("end of input after #")),
        }
    }

    fn read_number(&mut self) -> Result<Expr, Error> {
        let mut digits = String::new();
        while let Some(c) = self.stream.peek()? {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.stream.next_char()?;
        }
        Number::from_digits(&digits)
            .map(Expr::number)
            .ok_or_else(|| Error::syntax(format!("malformed number {:?}", digits)))
    }

    // No escape sequences.
    fn read_string(&mut self) -> Result<Expr, Error> {
        self.stream.next_char()?;
        let mut text = String::new();
        loop {
            match self.stream.next_char()? {
                Some('"') => return Ok(Expr::string(text)),
                Some(c) => text.push(c),
                None => return Err(Error::syntax("unterminated string")),
            }
        }
    }

    fn read_symbol(&mut self) -> Result<Expr, Error> {
        let mut name = String::new();
        while let Some(c) = self.stream.peek()? {
            if is_delimiter(c) {
                break;
            }
            name.push(c);
            self.stream.next_char()?;
        }
        if name.is_empty() {
            Err(Error::syntax("empty symbol"))
        } else {
            Ok(Expr::symbol(name))
        }
    }

    fn read_list(&mut self) -> Result<Expr, Error> {
        self.stream.next_char()?;
        let mut items = Vec::new();

        loop {
            match self.skip_atmosphere()? {
                None => return Err(Error::syntax("unmatched open paren")),
                Some(')') => {
                    self.stream.next_char()?;
                    return Ok(Expr::list(items));
                }
                Some(_) => {
                    let datum = self.read_datum()?;
                    if datum.as_symbol() == Some(".") {
                        if items.is_empty() {
                            return Err(Error::syntax("dot at the start of a list"));
                        }
                        let tail = self.read_dotted_tail()?;
                        return Ok(Expr::list_with_tail(items, tail));
                    }
                    items.push(datum);
                }
            }
        }
    }

    // After the dot: one expression, then the close paren.
    fn read_dotted_tail(&mut self) -> Result<Expr, Error> {
        let tail = match self.skip_atmosphere()? {
            None => return Err(Error::syntax("unmatched open paren")),
            Some(')') => return Err(Error::syntax("missing expression after dot")),
            Some(_) => self.read_datum()?,
        };
        match self.skip_atmosphere()? {
            None => Err(Error::syntax("unmatched open paren")),
            Some(')') => {
                self.stream.next_char()?;
                Ok(tail)
            }
            Some(_) => Err(Error::syntax("more than one expression after dot")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{read, read_all, Reader};
    use crate::error::Error;
    use crate::expr::Expr;
    use crate::number::Number;

    #[test]
    fn test_read_atoms() {
        assert_eq!(read("42"), Ok(Expr::int(42)));
        assert_eq!(read("#t"), Ok(Expr::boolean(true)));
        assert_eq!(read("#f"), Ok(Expr::boolean(false)));
        assert_eq!(read("\"hi there\""), Ok(Expr::string("hi there")));
        assert_eq!(read("foo-bar?"), Ok(Expr::symbol("foo-bar?")));
        assert_eq!(read("-5"), Ok(Expr::symbol("-5")));
    }

    #[test]
    fn test_read_big_number() {
        let digits = "340282366920938463463374607431768211456";
        assert_eq!(read(digits),
            Ok(Expr::number(Number::from_digits(digits).unwrap())));
    }

    #[test]
    fn test_string_has_no_escapes() {
        assert_eq!(read(r#""a\nb""#), Ok(Expr::string(r"a\nb")));
    }

    #[test]
    fn test_read_list() {
        assert_eq!(read("(1 (2 3) x)"), Ok(Expr::list(vec![
            Expr::int(1),
            Expr::list(vec![Expr::int(2), Expr::int(3)]),
            Expr::symbol("x"),
        ])));
        assert_eq!(read("()"), Ok(Expr::nil()));
        assert_eq!(read("(  )"), Ok(Expr::nil()));
    }

    #[test]
    fn test_read_dotted() {
        assert_eq!(read("(1 . 2)"), Ok(Expr::cons(Expr::int(1), Expr::int(2))));
        assert_eq!(read("(a b . c)"), Ok(Expr::cons(Expr::symbol("a"),
            Expr::cons(Expr::symbol("b"), Expr::symbol("c")))));
        assert!(matches!(read("(. 2)"), Err(Error::Syntax(_))));
        assert!(matches!(read("(1 . 2 3)"), Err(Error::Syntax(_))));
        assert!(matches!(read("(1 . )"), Err(Error::Syntax(_))));
    }

    #[test]
    fn test_delimiters_split_tokens() {
        assert_eq!(read_all("12ab"), Ok(vec![Expr::int(12), Expr::symbol("ab")]));
        assert_eq!(read_all("a#t"), Ok(vec![Expr::symbol("a"), Expr::boolean(true)]));
        assert_eq!(read("(a\"b\")"), Ok(Expr::list(vec![Expr::symbol("a"),
            Expr::string("b")])));
    }

    #[test]
    fn test_comments() {
        assert_eq!(read("; nothing here\n  7"), Ok(Expr::int(7)));
        assert_eq!(read("(1 ; one\n 2)"), Ok(Expr::list(vec![Expr::int(1),
            Expr::int(2)])));
        assert_eq!(read("; only a comment"), Ok(Expr::eof()));
    }

    #[test]
    fn test_paren_errors() {
        assert_eq!(read(")"), Err(Error::syntax("unmatched close paren")));
        assert_eq!(read("(1 2"), Err(Error::syntax("unmatched open paren")));
        assert_eq!(read("(1 (2)"), Err(Error::syntax("unmatched open paren")));
    }

    #[test]
    fn test_bad_literals() {
        assert!(matches!(read("#x"), Err(Error::Syntax(_))));
        assert!(matches!(read("#"), Err(Error::Syntax(_))));
        assert!(matches!(read("\"open"), Err(Error::Syntax(_))));
    }

    #[test]
    fn test_restartable() {
        let mut reader = Reader::new("(define x 5)\n x  \n".as_bytes());
        assert_eq!(reader.read_expr(), Ok(Expr::list(vec![Expr::symbol("define"),
            Expr::symbol("x"), Expr::int(5)])));
        assert_eq!(reader.read_expr(), Ok(Expr::symbol("x")));
        assert_eq!(reader.read_expr(), Ok(Expr::eof()));
        assert_eq!(reader.read_expr(), Ok(Expr::eof()));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(read(""), Ok(Expr::eof()));
        assert_eq!(read("   \n\t "), Ok(Expr::eof()));
    }
}
