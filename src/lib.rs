//! A small Lisp: s-expressions, closures, exact integers and proper tail
//! calls, evaluated by a trampolined tree walker.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate maplit;

pub mod builtin;
pub mod environment;
pub mod equality;
pub mod error;
pub mod expr;
pub mod number;
pub mod port;
pub mod print;
pub mod read;
pub mod runtime;

use std::fs::File;
use std::io::{BufRead, BufReader};

use log::debug;

pub use crate::environment::Environment;
pub use crate::error::Error;
pub use crate::expr::{Expr, ExprData};
pub use crate::read::{read, read_all, Reader};
pub use crate::runtime::{Config, Evaluator};

/// A root environment stocked with the standard packs, and an evaluator.
#[derive(Debug)]
pub struct Interpreter {
    evaluator: Evaluator,
    root: Environment,
}

impl Interpreter {
    pub fn new(config: Config) -> Interpreter {
        Interpreter {
            evaluator: Evaluator::new(config),
            root: builtin::initial_environment(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.root
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn eval(&self, expr: &Expr) -> Result<Expr, Error> {
        self.evaluator.eval(expr, &self.root)
    }

    /// Evaluates every expression in `input`, returning the last value.
    pub fn eval_str(&self, input: &str) -> Result<Expr, Error> {
        self.run(&mut Reader::new(input.as_bytes()), |_| ())
    }

    /// Reads and evaluates until end of input, handing each value to
    /// `on_value`. Stops at the first error.
    pub fn run<R, F>(&self, reader: &mut Reader<R>, mut on_value: F) -> Result<Expr, Error>
    where
        R: BufRead,
        F: FnMut(&Expr),
    {
        let mut last = Expr::unspecified();
        loop {
            let expr = reader.read_expr()?;
            if expr.is_eof() {
                return Ok(last);
            }
            last = self.eval(&expr)?;
            on_value(&last);
        }
    }

    /// Evaluates a whole file under the root environment.
    pub fn load(&self, path: &str) -> Result<Expr, Error> {
        debug!("loading {}", path);
        // The reader owns the file, so it is closed on every return path.
        let mut reader = Reader::new(BufReader::new(File::open(path)?));
        self.run(&mut reader, |_| ())
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new(Config::default())
    }
}

#[cfg(test)]
mod test {
    use std::env;
    use std::fs;

    use super::{Error, Expr, Interpreter};

    #[test]
    fn test_scenarios() {
        let interp = Interpreter::default();
        assert_eq!(interp.eval_str("(quote (1 2 3))").unwrap().to_string(), "(1 2 3)");
        assert_eq!(interp.eval_str("(define x 5) x"), Ok(Expr::int(5)));
        assert_eq!(interp.eval_str("(define x 6)"),
            Err(Error::Redefinition("x".to_string())));
        assert_eq!(interp.eval_str("x"), Ok(Expr::int(5)));
        assert_eq!(interp.eval_str("(cons 1 2)").unwrap().to_string(), "(1 . 2)");
        assert_eq!(interp.eval_str("(car (cons 1 2))"), Ok(Expr::int(1)));
        assert_eq!(interp.eval_str(")"), Err(Error::syntax("unmatched close paren")));
        assert_eq!(interp.eval_str("(1 2"), Err(Error::syntax("unmatched open paren")));
        assert_eq!(interp.eval_str("undefined-name"),
            Err(Error::Unbound("undefined-name".to_string())));
    }

    #[test]
    fn test_errors_leave_environment_usable() {
        let interp = Interpreter::default();
        assert!(interp.eval_str("(define a 1) (car a)").is_err());
        assert_eq!(interp.eval_str("(+ a 1)"), Ok(Expr::int(2)));
    }

    #[test]
    fn test_run_reports_each_value() {
        let interp = Interpreter::default();
        let mut seen = Vec::new();
        let mut reader = super::Reader::new("1 (+ 1 1) (define q 3) q".as_bytes());
        let last = interp.run(&mut reader, |value| seen.push(value.to_string())).unwrap();
        assert_eq!(last, Expr::int(3));
        assert_eq!(seen, vec!["1", "2", "<unspecified>", "3"]);
    }

    #[test]
    fn test_load() {
        let path = env::temp_dir().join(format!("vole-load-{}.scm", std::process::id()));
        fs::write(&path, "; library\n(define square (lambda (n) (* n n)))\n(square 12)\n")
            .unwrap();
        let interp = Interpreter::default();
        assert_eq!(interp.load(path.to_str().unwrap()), Ok(Expr::int(144)));
        assert_eq!(interp.eval_str("(square 3)"), Ok(Expr::int(9)));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let interp = Interpreter::default();
        assert!(matches!(interp.load("/nonexistent/vole.scm"), Err(Error::Io(_))));
    }
}
