use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::ptr;

use gc::{Finalize, Trace};
use log::debug;

use crate::builtin::{arguments, exactly, native_bindings};
use crate::environment::Environment;
use crate::error::Error;
use crate::expr::Expr;
use crate::read::Reader;

/// An IO capability: an optional readable side and an optional writable side.
/// Both sides are released by [`Port::close`]; nothing closes a port
/// implicitly.
pub struct Port {
    input: RefCell<Option<Reader<Box<dyn BufRead>>>>,
    output: RefCell<Option<Box<dyn Write>>>,
}

impl Finalize for Port {}

// Readers and writers hold no Gc pointers.
unsafe impl Trace for Port {
    gc::unsafe_empty_trace!();
}

impl Port {
    pub fn input<R: BufRead + 'static>(input: R) -> Port {
        let input: Box<dyn BufRead> = Box::new(input);
        Port {
            input: RefCell::new(Some(Reader::new(input))),
            output: RefCell::new(None),
        }
    }

    pub fn output<W: Write + 'static>(output: W) -> Port {
        Port {
            input: RefCell::new(None),
            output: RefCell::new(Some(Box::new(output))),
        }
    }

    pub fn open_input_file(path: &str) -> io::Result<Port> {
        debug!("opening {} for reading", path);
        Ok(Port::input(BufReader::new(File::open(path)?)))
    }

    pub fn open_output_file(path: &str) -> io::Result<Port> {
        debug!("opening {} for writing", path);
        Ok(Port::output(BufWriter::new(File::create(path)?)))
    }

    pub fn is_open(&self) -> bool {
        self.input.borrow().is_some() || self.output.borrow().is_some()
    }

    /// Parses the next expression from the readable side.
    pub fn read_expr(&self) -> Result<Expr, Error> {
        match *self.input.borrow_mut() {
            Some(ref mut reader) => reader.read_expr(),
            None => Err(Error::native("read", "port is closed or not readable")),
        }
    }

    pub fn write_str(&self, text: &str) -> Result<(), Error> {
        match *self.output.borrow_mut() {
            Some(ref mut out) => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
                Ok(())
            }
            None => Err(Error::native("write", "port is closed or not writable")),
        }
    }

    /// Flushes pending output and drops both sides.
    pub fn close(&self) -> Result<(), Error> {
        self.input.borrow_mut().take();
        if let Some(mut out) = self.output.borrow_mut().take() {
            out.flush()?;
        }
        Ok(())
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Port) -> bool {
        ptr::eq(self, other)
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<port readable={} writable={}>", self.input.borrow().is_some(),
            self.output.borrow().is_some())
    }
}

fn path_argument(name: &str, args: &Expr) -> Result<String, Error> {
    let args = exactly(name, args, 1)?;
    args[0]
        .as_string()
        .map(str::to_string)
        .ok_or_else(|| Error::native(name, format!("expected a file name, got {}", args[0])))
}

fn port_argument<'a>(name: &str, arg: &'a Expr) -> Result<&'a Port, Error> {
    arg.as_port()
        .ok_or_else(|| Error::native(name, format!("expected a port, got {}", arg)))
}

// The port is optional; without one output goes to stdout.
fn with_output_port<F>(name: &str, port: Option<&Expr>, f: F) -> Result<Expr, Error>
where
    F: FnOnce(&Port) -> Result<(), Error>,
{
    match port {
        Some(port) => f(port_argument(name, port)?)?,
        None => f(&Port::output(io::stdout()))?,
    }
    Ok(Expr::unspecified())
}

fn open_input_file(args: Expr) -> Result<Expr, Error> {
    let path = path_argument("open-input-file", &args)?;
    Ok(Expr::port(Port::open_input_file(&path)?))
}

fn open_output_file(args: Expr) -> Result<Expr, Error> {
    let path = path_argument("open-output-file", &args)?;
    Ok(Expr::port(Port::open_output_file(&path)?))
}

fn close_port(args: Expr) -> Result<Expr, Error> {
    let args = exactly("close-port", &args, 1)?;
    port_argument("close-port", &args[0])?.close()?;
    Ok(Expr::unspecified())
}

fn read(args: Expr) -> Result<Expr, Error> {
    let args = exactly("read", &args, 1)?;
    port_argument("read", &args[0])?.read_expr()
}

fn write(args: Expr) -> Result<Expr, Error> {
    let args = arguments("write", &args)?;
    match args.as_slice() {
        [expr] | [expr, _] => with_output_port("write", args.get(1), |port| {
            port.write_str(&expr.to_string())
        }),
        _ => Err(Error::native("write", "expected an expression and an optional port")),
    }
}

fn display(args: Expr) -> Result<Expr, Error> {
    let args = arguments("display", &args)?;
    match args.as_slice() {
        [expr] | [expr, _] => with_output_port("display", args.get(1), |port| {
            match expr.as_string() {
                Some(text) => port.write_str(text),
                None => port.write_str(&expr.to_string()),
            }
        }),
        _ => Err(Error::native("display", "expected an expression and an optional port")),
    }
}

fn newline(args: Expr) -> Result<Expr, Error> {
    let args = arguments("newline", &args)?;
    if args.len() > 1 {
        return Err(Error::native("newline", "expected an optional port"));
    }
    with_output_port("newline", args.first(), |port| port.write_str("\n"))
}

fn is_eof_object(args: Expr) -> Result<Expr, Error> {
    let args = exactly("eof-object?", &args, 1)?;
    Ok(Expr::boolean(args[0].is_eof()))
}

fn is_port(args: Expr) -> Result<Expr, Error> {
    let args = exactly("port?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_port().is_some()))
}

fn current_output_port(args: Expr) -> Result<Expr, Error> {
    exactly("current-output-port", &args, 0)?;
    Ok(Expr::port(Port::output(io::stdout())))
}

/// Port and IO procedures.
pub fn ports() -> Environment {
    native_bindings(hashmap! {
        "open-input-file" => open_input_file as crate::runtime::NativeFn,
        "open-output-file" => open_output_file,
        "close-port" => close_port,
        "read" => read,
        "write" => write,
        "display" => display,
        "newline" => newline,
        "eof-object?" => is_eof_object,
        "port?" => is_port,
        "current-output-port" => current_output_port,
    })
}

#[cfg(test)]
mod test {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use crate::builtin::initial_environment;
    use crate::error::Error;
    use crate::expr::Expr;
    use crate::read::read_all;
    use crate::runtime::Evaluator;

    fn scratch_file(name: &str) -> PathBuf {
        env::temp_dir().join(format!("vole-port-{}-{}", std::process::id(), name))
    }

    fn run(input: &str) -> Result<Expr, Error> {
        let env = initial_environment();
        let evaluator = Evaluator::default();
        let mut last = Expr::unspecified();
        for expr in read_all(input)? {
            last = evaluator.eval(&expr, &env)?;
        }
        Ok(last)
    }

    #[test]
    fn test_read_from_file() {
        let path = scratch_file("in.scm");
        fs::write(&path, "(1 2) ; comment\n foo").unwrap();
        let program = format!("(define p (open-input-file \"{}\"))\
            (define a (read p))\
            (define b (read p))\
            (define c (read p))\
            (close-port p)\
            (list a b (eof-object? c))", path.display());
        assert_eq!(run(&program), Ok(Expr::list(vec![
            Expr::list(vec![Expr::int(1), Expr::int(2)]),
            Expr::symbol("foo"),
            Expr::boolean(true),
        ])));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_to_file() {
        let path = scratch_file("out.scm");
        let program = format!("(define p (open-output-file \"{}\"))\
            (write (quote (1 \"two\" #t)) p)\
            (newline p)\
            (display \"plain\" p)\
            (close-port p)", path.display());
        assert_eq!(run(&program), Ok(Expr::unspecified()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "(1 \"two\" #t)\nplain");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_closed_port() {
        let path = scratch_file("closed.scm");
        fs::write(&path, "1").unwrap();
        let program = format!("(define p (open-input-file \"{}\"))\
            (close-port p)\
            (read p)", path.display());
        assert!(matches!(run(&program), Err(Error::Native { .. })));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(run("(open-input-file \"/nonexistent/vole/file\")"),
            Err(Error::Io(_))));
    }

    #[test]
    fn test_port_predicates() {
        assert_eq!(run("(port? (current-output-port))"), Ok(Expr::boolean(true)));
        assert_eq!(run("(port? 1)"), Ok(Expr::boolean(false)));
        assert_eq!(run("(eof-object? 1)"), Ok(Expr::boolean(false)));
    }
}
