use std::env;
use std::io::{self, Write};

use vole::{print, Config, Interpreter, Reader};

const PROMPT: &str = "vole> ";

const HELP_MSG: &str = "\
Usage: vole [OPTIONS] [FILE]...

Loads each FILE in order, then reads expressions from standard input.

Options:
  -d, --debug     trace every evaluation step
      --no-repl   exit after loading the files
  -h, --help      print this message";

struct Options {
    config: Config,
    repl: bool,
    files: Vec<String>,
}

fn parse_args() -> Option<Options> {
    let mut options = Options {
        config: Config::default(),
        repl: true,
        files: Vec::new(),
    };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => return None,
            "-d" | "--debug" => options.config.debug = true,
            "--no-repl" => options.repl = false,
            _ => options.files.push(arg),
        }
    }
    Some(options)
}

fn repl(interp: &Interpreter) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut reader = Reader::new(stdin.lock());
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;
        let expr = match reader.read_expr() {
            Ok(expr) if expr.is_eof() => break,
            Ok(expr) => expr,
            Err(err) => {
                eprintln!("error: {}", err);
                reader.skip_line();
                continue;
            }
        };
        match interp.eval(&expr) {
            Ok(value) => {
                print::print(Some(&value), &mut stdout)?;
                writeln!(stdout)?;
            }
            Err(err) => eprintln!("error: {}", err),
        }
    }
    writeln!(stdout)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let options = match parse_args() {
        Some(options) => options,
        None => {
            println!("{}", HELP_MSG);
            return Ok(());
        }
    };

    let interp = Interpreter::new(options.config);
    for file in &options.files {
        if let Err(err) = interp.load(file) {
            eprintln!("error loading {}: {}", file, err);
        }
    }

    if options.repl {
        repl(&interp)?;
    }
    Ok(())
}
