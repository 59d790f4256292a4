use std::cmp;
use std::collections::HashMap;

use log::debug;
use num::{One, Zero};

use crate::environment::Environment;
use crate::equality::Equivalence;
use crate::error::Error;
use crate::expr::Expr;
use crate::number::Number;
use crate::port;
use crate::runtime::{Evaluator, Native, NativeFn};

/// The argument list as a vector. Native procedures always receive a proper
/// list from the evaluator unless called with a dotted argument list.
pub(crate) fn arguments(name: &str, args: &Expr) -> Result<Vec<Expr>, Error> {
    args.to_vec()
        .ok_or_else(|| Error::native(name, format!("improper argument list {}", args)))
}

pub(crate) fn exactly(name: &str, args: &Expr, n: usize) -> Result<Vec<Expr>, Error> {
    let args = arguments(name, args)?;
    if args.len() == n {
        Ok(args)
    } else {
        Err(Error::native(name, format!("expected {} argument(s), got {}", n, args.len())))
    }
}

/// Builds a pack from a table of native procedures.
pub(crate) fn native_bindings(table: HashMap<&'static str, NativeFn>) -> Environment {
    let env = Environment::new();
    for (name, func) in table {
        env.bind(name, Expr::native(Native::new(name, func)));
    }
    env
}

fn number_argument<'a>(name: &str, arg: &'a Expr) -> Result<&'a Number, Error> {
    arg.as_number()
        .ok_or_else(|| Error::native(name, format!("expected a number, got {}", arg)))
}

fn numbers(name: &str, args: &Expr) -> Result<Vec<Number>, Error> {
    arguments(name, args)?
        .iter()
        .map(|arg| number_argument(name, arg).map(Number::clone))
        .collect()
}

// Section: numbers

fn comparison<F>(name: &str, args: Expr, cmp: F) -> Result<Expr, Error>
where
    F: Fn(&Number, &Number) -> bool,
{
    let args = numbers(name, &args)?;
    if args.len() < 2 {
        return Err(Error::native(name, "expected at least 2 arguments"));
    }
    Ok(Expr::boolean(args.windows(2).all(|w| cmp(&w[0], &w[1]))))
}

fn num_eq(args: Expr) -> Result<Expr, Error> {
    comparison("=", args, |n, m| n == m)
}

fn less(args: Expr) -> Result<Expr, Error> {
    comparison("<", args, |n, m| n < m)
}

fn greater(args: Expr) -> Result<Expr, Error> {
    comparison(">", args, |n, m| n > m)
}

fn less_equal(args: Expr) -> Result<Expr, Error> {
    comparison("<=", args, |n, m| n <= m)
}

fn greater_equal(args: Expr) -> Result<Expr, Error> {
    comparison(">=", args, |n, m| n >= m)
}

fn is_number(args: Expr) -> Result<Expr, Error> {
    let args = exactly("number?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_number().is_some()))
}

fn is_zero(args: Expr) -> Result<Expr, Error> {
    let args = exactly("zero?", &args, 1)?;
    Ok(Expr::boolean(number_argument("zero?", &args[0])?.is_zero()))
}

fn extremum<F>(name: &str, args: Expr, pick: F) -> Result<Expr, Error>
where
    F: Fn(Number, Number) -> Number,
{
    let mut args = numbers(name, &args)?.into_iter();
    let first = args
        .next()
        .ok_or_else(|| Error::native(name, "expected at least 1 argument"))?;
    Ok(Expr::number(args.fold(first, pick)))
}

fn max(args: Expr) -> Result<Expr, Error> {
    extremum("max", args, cmp::max)
}

fn min(args: Expr) -> Result<Expr, Error> {
    extremum("min", args, cmp::min)
}

fn sum(args: Expr) -> Result<Expr, Error> {
    let total = numbers("+", &args)?
        .iter()
        .fold(Number::zero(), |total, n| &total + n);
    Ok(Expr::number(total))
}

fn times(args: Expr) -> Result<Expr, Error> {
    let total = numbers("*", &args)?
        .iter()
        .fold(Number::one(), |total, n| &total * n);
    Ok(Expr::number(total))
}

fn minus(args: Expr) -> Result<Expr, Error> {
    let args = numbers("-", &args)?;
    match args.split_first() {
        None => Err(Error::native("-", "expected at least 1 argument")),
        Some((only, [])) => Ok(Expr::number(-only)),
        Some((first, rest)) => {
            let total = rest.iter().fold(first.clone(), |total, n| &total - n);
            Ok(Expr::number(total))
        }
    }
}

fn division<F>(name: &str, args: Expr, op: F) -> Result<Expr, Error>
where
    F: Fn(&Number, &Number) -> Option<Number>,
{
    let args = exactly(name, &args, 2)?;
    let n = number_argument(name, &args[0])?;
    let m = number_argument(name, &args[1])?;
    op(n, m)
        .map(Expr::number)
        .ok_or_else(|| Error::native(name, "division by zero"))
}

fn quotient(args: Expr) -> Result<Expr, Error> {
    division("quotient", args, Number::checked_quotient)
}

fn remainder(args: Expr) -> Result<Expr, Error> {
    division("remainder", args, Number::checked_remainder)
}

// Section: booleans and type predicates

fn not(args: Expr) -> Result<Expr, Error> {
    let args = exactly("not", &args, 1)?;
    Ok(Expr::boolean(args[0].as_boolean() == Some(false)))
}

fn is_boolean(args: Expr) -> Result<Expr, Error> {
    let args = exactly("boolean?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_boolean().is_some()))
}

fn is_symbol(args: Expr) -> Result<Expr, Error> {
    let args = exactly("symbol?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_symbol().is_some()))
}

fn is_string(args: Expr) -> Result<Expr, Error> {
    let args = exactly("string?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_string().is_some()))
}

fn is_procedure(args: Expr) -> Result<Expr, Error> {
    let args = exactly("procedure?", &args, 1)?;
    Ok(Expr::boolean(args[0].is_procedure()))
}

fn is_environment(args: Expr) -> Result<Expr, Error> {
    let args = exactly("environment?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_environment().is_some()))
}

fn eq(args: Expr) -> Result<Expr, Error> {
    let args = exactly("eq?", &args, 2)?;
    Ok(Expr::boolean(args[0].eqv(&args[1])))
}

fn equal(args: Expr) -> Result<Expr, Error> {
    let args = exactly("equal?", &args, 2)?;
    Ok(Expr::boolean(args[0].equal(&args[1])))
}

// Section: pairs and lists

fn cons(args: Expr) -> Result<Expr, Error> {
    let args = exactly("cons", &args, 2)?;
    Ok(Expr::cons(args[0].clone(), args[1].clone()))
}

fn car(args: Expr) -> Result<Expr, Error> {
    let args = exactly("car", &args, 1)?;
    args[0]
        .as_pair()
        .map(|(first, _)| first.clone())
        .ok_or_else(|| Error::native("car", format!("expected a pair, got {}", args[0])))
}

fn cdr(args: Expr) -> Result<Expr, Error> {
    let args = exactly("cdr", &args, 1)?;
    args[0]
        .as_pair()
        .map(|(_, rest)| rest.clone())
        .ok_or_else(|| Error::native("cdr", format!("expected a pair, got {}", args[0])))
}

fn list(args: Expr) -> Result<Expr, Error> {
    Ok(args)
}

fn is_null(args: Expr) -> Result<Expr, Error> {
    let args = exactly("null?", &args, 1)?;
    Ok(Expr::boolean(args[0].is_nil()))
}

fn is_pair(args: Expr) -> Result<Expr, Error> {
    let args = exactly("pair?", &args, 1)?;
    Ok(Expr::boolean(args[0].as_pair().is_some()))
}

fn is_list(args: Expr) -> Result<Expr, Error> {
    let args = exactly("list?", &args, 1)?;
    Ok(Expr::boolean(args[0].is_list()))
}

fn list_argument(name: &str, arg: &Expr) -> Result<Vec<Expr>, Error> {
    arg.to_vec()
        .ok_or_else(|| Error::native(name, format!("expected a list, got {}", arg)))
}

fn length(args: Expr) -> Result<Expr, Error> {
    let args = exactly("length", &args, 1)?;
    let len = list_argument("length", &args[0])?.len();
    Ok(Expr::number(Number::from(len as i64)))
}

fn reverse(args: Expr) -> Result<Expr, Error> {
    let args = exactly("reverse", &args, 1)?;
    let mut items = list_argument("reverse", &args[0])?;
    items.reverse();
    Ok(Expr::list(items))
}

fn append(args: Expr) -> Result<Expr, Error> {
    let mut args = arguments("append", &args)?;
    let mut tail = args.pop().unwrap_or_else(Expr::nil);
    for list in args.iter().rev() {
        tail = Expr::list_with_tail(list_argument("append", list)?, tail);
    }
    Ok(tail)
}

// Section: environments and evaluation

fn eval(args: Expr) -> Result<Expr, Error> {
    let args = exactly("eval", &args, 2)?;
    let env = args[1].as_environment().ok_or_else(|| {
        Error::native("eval", format!("expected an environment, got {}", args[1]))
    })?;
    Evaluator::default().eval(&args[0], env)
}

/// Integer arithmetic and comparison.
pub fn arithmetic() -> Environment {
    native_bindings(hashmap! {
        "+" => sum as NativeFn,
        "-" => minus,
        "*" => times,
        "quotient" => quotient,
        "remainder" => remainder,
        "=" => num_eq,
        "<" => less,
        ">" => greater,
        "<=" => less_equal,
        ">=" => greater_equal,
        "zero?" => is_zero,
        "number?" => is_number,
        "max" => max,
        "min" => min,
    })
}

/// Pairs, lists, equality and type predicates.
pub fn lists() -> Environment {
    native_bindings(hashmap! {
        "cons" => cons as NativeFn,
        "car" => car,
        "cdr" => cdr,
        "list" => list,
        "length" => length,
        "reverse" => reverse,
        "append" => append,
        "null?" => is_null,
        "pair?" => is_pair,
        "list?" => is_list,
        "symbol?" => is_symbol,
        "string?" => is_string,
        "boolean?" => is_boolean,
        "procedure?" => is_procedure,
        "environment?" => is_environment,
        "not" => not,
        "eq?" => eq,
        "equal?" => equal,
    })
}

/// `eval` over first-class environments.
pub fn system() -> Environment {
    native_bindings(hashmap! {
        "eval" => eval as NativeFn,
    })
}

/// Every standard pack merged into one fresh root environment.
pub fn initial_environment() -> Environment {
    let root = Environment::new();
    for pack in &[arithmetic(), lists(), system(), port::ports()] {
        root.merge(pack);
    }
    debug!("initial environment has {} bindings", root.len());
    root
}
