use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

use either::{Either, Left, Right};
use gc::{Finalize, Trace};
use log::info;

use crate::environment::Environment;
use crate::error::Error;
use crate::expr::{Expr, ExprData};

/// Host-implemented procedure. Receives the evaluated argument list.
pub type NativeFn = fn(Expr) -> Result<Expr, Error>;

#[derive(Clone, Copy)]
pub struct Native {
    name: &'static str,
    func: NativeFn,
}

impl Finalize for Native {}

// Plain function pointers hold no Gc pointers.
unsafe impl Trace for Native {
    gc::unsafe_empty_trace!();
}

impl Native {
    pub fn new(name: &'static str, func: NativeFn) -> Native {
        Native { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: Expr) -> Result<Expr, Error> {
        (self.func)(args)
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Native) -> bool {
        self.name == other.name && self.func as usize == other.func as usize
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<native {}>", self.name)
    }
}

/// How a lambda binds its argument list.
#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub enum Formal {
    /// `(lambda () ...)`
    Nothing,
    /// `(lambda (x) ...)`: `x` is the sole argument.
    Single(String),
    /// `(lambda xs ...)`: `xs` is the whole argument list.
    Rest(String),
}

impl Formal {
    fn from_object(formals: &Expr) -> Result<Formal, Error> {
        if formals.is_nil() {
            return Ok(Formal::Nothing);
        }
        if let Some(name) = formals.as_symbol() {
            return Ok(Formal::Rest(name.to_string()));
        }
        if let Some((first, rest)) = formals.as_pair() {
            if let (Some(name), true) = (first.as_symbol(), rest.is_nil()) {
                return Ok(Formal::Single(name.to_string()));
            }
        }
        Err(Error::Eval(format!("lambda parameters {}", formals)))
    }

    fn bind_args(&self, args: Expr, env: &Environment) -> Result<(), Error> {
        match *self {
            Formal::Nothing => {
                if args.is_nil() {
                    Ok(())
                } else {
                    Err(Error::Apply(format!("procedure of no arguments to {}", args)))
                }
            }
            Formal::Single(ref name) => match args.as_pair() {
                Some((arg, rest)) if rest.is_nil() => {
                    env.bind(name, arg.clone());
                    Ok(())
                }
                _ => Err(Error::Apply(format!("procedure of one argument to {}", args))),
            },
            Formal::Rest(ref name) => {
                env.bind(name, args);
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, Finalize, PartialEq, Trace)]
pub struct Lambda {
    closure: Environment,
    formal: Formal,
    body: Expr,
}

/// "Evaluate `body` under `env` next." Only ever handed back to the
/// trampoline, never to user code.
#[derive(Clone, Debug)]
pub struct Thunk {
    body: Expr,
    env: Environment,
}

pub type Step = Either<Thunk, Expr>;

type SpecialForm = fn(&Evaluator, Vec<Expr>, &Environment) -> Result<Step, Error>;

lazy_static! {
    static ref SPECIAL_FORMS: HashMap<&'static str, SpecialForm> = hashmap! {
        "quote" => quote as SpecialForm,
        "lambda" => lambda as SpecialForm,
        "define" => define as SpecialForm,
        "if" => syntax_if as SpecialForm,
        "current-environment" => current_environment as SpecialForm,
        "toggle-debug" => toggle_debug as SpecialForm,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Log every evaluation step and application under `vole::trace`.
    pub debug: bool,
}

#[derive(Debug, Default)]
pub struct Evaluator {
    debug: Cell<bool>,
}

impl Evaluator {
    pub fn new(config: Config) -> Evaluator {
        Evaluator {
            debug: Cell::new(config.debug),
        }
    }

    pub fn debug(&self) -> bool {
        self.debug.get()
    }

    /// Evaluates `expr` to completion.
    pub fn eval(&self, expr: &Expr, env: &Environment) -> Result<Expr, Error> {
        let step = self.step(expr, env)?;
        self.complete(step)
    }

    /// The trampoline: keeps stepping until a final value comes out.
    pub fn complete(&self, step: Step) -> Result<Expr, Error> {
        let mut cur_step = step;
        loop {
            match cur_step {
                Left(thunk) => cur_step = self.step(&thunk.body, &thunk.env)?,
                Right(result) => return Ok(result),
            }
        }
    }

    /// A single transition. Tail positions come back as a `Thunk`.
    pub fn step(&self, expr: &Expr, env: &Environment) -> Result<Step, Error> {
        if self.debug() {
            info!(target: "vole::trace", "eval {}", expr);
        }
        match *expr.data() {
            ExprData::Symbol(ref name) => env
                .lookup(name)
                .map(Right)
                .ok_or_else(|| Error::Unbound(name.clone())),
            ExprData::Pair(Some(ref head), Some(ref rest)) => {
                if !rest.is_list() {
                    return Err(Error::Eval(expr.to_string()));
                }
                self.step_combination(head, rest, env)
            }
            _ => Ok(Right(expr.clone())),
        }
    }

    fn step_combination(&self, head: &Expr, operands: &Expr, env: &Environment)
        -> Result<Step, Error> {

        let procedure = if let Some(name) = head.as_symbol() {
            // Bindings shadow special forms of the same name.
            match env.lookup(name) {
                Some(procedure) => procedure,
                None => {
                    let form = SPECIAL_FORMS
                        .get(name)
                        .ok_or_else(|| Error::Unbound(name.to_string()))?;
                    let operands = operands
                        .to_vec()
                        .ok_or_else(|| Error::Eval(operands.to_string()))?;
                    return form(self, operands, env);
                }
            }
        } else {
            self.eval(head, env)?
        };
        let args = self.evlis(operands, env)?;
        self.apply(&procedure, args, env)
    }

    /// Evaluates each element of `list` left to right. An atom, nil
    /// included, comes back unchanged.
    pub fn evlis(&self, list: &Expr, env: &Environment) -> Result<Expr, Error> {
        let mut values = Vec::new();
        let mut head = list;
        while let Some((first, rest)) = head.as_pair() {
            values.push(self.eval(first, env)?);
            head = rest;
        }
        Ok(Expr::list_with_tail(values, head.clone()))
    }

    /// Applies `procedure` to an evaluated argument list. Lambda bodies are
    /// deferred as a `Thunk`; native procedures run immediately.
    pub fn apply(&self, procedure: &Expr, args: Expr, env: &Environment)
        -> Result<Step, Error> {

        if self.debug() {
            info!(target: "vole::trace", "apply {} to {}", procedure, args);
        }
        match *procedure.data() {
            ExprData::Lambda(ref lambda) => {
                let call_env = env.snapshot();
                call_env.merge(&lambda.closure);
                lambda.formal.bind_args(args, &call_env)?;
                Ok(Left(Thunk {
                    body: lambda.body.clone(),
                    env: call_env,
                }))
            }
            ExprData::Native(ref native) => Ok(Right(native.call(args)?)),
            _ => Err(Error::Apply(procedure.to_string())),
        }
    }
}

fn quote(_: &Evaluator, operands: Vec<Expr>, _: &Environment) -> Result<Step, Error> {
    match <[Expr; 1]>::try_from(operands) {
        Ok([quoted]) => Ok(Right(quoted)),
        Err(operands) => Err(Error::Eval(form_text("quote", operands))),
    }
}

fn syntax_if(evaluator: &Evaluator, operands: Vec<Expr>, env: &Environment)
    -> Result<Step, Error> {

    let (cond, if_true, if_false) = match operands.as_slice() {
        [cond, if_true] => (cond.clone(), if_true.clone(), None),
        [cond, if_true, if_false] => (cond.clone(), if_true.clone(), Some(if_false.clone())),
        _ => return Err(Error::Eval(form_text("if", operands.to_vec()))),
    };

    if evaluator.eval(&cond, env)?.is_true() {
        Ok(Left(Thunk { body: if_true, env: env.clone() }))
    } else {
        match if_false {
            Some(body) => Ok(Left(Thunk { body, env: env.clone() })),
            None => Ok(Right(Expr::unspecified())),
        }
    }
}

fn lambda(_: &Evaluator, operands: Vec<Expr>, env: &Environment) -> Result<Step, Error> {
    match <[Expr; 2]>::try_from(operands) {
        Ok([formals, body]) => Ok(Right(Expr::lambda(Lambda {
            closure: env.snapshot(),
            formal: Formal::from_object(&formals)?,
            body,
        }))),
        Err(operands) => Err(Error::Eval(form_text("lambda", operands))),
    }
}

fn define(evaluator: &Evaluator, operands: Vec<Expr>, env: &Environment)
    -> Result<Step, Error> {

    let [target, value_expr] = match <[Expr; 2]>::try_from(operands) {
        Ok(pair) => pair,
        Err(operands) => return Err(Error::Eval(form_text("define", operands))),
    };
    let name = target
        .as_symbol()
        .ok_or_else(|| Error::Eval(format!("define of non-symbol {}", target)))?;
    if env.contains(name) {
        return Err(Error::Redefinition(name.to_string()));
    }
    let value = evaluator.eval(&value_expr, env)?;
    env.define(name, value)?;
    Ok(Right(Expr::unspecified()))
}

fn current_environment(_: &Evaluator, operands: Vec<Expr>, env: &Environment)
    -> Result<Step, Error> {

    if operands.is_empty() {
        Ok(Right(Expr::environment(env.clone())))
    } else {
        Err(Error::Eval(form_text("current-environment", operands)))
    }
}

fn toggle_debug(evaluator: &Evaluator, operands: Vec<Expr>, _: &Environment)
    -> Result<Step, Error> {

    if !operands.is_empty() {
        return Err(Error::Eval(form_text("toggle-debug", operands)));
    }
    let debug = !evaluator.debug();
    evaluator.debug.set(debug);
    Ok(Right(Expr::boolean(debug)))
}

fn form_text(keyword: &str, operands: Vec<Expr>) -> String {
    Expr::cons(Expr::symbol(keyword), Expr::list(operands)).to_string()
}
