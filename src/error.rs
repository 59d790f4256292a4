use std::io;

use thiserror::Error;

/// Every way reading or evaluating an expression can fail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("Symbol {0} is undefined")]
    Unbound(String),
    #[error("Symbol {0} is already defined")]
    Redefinition(String),
    #[error("cannot apply {0}")]
    Apply(String),
    #[error("cannot evaluate {0}")]
    Eval(String),
    #[error("{name}: {message}")]
    Native {
        name: String,
        message: String,
    },
    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    pub fn syntax<S: ToString>(message: S) -> Error {
        Error::Syntax(message.to_string())
    }

    pub fn native<S: ToString>(name: &str, message: S) -> Error {
        Error::Native {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err.to_string())
    }
}
