use thiserror::Error;

#[macro_export]
macro_rules! expect {
    ($cond:expr, $err:expr) => {
        if !$cond {
            Err($err)?;
        }
    };
}

pub type Result<T> = std::result::Result<T, LispError>;

/// Every failure the interpreter reports. Parse errors come out of the
/// reader, the rest out of evaluation; all are fail-fast, unwinding to the
/// embedding boundary without rolling back any `define`/`set!` already run.
#[derive(Error, Debug)]
pub enum LispError {
    // parse errors
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    #[error("unexpected end of input inside a string literal")]
    UnterminatedString,
    #[error("invalid escape character '{0}' in string literal")]
    InvalidEscape(char),
    #[error("invalid #-literal")]
    InvalidHashLiteral,
    #[error("`{0}` is reserved syntax")]
    ReservedSyntax(&'static str),
    #[error("number literal out of range")]
    NumberOutOfRange,
    #[error("prefix symbol `{0}` not followed by any form")]
    MissingQuotedForm(&'static str),

    // eval errors
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("no procedure named `{0}`")]
    ProcedureNotFound(String),
    #[error("unexpected arguments. expected {0}, received {1}")]
    IncorrectArguments(usize, usize),
    #[error("`{0}` cannot accept a non-numerical argument, received {1}")]
    NonNumericArgument(&'static str, &'static str),
    #[error("malformed `{0}` form")]
    BadSpecialForm(&'static str),

    // type errors
    #[error("invalid data type. expected {0}, received {1}")]
    InvalidDataType(&'static str, &'static str),
}
