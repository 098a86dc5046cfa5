use serde::{Deserialize, Serialize};
use std::fmt;

/// Error raised while parsing an encoded expression or coercing a literal.
///
/// `Parse` covers structural problems (arity, unknown operators, malformed
/// option records); `Literal` covers a primitive that cannot be coerced into
/// the declared type; `Unsupported` is raised when compiling an operator the
/// cpu evaluator does not implement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprError {
    Parse(String),
    Literal(String),
    Unsupported(String),
}

impl ExprError {
    pub fn parse(msg: &str) -> ExprError {
        ExprError::Parse(msg.to_owned())
    }

    pub fn literal(msg: &str) -> ExprError {
        ExprError::Literal(msg.to_owned())
    }

    pub fn unsupported(msg: &str) -> ExprError {
        ExprError::Unsupported(msg.to_owned())
    }

    pub fn message<'a>(&'a self) -> &'a str {
        match self {
            ExprError::Parse(msg) => msg,
            ExprError::Literal(msg) => msg,
            ExprError::Unsupported(msg) => msg,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            ExprError::Parse(msg) => msg,
            ExprError::Literal(msg) => msg,
            ExprError::Unsupported(msg) => msg,
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ExprError {}

pub type ExprResult<T> = Result<T, ExprError>;
