use crate::ast;
use crate::automata::program::InstPtr;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] ast::Error),
    /// The backtracking stack would have grown past its limit. This is not a
    /// failed match: the pattern/input pair is too expensive for the engine.
    #[error("backtrack stack exceeded its limit of {limit} branches")]
    CapacityExceeded { limit: usize },
    #[error("instruction {ip} refers to {target}, which is outside the program")]
    InvalidProgram { ip: InstPtr, target: InstPtr },
    #[error("program start {start} is outside a program of {len} instructions")]
    InvalidStart { start: InstPtr, len: usize },
}
