pub mod ast;
pub mod automata;
pub mod errors;
pub mod executor;
pub mod regex;

pub use crate::errors::Error;
pub use crate::executor::{Captures, Executor, ExecutorType};
pub use crate::regex::Regex;
