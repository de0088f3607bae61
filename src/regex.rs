use crate::ast::parser::Parser;
use crate::automata::compiler::Compiler;
use crate::automata::program::Program;
use crate::errors::Error;
use crate::executor::{Captures, Executor, ExecutorType};

/// A compiled pattern, matched with the Pike engine.
///
/// The program is immutable, so one `Regex` can be shared across threads.
pub struct Regex(Program);

impl Regex {
    /// Compiles `pat` anchored at the start of the input.
    pub fn new(pat: &str) -> Result<Regex, Error> {
        Self::build(pat, false)
    }

    /// Compiles `pat` so that a match may start anywhere in the input.
    pub fn unanchored(pat: &str) -> Result<Regex, Error> {
        Self::build(pat, true)
    }

    fn build(pat: &str, unanchored: bool) -> Result<Regex, Error> {
        let ast = Parser::new(pat.to_owned()).parse()?;
        let c = Compiler::new().unanchored(unanchored).compile(&ast)?;
        Ok(Regex(c))
    }

    pub fn program(&self) -> &Program {
        &self.0
    }

    pub fn is_match(&self, s: &str) -> Result<bool, Error> {
        Ok(self.captures(s)?.is_some())
    }

    /// Runs the program over `s`. `Ok(None)` means no match; an `Err` means
    /// the run itself failed.
    pub fn captures(&self, s: &str) -> Result<Option<Captures>, Error> {
        Executor::new(ExecutorType::Pike).exec(&self.0, s.as_bytes(), self.0.slot_count())
    }
}
