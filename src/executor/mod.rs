//! The three matching engines and the dispatcher in front of them.
//!
//! Every engine runs a [`Program`] against a byte slice from offset 0 and
//! reports the same leftmost-priority match; they differ in cost and in how
//! much of the capture state they track:
//!
//! * [`ExecutorType::Backtrack`] explores one branch at a time, depth first,
//!   with a bounded branch stack. Exponential in the worst case.
//! * [`ExecutorType::Thompson`] runs all branches in lock step without
//!   captures and reports only the overall match bounds.
//! * [`ExecutorType::Pike`] runs in lock step like Thompson but carries a
//!   shared, copy-on-write capture frame per branch.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::automata::program::Program;
use crate::errors::Error;

mod backtrack;
mod captures;
mod pike;
mod thompson;
mod threads;

pub use self::backtrack::DEFAULT_STACK_LIMIT;
pub use self::captures::Captures;

use self::backtrack::BacktrackExecutor;
use self::captures::Frames;
use self::pike::PikeExecutor;
use self::thompson::ThompsonExecutor;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ExecutorType {
    Backtrack,
    Thompson,
    Pike,
}

impl ExecutorType {
    pub const ALL: [ExecutorType; 3] = [
        ExecutorType::Backtrack,
        ExecutorType::Thompson,
        ExecutorType::Pike,
    ];

    pub fn name(&self) -> &'static str {
        match *self {
            ExecutorType::Backtrack => "backtrack",
            ExecutorType::Thompson => "thompson",
            ExecutorType::Pike => "pike",
        }
    }
}

impl fmt::Display for ExecutorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExecutorType::ALL
            .iter()
            .copied()
            .find(|typ| typ.name() == s)
            .ok_or_else(|| format!("unknown engine {:?}", s))
    }
}

#[derive(Debug, Clone)]
pub struct Executor {
    typ: ExecutorType,
    stack_limit: usize,
}

impl Executor {
    pub fn new(typ: ExecutorType) -> Executor {
        Executor {
            typ,
            stack_limit: DEFAULT_STACK_LIMIT,
        }
    }

    /// Bounds the number of pending branches the backtracking engine may
    /// hold. Ignored by the other engines.
    pub fn with_stack_limit(mut self, limit: usize) -> Executor {
        self.stack_limit = limit;
        self
    }

    pub fn typ(&self) -> ExecutorType {
        self.typ
    }

    /// Runs `program` against `input`, filling at most `nslots` capture slots.
    ///
    /// `Ok(None)` means no match. A match always reports exactly `nslots`
    /// slots; the Thompson engine only fills slots 0 and 1.
    pub fn exec(
        &self,
        program: &Program,
        input: &[u8],
        nslots: usize,
    ) -> Result<Option<Captures>, Error> {
        program.validate()?;
        match self.typ {
            ExecutorType::Backtrack => {
                let frames = Frames::new(nslots);
                let res = BacktrackExecutor::new(program, self.stack_limit).exec(&frames, input);
                Self::check_released(self.typ, &frames);
                res
            }
            ExecutorType::Thompson => Ok(ThompsonExecutor::new(program).exec(input, nslots)),
            ExecutorType::Pike => {
                let frames = Frames::new(nslots);
                let res = PikeExecutor::new(program).exec(&frames, input);
                Self::check_released(self.typ, &frames);
                Ok(res)
            }
        }
    }

    pub fn is_match(&self, program: &Program, input: &[u8]) -> Result<bool, Error> {
        Ok(self.exec(program, input, 0)?.is_some())
    }

    fn check_released(typ: ExecutorType, frames: &Frames) {
        debug!(
            "{}: {} fresh frames, {} still live",
            typ,
            frames.allocated(),
            frames.live()
        );
        debug_assert_eq!(frames.live(), 0, "{} leaked capture frames", typ);
    }
}

#[cfg(test)]
mod test {
    use super::{Executor, ExecutorType};
    use crate::ast::parser::Parser;
    use crate::automata::compiler::Compiler;
    use crate::automata::program::{Inst, InstChar, InstSplit, Program};
    use crate::errors::Error;
    use pretty_assertions::assert_eq;

    fn c(s: &str) -> Program {
        let ast = Parser::new(s.to_string()).parse().expect("should be valid ast");
        Compiler::new().compile(&ast).expect("should be valid")
    }

    fn group0(ex: &Executor, p: &Program, s: &str) -> Option<(usize, usize)> {
        ex.exec(p, s.as_bytes(), 2)
            .expect("should run")
            .and_then(|caps| caps.group(0))
    }

    #[test]
    fn all_engines() {
        for typ in ExecutorType::ALL {
            executor(Executor::new(typ));
        }
    }

    fn executor(ex: Executor) {
        let p = &c("ab");
        assert_eq!(group0(&ex, p, "ab"), Some((0, 2)));
        assert_eq!(group0(&ex, p, "abc"), Some((0, 2)));
        assert_eq!(group0(&ex, p, "a"), None);

        let p = &c("a|b");
        assert_eq!(group0(&ex, p, "a"), Some((0, 1)));
        assert_eq!(group0(&ex, p, "b"), Some((0, 1)));
        assert_eq!(group0(&ex, p, "c"), None);

        let p = &c("a*b");
        assert_eq!(group0(&ex, p, "b"), Some((0, 1)));
        assert_eq!(group0(&ex, p, "ab"), Some((0, 2)));
        assert_eq!(group0(&ex, p, "aaaaaaab"), Some((0, 8)));
        assert_eq!(group0(&ex, p, "abb"), Some((0, 2)));

        let p = &c("a+b");
        assert_eq!(group0(&ex, p, "b"), None);
        assert_eq!(group0(&ex, p, "ab"), Some((0, 2)));
        assert_eq!(group0(&ex, p, "aaaaaaab"), Some((0, 8)));

        let p = &c("a?b");
        assert_eq!(group0(&ex, p, "b"), Some((0, 1)));
        assert_eq!(group0(&ex, p, "ab"), Some((0, 2)));
        assert_eq!(group0(&ex, p, "aaab"), None);

        let p = &c("a(bc|cd)*e");
        assert_eq!(group0(&ex, p, "ae"), Some((0, 2)));
        assert_eq!(group0(&ex, p, "abce"), Some((0, 4)));
        assert_eq!(group0(&ex, p, "acde"), Some((0, 4)));
        assert_eq!(group0(&ex, p, "abccdbce"), Some((0, 8)));
        assert_eq!(group0(&ex, p, "abccd"), None);
        assert_eq!(group0(&ex, p, "abccdef"), Some((0, 6)));

        let p = &c("a.c");
        assert_eq!(group0(&ex, p, "abc"), Some((0, 3)));
        assert_eq!(group0(&ex, p, "ac"), None);

        let p = &c("☃+");
        assert_eq!(group0(&ex, p, "☃☃x"), Some((0, 6)));
    }

    #[test]
    fn start_at_match() {
        let p = Program {
            insts: vec![Inst::Match],
            start: 0,
            slots: 2,
        };
        for typ in [ExecutorType::Backtrack, ExecutorType::Pike] {
            let caps = Executor::new(typ)
                .exec(&p, b"", 4)
                .expect("should run")
                .expect("should match");
            assert_eq!(caps.as_slice(), &[None, None, None, None]);
        }
        assert!(Executor::new(ExecutorType::Thompson)
            .is_match(&p, b"")
            .expect("should run"));
    }

    #[test]
    fn invalid_program_fails_fast() {
        let p = Program {
            insts: vec![
                Inst::Split(InstSplit { goto1: 1, goto2: 2 }),
                Inst::Char(InstChar { c: b'a', goto: 9 }),
                Inst::Match,
            ],
            start: 0,
            slots: 0,
        };
        for typ in ExecutorType::ALL {
            assert_eq!(
                Executor::new(typ).exec(&p, b"a", 2),
                Err(Error::InvalidProgram { ip: 1, target: 9 })
            );
        }
    }

    #[test]
    fn captures_are_truncated_to_requested_slots() {
        let p = &c("(a)(b)");
        for typ in [ExecutorType::Backtrack, ExecutorType::Pike] {
            let caps = Executor::new(typ)
                .exec(p, b"ab", 3)
                .expect("should run")
                .expect("should match");
            assert_eq!(caps.as_slice(), &[Some(0), Some(2), Some(0)]);
        }
    }

    #[test]
    fn deep_repetition_overflows_backtracking_only() {
        let p = &c("(a(b)?)*c");
        let input = format!("{}c", "a".repeat(2000));
        assert_eq!(
            Executor::new(ExecutorType::Backtrack).exec(p, input.as_bytes(), 6),
            Err(Error::CapacityExceeded { limit: 1000 })
        );
        let caps = Executor::new(ExecutorType::Pike)
            .exec(p, input.as_bytes(), 6)
            .expect("should run")
            .expect("should match");
        assert_eq!(caps.as_slice(), &[Some(0), Some(2001), Some(1999), Some(2000), None, None]);
    }

    #[test]
    fn engine_names_round_trip() {
        for typ in ExecutorType::ALL {
            assert_eq!(typ.name().parse::<ExecutorType>(), Ok(typ));
        }
        assert!("recursive".parse::<ExecutorType>().is_err());
    }
}
