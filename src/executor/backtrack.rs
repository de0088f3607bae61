use log::{debug, trace};

use crate::automata::program::{
    Inst, InstAny, InstChar, InstJmp, InstPtr, InstSave, InstSplit, Program,
};
use crate::errors::Error;
use crate::executor::captures::{Captures, Frame, Frames};

/// Default bound on branches waiting on the stack.
pub const DEFAULT_STACK_LIMIT: usize = 1000;

struct Branch {
    ip: InstPtr,
    at: usize,
    /// Non-consuming steps taken since the last consumed byte.
    idle: usize,
    frame: Frame,
}

/// Depth-first interpreter with an explicit, bounded branch stack.
///
/// A branch runs until it dies or matches. At a split the secondary successor
/// is pushed and the branch carries on with the primary one, so the first
/// match found is the one a recursive backtracker would find first.
///
/// A branch that takes more non-consuming steps in a row than the program
/// has instructions must have revisited an instruction without consuming
/// input, so it is dropped. Without that a lazy loop whose body matches empty
/// would spin forever with a stack that never grows.
pub(crate) struct BacktrackExecutor<'a> {
    program: &'a Program,
    limit: usize,
    stack: Vec<Branch>,
}

impl<'a> BacktrackExecutor<'a> {
    pub(crate) fn new(program: &'a Program, limit: usize) -> BacktrackExecutor<'a> {
        BacktrackExecutor {
            program,
            limit,
            stack: vec![],
        }
    }

    pub(crate) fn exec(
        &mut self,
        frames: &Frames,
        input: &[u8],
    ) -> Result<Option<Captures>, Error> {
        self.stack.clear();
        self.stack.push(Branch {
            ip: self.program.start,
            at: 0,
            idle: 0,
            frame: frames.fresh(),
        });

        let len = self.program.len();
        while let Some(Branch {
            mut ip,
            mut at,
            mut idle,
            mut frame,
        }) = self.stack.pop()
        {
            debug_assert!(frame.refs() > 0);
            loop {
                if idle > len {
                    trace!("backtrack: empty cycle through {} at {} dropped", ip, at);
                    break;
                }
                match self.program.insts[ip] {
                    Inst::Char(InstChar { c, goto }) => {
                        if input.get(at) != Some(&c) {
                            break;
                        }
                        ip = goto;
                        at += 1;
                        idle = 0;
                    }
                    Inst::Any(InstAny { goto }) => {
                        if at >= input.len() {
                            break;
                        }
                        ip = goto;
                        at += 1;
                        idle = 0;
                    }
                    Inst::Match => {
                        trace!("backtrack: match at {} with {} pending", at, self.stack.len());
                        self.stack.clear();
                        return Ok(Some(frame.to_captures()));
                    }
                    Inst::Jmp(InstJmp { goto }) => {
                        ip = goto;
                        idle += 1;
                    }
                    Inst::Split(InstSplit { goto1, goto2 }) => {
                        if self.stack.len() >= self.limit {
                            debug!("backtrack: stack limit {} reached at {}", self.limit, at);
                            self.stack.clear();
                            return Err(Error::CapacityExceeded { limit: self.limit });
                        }
                        idle += 1;
                        self.stack.push(Branch {
                            ip: goto2,
                            at,
                            idle,
                            frame: frame.clone(),
                        });
                        ip = goto1;
                    }
                    Inst::Save(InstSave { slot, goto }) => {
                        frame = frame.update(slot, at);
                        ip = goto;
                        idle += 1;
                    }
                }
            }
        }
        Ok(None)
    }
}
