use log::trace;

use crate::automata::program::{Inst, InstAny, InstChar, InstJmp, InstPtr, InstSave, InstSplit, Program};
use crate::executor::captures::{Captures, Frame, Frames};
use crate::executor::threads::{Marks, Threads};

struct Thread {
    ip: InstPtr,
    frame: Frame,
}

/// Lock-step simulation that carries a capture frame per branch.
///
/// Two branches at the same instruction behave identically from then on, so
/// the lists still hold at most one branch per instruction; the one added
/// first has the higher priority and keeps its captures.
pub(crate) struct PikeExecutor<'a> {
    program: &'a Program,
    marks: Marks,
    stack: Vec<Thread>,
}

impl<'a> PikeExecutor<'a> {
    pub(crate) fn new(program: &'a Program) -> PikeExecutor<'a> {
        PikeExecutor {
            program,
            marks: Marks::new(program.len()),
            stack: vec![],
        }
    }

    /// Follows jumps, splits and saves from `ip` with input position `at`,
    /// adding the consuming instructions and `match` reached to `list` in
    /// priority order. A split shares the frame between both successors; a
    /// branch that reaches an instruction already on the list is dropped
    /// along with its frame reference.
    fn add(&mut self, list: &mut Threads<Thread>, ip: InstPtr, frame: Frame, at: usize) {
        self.stack.push(Thread { ip, frame });
        while let Some(Thread { ip, frame }) = self.stack.pop() {
            if !self.marks.insert(ip) {
                continue;
            }
            match self.program.insts[ip] {
                Inst::Match | Inst::Char(_) | Inst::Any(_) => list.push(Thread { ip, frame }),
                Inst::Jmp(InstJmp { goto }) => self.stack.push(Thread { ip: goto, frame }),
                Inst::Split(InstSplit { goto1, goto2 }) => {
                    self.stack.push(Thread {
                        ip: goto2,
                        frame: frame.clone(),
                    });
                    self.stack.push(Thread { ip: goto1, frame });
                }
                Inst::Save(InstSave { slot, goto }) => self.stack.push(Thread {
                    ip: goto,
                    frame: frame.update(slot, at),
                }),
            }
        }
    }

    pub(crate) fn exec(&mut self, frames: &Frames, input: &[u8]) -> Option<Captures> {
        let len = self.program.len();
        let mut clist = Threads::new(len);
        let mut nlist = Threads::new(len);
        let mut matched: Option<Frame> = None;

        self.marks.next_generation();
        self.add(&mut clist, self.program.start, frames.fresh(), 0);
        for at in 0..=input.len() {
            if clist.is_empty() {
                break;
            }
            trace!("pike: {} branches at {}", clist.len(), at);
            self.marks.next_generation();
            let byte = input.get(at).copied();
            for Thread { ip, frame } in clist.drain() {
                match self.program.insts[ip] {
                    Inst::Char(InstChar { c, goto }) => {
                        if byte == Some(c) {
                            self.add(&mut nlist, goto, frame, at + 1);
                        }
                    }
                    Inst::Any(InstAny { goto }) => {
                        if byte.is_some() {
                            self.add(&mut nlist, goto, frame, at + 1);
                        }
                    }
                    Inst::Match => {
                        // Dropping the rest of the drain releases every lower
                        // priority branch. Branches already on `nlist` came
                        // from higher priority ones and keep running.
                        matched = Some(frame);
                        break;
                    }
                    Inst::Jmp(_) | Inst::Split(_) | Inst::Save(_) => {
                        unreachable!("only consuming instructions are queued")
                    }
                }
            }
            std::mem::swap(&mut clist, &mut nlist);
            nlist.clear();
        }

        matched.map(|frame| frame.to_captures())
    }
}
