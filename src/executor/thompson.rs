use log::trace;

use crate::automata::program::{Inst, InstAny, InstChar, InstJmp, InstPtr, InstSave, InstSplit, Program};
use crate::executor::captures::Captures;
use crate::executor::threads::{Marks, Threads};

/// Where the overall match started and ended on this branch: the positions
/// at which it passed `save 0` and `save 1`.
type Bounds = [Option<usize>; 2];

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
struct Thread {
    ip: InstPtr,
    bounds: Bounds,
}

/// Lock-step simulation without captures.
///
/// A branch is an instruction pointer plus the overall match bounds; no other
/// group is tracked, so only slots 0 and 1 can be reported.
pub(crate) struct ThompsonExecutor<'a> {
    program: &'a Program,
    marks: Marks,
    stack: Vec<Thread>,
}

impl<'a> ThompsonExecutor<'a> {
    pub(crate) fn new(program: &'a Program) -> ThompsonExecutor<'a> {
        ThompsonExecutor {
            program,
            marks: Marks::new(program.len()),
            stack: vec![],
        }
    }

    /// Adds `ip` and everything reachable from it without consuming input.
    /// Only consuming instructions and `match` land on the list, in priority
    /// order.
    fn add(&mut self, list: &mut Threads<Thread>, ip: InstPtr, bounds: Bounds, at: usize) {
        self.stack.push(Thread { ip, bounds });
        while let Some(Thread { ip, mut bounds }) = self.stack.pop() {
            if !self.marks.insert(ip) {
                continue;
            }
            match self.program.insts[ip] {
                Inst::Match | Inst::Char(_) | Inst::Any(_) => list.push(Thread { ip, bounds }),
                Inst::Jmp(InstJmp { goto }) => self.stack.push(Thread { ip: goto, bounds }),
                Inst::Save(InstSave { slot, goto }) => {
                    if let Some(b) = bounds.get_mut(slot) {
                        *b = Some(at);
                    }
                    self.stack.push(Thread { ip: goto, bounds })
                }
                Inst::Split(InstSplit { goto1, goto2 }) => {
                    self.stack.push(Thread { ip: goto2, bounds });
                    self.stack.push(Thread { ip: goto1, bounds });
                }
            }
        }
    }

    pub(crate) fn exec(&mut self, input: &[u8], nslots: usize) -> Option<Captures> {
        let len = self.program.len();
        let mut clist = Threads::new(len);
        let mut nlist = Threads::new(len);
        let mut matched: Option<Bounds> = None;

        self.marks.next_generation();
        self.add(&mut clist, self.program.start, [None; 2], 0);
        for at in 0..=input.len() {
            if clist.is_empty() {
                break;
            }
            trace!("thompson: {} branches at {}", clist.len(), at);
            self.marks.next_generation();
            let byte = input.get(at).copied();
            for Thread { ip, bounds } in clist.drain() {
                match self.program.insts[ip] {
                    Inst::Char(InstChar { c, goto }) => {
                        if byte == Some(c) {
                            self.add(&mut nlist, goto, bounds, at + 1);
                        }
                    }
                    Inst::Any(InstAny { goto }) => {
                        if byte.is_some() {
                            self.add(&mut nlist, goto, bounds, at + 1);
                        }
                    }
                    Inst::Match => {
                        // Lower priority branches are cut off; those already
                        // advanced to `nlist` may still match further on.
                        matched = Some(bounds);
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

        matched.map(|bounds| {
            let mut caps = Captures::new(nslots);
            for (slot, pos) in bounds.iter().enumerate() {
                if let Some(pos) = *pos {
                    caps.set(slot, pos);
                }
            }
            caps
        })
    }
}

#[cfg(test)]
mod test {
    use super::ThompsonExecutor;
    use crate::ast::parser::Parser;
    use crate::automata::compiler::Compiler;
    use crate::automata::program::{Inst, Program};
    use pretty_assertions::assert_eq;

    fn c(s: &str) -> Program {
        let ast = Parser::new(s.to_string()).parse().expect("should be valid ast");
        Compiler::new().compile(&ast).expect("should be valid")
    }

    fn run(prog: &Program, input: &str) -> Option<(usize, usize)> {
        ThompsonExecutor::new(prog)
            .exec(input.as_bytes(), 2)
            .and_then(|caps| caps.group(0))
    }

    #[test]
    fn overall_bounds_only() {
        let prog = &c("a(b|c)*");
        let caps = ThompsonExecutor::new(prog)
            .exec(b"abc", 4)
            .expect("should match");
        assert_eq!(caps.as_slice(), &[Some(0), Some(3), None, None]);
    }

    #[test]
    fn unanchored_start_follows_the_prefix() {
        let ast = Parser::new("b+".to_string()).parse().expect("should be valid ast");
        let prog = Compiler::new()
            .unanchored(true)
            .compile(&ast)
            .expect("should be valid");
        assert_eq!(run(&prog, "abbc"), Some((1, 3)));
        assert_eq!(run(&prog, "xxxb"), Some((3, 4)));
        assert_eq!(run(&prog, "xxx"), None);
    }

    #[test]
    fn unsaved_bounds_stay_unset() {
        let prog = Program {
            insts: vec![Inst::Match],
            start: 0,
            slots: 2,
        };
        let caps = ThompsonExecutor::new(&prog).exec(b"", 2).expect("should match");
        assert_eq!(caps.as_slice(), &[None, None]);
    }

    #[test]
    fn greedy_keeps_extending() {
        assert_eq!(run(&c("a*"), "aaab"), Some((0, 3)));
        assert_eq!(run(&c("a*"), "bbb"), Some((0, 0)));
    }

    #[test]
    fn lazy_stops_at_first_match() {
        assert_eq!(run(&c("a*?"), "aaa"), Some((0, 0)));
        assert_eq!(run(&c("a+?"), "aaa"), Some((0, 1)));
    }

    #[test]
    fn priority_over_length() {
        // `a` has priority over `ab`, and once it matches `ab` is cut off.
        assert_eq!(run(&c("a|ab"), "ab"), Some((0, 1)));
        assert_eq!(run(&c("ab|a"), "ab"), Some((0, 2)));
    }

    #[test]
    fn no_match() {
        assert_eq!(run(&c("abc"), "abd"), None);
        assert_eq!(run(&c("a"), ""), None);
    }

    #[test]
    fn empty_loops_terminate() {
        assert_eq!(run(&c("(a*)*b"), "aaab"), Some((0, 4)));
        // The empty iteration dies on the visited set, leaving `a` ahead of
        // the exit.
        assert_eq!(run(&c("(|a)*"), "aa"), Some((0, 2)));
    }
}
