use std::fmt;

use crate::errors::Error;

pub type InstPtr = usize;

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Inst {
    Match,
    Char(InstChar),
    Any(InstAny),
    Jmp(InstJmp),
    Split(InstSplit),
    Save(InstSave),
}

impl Inst {
    /// Successor references, in priority order.
    fn gotos(&self) -> impl Iterator<Item = InstPtr> {
        let (first, second) = match *self {
            Inst::Match => (None, None),
            Inst::Char(InstChar { goto, .. })
            | Inst::Any(InstAny { goto })
            | Inst::Jmp(InstJmp { goto })
            | Inst::Save(InstSave { goto, .. }) => (Some(goto), None),
            Inst::Split(InstSplit { goto1, goto2 }) => (Some(goto1), Some(goto2)),
        };
        first.into_iter().chain(second)
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct InstSave {
    pub slot: usize,
    pub goto: InstPtr,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct InstChar {
    pub c: u8,
    pub goto: InstPtr,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct InstAny {
    pub goto: InstPtr,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct InstJmp {
    pub goto: InstPtr,
}

/// `goto1` is the primary successor and is always explored first.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct InstSplit {
    pub goto1: InstPtr,
    pub goto2: InstPtr,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Program {
    pub insts: Vec<Inst>,
    pub start: InstPtr,
    /// Number of capture slots the compiler assigned, `2 * (groups + 1)`.
    pub slots: usize,
}

impl Program {
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.slots
    }

    /// Checks that `start` and every successor reference land inside the
    /// program. Engines run this before executing so that a malformed
    /// program fails here instead of indexing out of bounds.
    pub fn validate(&self) -> Result<(), Error> {
        let len = self.insts.len();
        if self.start >= len {
            return Err(Error::InvalidStart {
                start: self.start,
                len,
            });
        }
        for (ip, inst) in self.insts.iter().enumerate() {
            if let Some(target) = inst.gotos().find(|&t| t >= len) {
                return Err(Error::InvalidProgram { ip, target });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Inst::Match => write!(f, "match"),
            Inst::Char(InstChar { c, goto }) => {
                write!(f, "char {:?} -> {}", char::from(c), goto)
            }
            Inst::Any(InstAny { goto }) => write!(f, "any -> {}", goto),
            Inst::Jmp(InstJmp { goto }) => write!(f, "jmp {}", goto),
            Inst::Split(InstSplit { goto1, goto2 }) => write!(f, "split {}, {}", goto1, goto2),
            Inst::Save(InstSave { slot, goto }) => write!(f, "save {} -> {}", slot, goto),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ip, inst) in self.insts.iter().enumerate() {
            let marker = if ip == self.start { '>' } else { ' ' };
            writeln!(f, "{}{:3}. {}", marker, ip, inst)?;
        }
        Ok(())
    }
}
