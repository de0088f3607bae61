use std::{result, vec};

use crate::{
    ast,
    automata::program::{Inst, InstAny, InstChar, InstPtr, InstSave, InstSplit, Program},
    errors::Error,
};

#[derive(Debug, Eq, PartialEq)]
enum MaybeInst {
    Compiled(Inst),
    Uncompiled(InstHole),
    Split {
        goto1: Option<InstPtr>,
        goto2: Option<InstPtr>,
    },
}

impl MaybeInst {
    fn unwrap(self) -> Inst {
        match self {
            MaybeInst::Compiled(inst) => inst,
            _ => unreachable!(
                "must be called on a compiled instruction, \
                 instead it was called on: {:?}",
                self
            ),
        }
    }

    fn fill(&mut self, goto: InstPtr) {
        let maybe_inst = match *self {
            MaybeInst::Uncompiled(ref hole) => MaybeInst::Compiled(hole.fill(goto)),
            _ => unreachable!("only an uncompiled hole can be filled, got {:?}", self),
        };
        *self = maybe_inst
    }

    fn fill_split(&mut self, goto1: Option<InstPtr>, goto2: Option<InstPtr>) {
        let (old1, old2) = match *self {
            MaybeInst::Split { goto1, goto2 } => (goto1, goto2),
            _ => unreachable!(
                "must be called on Split instruction, \
                 instead it was called on: {:?}",
                self
            ),
        };
        let (goto1, goto2) = (goto1.or(old1), goto2.or(old2));
        *self = match (goto1, goto2) {
            (Some(goto1), Some(goto2)) => MaybeInst::Compiled(Inst::Split(InstSplit { goto1, goto2 })),
            _ => MaybeInst::Split { goto1, goto2 },
        };
    }
}

#[derive(Debug, Eq, PartialEq)]
enum InstHole {
    Char { c: u8 },
    Any,
    Save { slot: usize },
}
impl InstHole {
    fn fill(&self, goto: InstPtr) -> Inst {
        match *self {
            InstHole::Char { c } => Inst::Char(InstChar { c, goto }),
            InstHole::Any => Inst::Any(InstAny { goto }),
            InstHole::Save { slot } => Inst::Save(InstSave { slot, goto }),
        }
    }
}

struct Patch {
    hole: Hole,
    entry: InstPtr,
}

enum Hole {
    None,
    One(InstPtr),
    /// The primary successor of the split at this index is still open.
    Goto1(InstPtr),
    /// The secondary successor of the split at this index is still open.
    Goto2(InstPtr),
    Many(Vec<Hole>),
}
impl Hole {
    fn new(holes: Vec<Hole>) -> Hole {
        match holes.len() {
            0 => Hole::None,
            1 => holes.into_iter().next().expect("exists"),
            _ => Hole::Many(holes),
        }
    }
}

type ResultOrEmpty = result::Result<Option<Patch>, Error>;

/// Lowers an [`ast::Ast`] into a [`Program`].
///
/// The whole pattern is wrapped in `save 0` / `save 1` and group `k` in
/// `save 2k` / `save 2k+1`. By default the program is anchored at the start
/// of the input; [`Compiler::unanchored`] prefixes a lazy `.*?` so a match may
/// begin anywhere.
pub struct Compiler {
    insts: Vec<MaybeInst>,
    unanchored: bool,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new()
    }
}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler {
            insts: vec![],
            unanchored: false,
        }
    }

    pub fn unanchored(mut self, yes: bool) -> Compiler {
        self.unanchored = yes;
        self
    }

    pub fn compile(mut self, ast: &ast::Ast) -> result::Result<Program, Error> {
        let mut hole = Hole::None;
        if self.unanchored {
            let split = self.push_split_hole();
            let any = self.push_hole(InstHole::Any);
            self.fill(any, split);
            self.insts[split].fill_split(None, Some(split + 1));
            hole = Hole::Goto1(split);
        }

        self.fill_to_next(hole);
        let mut hole = self.push_hole(InstHole::Save { slot: 0 });
        if let Some(Patch { hole: body, entry }) = self.c(ast)? {
            self.fill(hole, entry);
            hole = body;
        }
        self.fill_to_next(hole);
        let save = self.push_hole(InstHole::Save { slot: 1 });
        self.fill_to_next(save);
        self.push_compiled(Inst::Match);

        let insts = self
            .insts
            .into_iter()
            .map(|i| i.unwrap())
            .collect::<Vec<_>>();
        Ok(Program {
            insts,
            start: 0,
            slots: 2 * (ast.group_count() + 1),
        })
    }

    fn push_compiled(&mut self, inst: Inst) {
        self.insts.push(MaybeInst::Compiled(inst));
    }

    fn push_hole(&mut self, hole: InstHole) -> Hole {
        let pc = self.insts.len();
        self.insts.push(MaybeInst::Uncompiled(hole));
        Hole::One(pc)
    }

    fn push_split_hole(&mut self) -> InstPtr {
        let pc = self.insts.len();
        self.insts.push(MaybeInst::Split {
            goto1: None,
            goto2: None,
        });
        pc
    }

    fn pop_split_hole(&mut self) -> ResultOrEmpty {
        self.insts.pop();
        Ok(None)
    }

    /// Points the body branch of a repetition split at `body`, returning the
    /// still-open exit branch. Greedy repetitions prefer the body.
    fn fill_repetition_split(&mut self, split: InstPtr, body: InstPtr, greedy: bool) -> Hole {
        if greedy {
            self.insts[split].fill_split(Some(body), None);
            Hole::Goto2(split)
        } else {
            self.insts[split].fill_split(None, Some(body));
            Hole::Goto1(split)
        }
    }

    fn fill_to_next(&mut self, hole: Hole) {
        let next = self.insts.len();
        self.fill(hole, next);
    }

    fn fill(&mut self, hole: Hole, goto: InstPtr) {
        match hole {
            Hole::None => {}
            Hole::One(pc) => self.insts[pc].fill(goto),
            Hole::Goto1(pc) => self.insts[pc].fill_split(Some(goto), None),
            Hole::Goto2(pc) => self.insts[pc].fill_split(None, Some(goto)),
            Hole::Many(holes) => {
                for hole in holes {
                    self.fill(hole, goto)
                }
            }
        }
    }

    fn c(&mut self, ast: &ast::Ast) -> ResultOrEmpty {
        match *ast {
            ast::Ast::Empty(_) => self.c_empty(),
            ast::Ast::Concat(ref concat) => self.c_concat(concat.asts()),
            ast::Ast::Repetition(ref repetition) => self.c_repetition(
                repetition.kind(),
                repetition.greedy,
                repetition.ast.as_ref(),
            ),
            ast::Ast::Literal(ref literal) => self.c_char(literal.char),
            ast::Ast::Dot(_) => self.c_any(),
            ast::Ast::Group(ref group) => self.c_group(group.index, group.ast.as_ref()),
            ast::Ast::Alternation(ref alternation) => self.c_alternation(alternation.asts.as_ref()),
        }
    }

    fn c_empty(&mut self) -> ResultOrEmpty {
        Ok(None)
    }

    fn c_concat(&mut self, concat: &[ast::Ast]) -> ResultOrEmpty {
        let mut iter = concat.iter();
        let Patch { mut hole, entry } = loop {
            match iter.next() {
                Some(e) => {
                    if let Some(p) = self.c(e)? {
                        break p;
                    }
                }
                None => return self.c_empty(),
            }
        };
        for e in iter {
            if let Some(p) = self.c(e)? {
                self.fill(hole, p.entry);
                hole = p.hole;
            }
        }
        Ok(Some(Patch { hole, entry }))
    }

    /// A char lowers to one `char` instruction per byte of its UTF-8 encoding.
    fn c_char(&mut self, c: char) -> ResultOrEmpty {
        let mut buf = [0; 4];
        let entry = self.insts.len();
        let mut hole = Hole::None;
        for &b in c.encode_utf8(&mut buf).as_bytes() {
            self.fill_to_next(hole);
            hole = self.push_hole(InstHole::Char { c: b });
        }
        Ok(Some(Patch { hole, entry }))
    }

    fn c_any(&mut self) -> ResultOrEmpty {
        let entry = self.insts.len();
        let hole = self.push_hole(InstHole::Any);
        Ok(Some(Patch { hole, entry }))
    }

    fn c_group(&mut self, index: usize, ast: &ast::Ast) -> ResultOrEmpty {
        let entry = self.insts.len();
        let mut hole = self.push_hole(InstHole::Save { slot: 2 * index });
        if let Some(Patch { hole: body, entry }) = self.c(ast)? {
            self.fill(hole, entry);
            hole = body;
        }
        self.fill_to_next(hole);
        let hole = self.push_hole(InstHole::Save {
            slot: 2 * index + 1,
        });
        Ok(Some(Patch { hole, entry }))
    }

    fn c_alternation(&mut self, alt: &[ast::Ast]) -> ResultOrEmpty {
        let (last, init) = match alt.split_last() {
            Some(split) => split,
            None => return self.c_empty(),
        };
        let entry = self.insts.len();
        let mut holes: Vec<Hole> = vec![];
        let mut pending = Hole::None;

        for ast in init {
            self.fill_to_next(pending);
            let split = self.push_split_hole();
            match self.c(ast)? {
                Some(Patch { hole, entry }) => {
                    self.insts[split].fill_split(Some(entry), None);
                    holes.push(hole);
                }
                None => holes.push(Hole::Goto1(split)),
            }
            pending = Hole::Goto2(split);
        }
        match self.c(last)? {
            Some(Patch { hole, entry }) => {
                self.fill(pending, entry);
                holes.push(hole);
            }
            None => holes.push(pending),
        }
        Ok(Some(Patch {
            hole: Hole::new(holes),
            entry,
        }))
    }

    fn c_repetition(
        &mut self,
        kind: ast::RepetitionKind,
        greedy: bool,
        ast: &ast::Ast,
    ) -> ResultOrEmpty {
        match kind {
            ast::RepetitionKind::ZeroOrOne => self.c_zero_or_one(ast, greedy),
            ast::RepetitionKind::ZeroOrMore => self.c_zero_or_more(ast, greedy),
            ast::RepetitionKind::OneOrMore => self.c_one_or_more(ast, greedy),
        }
    }

    fn c_zero_or_one(&mut self, ast: &ast::Ast, greedy: bool) -> ResultOrEmpty {
        let split = self.push_split_hole();
        match self.c(ast)? {
            Some(Patch { hole, entry }) => {
                let exit = self.fill_repetition_split(split, entry, greedy);
                Ok(Some(Patch {
                    hole: Hole::new(vec![exit, hole]),
                    entry: split,
                }))
            }
            None => self.pop_split_hole(),
        }
    }

    fn c_zero_or_more(&mut self, ast: &ast::Ast, greedy: bool) -> ResultOrEmpty {
        let split = self.push_split_hole();
        match self.c(ast)? {
            Some(Patch { hole, entry }) => {
                self.fill(hole, split);
                let exit = self.fill_repetition_split(split, entry, greedy);
                Ok(Some(Patch {
                    hole: exit,
                    entry: split,
                }))
            }
            None => self.pop_split_hole(),
        }
    }

    fn c_one_or_more(&mut self, ast: &ast::Ast, greedy: bool) -> ResultOrEmpty {
        match self.c(ast)? {
            Some(Patch { hole, entry }) => {
                self.fill_to_next(hole);
                let split = self.push_split_hole();
                let exit = self.fill_repetition_split(split, entry, greedy);
                Ok(Some(Patch { hole: exit, entry }))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Compiler, Error};
    use crate::ast::parser::Parser;
    use crate::ast::Ast;
    use crate::automata::program::{self, Inst, Program};
    use pretty_assertions::assert_eq;
    use std::result::Result;

    fn p(s: &str) -> Ast {
        Parser::new(s.to_string())
            .parse()
            .expect("should be valid ast")
    }

    fn c(s: &str) -> Result<Program, Error> {
        Compiler::new().compile(&p(s))
    }

    fn i_split(goto1: usize, goto2: usize) -> Inst {
        Inst::Split(program::InstSplit { goto1, goto2 })
    }
    fn i_char(c: char, goto: usize) -> Inst {
        Inst::Char(program::InstChar { c: c as u8, goto })
    }
    fn i_any(goto: usize) -> Inst {
        Inst::Any(program::InstAny { goto })
    }
    fn i_save(slot: usize, goto: usize) -> Inst {
        Inst::Save(program::InstSave { slot, goto })
    }
    fn i_match() -> Inst {
        Inst::Match
    }

    fn program(v: Vec<Inst>, slots: usize) -> Result<Program, Error> {
        Ok(Program {
            insts: v,
            start: 0,
            slots,
        })
    }

    #[test]
    fn concat() {
        assert_eq!(
            c("ab"),
            program(
                vec![i_save(0, 1), i_char('a', 2), i_char('b', 3), i_save(1, 4), i_match()],
                2
            )
        );
    }

    #[test]
    fn empty() {
        assert_eq!(c(""), program(vec![i_save(0, 1), i_save(1, 2), i_match()], 2));
    }

    #[test]
    fn multibyte_literal() {
        let prog = c("é").expect("should compile");
        assert_eq!(
            prog.insts[1..3],
            [
                Inst::Char(program::InstChar { c: 0xc3, goto: 2 }),
                Inst::Char(program::InstChar { c: 0xa9, goto: 3 }),
            ]
        );
    }

    #[test]
    fn alternate() {
        assert_eq!(
            c("a|b|c"),
            program(
                vec![
                    i_save(0, 1),
                    i_split(2, 3),
                    i_char('a', 6),
                    i_split(4, 5),
                    i_char('b', 6),
                    i_char('c', 6),
                    i_save(1, 7),
                    i_match(),
                ],
                2
            )
        );
        assert_eq!(
            c("a||c"),
            program(
                vec![
                    i_save(0, 1),
                    i_split(2, 3),
                    i_char('a', 5),
                    i_split(5, 4),
                    i_char('c', 5),
                    i_save(1, 6),
                    i_match(),
                ],
                2
            )
        );
    }

    #[test]
    fn repeat_zero_or_many() {
        assert_eq!(
            c("a*"),
            program(vec![i_save(0, 1), i_split(2, 3), i_char('a', 1), i_save(1, 4), i_match()], 2)
        );
        assert_eq!(
            c("a*?"),
            program(vec![i_save(0, 1), i_split(3, 2), i_char('a', 1), i_save(1, 4), i_match()], 2)
        );
    }

    #[test]
    fn groups() {
        assert_eq!(
            c("a(b|c)*"),
            program(
                vec![
                    i_save(0, 1),
                    i_char('a', 2),
                    i_split(3, 8),
                    i_save(2, 4),
                    i_split(5, 6),
                    i_char('b', 7),
                    i_char('c', 7),
                    i_save(3, 2),
                    i_save(1, 9),
                    i_match(),
                ],
                4
            )
        );
    }

    #[test]
    fn repeat_zero_or_one() {
        assert_eq!(
            c("a?"),
            program(vec![i_save(0, 1), i_split(2, 3), i_char('a', 3), i_save(1, 4), i_match()], 2)
        );
    }

    #[test]
    fn repeat_one_or_many() {
        assert_eq!(
            c("a+"),
            program(vec![i_save(0, 1), i_char('a', 2), i_split(1, 3), i_save(1, 4), i_match()], 2)
        );
        assert_eq!(
            c("a+?"),
            program(vec![i_save(0, 1), i_char('a', 2), i_split(3, 1), i_save(1, 4), i_match()], 2)
        );
    }

    #[test]
    fn unanchored_prefix() {
        assert_eq!(
            Compiler::new().unanchored(true).compile(&p(".")),
            program(
                vec![i_split(2, 1), i_any(0), i_save(0, 3), i_any(4), i_save(1, 5), i_match()],
                2
            )
        );
    }

    #[test]
    fn compiled_programs_validate() {
        for pat in ["", "a", "a|", "(a|)*", "a(b(c|d)*)+?e", ".*x"] {
            let prog = c(pat).expect("should compile");
            assert_eq!(prog.validate(), Ok(()), "{}", pat);
        }
    }
}
