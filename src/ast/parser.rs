use crate::ast::{self, Ast, ErrorKind, Literal, LiteralKind, Position, RepetitionKind, Span};

type Result<T> = std::result::Result<T, ast::Error>;

/// Single pass parser over the pattern text.
///
/// Characters are taken one at a time with their span. A sequence is built
/// up in a [`ast::Concat`]; `(` and `|` park the sequence built so far on the
/// `open` stack until the matching `)` or the end of the pattern.
pub struct Parser {
    pattern: String,
    offset: usize,
    open: Vec<Open>,
    groups: usize,
}

/// A construct still waiting for its closing token.
enum Open {
    /// Seen `(`: the sequence it interrupted, where it started and its
    /// capture index.
    Group {
        before: ast::Concat,
        start: Position,
        index: usize,
    },
    /// Seen `|` at the current nesting level, with the branches so far.
    Alternation(ast::Alternation),
}

impl Parser {
    pub fn new(pattern: String) -> Self {
        Parser {
            pattern,
            offset: 0,
            open: vec![],
            groups: 0,
        }
    }

    fn here(&self) -> Position {
        Position::new(self.offset)
    }

    fn peek(&self) -> Option<char> {
        self.pattern[self.offset..].chars().next()
    }

    /// Consumes the next character, returning it with the span it covers.
    fn take(&mut self) -> Option<(char, Span)> {
        let c = self.peek()?;
        let start = self.here();
        self.offset += c.len_utf8();
        Some((c, Span::new(start, self.here())))
    }

    fn fail(&self, span: Span, kind: ErrorKind) -> ast::Error {
        ast::Error {
            kind,
            pattern: self.pattern.clone(),
            span,
        }
    }

    pub fn parse(&mut self) -> Result<Ast> {
        let mut seq = ast::Concat::new(Span::point(self.here()));
        while let Some((c, span)) = self.take() {
            seq = match c {
                '(' => self.open_group(seq, span),
                ')' => self.close_group(seq, span)?,
                '|' => self.alternate(seq, span),
                '?' => self.repeat(seq, span, RepetitionKind::ZeroOrOne)?,
                '*' => self.repeat(seq, span, RepetitionKind::ZeroOrMore)?,
                '+' => self.repeat(seq, span, RepetitionKind::OneOrMore)?,
                '.' => then(seq, Ast::Dot(ast::Dot { span })),
                '\\' => then(seq, Ast::Literal(self.parse_escape(span)?)),
                _ => then(
                    seq,
                    Ast::Literal(Literal {
                        span,
                        kind: LiteralKind::Verbatim,
                        char: c,
                    }),
                ),
            };
        }
        self.finish(seq)
    }

    /// `\x` stands for `x` itself, whatever `x` is.
    fn parse_escape(&mut self, backslash: Span) -> Result<Literal> {
        match self.take() {
            Some((char, span)) => Ok(Literal {
                span: Span::new(backslash.start(), span.end()),
                kind: LiteralKind::Punctuation,
                char,
            }),
            None => Err(self.fail(backslash, ErrorKind::EscapeUnexpectedEof)),
        }
    }

    /// Wraps the last item of `seq` in a repetition. A `?` right after the
    /// operator makes it lazy.
    fn repeat(
        &mut self,
        mut seq: ast::Concat,
        op: Span,
        kind: RepetitionKind,
    ) -> Result<ast::Concat> {
        let operand = match seq.asts.pop() {
            Some(ast) => ast,
            None => {
                return Err(self.fail(Span::point(op.start()), ErrorKind::RepetitionMissing))
            }
        };
        let mut end = op.end();
        let greedy = self.peek() != Some('?');
        if !greedy {
            self.offset += 1;
            end = self.here();
        }
        seq.asts.push(Ast::Repetition(ast::Repetition {
            op: ast::RepetitionOp {
                span: Span::new(op.start(), end),
                kind,
            },
            greedy,
            ast: Box::new(operand),
        }));
        Ok(seq)
    }

    fn open_group(&mut self, seq: ast::Concat, paren: Span) -> ast::Concat {
        self.groups += 1;
        self.open.push(Open::Group {
            before: seq,
            start: paren.start(),
            index: self.groups,
        });
        ast::Concat::new(Span::point(paren.end()))
    }

    fn close_group(&mut self, seq: ast::Concat, paren: Span) -> Result<ast::Concat> {
        let body = self.end_branch(seq, paren.start());
        match self.open.pop() {
            Some(Open::Group {
                before,
                start,
                index,
            }) => Ok(then(
                before,
                Ast::Group(ast::Group {
                    span: Span::new(start, paren.end()),
                    index,
                    ast: Box::new(body),
                }),
            )),
            _ => Err(self.fail(Span::point(paren.start()), ErrorKind::GroupUnopened)),
        }
    }

    fn alternate(&mut self, mut seq: ast::Concat, bar: Span) -> ast::Concat {
        seq.span.end = bar.start();
        match self.open.last_mut() {
            Some(Open::Alternation(alt)) => alt.asts.push(seq.into_ast()),
            _ => {
                let alt = ast::Alternation {
                    span: Span::new(seq.span.start, bar.start()),
                    asts: vec![seq.into_ast()],
                };
                self.open.push(Open::Alternation(alt));
            }
        }
        ast::Concat::new(Span::point(bar.end()))
    }

    /// Ends `seq` at `end`. If it was the last branch of an alternation the
    /// alternation is closed and returned instead.
    fn end_branch(&mut self, mut seq: ast::Concat, end: Position) -> Ast {
        seq.span.end = end;
        match self.open.pop() {
            Some(Open::Alternation(mut alt)) => {
                alt.span.end = end;
                alt.asts.push(seq.into_ast());
                Ast::Alternation(alt)
            }
            other => {
                self.open.extend(other);
                seq.into_ast()
            }
        }
    }

    fn finish(&mut self, seq: ast::Concat) -> Result<Ast> {
        let ast = self.end_branch(seq, self.here());
        match self.open.pop() {
            None => Ok(ast),
            Some(Open::Group { start, .. }) => Err(self.fail(
                Span::new(start, Position::new(start.offset + 1)),
                ErrorKind::GroupUnclosed,
            )),
            Some(Open::Alternation(_)) => unreachable!("alternations are folded per level"),
        }
    }
}

fn then(mut seq: ast::Concat, ast: Ast) -> ast::Concat {
    seq.asts.push(ast);
    seq
}
