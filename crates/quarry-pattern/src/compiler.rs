//! Recursive-descent compiler from pattern text to [`PatternAst`].

use std::fmt;
use std::str::FromStr;

use quarry_syntax::Value;

use crate::ast::{Arity, ChildList, PatternAst};
use crate::error::{PatternErrorKind, PatternSyntaxError};
use crate::lexer::{Spanned, Token, tokenize};
use crate::matcher::Subject;

/// Compiles pattern text into a [`PatternAst`].
///
/// Compilation is pure: the same text always yields an equal tree.
///
/// # Errors
///
/// Returns [`PatternSyntaxError`] with the byte offset of the first problem
/// when `source` is not a well-formed pattern.
pub fn compile(source: &str) -> Result<PatternAst, PatternSyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = PatternParser {
        source,
        tokens: &tokens,
        cursor: 0,
    };
    let ast = parser.pattern()?;
    let trailing = parser.peek();
    if trailing.token != Token::Eof {
        return Err(parser.error_at(trailing.offset, PatternErrorKind::TrailingInput));
    }
    Ok(ast)
}

/// A compiled pattern together with the text it was compiled from.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    ast: PatternAst,
}

impl Pattern {
    /// Compiles `source` into a reusable matcher.
    ///
    /// # Errors
    ///
    /// Returns [`PatternSyntaxError`] when `source` is malformed.
    pub fn compile(source: &str) -> Result<Self, PatternSyntaxError> {
        Ok(Self {
            source: source.to_owned(),
            ast: compile(source)?,
        })
    }

    /// Returns the text this pattern was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the compiled operator tree.
    #[must_use]
    pub const fn ast(&self) -> &PatternAst {
        &self.ast
    }

    /// Tests the pattern against a node or slot.
    #[must_use]
    pub fn matches<'a>(&self, subject: impl Into<Subject<'a>>) -> bool {
        self.ast.matches(subject)
    }
}

impl FromStr for Pattern {
    type Err = PatternSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One entry of a child list before `...` placement is validated.
enum ChildEntry {
    Pattern(PatternAst),
    Ellipsis(usize),
}

struct PatternParser<'t> {
    source: &'t str,
    tokens: &'t [Spanned],
    cursor: usize,
}

impl PatternParser<'_> {
    fn peek(&self) -> Spanned {
        self.tokens
            .get(self.cursor)
            .cloned()
            .unwrap_or_else(|| Spanned {
                token: Token::Eof,
                offset: self.source.len(),
            })
    }

    fn advance(&mut self) -> Spanned {
        let current = self.peek();
        if current.token != Token::Eof {
            self.cursor += 1;
        }
        current
    }

    fn eat(&mut self, token: &Token) -> bool {
        if &self.peek().token == token {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn error_at(&self, offset: usize, kind: PatternErrorKind) -> PatternSyntaxError {
        PatternSyntaxError::new(self.source, offset, kind)
    }

    fn unexpected(&self, found: &Spanned, expected: &'static str) -> PatternSyntaxError {
        let kind = if found.token == Token::Eof {
            PatternErrorKind::UnexpectedEnd { expected }
        } else {
            PatternErrorKind::UnexpectedToken {
                found: found.token.to_string(),
                expected,
            }
        };
        self.error_at(found.offset, kind)
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), PatternSyntaxError> {
        let found = self.peek();
        if &found.token == token {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.unexpected(&found, expected))
        }
    }

    fn pattern(&mut self) -> Result<PatternAst, PatternSyntaxError> {
        if self.eat(&Token::Bang) {
            return Ok(PatternAst::negation(self.pattern()?));
        }
        if self.eat(&Token::Caret) {
            return Ok(PatternAst::anywhere(self.pattern()?));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<PatternAst, PatternSyntaxError> {
        let next = self.advance();
        match next.token {
            Token::Underscore => {
                if self.peek().token == Token::LParen {
                    Ok(PatternAst::Children(self.child_list()?))
                } else {
                    Ok(PatternAst::Wildcard)
                }
            }
            Token::Ident(kind) => {
                if self.peek().token == Token::LParen {
                    Ok(PatternAst::Node {
                        kind,
                        children: self.child_list()?,
                    })
                } else {
                    Ok(PatternAst::TypeMatch(kind))
                }
            }
            Token::Str(text) => Ok(PatternAst::Literal(Value::String(text))),
            Token::Int(value) => Ok(PatternAst::Literal(Value::Integer(value))),
            Token::Float(value) => Ok(PatternAst::Literal(Value::Float(value))),
            Token::True => Ok(PatternAst::Literal(Value::Boolean(true))),
            Token::False => Ok(PatternAst::Literal(Value::Boolean(false))),
            Token::Nil => Ok(PatternAst::Literal(Value::Nil)),
            Token::LBrace => self.braced_alternation(next.offset),
            Token::LParen => self.group(),
            Token::Ellipsis => {
                Err(self.error_at(next.offset, PatternErrorKind::EllipsisOutsideChildren))
            }
            _ => Err(self.unexpected(&next, "a pattern")),
        }
    }

    /// Parses `{a | b}` after the opening brace. A single member still forms
    /// an alternation.
    fn braced_alternation(&mut self, open: usize) -> Result<PatternAst, PatternSyntaxError> {
        if self.peek().token == Token::RBrace {
            return Err(self.error_at(open, PatternErrorKind::EmptyAlternation));
        }
        let members = self.members()?;
        self.expect(&Token::RBrace, "'|' or '}'")?;
        Ok(PatternAst::Alternation(members))
    }

    /// Parses `(a | b)` after the opening parenthesis. A single member is
    /// plain grouping.
    fn group(&mut self) -> Result<PatternAst, PatternSyntaxError> {
        let members = self.members()?;
        self.expect(&Token::RParen, "'|' or ')'")?;
        Ok(match <[PatternAst; 1]>::try_from(members) {
            Ok([only]) => only,
            Err(members) => PatternAst::Alternation(members),
        })
    }

    fn members(&mut self) -> Result<Vec<PatternAst>, PatternSyntaxError> {
        let mut members = vec![self.pattern()?];
        while self.eat(&Token::Pipe) {
            members.push(self.pattern()?);
        }
        Ok(members)
    }

    fn child_list(&mut self) -> Result<ChildList, PatternSyntaxError> {
        self.expect(&Token::LParen, "'('")?;
        let mut entries = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                let next = self.peek();
                if next.token == Token::Ellipsis {
                    self.cursor += 1;
                    entries.push(ChildEntry::Ellipsis(next.offset));
                } else {
                    entries.push(ChildEntry::Pattern(self.pattern()?));
                }
                if self.eat(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma, "',' or ')'")?;
            }
        }
        self.finish_child_list(entries)
    }

    fn finish_child_list(&self, entries: Vec<ChildEntry>) -> Result<ChildList, PatternSyntaxError> {
        let ellipses: Vec<usize> = entries
            .iter()
            .filter_map(|entry| match entry {
                ChildEntry::Ellipsis(offset) => Some(*offset),
                ChildEntry::Pattern(_) => None,
            })
            .collect();
        if let Some(second) = ellipses.get(1) {
            return Err(self.error_at(*second, PatternErrorKind::MultipleEllipsis));
        }

        let open = matches!(entries.last(), Some(ChildEntry::Ellipsis(_)));
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                ChildEntry::Pattern(item) => items.push(item),
                ChildEntry::Ellipsis(offset) if !open => {
                    return Err(self.error_at(offset, PatternErrorKind::EllipsisNotLast));
                }
                ChildEntry::Ellipsis(_) => {}
            }
        }
        let arity = if open { Arity::Open } else { Arity::Exact };
        Ok(ChildList::new(items, arity))
    }
}
