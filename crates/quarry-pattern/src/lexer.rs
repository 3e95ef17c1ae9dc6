//! Tokeniser for pattern text.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{PatternErrorKind, PatternSyntaxError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Underscore,
    Ellipsis,
    Str(String),
    Int(i64),
    Float(f64),
    True,
    False,
    Nil,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Pipe,
    Comma,
    Bang,
    Caret,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Underscore => f.write_str("'_'"),
            Self::Ellipsis => f.write_str("'...'"),
            Self::Str(text) => write!(f, "string {text:?}"),
            Self::Int(value) => write!(f, "integer {value}"),
            Self::Float(value) => write!(f, "float {value:?}"),
            Self::True => f.write_str("'true'"),
            Self::False => f.write_str("'false'"),
            Self::Nil => f.write_str("'nil'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBrace => f.write_str("'{'"),
            Self::RBrace => f.write_str("'}'"),
            Self::Pipe => f.write_str("'|'"),
            Self::Comma => f.write_str("','"),
            Self::Bang => f.write_str("'!'"),
            Self::Caret => f.write_str("'^'"),
            Self::Eof => f.write_str("end of pattern"),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) offset: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, PatternSyntaxError> {
    Lexer {
        source,
        chars: source.char_indices().peekable(),
    }
    .run()
}

struct Lexer<'s> {
    source: &'s str,
    chars: Peekable<CharIndices<'s>>,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Spanned>, PatternSyntaxError> {
        let mut tokens = Vec::new();
        while let Some((offset, ch)) = self.chars.next() {
            let token = match ch {
                c if c.is_whitespace() => continue,
                '(' => Token::LParen,
                ')' => Token::RParen,
                '{' => Token::LBrace,
                '}' => Token::RBrace,
                '|' => Token::Pipe,
                ',' => Token::Comma,
                '!' => Token::Bang,
                '^' => Token::Caret,
                '.' => self.ellipsis(offset)?,
                '"' | '\'' => self.string(offset, ch)?,
                '-' | '0'..='9' => self.number(offset)?,
                c if c.is_ascii_alphabetic() || c == '_' => self.word(offset),
                other => return Err(self.error(offset, PatternErrorKind::UnexpectedCharacter(other))),
            };
            tokens.push(Spanned { token, offset });
        }
        tokens.push(Spanned {
            token: Token::Eof,
            offset: self.source.len(),
        });
        Ok(tokens)
    }

    fn error(&self, offset: usize, kind: PatternErrorKind) -> PatternSyntaxError {
        PatternSyntaxError::new(self.source, offset, kind)
    }

    fn ellipsis(&mut self, start: usize) -> Result<Token, PatternSyntaxError> {
        for _ in 0..2 {
            match self.chars.next() {
                Some((_, '.')) => {}
                Some((offset, other)) => {
                    return Err(self.error(offset, PatternErrorKind::UnexpectedCharacter(other)));
                }
                None => {
                    return Err(self.error(
                        start,
                        PatternErrorKind::UnexpectedEnd { expected: "'...'" },
                    ));
                }
            }
        }
        Ok(Token::Ellipsis)
    }

    fn string(&mut self, start: usize, quote: char) -> Result<Token, PatternSyntaxError> {
        let mut text = String::new();
        while let Some((offset, ch)) = self.chars.next() {
            match ch {
                c if c == quote => return Ok(Token::Str(text)),
                '\\' => text.push(self.escape(offset)?),
                c => text.push(c),
            }
        }
        Err(self.error(start, PatternErrorKind::UnterminatedString))
    }

    fn escape(&mut self, start: usize) -> Result<char, PatternSyntaxError> {
        let Some((_, ch)) = self.chars.next() else {
            return Err(self.error(start, PatternErrorKind::UnterminatedString));
        };
        match ch {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '0' => Ok('\0'),
            '\\' | '"' | '\'' => Ok(ch),
            'u' => self.unicode_escape(start),
            other => Err(self.error(start, PatternErrorKind::InvalidEscape(other))),
        }
    }

    /// Reads the `{XXXX}` part of a `\u{XXXX}` escape.
    fn unicode_escape(&mut self, start: usize) -> Result<char, PatternSyntaxError> {
        if !matches!(self.chars.next(), Some((_, '{'))) {
            return Err(self.error(start, PatternErrorKind::InvalidEscape('u')));
        }
        let mut digits = String::new();
        loop {
            match self.chars.next() {
                Some((_, '}')) => break,
                Some((_, c)) if c.is_ascii_hexdigit() => digits.push(c),
                _ => return Err(self.error(start, PatternErrorKind::InvalidEscape('u'))),
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(start, PatternErrorKind::InvalidEscape('u')))
    }

    fn number(&mut self, start: usize) -> Result<Token, PatternSyntaxError> {
        let mut end = start + 1;
        let mut is_float = false;
        while let Some(&(offset, ch)) = self.chars.peek() {
            let accepted = match ch {
                '0'..='9' | '_' => true,
                '.' if !is_float && self.next_is_digit(offset) => {
                    is_float = true;
                    true
                }
                'e' | 'E' => {
                    is_float = true;
                    true
                }
                '+' | '-' => self.previous_is_exponent(offset),
                _ => false,
            };
            if !accepted {
                break;
            }
            self.chars.next();
            end = offset + ch.len_utf8();
        }

        let raw = self.source.get(start..end).unwrap_or_default();
        let cleaned = raw.replace('_', "");
        let invalid = || self.error(start, PatternErrorKind::InvalidNumber(raw.to_owned()));
        if is_float {
            // Infinities have no literal spelling to render back to.
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Token::Float)
                .ok_or_else(invalid)
        } else {
            cleaned.parse::<i64>().map(Token::Int).map_err(|_| invalid())
        }
    }

    fn next_is_digit(&self, dot_offset: usize) -> bool {
        self.source
            .get(dot_offset + 1..)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn previous_is_exponent(&self, sign_offset: usize) -> bool {
        sign_offset
            .checked_sub(1)
            .and_then(|idx| self.source.get(idx..sign_offset))
            .is_some_and(|prev| prev.eq_ignore_ascii_case("e"))
    }

    fn word(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some(&(offset, ch)) = self.chars.peek() {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            self.chars.next();
            end = offset + 1;
        }

        match self.source.get(start..end).unwrap_or_default() {
            "_" => Token::Underscore,
            "true" => Token::True,
            "false" => Token::False,
            "nil" => Token::Nil,
            name => Token::Ident(name.to_owned()),
        }
    }
}
