//! Tokenizer for robot programs
//!
//! Splits source text on whitespace and around the punctuation characters
//! `{ } ( ) , ;`. Everything else between delimiters forms a single token,
//! which is classified as a numeral, a `$name` variable, or a bare word.
//! The parser drives a [`Tokenizer`] as a cursor with one token of lookahead.

use crate::diagnostics::SourceLocation;
use crate::parser::ParseError;

/// Characters that always form a token on their own
pub const PUNCTUATION: [char; 6] = ['{', '}', '(', ')', ',', ';'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Punct,
    /// `-?[1-9][0-9]*` or `0`
    Number,
    /// `$` followed by a letter and then letters or digits
    Variable,
    Word,
}

/// A lexical unit together with its byte offset in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

/// Cursor over the token stream of one program source
pub struct Tokenizer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: split_tokens(source),
            cursor: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// True if the next token is exactly `text`
    pub fn next_is(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text == text)
    }

    pub fn next_is_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Consume the next token unconditionally
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// Consume the next token, which must be exactly `text`
    pub fn expect(&mut self, text: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(t) if t.text == text => Ok(self.advance_unchecked()),
            Some(t) => Err(ParseError::UnexpectedToken {
                found: t.text.clone(),
                expected: text.to_string(),
                location: self.location(),
            }),
            None => Err(self.end_of_input(text)),
        }
    }

    /// Consume the next token, which must be of `kind`; `expected` names it in errors
    pub fn expect_kind(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(t) if t.kind == kind => Ok(self.advance_unchecked()),
            Some(t) => Err(ParseError::UnexpectedToken {
                found: t.text.clone(),
                expected: expected.to_string(),
                location: self.location(),
            }),
            None => Err(self.end_of_input(expected)),
        }
    }

    /// Location of the first unconsumed token, or of the end of input
    pub fn location(&self) -> SourceLocation {
        let offset = self
            .peek()
            .map(|t| t.offset)
            .unwrap_or(self.source.len());
        SourceLocation::at_offset(self.source, offset)
    }

    pub fn end_of_input(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedEnd {
            expected: expected.to_string(),
            location: self.location(),
        }
    }

    fn advance_unchecked(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        self.cursor += 1;
        token
    }
}

// ── Splitting ──────────────────────────────────────────

fn split_tokens(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (offset, ch) in source.char_indices() {
        if ch.is_whitespace() || PUNCTUATION.contains(&ch) {
            if let Some(begin) = start.take() {
                tokens.push(make_token(&source[begin..offset], begin));
            }
            if !ch.is_whitespace() {
                tokens.push(Token {
                    kind: TokenKind::Punct,
                    text: ch.to_string(),
                    offset,
                });
            }
        } else if start.is_none() {
            start = Some(offset);
        }
    }
    if let Some(begin) = start {
        tokens.push(make_token(&source[begin..], begin));
    }

    tokens
}

fn make_token(text: &str, offset: usize) -> Token {
    let kind = if is_number(text) {
        TokenKind::Number
    } else if is_variable(text) {
        TokenKind::Variable
    } else {
        TokenKind::Word
    };
    Token {
        kind,
        text: text.to_string(),
        offset,
    }
}

// ── Classification ─────────────────────────────────────

fn is_number(text: &str) -> bool {
    if text == "0" {
        return true;
    }
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut chars = digits.chars();
    matches!(chars.next(), Some('1'..='9')) && chars.all(|c| c.is_ascii_digit())
}

fn is_variable(text: &str) -> bool {
    let Some(name) = text.strip_prefix('$') else {
        return false;
    };
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric())
}
