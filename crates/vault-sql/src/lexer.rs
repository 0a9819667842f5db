//! SQL lexer.
//!
//! Converts statement text into tokens. Literal and identifier limits are
//! enforced here so the parser only ever sees values that fit a record.

use vault_common::constants::{MAX_NUMBER_DIGITS, MAX_STR_LEN, MAX_TABLE_NAME};

use crate::error::{ParseError, ParseResult};
use crate::token::{Keyword, Token, TokenKind};

/// SQL lexer over a statement's text.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for the given text.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { src: source, pos: 0 }
    }

    /// Tokenizes the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// Produces the next token.
    pub fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace();

        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset: start,
            });
        };

        let kind = match ch {
            b'\'' => self.lex_string()?,
            b'0'..=b'9' => self.lex_number()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_word()?,

            b'*' => self.single(TokenKind::Star),
            b',' => self.single(TokenKind::Comma),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b';' => self.single(TokenKind::Semicolon),
            b'=' => self.single(TokenKind::Eq),

            b'<' => self.one_or_two(TokenKind::Lt, TokenKind::LtEq),
            b'>' => self.one_or_two(TokenKind::Gt, TokenKind::GtEq),
            b'!' if self.peek_at(1) == Some(b'=') => {
                self.pos += 2;
                TokenKind::NotEq
            }

            _ => {
                let ch = self.src[start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(ParseError::UnexpectedChar { ch, offset: start });
            }
        };

        Ok(Token {
            kind,
            offset: start,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// `<` / `<=` and `>` / `>=`.
    fn one_or_two(&mut self, one: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.peek_at(1) == Some(b'=') {
            self.pos += 2;
            with_eq
        } else {
            self.pos += 1;
            one
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    // -----------------------------------------------------------------------
    // Literal tokenizers
    // -----------------------------------------------------------------------

    /// Single-quoted string. There are no escapes; the literal ends at the
    /// next quote.
    fn lex_string(&mut self) -> ParseResult<TokenKind> {
        let start = self.pos;
        self.pos += 1;

        let rest = &self.src[self.pos..];
        let Some(len) = rest.find('\'') else {
            self.pos = self.src.len();
            return Err(ParseError::UnterminatedString { offset: start });
        };
        if len > MAX_STR_LEN {
            return Err(ParseError::StringTooLong {
                offset: start,
                max: MAX_STR_LEN,
            });
        }

        let value = rest[..len].to_string();
        self.pos += len + 1;
        Ok(TokenKind::Str(value))
    }

    fn lex_number(&mut self) -> ParseResult<TokenKind> {
        let start = self.pos;
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.len() > MAX_NUMBER_DIGITS {
            return Err(ParseError::NumberOutOfRange { offset: start });
        }
        digits
            .parse::<u64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::NumberOutOfRange { offset: start })
    }

    fn lex_word(&mut self) -> ParseResult<TokenKind> {
        let start = self.pos;
        let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        if let Some(keyword) = Keyword::lookup(word) {
            return Ok(TokenKind::Keyword(keyword));
        }
        if word.len() > MAX_TABLE_NAME {
            return Err(ParseError::IdentifierTooLong {
                offset: start,
                max: MAX_TABLE_NAME,
            });
        }
        Ok(TokenKind::Ident(word.to_string()))
    }
}
