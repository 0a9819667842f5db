//! SQL token types.
//!
//! Every token carries its kind and the byte offset where it starts in the
//! statement text. Keywords are their own enum so the parser can match them
//! without string comparisons.

use std::fmt;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token discriminant.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub offset: usize,
}

/// Token discriminant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Reserved word.
    Keyword(Keyword),
    /// Unquoted identifier.
    Ident(String),
    /// Single-quoted string literal, quotes removed.
    Str(String),
    /// Unsigned integer literal.
    Number(u64),

    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    /// `*`
    Star,
    /// `,`
    Comma,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `;`
    Semicolon,

    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(kw) => write!(f, "{kw}"),
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Str(s) => write!(f, "string '{s}'"),
            Self::Number(n) => write!(f, "number {n}"),
            Self::Eq => f.write_str("'='"),
            Self::NotEq => f.write_str("'!='"),
            Self::Lt => f.write_str("'<'"),
            Self::Gt => f.write_str("'>'"),
            Self::LtEq => f.write_str("'<='"),
            Self::GtEq => f.write_str("'>='"),
            Self::Star => f.write_str("'*'"),
            Self::Comma => f.write_str("','"),
            Self::LeftParen => f.write_str("'('"),
            Self::RightParen => f.write_str("')'"),
            Self::Semicolon => f.write_str("';'"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// Reserved words, matched case-insensitively.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Looks up a word, ignoring ASCII case.
            pub fn lookup(word: &str) -> Option<Self> {
                $(
                    if word.eq_ignore_ascii_case($text) {
                        return Some(Self::$variant);
                    }
                )*
                None
            }

            /// Upper-case spelling.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Select => "SELECT",
    Insert => "INSERT",
    Into => "INTO",
    Delete => "DELETE",
    Update => "UPDATE",
    From => "FROM",
    Where => "WHERE",
    And => "AND",
    Set => "SET",
    Values => "VALUES",
    Show => "SHOW",
    Tables => "TABLES",
    Describe => "DESCRIBE",
    Grant => "GRANT",
    Revoke => "REVOKE",
    On => "ON",
    To => "TO",
    Read => "READ",
    Write => "WRITE",
    All => "ALL",
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
