//! Tokenizer for raw address list header values
//!
//! Splits the input into operator, text, quoted and comment tokens in one
//! pass. It knows nothing about addresses or groups and never fails:
//! unterminated quotes and comments simply run to the end of the input.

use serde::{Deserialize, Serialize};
use std::str::Chars;

/// Structural single-character operators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `,` member delimiter
    Comma,
    /// `;` group terminator, or member delimiter outside a group
    Semicolon,
    /// `<` opens an angle address
    LeftAngle,
    /// `>` closes an angle address
    RightAngle,
    /// `:` opens a group
    Colon,
}

impl Operator {
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            ',' => Some(Self::Comma),
            ';' => Some(Self::Semicolon),
            '<' => Some(Self::LeftAngle),
            '>' => Some(Self::RightAngle),
            ':' => Some(Self::Colon),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Semicolon => ';',
            Self::LeftAngle => '<',
            Self::RightAngle => '>',
            Self::Colon => ':',
        }
    }
}

/// A lexical token of an address list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Token {
    /// One of `, ; < > :` outside quotes and comments
    Operator(Operator),

    /// Maximal run of ordinary characters, whitespace included
    Text(String),

    /// Content of a `"..."` or `'...'` span, without the delimiters.
    /// Escape sequences are kept verbatim (`\"` stays two characters).
    Quoted { delimiter: char, text: String },

    /// Content of a `(...)` span, without the parentheses
    Comment(String),
}

/// Payload-free discriminant of a [`Token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Operator(Operator),
    Text,
    Quoted,
    Comment,
}

impl Token {
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Operator(op) => TokenKind::Operator(*op),
            Self::Text(_) => TokenKind::Text,
            Self::Quoted { .. } => TokenKind::Quoted,
            Self::Comment(_) => TokenKind::Comment,
        }
    }
}

/// Tokenize a raw header value
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut chars = input.chars();
    let mut prev: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(op) = Operator::from_char(ch) {
            flush_text(&mut text, &mut tokens);
            tokens.push(Token::Operator(op));
        } else if ch == '"' || (ch == '\'' && at_word_boundary(prev)) {
            flush_text(&mut text, &mut tokens);
            let quoted = scan_quoted(&mut chars, ch);
            tokens.push(Token::Quoted {
                delimiter: ch,
                text: quoted,
            });
        } else if ch == '(' {
            flush_text(&mut text, &mut tokens);
            let comment = chars.by_ref().take_while(|&c| c != ')').collect();
            tokens.push(Token::Comment(comment));
            prev = Some(')');
            continue;
        } else {
            text.push(ch);
        }
        prev = Some(ch);
    }
    flush_text(&mut text, &mut tokens);

    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

// An apostrophe only opens a quote where a word could start, so that
// names like O'Neill stay plain text.
fn at_word_boundary(prev: Option<char>) -> bool {
    prev.is_none_or(|c| {
        c.is_whitespace() || Operator::from_char(c).is_some() || matches!(c, '"' | '\'' | ')')
    })
}

fn scan_quoted(chars: &mut Chars<'_>, delimiter: char) -> String {
    let mut text = String::new();

    while let Some(ch) = chars.next() {
        if ch == delimiter {
            break;
        }
        text.push(ch);
        if ch == '\\'
            && let Some(escaped) = chars.next()
        {
            text.push(escaped);
        }
    }

    text
}
