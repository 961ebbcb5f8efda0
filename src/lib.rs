// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email Address List Parser
//!
//! Turns raw `From`/`To`/`Cc` header values into structured address and
//! group entries, tolerating the malformed input found in real mail.
//!
//! # Features
//!
//! - Quoted display names, with `,` and `;` inside quotes never splitting
//! - Parenthetical comments as a fallback display name
//! - Named groups (`Team: a@b.c, d@e.f;`), empty and nested
//! - `;` as a plain delimiter outside of groups
//! - Recovery from stray angle brackets and unbalanced quotes
//!
//! The parser never rejects input; it always returns a best-effort reading.
//!
//! # Example
//!
//! ```rust
//! use email_address_parser::{Entry, flatten, parse_addresses};
//!
//! let entries = parse_addresses("\"Reinman, Andris\" <andris@tr.ee>, Team: a@b.c, d@e.f;");
//!
//! assert_eq!(entries.len(), 2);
//! assert_eq!(entries[0].name(), Some("Reinman, Andris"));
//! assert!(matches!(&entries[1], Entry::Group(group) if group.group.len() == 2));
//! assert_eq!(flatten(&entries).len(), 3);
//! ```

mod error;
mod normalizer;
mod parser;
mod tokenizer;
mod types;

pub use error::{ParseError, Result};
pub use parser::{parse_address_bytes, parse_addresses};
pub use tokenizer::{Operator, Token, TokenKind, tokenize};
pub use types::*;
