//! Address list parser
//!
//! Drives the token stream through an explicit state machine. Every
//! address or group in progress is a [`Fragment`] stored in a flat arena;
//! open groups are tracked on a scope stack of arena indices, so nesting
//! depth never turns into call-stack depth.

use crate::error::{ParseError, Result};
use crate::normalizer::normalize;
use crate::tokenizer::{Operator, Token, TokenKind, tokenize};
use crate::types::Entry;
use tracing::{debug, trace};

/// Arena index of the implicit top-level scope
pub(crate) const ROOT: usize = 0;

/// Parse a header value into its address and group entries
///
/// Never fails: malformed input degrades to a best-effort reading.
///
/// ```rust
/// use email_address_parser::{Address, Entry, parse_addresses};
///
/// let entries = parse_addresses("Test User <test.user@mail.ee>, andris@tr.ee");
/// assert_eq!(
///     entries[0],
///     Entry::Address(Address::new("Test User", "test.user@mail.ee"))
/// );
/// assert_eq!(entries[1].as_address().map(|a| a.address.as_str()), Some("andris@tr.ee"));
/// ```
#[must_use]
pub fn parse_addresses(input: &str) -> Vec<Entry> {
    let tokens = tokenize(input);
    let token_count = tokens.len();

    let mut parser = Parser::new();
    for token in tokens {
        parser.step(token);
    }
    let entries = normalize(&parser.finish());

    debug!(
        tokens = token_count,
        entries = entries.len(),
        "Parsed address list"
    );
    entries
}

/// Parse raw header bytes into address and group entries
///
/// Fails with [`ParseError::InvalidArgument`] when the bytes are not text.
pub fn parse_address_bytes(input: &[u8]) -> Result<Vec<Entry>> {
    let text = std::str::from_utf8(input).map_err(|e| {
        ParseError::InvalidArgument(format!("address list is not valid UTF-8: {e}"))
    })?;
    Ok(parse_addresses(text))
}

/// Piece of name or address text, remembering whether it was quoted
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Part {
    Bare(String),
    Quoted { delimiter: char, text: String },
}

impl Part {
    pub(crate) fn is_blank(&self) -> bool {
        match self {
            Self::Bare(text) => text.trim().is_empty(),
            Self::Quoted { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Angle {
    #[default]
    None,
    Open,
    Closed,
}

/// Address or group in progress
#[derive(Debug, Default)]
pub(crate) struct Fragment {
    pub(crate) name_parts: Vec<Part>,
    pub(crate) address_parts: Vec<Part>,
    pub(crate) comment: Option<String>,
    pub(crate) is_group: bool,
    /// Arena indices of group members, in input order
    pub(crate) children: Vec<usize>,
    angle: Angle,
    /// A second angle address is open; its content goes to the name
    spill: bool,
}

/// Effective parser state for the token being dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Collecting,
    InsideAngleAddress,
    InsideGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AppendName,
    AppendAddress,
    OpenAngle,
    RestartAngle,
    CloseAngle,
    OpenGroup,
    AttachComment,
    EndMember,
    CloseGroup,
}

/// The grammar: what a token of a given kind does in a given state
const fn transition(state: ParserState, kind: TokenKind) -> Action {
    match (state, kind) {
        (_, TokenKind::Comment) => Action::AttachComment,
        (ParserState::InsideAngleAddress, TokenKind::Operator(Operator::RightAngle)) => {
            Action::CloseAngle
        }
        (ParserState::InsideAngleAddress, TokenKind::Operator(Operator::LeftAngle)) => {
            Action::RestartAngle
        }
        (ParserState::InsideAngleAddress, _) => Action::AppendAddress,
        (_, TokenKind::Operator(Operator::LeftAngle)) => Action::OpenAngle,
        (_, TokenKind::Operator(Operator::Colon)) => Action::OpenGroup,
        (_, TokenKind::Operator(Operator::Comma))
        | (ParserState::Collecting, TokenKind::Operator(Operator::Semicolon)) => {
            Action::EndMember
        }
        (ParserState::InsideGroup, TokenKind::Operator(Operator::Semicolon)) => {
            Action::CloseGroup
        }
        (_, TokenKind::Operator(Operator::RightAngle) | TokenKind::Text | TokenKind::Quoted) => {
            Action::AppendName
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    /// Arena index of the group owning this scope
    group: usize,
    /// Arena index of the member currently accumulating tokens
    current: usize,
}

struct Parser {
    fragments: Vec<Fragment>,
    root: Scope,
    /// Open groups, innermost last
    scopes: Vec<Scope>,
}

impl Parser {
    fn new() -> Self {
        let mut parser = Self {
            fragments: vec![Fragment {
                is_group: true,
                ..Fragment::default()
            }],
            root: Scope {
                group: ROOT,
                current: ROOT,
            },
            scopes: Vec::new(),
        };
        parser.root.current = parser.open_member(ROOT);
        parser
    }

    fn scope(&self) -> Scope {
        self.scopes.last().copied().unwrap_or(self.root)
    }

    fn scope_mut(&mut self) -> &mut Scope {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => &mut self.root,
        }
    }

    fn current(&mut self) -> &mut Fragment {
        let index = self.scope().current;
        &mut self.fragments[index]
    }

    fn state(&self) -> ParserState {
        let scope = self.scope();
        if self.fragments[scope.current].angle == Angle::Open {
            ParserState::InsideAngleAddress
        } else if self.scopes.is_empty() {
            ParserState::Collecting
        } else {
            ParserState::InsideGroup
        }
    }

    /// Allocate an empty member fragment under `group`
    fn open_member(&mut self, group: usize) -> usize {
        let index = self.fragments.len();
        self.fragments.push(Fragment::default());
        self.fragments[group].children.push(index);
        index
    }

    fn step(&mut self, token: Token) {
        let state = self.state();
        let action = transition(state, token.kind());
        trace!(?state, ?action, ?token, "address parser transition");

        match action {
            Action::AppendName => {
                if let Some(part) = into_part(token) {
                    self.current().name_parts.push(part);
                }
            }
            Action::AppendAddress => {
                if let Some(part) = into_part(token) {
                    let fragment = self.current();
                    if fragment.spill {
                        fragment.name_parts.push(part);
                    } else {
                        fragment.address_parts.push(part);
                    }
                }
            }
            Action::OpenAngle => {
                let fragment = self.current();
                // Only the first angle address of an entry counts
                fragment.spill = fragment.angle == Angle::Closed;
                fragment.angle = Angle::Open;
            }
            Action::RestartAngle => {
                let fragment = self.current();
                if !fragment.spill && !fragment.address_parts.is_empty() {
                    debug!("Discarding text before unexpected '<' in angle address");
                    fragment.address_parts.clear();
                }
            }
            Action::CloseAngle => {
                let fragment = self.current();
                fragment.angle = Angle::Closed;
                fragment.spill = false;
            }
            Action::OpenGroup => self.open_group(),
            Action::AttachComment => {
                if let Token::Comment(text) = token {
                    attach_comment(self.current(), &text);
                }
            }
            Action::EndMember => {
                let group = self.scope().group;
                let next = self.open_member(group);
                self.scope_mut().current = next;
            }
            Action::CloseGroup => {
                self.scopes.pop();
                let group = self.scope().group;
                let next = self.open_member(group);
                self.scope_mut().current = next;
            }
        }
    }

    /// Turn the current member into a group and descend into it
    fn open_group(&mut self) {
        let group = self.scope().current;
        let fragment = &mut self.fragments[group];
        if !fragment.address_parts.is_empty() {
            debug!("Dropping angle address of an entry turned into a group");
            fragment.address_parts.clear();
        }
        fragment.is_group = true;
        fragment.angle = Angle::None;
        fragment.spill = false;

        let current = self.open_member(group);
        self.scopes.push(Scope { group, current });
    }

    /// Close any groups left open and hand over the fragment arena
    fn finish(self) -> Vec<Fragment> {
        if !self.scopes.is_empty() {
            debug!(
                open_groups = self.scopes.len(),
                "Closing unterminated groups at end of input"
            );
        }
        self.fragments
    }
}

fn into_part(token: Token) -> Option<Part> {
    match token {
        Token::Text(text) => Some(Part::Bare(text)),
        Token::Quoted { delimiter, text } => Some(Part::Quoted { delimiter, text }),
        Token::Operator(op) => Some(Part::Bare(op.as_char().to_string())),
        Token::Comment(_) => None,
    }
}

fn attach_comment(fragment: &mut Fragment, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match &mut fragment.comment {
        Some(comment) => {
            comment.push(' ');
            comment.push_str(text);
        }
        None => fragment.comment = Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [ParserState; 3] = [
        ParserState::Collecting,
        ParserState::InsideAngleAddress,
        ParserState::InsideGroup,
    ];

    fn op(op: Operator) -> TokenKind {
        TokenKind::Operator(op)
    }

    #[test]
    fn test_comment_attaches_in_every_state() {
        for state in ALL_STATES {
            assert_eq!(
                transition(state, TokenKind::Comment),
                Action::AttachComment
            );
        }
    }

    #[test]
    fn test_text_outside_angle_goes_to_name() {
        for state in [ParserState::Collecting, ParserState::InsideGroup] {
            assert_eq!(transition(state, TokenKind::Text), Action::AppendName);
            assert_eq!(transition(state, TokenKind::Quoted), Action::AppendName);
            assert_eq!(
                transition(state, op(Operator::RightAngle)),
                Action::AppendName
            );
        }
    }

    #[test]
    fn test_angle_address_swallows_delimiters() {
        let state = ParserState::InsideAngleAddress;
        assert_eq!(transition(state, TokenKind::Text), Action::AppendAddress);
        assert_eq!(transition(state, TokenKind::Quoted), Action::AppendAddress);
        assert_eq!(transition(state, op(Operator::Comma)), Action::AppendAddress);
        assert_eq!(
            transition(state, op(Operator::Semicolon)),
            Action::AppendAddress
        );
        assert_eq!(transition(state, op(Operator::Colon)), Action::AppendAddress);
    }

    #[test]
    fn test_angle_brackets() {
        assert_eq!(
            transition(ParserState::Collecting, op(Operator::LeftAngle)),
            Action::OpenAngle
        );
        assert_eq!(
            transition(ParserState::InsideGroup, op(Operator::LeftAngle)),
            Action::OpenAngle
        );
        assert_eq!(
            transition(ParserState::InsideAngleAddress, op(Operator::LeftAngle)),
            Action::RestartAngle
        );
        assert_eq!(
            transition(ParserState::InsideAngleAddress, op(Operator::RightAngle)),
            Action::CloseAngle
        );
    }

    #[test]
    fn test_colon_opens_group_outside_angle() {
        assert_eq!(
            transition(ParserState::Collecting, op(Operator::Colon)),
            Action::OpenGroup
        );
        assert_eq!(
            transition(ParserState::InsideGroup, op(Operator::Colon)),
            Action::OpenGroup
        );
    }

    #[test]
    fn test_semicolon_dual_role() {
        assert_eq!(
            transition(ParserState::Collecting, op(Operator::Semicolon)),
            Action::EndMember
        );
        assert_eq!(
            transition(ParserState::InsideGroup, op(Operator::Semicolon)),
            Action::CloseGroup
        );
    }

    #[test]
    fn test_comma_ends_member() {
        assert_eq!(
            transition(ParserState::Collecting, op(Operator::Comma)),
            Action::EndMember
        );
        assert_eq!(
            transition(ParserState::InsideGroup, op(Operator::Comma)),
            Action::EndMember
        );
    }

    #[test]
    fn test_scope_stack_follows_groups() {
        let mut parser = Parser::new();
        for token in tokenize("Outer: Inner: a@b.c;") {
            parser.step(token);
        }
        assert_eq!(parser.state(), ParserState::InsideGroup);
        assert_eq!(parser.scopes.len(), 1);

        parser.step(Token::Operator(Operator::Semicolon));
        assert_eq!(parser.state(), ParserState::Collecting);
        assert!(parser.scopes.is_empty());
    }

    #[test]
    fn test_closed_group_is_not_reopened() {
        let mut parser = Parser::new();
        for token in tokenize("G:;") {
            parser.step(token);
        }
        let group = parser.fragments[ROOT].children[0];
        assert!(parser.fragments[group].is_group);
        assert_ne!(parser.scope().current, group);

        parser.step(Token::Text("late".into()));
        assert!(parser.fragments[group].children.iter().all(|&c| {
            parser.fragments[c].name_parts.is_empty()
        }));
    }

    #[test]
    fn test_unexpected_left_angle_restarts_capture() {
        let mut parser = Parser::new();
        for token in tokenize("x < junk <a@b.c") {
            parser.step(token);
        }
        assert_eq!(parser.state(), ParserState::InsideAngleAddress);
        assert_eq!(
            parser.current().address_parts,
            vec![Part::Bare("a@b.c".into())]
        );
    }

    #[test]
    fn test_comments_are_joined() {
        let mut fragment = Fragment::default();
        attach_comment(&mut fragment, " first ");
        attach_comment(&mut fragment, "");
        attach_comment(&mut fragment, "second");
        assert_eq!(fragment.comment.as_deref(), Some("first second"));
    }
}
