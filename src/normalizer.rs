//! Resolution of parser fragments into final address and group entries

use crate::parser::{Fragment, Part, ROOT};
use crate::types::{Address, Entry, Group};
use regex::Regex;

// Bare mailbox: exactly one `@` with something on both sides
static MAILBOX_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());

// Lone word that is still taken as an address, extra `@` included
static LOOSE_MAILBOX_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[^@\s]+@\S+$").unwrap());

/// Build the final entry list from the parser's fragment arena
///
/// Members are always allocated after the group that owns them, so walking
/// the arena from the back finishes every member before its group is built.
pub(crate) fn normalize(fragments: &[Fragment]) -> Vec<Entry> {
    let mut built: Vec<Option<Entry>> = vec![None; fragments.len()];
    let mut top_level = Vec::new();

    for (index, fragment) in fragments.iter().enumerate().rev() {
        if index == ROOT {
            top_level = take_members(&fragment.children, &mut built);
        } else {
            let entry = resolve(fragment, &mut built);
            built[index] = entry;
        }
    }

    top_level
}

fn take_members(children: &[usize], built: &mut [Option<Entry>]) -> Vec<Entry> {
    children
        .iter()
        .filter_map(|&child| built.get_mut(child).and_then(Option::take))
        .collect()
}

fn resolve(fragment: &Fragment, built: &mut [Option<Entry>]) -> Option<Entry> {
    if fragment.is_group {
        let name = Some(join_name(&fragment.name_parts))
            .filter(|name| !name.is_empty())
            .or_else(|| comment_text(fragment.comment.as_deref()));
        let group = take_members(&fragment.children, built);
        return Some(Entry::Group(Group { name, group }));
    }

    if is_blank(fragment) {
        return None;
    }

    Some(Entry::Address(resolve_address(fragment)))
}

fn is_blank(fragment: &Fragment) -> bool {
    fragment.name_parts.iter().all(Part::is_blank)
        && fragment.address_parts.iter().all(Part::is_blank)
        && fragment.comment.is_none()
}

fn resolve_address(fragment: &Fragment) -> Address {
    let (mut name, address) = if fragment.address_parts.iter().all(Part::is_blank) {
        split_mailbox(&fragment.name_parts)
    } else {
        (
            join_name(&fragment.name_parts),
            join_address(&fragment.address_parts),
        )
    };

    if name.is_empty()
        && let Some(comment) = comment_text(fragment.comment.as_deref())
    {
        name = comment;
    }
    if name == address {
        name.clear();
    }

    Address { name, address }
}

fn comment_text(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

#[derive(Debug)]
struct Word {
    text: String,
    quoted: bool,
}

fn words(parts: &[Part]) -> Vec<Word> {
    let mut words = Vec::new();
    for part in parts {
        match part {
            Part::Bare(text) => words.extend(text.split_whitespace().map(|word| Word {
                text: word.to_string(),
                quoted: false,
            })),
            Part::Quoted { text, .. } => {
                let text = unescape(text).trim().to_string();
                if !text.is_empty() {
                    words.push(Word { text, quoted: true });
                }
            }
        }
    }
    words
}

fn join_words(words: &[Word]) -> String {
    words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_name(parts: &[Part]) -> String {
    join_words(&words(parts))
}

/// Find the address inside free text when no `<...>` was given
fn split_mailbox(parts: &[Part]) -> (String, String) {
    let mut words = words(parts);

    let position = words
        .iter()
        .rposition(|word| !word.quoted && MAILBOX_REGEX.is_match(&word.text));
    if let Some(position) = position {
        let address = words.remove(position).text;
        return (join_words(&words), address);
    }

    if let [word] = words.as_slice()
        && !word.quoted
        && LOOSE_MAILBOX_REGEX.is_match(&word.text)
    {
        return (String::new(), word.text.clone());
    }

    (join_words(&words), String::new())
}

fn join_address(parts: &[Part]) -> String {
    let mut raw = String::new();
    for part in parts {
        match part {
            Part::Bare(text) => raw.push_str(text),
            Part::Quoted { delimiter, text } => {
                raw.push(*delimiter);
                raw.push_str(text);
                raw.push(*delimiter);
            }
        }
    }
    strip_wrapping_quotes(raw.trim()).to_string()
}

/// Remove one pair of quotes, only when it wraps the whole value
fn strip_wrapping_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    value
}

/// Drop the backslash of `\"`, `\'` and `\\`; any other backslash is literal
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&escaped) = chars.peek()
            && matches!(escaped, '"' | '\'' | '\\')
        {
            out.push(escaped);
            chars.next();
        } else {
            out.push(ch);
        }
    }
    out
}
