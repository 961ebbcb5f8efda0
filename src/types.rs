//! Output types for parsed address lists

use serde::{Deserialize, Serialize};

/// A single mailbox with its display name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// Display name (e.g., "John Doe"), empty when none was recoverable
    pub name: String,

    /// Mailbox (e.g., "john@example.com"), empty when none was found
    pub address: String,
}

impl Address {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// A named group of entries (`Name: a@b, c@d;`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Group name, `None` when the group was opened without any name text
    pub name: Option<String>,

    /// Members in input order; empty groups keep an empty list
    pub group: Vec<Entry>,
}

impl Group {
    #[must_use]
    pub const fn new(name: Option<String>, group: Vec<Entry>) -> Self {
        Self { name, group }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.group.is_empty()
    }
}

// Members are released from a worklist so that dropping deeply nested groups
// uses constant stack.
impl Drop for Group {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.group);
        while let Some(entry) = pending.pop() {
            if let Entry::Group(mut group) = entry {
                pending.append(&mut group.group);
            }
        }
    }
}

/// One top-level or group member entry: either a mailbox or a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Entry {
    Group(Group),
    Address(Address),
}

impl Entry {
    #[must_use]
    pub const fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(address) => Some(address),
            Self::Group(_) => None,
        }
    }

    #[must_use]
    pub const fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            Self::Address(_) => None,
        }
    }

    /// Display name of the entry, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Address(address) => Some(address.name.as_str()),
            Self::Group(group) => group.name.as_deref(),
        }
    }

    /// All mailboxes in this entry, group members expanded depth-first
    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        flatten(std::slice::from_ref(self))
    }
}

impl From<Address> for Entry {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<Group> for Entry {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

/// Expand groups into their member mailboxes, preserving input order
///
/// Useful when building an envelope recipient list, where group names carry
/// no meaning. Empty groups contribute nothing.
#[must_use]
pub fn flatten(entries: &[Entry]) -> Vec<Address> {
    let mut out = Vec::new();
    let mut pending: Vec<&Entry> = entries.iter().rev().collect();

    while let Some(entry) = pending.pop() {
        match entry {
            Entry::Address(address) => out.push(address.clone()),
            Entry::Group(group) => pending.extend(group.group.iter().rev()),
        }
    }

    out
}
