//! Link group domain model.
//!
//! # Responsibility
//! - Define the single record kept by the link collection store.
//! - Own the `{id, label, links}` shape shared by persistence and export.
//!
//! # Invariants
//! - `id` is unique within one in-memory list.
//! - `links` is stored verbatim; empty lines are never dropped.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const MINTED_ID_PREFIX: &str = "box-";

/// Session-scoped group identifier.
///
/// Minted ids look like `box-3`; imported ids are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wraps an existing identifier string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the id minted for counter value `n`.
    pub fn minted(n: u64) -> Self {
        Self(format!("{MINTED_ID_PREFIX}{n}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Editable text field of a [`LinkGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Label,
    Links,
}

/// One labeled block of newline-delimited links.
///
/// Serialized field order and names match the persisted snapshot record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGroup {
    pub id: GroupId,
    /// Free-form label, may be empty.
    pub label: String,
    /// Newline-delimited link lines. No URL validation is applied.
    pub links: String,
}

impl LinkGroup {
    pub fn new(id: GroupId, label: impl Into<String>, links: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            links: links.into(),
        }
    }

    /// Iterates link lines in order, empty lines included.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.links.split('\n')
    }

    /// Replaces the selected field with `value`.
    pub fn set_field(&mut self, field: GroupField, value: impl Into<String>) {
        match field {
            GroupField::Label => self.label = value.into(),
            GroupField::Links => self.links = value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GroupField, GroupId, LinkGroup};

    #[test]
    fn minted_ids_use_box_prefix() {
        assert_eq!(GroupId::minted(1).as_str(), "box-1");
        assert_eq!(GroupId::minted(42).to_string(), "box-42");
    }

    #[test]
    fn lines_preserve_empty_entries() {
        let group = LinkGroup::new(GroupId::minted(1), "", "a\n\nb\n");
        assert_eq!(group.lines().collect::<Vec<_>>(), vec!["a", "", "b", ""]);
    }

    #[test]
    fn set_field_touches_only_selected_field() {
        let mut group = LinkGroup::new(GroupId::minted(1), "old", "x");
        group.set_field(GroupField::Label, "new");
        assert_eq!(group.label, "new");
        assert_eq!(group.links, "x");

        group.set_field(GroupField::Links, "y\nz");
        assert_eq!(group.label, "new");
        assert_eq!(group.links, "y\nz");
    }

    #[test]
    fn serializes_with_flat_string_id() {
        let group = LinkGroup::new(GroupId::minted(7), "News", "a");
        let json = serde_json::to_string(&group).expect("group should serialize");
        assert_eq!(json, r#"{"id":"box-7","label":"News","links":"a"}"#);
    }
}
