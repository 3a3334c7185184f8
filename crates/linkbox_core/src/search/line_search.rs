//! Case-insensitive substring search over labels and link lines.
//!
//! # Invariants
//! - Blank queries never produce results; they report an inactive search.
//! - Hits follow list order; matched lines follow in-group order.
//! - Returned labels and lines keep their original case.

use crate::model::link_group::{GroupId, LinkGroup};

const UNTITLED_LABEL: &str = "Untitled Box";

/// One group matching a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub group_id: GroupId,
    pub label: String,
    /// Only the lines containing the query. Empty when only the label matched.
    pub matched_lines: Vec<String>,
}

impl SearchHit {
    /// Label for result rendering, with a placeholder for empty labels.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            UNTITLED_LABEL
        } else {
            self.label.as_str()
        }
    }
}

/// Search state reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query was blank; results should be hidden.
    Inactive,
    Active(Vec<SearchHit>),
}

impl SearchOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Hits of an active search; empty when inactive.
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Self::Inactive => &[],
            Self::Active(hits) => hits,
        }
    }
}

/// Searches `groups` for `query`.
///
/// A group matches when the label or at least one link line contains the
/// trimmed, lowercased query.
pub fn search_groups(groups: &[LinkGroup], query: &str) -> SearchOutcome {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchOutcome::Inactive;
    }

    let hits = groups
        .iter()
        .filter_map(|group| match_group(group, &needle))
        .collect();
    SearchOutcome::Active(hits)
}

fn match_group(group: &LinkGroup, needle: &str) -> Option<SearchHit> {
    let matched_lines: Vec<String> = group
        .lines()
        .filter(|line| line.to_lowercase().contains(needle))
        .map(str::to_string)
        .collect();
    let label_matches = group.label.to_lowercase().contains(needle);

    if !label_matches && matched_lines.is_empty() {
        return None;
    }

    Some(SearchHit {
        group_id: group.id.clone(),
        label: group.label.clone(),
        matched_lines,
    })
}
