//! Ecosystem-based assignee resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved key whose list applies to ecosystems without their own entry.
pub const OTHER_KEY: &str = "other";

/// Reserved key whose list is appended for every ecosystem.
pub const ALL_KEY: &str = "all";

/// One entry of the assignee table as written in the configuration.
///
/// Accepts a list (possibly containing nulls), a single login, or null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssigneeList {
    Many(Vec<Option<String>>),
    One(Option<String>),
}

impl AssigneeList {
    fn is_null(&self) -> bool {
        matches!(self, Self::One(None))
    }

    fn logins(&self) -> impl Iterator<Item = &str> {
        let (many, one) = match self {
            Self::Many(list) => (Some(list.iter()), None),
            Self::One(single) => (None, Some(single)),
        };
        many.into_iter()
            .flatten()
            .chain(one)
            .filter_map(|entry| entry.as_deref())
            .map(str::trim)
            .filter(|login| !login.is_empty())
    }
}

/// Maps a package ecosystem to the GitHub logins that should be assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssigneeTable(BTreeMap<String, AssigneeList>);

impl AssigneeTable {
    /// Resolves the assignees for `ecosystem`.
    ///
    /// Uses the ecosystem's own list when present (an explicitly empty list
    /// counts as present), otherwise the `"other"` list, then appends the
    /// `"all"` list. Blank entries are dropped and duplicates removed, keeping
    /// the first occurrence.
    pub fn assignees_for(&self, ecosystem: &str) -> Vec<String> {
        let specific = self
            .0
            .get(ecosystem)
            .filter(|list| !list.is_null())
            .or_else(|| self.0.get(OTHER_KEY));

        let mut resolved: Vec<String> = Vec::new();
        for login in specific
            .into_iter()
            .chain(self.0.get(ALL_KEY))
            .flat_map(AssigneeList::logins)
        {
            if !resolved.iter().any(|seen| seen == login) {
                resolved.push(login.to_string());
            }
        }
        resolved
    }
}
