//! Identifier newtypes.
//!
//! Alert numbers and issue numbers are both GitHub integers scoped to one
//! repository; they get separate types so one can never be passed where the
//! other is expected. String identifiers reject blank input at construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a non-blank string identifier with `new`, `as_str`, `AsRef<str>`
/// and `Display`.
macro_rules! string_id {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(String);

        impl $ty {
            /// Wraps `value`; blank input yields `None`.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                (!value.trim().is_empty()).then_some(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// Declares a `Copy` identifier over a GitHub-assigned integer.
macro_rules! u64_id {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(u64);

        impl $ty {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $ty {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a Dependabot alert within one repository.
    ///
    /// Alert numbers are unique per repository, which is the only scope a
    /// single run ever reads from.
    AlertNumber
}

u64_id! {
    /// Identifies a GitHub Issue within one repository.
    ///
    /// Assigned by GitHub when the issue is persisted.
    IssueNumber
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Correlates every span and event of one invocation. Recorded on the
/// `reconcile_run` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (configuration / GitHub names)
// ---------------------------------------------------------------------------

string_id! {
    /// The login of the user or organisation that owns the repository.
    Owner
}

string_id! {
    /// The repository name, without the owner prefix.
    RepoName
}

string_id! {
    /// The GraphQL node id of a GitHub ProjectV2 board (e.g. `"PVT_kwDO..."`).
    ProjectId
}

string_id! {
    /// The GraphQL node id of an item on a ProjectV2 board (e.g. `"PVTI_lADO..."`).
    ProjectItemId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_blank_values() {
        assert!(Owner::new("").is_none());
        assert!(RepoName::new("   ").is_none());
        assert_eq!(ProjectId::new("PVT_1").unwrap().as_str(), "PVT_1");
    }

    #[test]
    fn numeric_ids_serialise_as_plain_integers() {
        let json = serde_json::to_string(&AlertNumber::new(320)).unwrap();
        assert_eq!(json, "320");

        let back: IssueNumber = serde_json::from_str("10656").unwrap();
        assert_eq!(back.as_u64(), 10656);
    }
}
