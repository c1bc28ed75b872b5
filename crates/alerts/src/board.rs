//! Project board types.
//!
//! A [`Project`] is resolved once per run and carries the field definitions
//! needed to translate a rendered string into a typed field update.
//! A [`ProjectItem`] is the board entry that GitHub automation creates for a
//! newly opened issue.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ProjectId, ProjectItemId};

/// One option of a single-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

/// Data type of a project field, as far as updates are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ProjectFieldKind {
    Text,
    Number,
    Date,
    SingleSelect { options: Vec<SelectOption> },
    /// Any field type that cannot be set from a rendered string
    /// (iterations, assignees, linked pull requests...).
    Unsupported { data_type: String },
}

/// A field definition on a project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectField {
    /// Opaque field id used in update calls.
    pub id: String,
    /// Human-readable field name, as referenced by the configuration.
    pub name: String,
    pub kind: ProjectFieldKind,
}

impl ProjectField {
    /// Finds a single-select option by name, ignoring case.
    pub fn option_named(&self, name: &str) -> Option<&SelectOption> {
        match &self.kind {
            ProjectFieldKind::SingleSelect { options } => options
                .iter()
                .find(|option| option.name.eq_ignore_ascii_case(name.trim())),
            _ => None,
        }
    }
}

/// A resolved project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub fields: Vec<ProjectField>,
}

impl Project {
    /// Finds a field by its exact name.
    pub fn field(&self, name: &str) -> Option<&ProjectField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// An entry on a project board, linked to an issue.
///
/// `fields` mirrors the item's current values; the synchroniser updates it
/// in place after every successful field update so it always reflects what
/// the board holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: ProjectItemId,
    pub fields: BTreeMap<String, String>,
}

impl ProjectItem {
    /// Creates an item with no known field values.
    pub fn new(id: ProjectItemId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Records a field value after it has been applied remotely.
    pub fn record(&mut self, field_name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field_name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_field() -> ProjectField {
        ProjectField {
            id: "F_status".into(),
            name: "Status".into(),
            kind: ProjectFieldKind::SingleSelect {
                options: vec![
                    SelectOption {
                        id: "opt_todo".into(),
                        name: "Todo".into(),
                    },
                    SelectOption {
                        id: "opt_done".into(),
                        name: "Done".into(),
                    },
                ],
            },
        }
    }

    #[test]
    fn single_select_options_match_ignoring_case() {
        let field = status_field();
        assert_eq!(field.option_named("todo").map(|o| o.id.as_str()), Some("opt_todo"));
        assert!(field.option_named("Blocked").is_none());
    }

    #[test]
    fn field_lookup_is_exact() {
        let project = Project {
            id: ProjectId::new("PVT_1").unwrap(),
            title: "Security".into(),
            fields: vec![status_field()],
        };
        assert!(project.field("Status").is_some());
        assert!(project.field("status").is_none());
    }
}
