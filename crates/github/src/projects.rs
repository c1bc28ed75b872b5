//! ProjectV2 board access over the GraphQL API.

use alerts::{
    IssueNumber, Owner, Project, ProjectBoard, ProjectField, ProjectFieldKind, ProjectId,
    ProjectItem, ProjectItemId, RepoName, SelectOption, TrackerError,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::GithubClient;

const RESOLVE_PROJECT: &str = r#"
query ResolveProject($id: ID!) {
  node(id: $id) {
    ... on ProjectV2 {
      id
      title
      fields(first: 100) {
        nodes {
          ... on ProjectV2FieldCommon { id name dataType }
          ... on ProjectV2SingleSelectField { options { id name } }
        }
      }
    }
  }
}
"#;

const FIND_ITEM: &str = r#"
query FindProjectItem($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) {
      projectItems(first: 50) {
        nodes {
          id
          project { id }
          fieldValues(first: 50) {
            nodes {
              ... on ProjectV2ItemFieldTextValue { text field { ... on ProjectV2FieldCommon { name } } }
              ... on ProjectV2ItemFieldNumberValue { number field { ... on ProjectV2FieldCommon { name } } }
              ... on ProjectV2ItemFieldDateValue { date field { ... on ProjectV2FieldCommon { name } } }
              ... on ProjectV2ItemFieldSingleSelectValue { name field { ... on ProjectV2FieldCommon { name } } }
            }
          }
        }
      }
    }
  }
}
"#;

const UPDATE_FIELD: &str = r#"
mutation UpdateProjectItemField($project: ID!, $item: ID!, $field: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: { projectId: $project, itemId: $item, fieldId: $field, value: $value }
  ) {
    projectV2Item { id }
  }
}
"#;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<Option<T>>,
}

impl<T> Nodes<T> {
    fn into_values(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct ResolveData {
    node: Option<ProjectNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    id: Option<String>,
    title: Option<String>,
    fields: Option<Nodes<FieldNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldNode {
    id: Option<String>,
    name: Option<String>,
    data_type: Option<String>,
    #[serde(default)]
    options: Vec<SelectOptionNode>,
}

#[derive(Debug, Deserialize)]
struct SelectOptionNode {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FindItemData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    project_items: Nodes<ItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemNode {
    id: String,
    project: ProjectRef,
    field_values: Option<Nodes<FieldValueNode>>,
}

#[derive(Debug, Deserialize)]
struct ProjectRef {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FieldValueNode {
    text: Option<String>,
    number: Option<f64>,
    date: Option<String>,
    name: Option<String>,
    field: Option<FieldNameNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FieldNameNode {
    name: Option<String>,
}

impl FieldValueNode {
    fn into_pair(self) -> Option<(String, String)> {
        let field = self.field?.name?;
        let value = self
            .text
            .or(self.date)
            .or(self.name)
            .or_else(|| self.number.map(|n| n.to_string()))?;
        Some((field, value))
    }
}

fn field_kind(data_type: &str, options: Vec<SelectOptionNode>) -> ProjectFieldKind {
    match data_type {
        "TEXT" => ProjectFieldKind::Text,
        "NUMBER" => ProjectFieldKind::Number,
        "DATE" => ProjectFieldKind::Date,
        "SINGLE_SELECT" => ProjectFieldKind::SingleSelect {
            options: options
                .into_iter()
                .map(|o| SelectOption {
                    id: o.id,
                    name: o.name,
                })
                .collect(),
        },
        other => ProjectFieldKind::Unsupported {
            data_type: other.to_string(),
        },
    }
}

/// Converts a rendered string into the `ProjectV2FieldValue` input for `field`.
pub(crate) fn field_value_input(field: &ProjectField, value: &str) -> Result<Value, TrackerError> {
    let invalid = |reason: &str| TrackerError::InvalidFieldValue {
        field: field.name.clone(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = value.trim();

    match &field.kind {
        ProjectFieldKind::Text => Ok(json!({ "text": value })),
        ProjectFieldKind::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| json!({ "number": n }))
            .ok_or_else(|| invalid("not a number")),
        ProjectFieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
            .map(|date| json!({ "date": date.format("%Y-%m-%d").to_string() }))
            .ok_or_else(|| invalid("not a YYYY-MM-DD date")),
        ProjectFieldKind::SingleSelect { .. } => field
            .option_named(trimmed)
            .map(|option| json!({ "singleSelectOptionId": option.id }))
            .ok_or_else(|| invalid("no single-select option with that name")),
        ProjectFieldKind::Unsupported { data_type } => Err(invalid(&format!(
            "fields of type {data_type} cannot be set from text"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Reads and updates a ProjectV2 board. Authenticated with the GraphQL token.
#[derive(Debug, Clone)]
pub struct GithubProjectBoard {
    client: GithubClient,
}

impl GithubProjectBoard {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProjectBoard for GithubProjectBoard {
    #[instrument(skip_all, fields(project_id = %project_id))]
    async fn resolve_project(&self, project_id: &ProjectId) -> Result<Project, TrackerError> {
        let data: ResolveData = self
            .client
            .graphql(RESOLVE_PROJECT, json!({ "id": project_id.as_str() }))
            .await?;

        let not_found = || TrackerError::NotFound {
            what: format!("ProjectV2 '{project_id}'"),
        };
        let node = data.node.ok_or_else(not_found)?;
        // A node id that exists but is not a ProjectV2 comes back as `{}`.
        let id = node.id.and_then(ProjectId::new).ok_or_else(not_found)?;

        let fields = node
            .fields
            .map(|nodes| {
                nodes
                    .into_values()
                    .filter_map(|f| {
                        Some(ProjectField {
                            kind: field_kind(f.data_type.as_deref().unwrap_or_default(), f.options),
                            id: f.id?,
                            name: f.name?,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Project {
            id,
            title: node.title.unwrap_or_default(),
            fields,
        })
    }

    #[instrument(skip_all, fields(owner = %owner, repo = %repo, issue_number = %number))]
    async fn find_item_by_issue_number(
        &self,
        project: &Project,
        owner: &Owner,
        repo: &RepoName,
        number: IssueNumber,
    ) -> Result<ProjectItem, TrackerError> {
        let data: FindItemData = self
            .client
            .graphql(
                FIND_ITEM,
                json!({
                    "owner": owner.as_str(),
                    "repo": repo.as_str(),
                    "number": number.as_u64(),
                }),
            )
            .await?;

        let issue = data
            .repository
            .and_then(|r| r.issue)
            .ok_or_else(|| TrackerError::NotFound {
                what: format!("issue {owner}/{repo}#{number}"),
            })?;

        let node = issue
            .project_items
            .into_values()
            .find(|item| item.project.id == project.id.as_str())
            .ok_or_else(|| TrackerError::NotFound {
                what: format!("item for issue #{number} on project '{}'", project.title),
            })?;

        let id = ProjectItemId::new(node.id).ok_or_else(|| TrackerError::Decode {
            message: "project item has an empty id".into(),
        })?;
        let mut item = ProjectItem::new(id);
        for (field, value) in node
            .field_values
            .map(|values| values.into_values().filter_map(FieldValueNode::into_pair).collect())
            .unwrap_or_else(Vec::new)
        {
            item.record(field, value);
        }

        debug!(item_id = %item.id, known_fields = item.fields.len(), "Resolved project item");
        Ok(item)
    }

    #[instrument(skip_all, fields(item_id = %item.id, field = %field_name))]
    async fn update_item_field(
        &self,
        project: &Project,
        item: &ProjectItem,
        field_name: &str,
        value: &str,
    ) -> Result<(), TrackerError> {
        let field = project.field(field_name).ok_or_else(|| TrackerError::UnknownField {
            field: field_name.to_string(),
        })?;
        let input = field_value_input(field, value)?;

        let _: Value = self
            .client
            .graphql(
                UPDATE_FIELD,
                json!({
                    "project": project.id.as_str(),
                    "item": item.id.as_str(),
                    "field": field.id,
                    "value": input,
                }),
            )
            .await?;
        Ok(())
    }
}
