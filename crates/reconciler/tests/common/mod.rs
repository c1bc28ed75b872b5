//! In-memory GitHub stand-in shared by the engine tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use alerts::{
    Alert, AlertNumber, AlertSource, Config, Issue, IssueNumber, IssueSummary, IssueTracker,
    LookupKey, Owner, Project, ProjectBoard, ProjectField, ProjectFieldKind, ProjectId, ProjectItem,
    ProjectItemId, RepoName, TrackerError,
};
use async_trait::async_trait;
use reconciler::Reconciler;

pub const CONFIG: &str = r#"
github:
  project_id: PVT_security
  owner: acme
  repo: webapp
  issue:
    title: "{{alert_severity}}: {{alert_package_name}}"
    body: "Alert {{alert_number}} ({{alert_package_ecosystem}}) due {{remediation_deadline}}"
    labels: [security, "{{alert_package_ecosystem}}", security]
    assignees:
      npm: [npm_owner]
      other: [triage]
      all: [security_lead]
  project_item:
    field_map:
      - field_name: Due
        field_value: "{{remediation_deadline}}"
      - field_name: Severity
        field_value: "{{alert_severity}}"
      - field_name: Package
        field_value: "{{alert_package_name}}@{{alert_package_ecosystem}}"
remediation_sla:
  critical: 1
  high: 3
  medium: 14
  low: 30
"#;

pub fn config() -> Config {
    Config::from_yaml_str(CONFIG).expect("test config is valid")
}

pub fn alert(number: u64, severity: &str, package: &str, ecosystem: &str) -> Alert {
    Alert {
        number: AlertNumber::new(number),
        severity: severity.into(),
        package_name: package.into(),
        ecosystem: ecosystem.into(),
        created_at: Some("2024-01-01T10:00:00Z".into()),
        summary: Some(format!("{package} is vulnerable")),
        ghsa_id: None,
        html_url: None,
    }
}

/// Every collaborator call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ResolveProject,
    GetAlerts,
    Search(String),
    Create(String),
    FindItem(IssueNumber),
    Update { field: String, value: String },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    issues: Vec<Issue>,
    items: BTreeMap<IssueNumber, ProjectItem>,
    search_failures: VecDeque<TrackerError>,
    create_failures: VecDeque<TrackerError>,
    find_failures: VecDeque<TrackerError>,
    update_failures: VecDeque<TrackerError>,
    always_rate_limit_search_for: Option<String>,
}

/// Alert source, issue tracker and project board in one, remembering every
/// issue it creates so repeated runs observe earlier ones.
pub struct FakeGithub {
    alerts: Result<Vec<Alert>, TrackerError>,
    project_resolvable: bool,
    automation_enabled: bool,
    state: Mutex<State>,
}

impl FakeGithub {
    pub fn new(alerts: Vec<Alert>) -> Arc<Self> {
        Arc::new(Self {
            alerts: Ok(alerts),
            project_resolvable: true,
            automation_enabled: true,
            state: Mutex::new(State::default()),
        })
    }

    pub fn failing_alerts(error: TrackerError) -> Arc<Self> {
        Arc::new(Self {
            alerts: Err(error),
            project_resolvable: true,
            automation_enabled: true,
            state: Mutex::new(State::default()),
        })
    }

    pub fn without_project(alerts: Vec<Alert>) -> Arc<Self> {
        Arc::new(Self {
            alerts: Ok(alerts),
            project_resolvable: false,
            automation_enabled: true,
            state: Mutex::new(State::default()),
        })
    }

    pub fn without_automation(alerts: Vec<Alert>) -> Arc<Self> {
        Arc::new(Self {
            alerts: Ok(alerts),
            project_resolvable: true,
            automation_enabled: false,
            state: Mutex::new(State::default()),
        })
    }

    pub fn fail_next_search(&self, error: TrackerError) {
        self.state.lock().unwrap().search_failures.push_back(error);
    }

    pub fn fail_next_create(&self, error: TrackerError) {
        self.state.lock().unwrap().create_failures.push_back(error);
    }

    pub fn fail_next_find(&self, error: TrackerError) {
        self.state.lock().unwrap().find_failures.push_back(error);
    }

    pub fn fail_next_update(&self, error: TrackerError) {
        self.state.lock().unwrap().update_failures.push_back(error);
    }

    /// Every search whose query contains `needle` is rate limited.
    pub fn always_rate_limit_search(&self, needle: &str) {
        self.state.lock().unwrap().always_rate_limit_search_for = Some(needle.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.state.lock().unwrap().issues.clone()
    }

    pub fn item_for(&self, number: IssueNumber) -> Option<ProjectItem> {
        self.state.lock().unwrap().items.get(&number).cloned()
    }

    pub fn reconciler(self: &Arc<Self>, config: Config) -> Reconciler {
        Reconciler::new(config, self.clone(), self.clone(), self.clone())
    }

    pub fn project() -> Project {
        let text = |name: &str| ProjectField {
            id: format!("F_{name}"),
            name: name.to_string(),
            kind: ProjectFieldKind::Text,
        };
        Project {
            id: ProjectId::new("PVT_security").unwrap(),
            title: "Security".into(),
            fields: vec![text("Due"), text("Severity"), text("Package")],
        }
    }
}

#[async_trait]
impl AlertSource for FakeGithub {
    async fn get_alerts(&self, _owner: &Owner, _repo: &RepoName) -> Result<Vec<Alert>, TrackerError> {
        self.state.lock().unwrap().calls.push(Call::GetAlerts);
        self.alerts.clone()
    }
}

#[async_trait]
impl IssueTracker for FakeGithub {
    async fn search_issues(
        &self,
        _owner: &Owner,
        _repo: &RepoName,
        key: &LookupKey,
    ) -> Result<Vec<IssueSummary>, TrackerError> {
        let query = key.as_str();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Search(query.to_string()));

        if let Some(error) = state.search_failures.pop_front() {
            return Err(error);
        }
        if state
            .always_rate_limit_search_for
            .as_deref()
            .is_some_and(|needle| query.contains(needle))
        {
            return Err(TrackerError::RateLimited { after: None });
        }

        Ok(state
            .issues
            .iter()
            .filter(|issue| key.matches_title(&issue.title))
            .map(|issue| IssueSummary {
                number: issue.number.expect("stored issues are persisted"),
                title: issue.title.clone(),
            })
            .collect())
    }

    async fn create_issue(&self, issue: &Issue) -> Result<IssueNumber, TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(issue.title.clone()));

        if let Some(error) = state.create_failures.pop_front() {
            return Err(error);
        }

        let number = IssueNumber::new(1000 + state.issues.len() as u64);
        state.issues.push(issue.clone().persisted(number));
        if self.automation_enabled {
            let item_id = ProjectItemId::new(format!("PVTI_{number}")).unwrap();
            state.items.insert(number, ProjectItem::new(item_id));
        }
        Ok(number)
    }
}

#[async_trait]
impl ProjectBoard for FakeGithub {
    async fn resolve_project(&self, project_id: &ProjectId) -> Result<Project, TrackerError> {
        self.state.lock().unwrap().calls.push(Call::ResolveProject);
        if self.project_resolvable {
            Ok(Self::project())
        } else {
            Err(TrackerError::NotFound {
                what: format!("project {project_id}"),
            })
        }
    }

    async fn find_item_by_issue_number(
        &self,
        _project: &Project,
        _owner: &Owner,
        _repo: &RepoName,
        number: IssueNumber,
    ) -> Result<ProjectItem, TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::FindItem(number));
        if let Some(error) = state.find_failures.pop_front() {
            return Err(error);
        }
        state.items.get(&number).cloned().ok_or(TrackerError::NotFound {
            what: format!("project item for issue #{number}"),
        })
    }

    async fn update_item_field(
        &self,
        _project: &Project,
        item: &ProjectItem,
        field_name: &str,
        value: &str,
    ) -> Result<(), TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update {
            field: field_name.to_string(),
            value: value.to_string(),
        });

        if let Some(error) = state.update_failures.pop_front() {
            return Err(error);
        }

        let stored = state
            .items
            .values_mut()
            .find(|stored| stored.id == item.id)
            .ok_or(TrackerError::NotFound {
                what: format!("project item {}", item.id),
            })?;
        stored.record(field_name, value);
        Ok(())
    }
}
