use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Bugfix,
    Feature,
    Task,
}

impl IssueType {
    /// Declared order, shared by display and index lookup.
    pub const ALL: [IssueType; 3] = [IssueType::Bugfix, IssueType::Feature, IssueType::Task];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::Bugfix => "bugfix",
            IssueType::Feature => "feature",
            IssueType::Task => "task",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Unstarted,
    InProgress,
    Paused,
    Closed,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Unstarted => "unstarted",
            IssueStatus::InProgress => "in progress",
            IssueStatus::Paused => "paused",
            IssueStatus::Closed => "closed",
        }
    }
}

/// Resolution recorded when an issue is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Fixed,
    Wontfix,
    Reorg,
}

impl Disposition {
    /// Declared order; the disposition chooser lists these and hands back an index.
    pub const ALL: [Disposition; 3] = [Disposition::Fixed, Disposition::Wontfix, Disposition::Reorg];

    pub fn from_index(index: usize) -> Option<Disposition> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Fixed => "fixed",
            Disposition::Wontfix => "wontfix",
            Disposition::Reorg => "reorg",
        }
    }

    /// Human readable label shown in the chooser.
    pub fn label(self) -> &'static str {
        match self {
            Disposition::Fixed => "fixed",
            Disposition::Wontfix => "won't fix",
            Disposition::Reorg => "reorganized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub time: DateTime<Utc>,
    pub who: String,
    pub what: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Unreleased,
    Released,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub status: ReleaseStatus,
    #[serde(default)]
    pub release_time: Option<DateTime<Utc>>,
}

impl Release {
    pub fn unreleased(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ReleaseStatus::Unreleased,
            release_time: None,
        }
    }
}

/// A release bucket as seen by the issue list: a real release or the
/// synthetic group of issues with no release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseGroup<'a> {
    Release(&'a Release),
    Unassigned,
}

/// Fields supplied when creating an issue.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub title: String,
    pub desc: String,
    pub issue_type: IssueType,
    pub component: String,
    pub release: Option<String>,
    pub reporter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Assigned by the project on load and on `add_issue`; not persisted.
    #[serde(skip)]
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub component: String,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub reporter: String,
    pub status: IssueStatus,
    #[serde(default)]
    pub disposition: Option<Disposition>,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
    #[serde(skip)]
    changed: bool,
}

impl Issue {
    /// Build a fresh, unstarted issue stamped with `now`.
    pub fn create(draft: IssueDraft, now: DateTime<Utc>) -> Issue {
        let id = make_id(&draft, now);
        let mut issue = Issue {
            id,
            name: String::new(),
            title: draft.title,
            desc: draft.desc,
            issue_type: draft.issue_type,
            component: draft.component,
            release: draft.release,
            reporter: draft.reporter,
            status: IssueStatus::Unstarted,
            disposition: None,
            creation_time: now,
            references: Vec::new(),
            log_events: Vec::new(),
            changed: false,
        };
        let who = issue.reporter.clone();
        issue.log_at(now, "created", &who, "");
        issue
    }

    pub fn is_open(&self) -> bool {
        self.status != IssueStatus::Closed
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Flag an in-memory mutation. Only a reload clears it.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn log(&mut self, what: &str, who: &str, comment: &str) {
        self.log_at(Utc::now(), what, who, comment);
        self.changed = true;
    }

    fn log_at(&mut self, time: DateTime<Utc>, what: &str, who: &str, comment: &str) {
        self.log_events.push(LogEvent {
            time,
            who: who.to_string(),
            what: what.to_string(),
            comment: comment.to_string(),
        });
    }

    pub fn close(&mut self, disposition: Disposition, who: &str, comment: &str) -> Result<()> {
        if self.is_closed() {
            return Err(Error::AlreadyClosed(self.name.clone()));
        }
        self.status = IssueStatus::Closed;
        self.disposition = Some(disposition);
        self.log(
            &format!("closed with disposition {}", disposition.as_str()),
            who,
            comment,
        );
        Ok(())
    }
}

fn make_id(draft: &IssueDraft, now: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(now.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true));
    hasher.update(draft.title.as_bytes());
    hasher.update(draft.reporter.as_bytes());
    hasher.update(draft.component.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..40].to_string()
}

/// The loaded issue database: project metadata plus every issue.
///
/// Issues are looked up by name through an index owned here, so callers
/// never keep their own copies of an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default)]
    releases: Vec<Release>,
    #[serde(skip)]
    issues: Vec<Issue>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Project {
    pub fn new(name: impl Into<String>, components: Vec<Component>) -> Self {
        Self {
            name: name.into(),
            components,
            releases: Vec::new(),
            issues: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_releases(mut self, releases: Vec<Release>) -> Self {
        self.releases = releases;
        self
    }

    /// Attach loaded issues, validate the whole project and name every issue.
    pub fn with_issues(mut self, issues: Vec<Issue>) -> Result<Self> {
        self.issues = issues;
        self.validate()?;
        self.assign_names();
        Ok(self)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn release(&self, name: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.name == name)
    }

    pub fn unreleased_releases(&self) -> Vec<&Release> {
        self.releases
            .iter()
            .filter(|r| r.status == ReleaseStatus::Unreleased)
            .collect()
    }

    /// Issues in one release group, in project order.
    pub fn issues_for_release(&self, group: ReleaseGroup<'_>) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|issue| match group {
                ReleaseGroup::Release(r) => issue.release.as_deref() == Some(r.name.as_str()),
                ReleaseGroup::Unassigned => issue.release.is_none(),
            })
            .collect()
    }

    pub fn issue(&self, name: &str) -> Option<&Issue> {
        self.index.get(name).and_then(|&i| self.issues.get(i))
    }

    pub fn issue_mut(&mut self, name: &str) -> Option<&mut Issue> {
        match self.index.get(name) {
            Some(&i) => self.issues.get_mut(i),
            None => None,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.issues.iter().any(Issue::is_changed)
    }

    /// Register a new issue, assign its name and return it.
    pub fn add_issue(&mut self, mut issue: Issue) -> Result<String> {
        if self.component(&issue.component).is_none() {
            return Err(Error::UnknownComponent(issue.component));
        }
        if let Some(release) = &issue.release {
            if self.release(release).is_none() {
                return Err(Error::InvalidProject(format!(
                    "issue {} refers to unknown release {}",
                    issue.title, release
                )));
            }
        }
        if self.issues.iter().any(|i| i.id == issue.id) {
            return Err(Error::InvalidProject(format!("duplicate issue id {}", issue.id)));
        }

        let name = self.next_name(&issue.component);
        issue.name = name.clone();
        issue.mark_changed();
        self.index.insert(name.clone(), self.issues.len());
        self.issues.push(issue);
        Ok(name)
    }

    // Existing names keep their number, so a new issue takes the next free one.
    fn next_name(&self, component: &str) -> String {
        let prefix = format!("{component}-");
        let highest = self
            .issues
            .iter()
            .filter_map(|i| i.name.strip_prefix(&prefix))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        format!("{prefix}{}", highest + 1)
    }

    fn validate(&self) -> Result<()> {
        if self.components.is_empty() {
            return Err(Error::InvalidProject("project has no components".to_string()));
        }
        let mut seen = HashSet::new();
        for component in &self.components {
            if !seen.insert(component.name.as_str()) {
                return Err(Error::InvalidProject(format!(
                    "duplicate component {}",
                    component.name
                )));
            }
        }

        let mut ids = HashSet::new();
        for issue in &self.issues {
            if !ids.insert(issue.id.as_str()) {
                return Err(Error::InvalidProject(format!("duplicate issue id {}", issue.id)));
            }
            if self.component(&issue.component).is_none() {
                return Err(Error::InvalidProject(format!(
                    "issue {} refers to unknown component {}",
                    issue.id, issue.component
                )));
            }
            if let Some(release) = &issue.release {
                if self.release(release).is_none() {
                    return Err(Error::InvalidProject(format!(
                        "issue {} refers to unknown release {}",
                        issue.id, release
                    )));
                }
            }
        }
        Ok(())
    }

    /// Name issues `<component>-<n>`, numbering each component's issues by
    /// creation time.
    fn assign_names(&mut self) {
        let mut names = vec![String::new(); self.issues.len()];
        for component in &self.components {
            let mut members: Vec<usize> = (0..self.issues.len())
                .filter(|&i| self.issues[i].component == component.name)
                .collect();
            members.sort_by(|&a, &b| {
                let (a, b) = (&self.issues[a], &self.issues[b]);
                a.creation_time.cmp(&b.creation_time).then_with(|| a.id.cmp(&b.id))
            });
            for (n, i) in members.into_iter().enumerate() {
                names[i] = format!("{}-{}", component.name, n + 1);
            }
        }

        self.index.clear();
        for (i, (issue, name)) in self.issues.iter_mut().zip(names).enumerate() {
            self.index.insert(name.clone(), i);
            issue.name = name;
        }
    }
}
