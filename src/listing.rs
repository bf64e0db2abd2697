use crate::model::{Issue, Project, ReleaseGroup};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayFilter {
    /// Include closed issues.
    pub show_all: bool,
}

/// One visible line of the issue list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub title: String,
}

/// Visible rows: unreleased releases in declared order, then unassigned
/// issues. Within a group issues keep project order.
pub fn render(project: &Project, filter: DisplayFilter) -> Vec<Row> {
    let groups = project
        .unreleased_releases()
        .into_iter()
        .map(ReleaseGroup::Release)
        .chain(std::iter::once(ReleaseGroup::Unassigned));

    let mut rows = Vec::new();
    for group in groups {
        for issue in project.issues_for_release(group) {
            if !filter.show_all && !issue.is_open() {
                continue;
            }
            rows.push(Row {
                id: issue.name.clone(),
                title: issue.title.clone(),
            });
        }
    }
    rows
}

/// Map an activated row back to the live issue. A stale name is a no-op.
pub fn resolve<'a>(project: &'a Project, row_id: &str) -> Option<&'a Issue> {
    let issue = project.issue(row_id);
    if issue.is_none() {
        tracing::debug!("row {} no longer matches an issue", row_id);
    }
    issue
}

/// The list as the window shows it: a filter plus the rows last rendered.
#[derive(Debug, Clone, Default)]
pub struct IssueList {
    filter: DisplayFilter,
    rows: Vec<Row>,
}

impl IssueList {
    pub fn new(filter: DisplayFilter) -> Self {
        Self {
            filter,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn filter(&self) -> DisplayFilter {
        self.filter
    }

    /// Rebuild every row from the project; no incremental patching.
    pub fn refresh(&mut self, project: &Project) {
        self.rows = render(project, self.filter);
    }

    pub fn set_show_all(&mut self, show_all: bool, project: &Project) {
        self.filter.show_all = show_all;
        self.refresh(project);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::issue;
    use crate::model::{Component, Disposition, Release, ReleaseStatus};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn project() -> Project {
        let mut shipped = Release::unreleased("v0");
        shipped.status = ReleaseStatus::Released;
        let mut project = Project::new("demo", vec![Component::new("core")])
            .with_releases(vec![Release::unreleased("v2"), shipped, Release::unreleased("v1")])
            .with_issues(vec![
                issue("loose", "core", None, 1),
                issue("for v1", "core", Some("v1"), 2),
                issue("for v2", "core", Some("v2"), 3),
                issue("old", "core", Some("v0"), 4),
                issue("done", "core", Some("v1"), 5),
            ])
            .unwrap();
        project
            .issue_mut("core-5")
            .unwrap()
            .close(Disposition::Fixed, "me", "")
            .unwrap();
        project
    }

    fn titles(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn groups_follow_release_order_then_unassigned() {
        let rows = render(&project(), DisplayFilter { show_all: false });
        assert_eq!(titles(&rows), vec!["for v2", "for v1", "loose"]);
    }

    #[test]
    fn open_only_hides_closed_issues() {
        let project = project();
        let rows = render(&project, DisplayFilter::default());
        assert!(rows.iter().all(|r| project.issue(&r.id).unwrap().is_open()));
    }

    #[test]
    fn show_all_lists_every_grouped_issue_once() {
        let project = project();
        let rows = render(&project, DisplayFilter { show_all: true });
        assert_eq!(titles(&rows), vec!["for v2", "for v1", "done", "loose"]);

        let ids: HashSet<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), rows.len());
    }

    #[test]
    fn rows_carry_issue_names() {
        let rows = render(&project(), DisplayFilter::default());
        assert_eq!(
            rows[0],
            Row {
                id: "core-3".to_string(),
                title: "for v2".to_string()
            }
        );
    }

    #[test]
    fn resolve_returns_live_issue_or_nothing() {
        let project = project();
        assert_eq!(resolve(&project, "core-2").unwrap().title, "for v1");
        assert!(resolve(&project, "core-99").is_none());
    }

    #[test]
    fn toggling_show_all_rerenders() {
        let project = project();
        let mut list = IssueList::new(DisplayFilter::default());
        list.refresh(&project);
        assert_eq!(list.rows().len(), 3);
        list.set_show_all(true, &project);
        assert_eq!(list.rows().len(), 4);
        assert!(list.filter().show_all);
    }
}
