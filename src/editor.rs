use crate::model::{Disposition, Issue, IssueType, Project};

/// Field snapshot of the issue editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorForm {
    pub component: String,
    pub issue_type: IssueType,
    pub title: String,
    pub desc: String,
}

impl EditorForm {
    pub fn for_issue(issue: &Issue) -> Self {
        Self {
            component: issue.component.clone(),
            issue_type: issue.issue_type,
            title: issue.title.clone(),
            desc: issue.desc.clone(),
        }
    }

    /// Defaults for a new issue: first component, first type, empty text.
    pub fn blank(project: &Project) -> Self {
        Self {
            component: project
                .components()
                .first()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            issue_type: IssueType::ALL[0],
            title: String::new(),
            desc: String::new(),
        }
    }
}

/// What dismissing the editor window (decoration close, Escape) means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    Cancel,
    RequestClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Create,
    Edit { on_dismiss: Dismissal },
}

impl EditorKind {
    /// Creation has nothing to close, so dismissal always cancels.
    pub fn dismissal(self) -> Dismissal {
        match self {
            EditorKind::Create => Dismissal::Cancel,
            EditorKind::Edit { on_dismiss } => on_dismiss,
        }
    }

    pub fn can_close(self) -> bool {
        matches!(self, EditorKind::Edit { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Commit(EditorForm),
    RequestClose,
    Cancel,
}

/// How the user left the editor: a button, or dismissing the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorExit {
    Chose(EditorOutcome),
    Dismissed,
}

impl EditorExit {
    pub fn resolve(self, kind: EditorKind) -> EditorOutcome {
        let outcome = match self {
            EditorExit::Chose(outcome) => outcome,
            EditorExit::Dismissed => match kind.dismissal() {
                Dismissal::Cancel => EditorOutcome::Cancel,
                Dismissal::RequestClose => EditorOutcome::RequestClose,
            },
        };
        if outcome == EditorOutcome::RequestClose && !kind.can_close() {
            return EditorOutcome::Cancel;
        }
        outcome
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserOutcome {
    Confirm(usize),
    Cancel,
}

/// Picks one disposition; the first is preselected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispositionChooser {
    pub selected: usize,
}

impl DispositionChooser {
    pub fn labels() -> impl Iterator<Item = &'static str> {
        Disposition::ALL.iter().map(|d| d.label())
    }

    pub fn confirm(self) -> ChooserOutcome {
        ChooserOutcome::Confirm(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::issue;
    use crate::model::Component;

    #[test]
    fn blank_form_uses_first_component_and_type() {
        let project = Project::new("demo", vec![Component::new("ui"), Component::new("core")]);
        let form = EditorForm::blank(&project);
        assert_eq!(form.component, "ui");
        assert_eq!(form.issue_type, IssueType::Bugfix);
        assert!(form.title.is_empty() && form.desc.is_empty());
    }

    #[test]
    fn form_prefills_from_issue() {
        let issue = issue("crash on start", "core", None, 1);
        let form = EditorForm::for_issue(&issue);
        assert_eq!(form.title, "crash on start");
        assert_eq!(form.component, "core");
    }

    #[test]
    fn dismissal_follows_configured_policy() {
        let cancel = EditorKind::Edit { on_dismiss: Dismissal::Cancel };
        let close = EditorKind::Edit { on_dismiss: Dismissal::RequestClose };

        assert_eq!(EditorExit::Dismissed.resolve(cancel), EditorOutcome::Cancel);
        assert_eq!(EditorExit::Dismissed.resolve(close), EditorOutcome::RequestClose);
        assert_eq!(EditorExit::Dismissed.resolve(EditorKind::Create), EditorOutcome::Cancel);
    }

    #[test]
    fn create_cannot_request_close() {
        let exit = EditorExit::Chose(EditorOutcome::RequestClose);
        assert_eq!(exit.resolve(EditorKind::Create), EditorOutcome::Cancel);
    }

    #[test]
    fn chooser_defaults_to_first_disposition() {
        assert_eq!(DispositionChooser::default().confirm(), ChooserOutcome::Confirm(0));
        let labels: Vec<_> = DispositionChooser::labels().collect();
        assert_eq!(labels, vec!["fixed", "won't fix", "reorganized"]);
    }
}
