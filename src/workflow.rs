//! The edit, close and create flows.
//!
//! Each flow runs to completion in one call: it asks [`Dialogs`] for the
//! user's answers, applies at most one mutation to the project, and saves
//! exactly once when something changed.

use chrono::Utc;

use crate::editor::{
    ChooserOutcome, Dismissal, EditorExit, EditorForm, EditorKind, EditorOutcome,
};
use crate::error::{Error, Result};
use crate::hooks::Hook;
use crate::model::{Disposition, Issue, IssueDraft};
use crate::session::Session;

/// Modal dialogs. Each call returns only once the user has decided.
pub trait Dialogs {
    fn edit_issue(&mut self, kind: EditorKind, form: EditorForm) -> EditorExit;
    fn choose_disposition(&mut self, issue: &Issue) -> ChooserOutcome;
}

/// Answers collected ahead of time, replayed when a flow asks for them.
/// A chooser that was never answered counts as cancelled.
#[derive(Debug, Clone)]
pub struct RecordedDialogs {
    pub editor: EditorExit,
    pub chooser: Option<ChooserOutcome>,
}

impl RecordedDialogs {
    pub fn editor(editor: EditorExit) -> Self {
        Self {
            editor,
            chooser: None,
        }
    }

    pub fn close(chooser: ChooserOutcome) -> Self {
        Self {
            editor: EditorExit::Chose(EditorOutcome::RequestClose),
            chooser: Some(chooser),
        }
    }
}

impl Dialogs for RecordedDialogs {
    fn edit_issue(&mut self, _kind: EditorKind, _form: EditorForm) -> EditorExit {
        self.editor.clone()
    }

    fn choose_disposition(&mut self, _issue: &Issue) -> ChooserOutcome {
        self.chooser.take().unwrap_or(ChooserOutcome::Cancel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Unchanged,
    Updated(String),
    Closed { name: String, disposition: Disposition },
    Created(String),
}

impl FlowOutcome {
    /// Whether the list needs rendering again.
    pub fn mutated(&self) -> bool {
        !matches!(self, FlowOutcome::Unchanged)
    }
}

/// Open the editor on an existing issue and apply whatever the user decides.
pub fn edit_issue(
    session: &mut Session,
    dialogs: &mut dyn Dialogs,
    name: &str,
    on_dismiss: Dismissal,
) -> Result<FlowOutcome> {
    let Some(issue) = session.project.issue(name) else {
        tracing::debug!("edit requested for unknown issue {}", name);
        return Ok(FlowOutcome::Unchanged);
    };
    let kind = EditorKind::Edit { on_dismiss };
    let form = EditorForm::for_issue(issue);

    match dialogs.edit_issue(kind, form).resolve(kind) {
        EditorOutcome::Commit(form) => commit_edit(session, name, form),
        EditorOutcome::RequestClose => close_issue(session, dialogs, name),
        EditorOutcome::Cancel => Ok(FlowOutcome::Unchanged),
    }
}

/// Open a blank editor and register a new issue if the user commits.
pub fn create_issue(session: &mut Session, dialogs: &mut dyn Dialogs) -> Result<FlowOutcome> {
    let kind = EditorKind::Create;
    let form = EditorForm::blank(&session.project);

    match dialogs.edit_issue(kind, form).resolve(kind) {
        EditorOutcome::Commit(form) => register_issue(session, form),
        EditorOutcome::RequestClose | EditorOutcome::Cancel => Ok(FlowOutcome::Unchanged),
    }
}

/// Ask for a disposition and close the issue if one is confirmed.
pub fn close_issue(
    session: &mut Session,
    dialogs: &mut dyn Dialogs,
    name: &str,
) -> Result<FlowOutcome> {
    let issue = session
        .project
        .issue(name)
        .ok_or_else(|| Error::IssueNotFound(name.to_string()))?;

    let index = match dialogs.choose_disposition(issue) {
        ChooserOutcome::Confirm(index) => index,
        ChooserOutcome::Cancel => return Ok(FlowOutcome::Unchanged),
    };
    let disposition = Disposition::from_index(index).ok_or(Error::InvalidDisposition(index))?;

    let who = session.reporter();
    let issue = session
        .project
        .issue_mut(name)
        .ok_or_else(|| Error::IssueNotFound(name.to_string()))?;
    issue.close(disposition, &who, "")?;
    tracing::info!("closed {} as {}", name, disposition.as_str());

    session.run_hook(Hook::AfterUpdate, name);
    session.save()?;
    Ok(FlowOutcome::Closed {
        name: name.to_string(),
        disposition,
    })
}

fn commit_edit(session: &mut Session, name: &str, form: EditorForm) -> Result<FlowOutcome> {
    if session.project.component(&form.component).is_none() {
        return Err(Error::UnknownComponent(form.component));
    }
    let who = session.reporter();
    let issue = session
        .project
        .issue_mut(name)
        .ok_or_else(|| Error::IssueNotFound(name.to_string()))?;

    issue.title = form.title;
    issue.desc = form.desc;
    issue.issue_type = form.issue_type;
    issue.component = form.component;
    issue.log("edited", &who, "");
    issue.mark_changed();
    tracing::info!("updated {}", name);

    session.run_hook(Hook::AfterUpdate, name);
    session.save()?;
    Ok(FlowOutcome::Updated(name.to_string()))
}

fn register_issue(session: &mut Session, form: EditorForm) -> Result<FlowOutcome> {
    let draft = IssueDraft {
        title: form.title,
        desc: form.desc,
        issue_type: form.issue_type,
        component: form.component,
        release: None,
        reporter: session.reporter(),
    };
    let name = session.project.add_issue(Issue::create(draft, Utc::now()))?;
    tracing::info!("added {}", name);

    session.run_hook(Hook::AfterAdd, &name);
    session.save()?;
    Ok(FlowOutcome::Created(name))
}
