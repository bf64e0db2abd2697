//! Flows driven against a real issue directory.

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use ditzui::config::Config;
use ditzui::editor::{ChooserOutcome, Dismissal, EditorExit, EditorForm, EditorOutcome};
use ditzui::hooks::Hooks;
use ditzui::listing::{render, DisplayFilter, Row};
use ditzui::model::{Disposition, IssueStatus, IssueType};
use ditzui::session::Session;
use ditzui::storage::{FileStorage, Storage, PROJECT_FN};
use ditzui::workflow::{self, RecordedDialogs};

fn open(dir: &std::path::Path) -> Session {
    let config = Config {
        name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        issue_dir: None,
    };
    Session::open(config, Box::new(FileStorage::new(dir)), Hooks::none()).unwrap()
}

fn add(session: &mut Session, title: &str) -> String {
    let form = EditorForm {
        component: "core".to_string(),
        issue_type: IssueType::Feature,
        title: title.to_string(),
        desc: format!("{title} in detail"),
    };
    let mut dialogs = RecordedDialogs::editor(EditorExit::Chose(EditorOutcome::Commit(form)));
    match workflow::create_issue(session, &mut dialogs).unwrap() {
        workflow::FlowOutcome::Created(name) => name,
        other => panic!("expected a created issue, got {other:?}"),
    }
}

#[test]
fn created_issues_survive_a_reload() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".ditz");
    FileStorage::init(&dir, "demo", &["core".to_string()]).unwrap();

    let mut session = open(&dir);
    assert_eq!(add(&mut session, "Parser"), "core-1");
    assert_eq!(add(&mut session, "Printer"), "core-2");

    let reloaded = FileStorage::new(&dir).load().unwrap();
    let rows = render(&reloaded, DisplayFilter::default());
    assert_eq!(
        rows,
        vec![
            Row {
                id: "core-1".to_string(),
                title: "Parser".to_string()
            },
            Row {
                id: "core-2".to_string(),
                title: "Printer".to_string()
            },
        ]
    );
    let parser = reloaded.issue("core-1").unwrap();
    assert_eq!(parser.desc, "Parser in detail");
    assert_eq!(parser.reporter, "Ann <ann@example.com>");
    assert!(!parser.is_changed());
}

#[test]
fn closing_persists_and_hides_from_open_list() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".ditz");
    FileStorage::init(&dir, "demo", &["core".to_string()]).unwrap();

    let mut session = open(&dir);
    add(&mut session, "Parser");
    add(&mut session, "Printer");

    let mut dialogs = RecordedDialogs::close(ChooserOutcome::Confirm(2));
    workflow::edit_issue(&mut session, &mut dialogs, "core-1", Dismissal::Cancel).unwrap();

    let reloaded = FileStorage::new(&dir).load().unwrap();
    let closed = reloaded.issue("core-1").unwrap();
    assert_eq!(closed.status, IssueStatus::Closed);
    assert_eq!(closed.disposition, Some(Disposition::Reorg));

    let open_rows = render(&reloaded, DisplayFilter { show_all: false });
    assert_eq!(open_rows.len(), 1);
    assert_eq!(open_rows[0].id, "core-2");
    let all_rows = render(&reloaded, DisplayFilter { show_all: true });
    assert_eq!(all_rows.len(), 2);
}

#[test]
fn teardown_writes_nothing_for_an_untouched_project() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".ditz");
    FileStorage::init(&dir, "demo", &["core".to_string()]).unwrap();
    let project_file = dir.join(PROJECT_FN);
    fs::write(&project_file, "name: demo\ncomponents:\n- name: core\n# hand edited\n").unwrap();

    let mut session = open(&dir);
    assert!(!session.save_if_changed().unwrap());
    assert!(fs::read_to_string(&project_file).unwrap().contains("# hand edited"));
}

#[test]
fn broken_issue_file_fails_the_load() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".ditz");
    FileStorage::init(&dir, "demo", &["core".to_string()]).unwrap();
    fs::write(dir.join("issue-deadbeef.yaml"), "title: [broken\n").unwrap();

    let err = FileStorage::new(&dir).load().unwrap_err();
    assert!(matches!(err, ditzui::Error::Parse { .. }));
}
