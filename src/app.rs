use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::editor::{
    ChooserOutcome, Dismissal, DispositionChooser, EditorExit, EditorForm, EditorKind,
    EditorOutcome,
};
use crate::error::Result;
use crate::listing::{self, DisplayFilter, IssueList};
use crate::model::{IssueType, Project};
use crate::session::Session;
use crate::workflow::{self, FlowOutcome, RecordedDialogs};

/// Closing the edit window through its decoration (or Escape) cancels.
pub const EDIT_DISMISSAL: Dismissal = Dismissal::Cancel;

/// The dialog currently blocking the list. Dropping it disposes the dialog.
enum Modal {
    Editor {
        target: Option<String>,
        kind: EditorKind,
        form: EditorForm,
    },
    Chooser {
        target: String,
        chooser: DispositionChooser,
    },
}

/// A dialog the user has just finished with.
enum Resolution {
    Editor {
        target: Option<String>,
        kind: EditorKind,
        exit: EditorExit,
    },
    Chooser {
        target: String,
        outcome: ChooserOutcome,
    },
}

pub struct DitzUiApp {
    session: Session,
    list: IssueList,
    selected: Option<String>,
    modal: Option<Modal>,
    error_message: Option<String>,
    status_message: Option<String>,
}

impl DitzUiApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: Session, filter: DisplayFilter) -> Self {
        Self::setup_custom_fonts(cc);
        let mut list = IssueList::new(filter);
        list.refresh(&session.project);
        Self {
            session,
            list,
            selected: None,
            modal: None,
            error_message: None,
            status_message: None,
        }
    }

    fn setup_custom_fonts(cc: &eframe::CreationContext<'_>) {
        let mut style = (*cc.egui_ctx.style()).clone();

        style.text_styles = [
            (egui::TextStyle::Small, egui::FontId::new(11.0, egui::FontFamily::Proportional)),
            (egui::TextStyle::Body, egui::FontId::new(13.0, egui::FontFamily::Proportional)),
            (egui::TextStyle::Button, egui::FontId::new(13.0, egui::FontFamily::Proportional)),
            (egui::TextStyle::Heading, egui::FontId::new(17.0, egui::FontFamily::Proportional)),
            (egui::TextStyle::Monospace, egui::FontId::new(12.0, egui::FontFamily::Monospace)),
        ]
        .into();

        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);
        style.spacing.window_margin = egui::Margin::same(8.0);

        cc.egui_ctx.set_style(style);
    }

    fn refresh(&mut self) {
        self.list.refresh(&self.session.project);
    }

    fn open_editor(&mut self, name: &str) {
        let Some(issue) = listing::resolve(&self.session.project, name) else {
            return;
        };
        self.modal = Some(Modal::Editor {
            target: Some(issue.name.clone()),
            kind: EditorKind::Edit {
                on_dismiss: EDIT_DISMISSAL,
            },
            form: EditorForm::for_issue(issue),
        });
    }

    fn open_creator(&mut self) {
        self.modal = Some(Modal::Editor {
            target: None,
            kind: EditorKind::Create,
            form: EditorForm::blank(&self.session.project),
        });
    }

    fn show_list_view(&mut self, ctx: &egui::Context) {
        let enabled = self.modal.is_none();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("ditz: {}", self.session.project.name)).strong());
                    ui.separator();
                    let mut show_all = self.list.filter().show_all;
                    if ui.checkbox(&mut show_all, "Show closed").changed() {
                        self.list.set_show_all(show_all, &self.session.project);
                    }
                });
            });

            if let Some(ref error) = self.error_message {
                ui.colored_label(egui::Color32::RED, error);
            } else if let Some(ref status) = self.status_message {
                ui.label(status);
            }
        });

        let mut add_clicked = false;
        let mut refresh_clicked = false;
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.horizontal(|ui| {
                    add_clicked = ui.button("Add Issue").clicked();
                    refresh_clicked = ui.button("Refresh").clicked();
                    if ui.button("Finish").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        let mut new_selected = None;
        let mut activated = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                self.show_issue_table(ui, &mut new_selected, &mut activated);
            });
        });

        if !enabled {
            return;
        }

        if let Some(selected) = new_selected {
            self.selected = Some(selected);
        }

        ctx.input(|i| {
            let rows = self.list.rows();
            let position = self
                .selected
                .as_ref()
                .and_then(|id| rows.iter().position(|r| &r.id == id));
            if i.key_pressed(egui::Key::ArrowDown) {
                let next = position.map_or(0, |p| p + 1);
                if let Some(row) = rows.get(next) {
                    self.selected = Some(row.id.clone());
                }
            }
            if i.key_pressed(egui::Key::ArrowUp) {
                if let Some(row) = position.and_then(|p| p.checked_sub(1)).and_then(|p| rows.get(p)) {
                    self.selected = Some(row.id.clone());
                }
            }
            if i.key_pressed(egui::Key::Enter) && activated.is_none() {
                activated = self.selected.clone();
            }
        });

        if refresh_clicked {
            self.refresh();
        }
        if add_clicked {
            self.open_creator();
        } else if let Some(name) = activated {
            self.open_editor(&name);
        }
    }

    fn show_issue_table(
        &self,
        ui: &mut egui::Ui,
        new_selected: &mut Option<String>,
        activated: &mut Option<String>,
    ) {
        let rows = self.list.rows();

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(100.0).resizable(true)) // id
            .column(Column::remainder().resizable(true)) // title
            .header(25.0, |mut header| {
                header.col(|ui| {
                    ui.strong("id");
                });
                header.col(|ui| {
                    ui.strong("title");
                });
            })
            .body(|body| {
                body.rows(20.0, rows.len(), |mut row| {
                    let Some(item) = rows.get(row.index()) else {
                        return;
                    };
                    row.set_selected(self.selected.as_deref() == Some(item.id.as_str()));

                    for text in [&item.id, &item.title] {
                        row.col(|ui| {
                            let response = clickable_cell(ui, text);
                            if response.clicked() {
                                *new_selected = Some(item.id.clone());
                            }
                            if response.double_clicked() {
                                *activated = Some(item.id.clone());
                            }
                        });
                    }
                });
            });
    }

    fn show_modal(&mut self, ctx: &egui::Context) {
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        let project = &self.session.project;

        let resolution = match self.modal.as_mut() {
            None => None,
            Some(Modal::Editor { target, kind, form }) => {
                show_editor_window(ctx, project, target.as_deref(), *kind, form, escape).map(
                    |exit| Resolution::Editor {
                        target: target.clone(),
                        kind: *kind,
                        exit,
                    },
                )
            }
            Some(Modal::Chooser { target, chooser }) => {
                show_chooser_window(ctx, target, chooser, escape).map(|outcome| {
                    Resolution::Chooser {
                        target: target.clone(),
                        outcome,
                    }
                })
            }
        };

        match resolution {
            None => {}
            Some(Resolution::Editor { target, kind, exit }) => self.finish_editor(target, kind, exit),
            Some(Resolution::Chooser { target, outcome }) => {
                self.modal = None;
                let mut dialogs = RecordedDialogs::close(outcome);
                let result = workflow::close_issue(&mut self.session, &mut dialogs, &target);
                self.after_flow(result);
            }
        }
    }

    fn finish_editor(&mut self, target: Option<String>, kind: EditorKind, exit: EditorExit) {
        match target {
            Some(name) if exit.clone().resolve(kind) == EditorOutcome::RequestClose => {
                // The close needs a disposition first; the editor is done either way.
                self.modal = Some(Modal::Chooser {
                    target: name,
                    chooser: DispositionChooser::default(),
                });
            }
            Some(name) => {
                self.modal = None;
                let mut dialogs = RecordedDialogs::editor(exit);
                let result =
                    workflow::edit_issue(&mut self.session, &mut dialogs, &name, kind.dismissal());
                self.after_flow(result);
            }
            None => {
                self.modal = None;
                let mut dialogs = RecordedDialogs::editor(exit);
                let result = workflow::create_issue(&mut self.session, &mut dialogs);
                self.after_flow(result);
            }
        }
    }

    fn after_flow(&mut self, result: Result<FlowOutcome>) {
        match result {
            Ok(outcome) => {
                self.error_message = None;
                if outcome.mutated() {
                    self.status_message = Some(match outcome {
                        FlowOutcome::Updated(name) => format!("Updated {name}"),
                        FlowOutcome::Closed { name, disposition } => {
                            format!("Closed {name} ({})", disposition.label())
                        }
                        FlowOutcome::Created(name) => format!("Added {name}"),
                        FlowOutcome::Unchanged => String::new(),
                    });
                    self.refresh();
                }
            }
            Err(e) => {
                self.error_message = Some(format!("Error: {e}"));
                self.refresh();
            }
        }
    }
}

/// A table cell that reacts to clicks across its whole area.
fn clickable_cell(ui: &mut egui::Ui, text: &str) -> egui::Response {
    let available_size = ui.available_size();
    let (id, rect) = ui.allocate_space(available_size);
    let response = ui.interact(rect, id, egui::Sense::click());

    let mut child_ui = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(rect)
            .layout(egui::Layout::left_to_right(egui::Align::Center)),
    );
    child_ui.add(egui::Label::new(text).selectable(false));
    response
}

fn show_editor_window(
    ctx: &egui::Context,
    project: &Project,
    target: Option<&str>,
    kind: EditorKind,
    form: &mut EditorForm,
    escape: bool,
) -> Option<EditorExit> {
    let mut open = true;
    let mut exit = None;

    egui::Window::new(format!("ditzui - {}", target.unwrap_or("new issue")))
        .id(egui::Id::new("issue_editor"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .min_width(420.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("editor_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Component:");
                    egui::ComboBox::from_id_salt("component_combo")
                        .selected_text(&form.component)
                        .show_ui(ui, |ui| {
                            for component in project.components() {
                                ui.selectable_value(
                                    &mut form.component,
                                    component.name.clone(),
                                    &component.name,
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Type:");
                    egui::ComboBox::from_id_salt("type_combo")
                        .selected_text(form.issue_type.as_str())
                        .show_ui(ui, |ui| {
                            for issue_type in IssueType::ALL {
                                ui.selectable_value(&mut form.issue_type, issue_type, issue_type.as_str());
                            }
                        });
                    ui.end_row();

                    ui.label("Title:");
                    ui.add(egui::TextEdit::singleline(&mut form.title).desired_width(300.0));
                    ui.end_row();
                });

            ui.label("Description:");
            egui::ScrollArea::vertical()
                .id_salt("desc_scroll")
                .max_height(200.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut form.desc)
                            .desired_width(f32::INFINITY)
                            .desired_rows(6),
                    );
                });

            ui.separator();
            ui.horizontal(|ui| {
                if kind.can_close() {
                    if ui.button("Update Issue").clicked() {
                        exit = Some(EditorExit::Chose(EditorOutcome::Commit(form.clone())));
                    }
                    if ui.button("Close Issue").clicked() {
                        exit = Some(EditorExit::Chose(EditorOutcome::RequestClose));
                    }
                } else if ui.button("Add").clicked() {
                    exit = Some(EditorExit::Chose(EditorOutcome::Commit(form.clone())));
                }
                if ui.button("Cancel").clicked() {
                    exit = Some(EditorExit::Chose(EditorOutcome::Cancel));
                }
            });
        });

    if exit.is_none() && (!open || escape) {
        exit = Some(EditorExit::Dismissed);
    }
    exit
}

fn show_chooser_window(
    ctx: &egui::Context,
    target: &str,
    chooser: &mut DispositionChooser,
    escape: bool,
) -> Option<ChooserOutcome> {
    let mut open = true;
    let mut outcome = None;

    egui::Window::new(format!("ditzui - close {target}"))
        .id(egui::Id::new("disposition_chooser"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Disposition:");
            let current = DispositionChooser::labels()
                .nth(chooser.selected)
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("disposition_combo")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for (index, label) in DispositionChooser::labels().enumerate() {
                        ui.selectable_value(&mut chooser.selected, index, label);
                    }
                });

            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    outcome = Some(chooser.confirm());
                }
                if ui.button("Cancel").clicked() {
                    outcome = Some(ChooserOutcome::Cancel);
                }
            });
        });

    if outcome.is_none() && (!open || escape) {
        outcome = Some(ChooserOutcome::Cancel);
    }
    outcome
}

impl eframe::App for DitzUiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_list_view(ctx);
        self.show_modal(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.modal = None;
        match self.session.save_if_changed() {
            Ok(true) => tracing::info!("saved pending changes on exit"),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("final save failed: {}", e);
                eprintln!("error: {}", e);
            }
        }
    }
}
