//! Header component with title, search, action buttons and column menu.

use crate::export::ExportFormat;
use crate::session::Session;
use crate::ui::process_table::ProcessTable;
use eframe::egui;
use procmon::ActionKind;

/// What the user asked for in the header this frame.
#[derive(Default)]
pub struct HeaderEvents {
    pub search_changed: bool,
    pub refresh: bool,
    pub action: Option<ActionKind>,
    pub export: Option<ExportFormat>,
}

pub struct Header;

impl Header {
    pub fn show(
        ui: &mut egui::Ui,
        session: &mut Session,
        process_table: &mut ProcessTable,
    ) -> HeaderEvents {
        let mut events = HeaderEvents::default();
        let idle = !session.is_busy();
        let suspend_available = session.suspend_available();

        ui.horizontal(|ui| {
            ui.heading("ProcMon");

            ui.add_space(20.0);
            ui.label("Search:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut session.filter)
                    .hint_text("Name or path...")
                    .desired_width(220.0),
            );
            if response.changed() {
                events.search_changed = true;
            }

            if !session.filter.is_empty() && ui.button("Clear").clicked() {
                session.filter.clear();
                events.search_changed = true;
            }

            ui.add_space(10.0);
            if ui
                .add_enabled(idle, egui::Button::new("Refresh"))
                .on_hover_text("Take a new process snapshot")
                .clicked()
            {
                events.refresh = true;
            }

            let kill = egui::Button::new("Kill").fill(egui::Color32::from_rgb(200, 40, 40));
            if ui.add_enabled(idle, kill).clicked() {
                events.action = Some(ActionKind::Terminate);
            }

            let suspend = ui
                .add_enabled(idle && suspend_available, egui::Button::new("Suspend"))
                .on_disabled_hover_text("Suspend/resume is unavailable");
            if suspend.clicked() {
                events.action = Some(ActionKind::Suspend);
            }

            let resume = ui
                .add_enabled(idle && suspend_available, egui::Button::new("Resume"))
                .on_disabled_hover_text("Suspend/resume is unavailable");
            if resume.clicked() {
                events.action = Some(ActionKind::Resume);
            }

            ui.checkbox(&mut session.expand_to_subtree, "Tree")
                .on_hover_text("Also act on every descendant of the selected processes");

            if !idle {
                ui.spinner();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("Menu", |ui| {
                    ui.set_min_width(140.0);

                    if ui.button("Export JSON").clicked() {
                        events.export = Some(ExportFormat::Json);
                        ui.close_menu();
                    }
                    if ui.button("Export CSV").clicked() {
                        events.export = Some(ExportFormat::Csv);
                        ui.close_menu();
                    }

                    ui.separator();
                    ui.label("Show columns:");
                    ui.checkbox(&mut process_table.show_pid, "PID");
                    ui.checkbox(&mut process_table.show_ppid, "PPID");
                    ui.checkbox(&mut process_table.show_path, "Path");
                });
            });
        });

        events
    }
}
