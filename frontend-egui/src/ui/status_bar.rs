//! Status bar component showing process counts and the last action result.

use crate::session::Session;
use crate::ui::process_table::human_size;
use eframe::egui;

pub struct StatusBar;

impl StatusBar {
    pub fn show(ui: &mut egui::Ui, session: &Session, filtered_count: usize) {
        let processes = &session.snapshot;

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!("Total processes: {}", processes.len()));

            if filtered_count != processes.len() {
                ui.separator();
                ui.label(format!("Filtered: {}", filtered_count));
            }

            ui.separator();
            ui.label(format!("Selected: {}", session.selection.len()));

            ui.separator();
            let total_memory: u64 = processes.iter().map(|p| p.memory_bytes).sum();
            ui.label(format!("Total memory: {}", human_size(total_memory)));

            ui.separator();
            let stopped = processes.iter().filter(|p| p.state == "T").count();
            ui.label(format!("Suspended: {}", stopped));

            if let Some((_, ok, fail)) = session.last_result {
                ui.separator();
                let color = if fail > 0 {
                    egui::Color32::from_rgb(230, 160, 40)
                } else {
                    egui::Color32::from_rgb(90, 200, 90)
                };
                ui.label(egui::RichText::new(format!("OK={} FAIL={}", ok, fail)).color(color));
            }

            if !session.suspend_available() {
                ui.separator();
                ui.label("Suspend/resume unavailable");
            }
        });

        ui.horizontal(|ui| {
            ui.label(session.status.as_str());
        });
    }
}
