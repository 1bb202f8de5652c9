//! Process table component with sorting, multi-select and a per-row
//! action menu.

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use procmon::{ActionKind, ProcessRecord};
use std::collections::BTreeSet;

#[derive(Default, PartialEq, Eq, Clone, Copy, Debug)]
pub enum SortColumn {
    Pid,
    Ppid,
    Name,
    #[default]
    Memory,
    State,
    Path,
}

pub struct ProcessTable {
    pub sort_column: SortColumn,
    pub sort_descending: bool,
    pub show_pid: bool,
    pub show_ppid: bool,
    pub show_path: bool,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self {
            sort_column: SortColumn::Memory,
            sort_descending: true,
            show_pid: true,
            show_ppid: true,
            show_path: true,
        }
    }
}

/// Outcome of drawing the table for one frame.
pub struct TableEvents {
    /// Action requested from a row's context menu.
    pub row_action: Option<(ActionKind, i32)>,
}

impl ProcessTable {
    pub fn sort(&self, rows: &mut [ProcessRecord]) {
        rows.sort_by(|a, b| {
            let ord = match self.sort_column {
                SortColumn::Pid => a.pid.cmp(&b.pid),
                SortColumn::Ppid => a.ppid.cmp(&b.ppid),
                SortColumn::Name => a.name.cmp(&b.name),
                SortColumn::Memory => a.memory_bytes.cmp(&b.memory_bytes),
                SortColumn::State => a.state.cmp(&b.state),
                SortColumn::Path => a.path.cmp(&b.path),
            };
            let ord = if self.sort_descending {
                ord.reverse()
            } else {
                ord
            };
            // Ties always by name ascending, then pid.
            ord.then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.pid.cmp(&b.pid))
        });
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        mut rows: Vec<ProcessRecord>,
        selection: &mut BTreeSet<i32>,
        actions_enabled: bool,
    ) -> TableEvents {
        self.sort(&mut rows);

        let text_sz = 15.0;
        let row_height = 26.0;
        let mut row_action = None;

        let mut table_builder = TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(28.0)); // selection
        if self.show_pid {
            table_builder = table_builder.column(Column::exact(80.0));
        }
        if self.show_ppid {
            table_builder = table_builder.column(Column::exact(80.0));
        }
        table_builder = table_builder
            .column(Column::exact(110.0)) // Memory
            .column(Column::initial(220.0).at_least(120.0)) // Name
            .column(Column::exact(60.0)); // State
        if self.show_path {
            table_builder = table_builder.column(Column::remainder());
        }

        table_builder
            .header(row_height, |mut header| {
                header.col(|_ui| {});
                if self.show_pid {
                    header.col(|ui| self.sort_header(ui, "PID", SortColumn::Pid));
                }
                if self.show_ppid {
                    header.col(|ui| self.sort_header(ui, "PPID", SortColumn::Ppid));
                }
                header.col(|ui| self.sort_header(ui, "Memory", SortColumn::Memory));
                header.col(|ui| self.sort_header(ui, "Name", SortColumn::Name));
                header.col(|ui| self.sort_header(ui, "State", SortColumn::State));
                if self.show_path {
                    header.col(|ui| self.sort_header(ui, "Path", SortColumn::Path));
                }
            })
            .body(|body| {
                body.rows(row_height, rows.len(), |mut row| {
                    let p = &rows[row.index()];

                    row.col(|ui| {
                        let mut checked = selection.contains(&p.pid);
                        if ui.checkbox(&mut checked, "").changed() {
                            toggle_selected(selection, p.pid);
                        }
                    });

                    let mut cell = |ui: &mut egui::Ui, text: String, monospace: bool| {
                        let mut rich = egui::RichText::new(text).size(text_sz);
                        if monospace {
                            rich = rich.monospace();
                        }
                        let response =
                            ui.add(egui::Label::new(rich).sense(egui::Sense::click()));
                        response.context_menu(|ui| {
                            if let Some(kind) = context_menu(ui, p, actions_enabled) {
                                row_action = Some((kind, p.pid));
                            }
                        });
                    };

                    if self.show_pid {
                        row.col(|ui| cell(ui, p.pid.to_string(), true));
                    }
                    if self.show_ppid {
                        row.col(|ui| cell(ui, p.ppid.to_string(), true));
                    }
                    row.col(|ui| cell(ui, human_size(p.memory_bytes), false));
                    row.col(|ui| cell(ui, p.name.clone(), false));
                    row.col(|ui| cell(ui, p.state.clone(), true));
                    if self.show_path {
                        row.col(|ui| cell(ui, p.path.clone(), false));
                    }
                });
            });

        TableEvents { row_action }
    }

    fn sort_header(&mut self, ui: &mut egui::Ui, title: &str, col: SortColumn) {
        let active = self.sort_column == col;
        let arrow = if !active {
            ""
        } else if self.sort_descending {
            " ↓"
        } else {
            " ↑"
        };
        let btn = egui::Button::new(
            egui::RichText::new(format!("{title}{arrow}"))
                .strong()
                .size(14.0),
        )
        .frame(false);

        if ui.add(btn).clicked() {
            if active {
                self.sort_descending = !self.sort_descending;
            } else {
                self.sort_column = col;
                self.sort_descending = col == SortColumn::Memory;
            }
        }
    }
}

/// Flip `pid` in or out of `selection`.
pub fn toggle_selected(selection: &mut BTreeSet<i32>, pid: i32) {
    if !selection.remove(&pid) {
        selection.insert(pid);
    }
}

fn context_menu(ui: &mut egui::Ui, p: &ProcessRecord, enabled: bool) -> Option<ActionKind> {
    ui.set_min_width(200.0);
    let mut chosen = None;

    let kill = egui::Button::new("Kill Process")
        .fill(egui::Color32::from_rgb(200, 40, 40))
        .min_size(egui::vec2(180.0, 25.0));
    if ui.add_enabled(enabled, kill).clicked() {
        chosen = Some(ActionKind::Terminate);
    }
    if ui.add_enabled(enabled, egui::Button::new("Suspend")).clicked() {
        chosen = Some(ActionKind::Suspend);
    }
    if ui.add_enabled(enabled, egui::Button::new("Resume")).clicked() {
        chosen = Some(ActionKind::Resume);
    }
    if chosen.is_some() {
        ui.close_menu();
    }

    ui.separator();
    ui.label(format!("PID: {}", p.pid));
    ui.label(format!("Name: {}", p.name));
    ui.label(format!("State: {}", p.state));
    ui.label(format!("Parent PID: {}", p.ppid));
    ui.label(format!("Memory: {}", human_size(p.memory_bytes)));
    if !p.path.is_empty() {
        ui.label(format!("Path: {}", p.path));
    }
    chosen
}

/// `512 B`, `1.5 KB`, `3.2 GB`...
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: i32, name: &str, memory_bytes: u64) -> ProcessRecord {
        ProcessRecord {
            pid,
            ppid: 1,
            name: name.to_string(),
            path: String::new(),
            memory_bytes,
            state: "S".to_string(),
            start_time: 0,
        }
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn toggle_selects_then_deselects() {
        let mut selection = BTreeSet::from([3]);
        toggle_selected(&mut selection, 12);
        assert_eq!(selection, BTreeSet::from([3, 12]));
        toggle_selected(&mut selection, 12);
        assert_eq!(selection, BTreeSet::from([3]));
    }

    #[test]
    fn default_order_is_memory_then_name() {
        let table = ProcessTable::default();
        let mut rows = vec![
            record(1, "zsh", 10),
            record(2, "bash", 10),
            record(3, "java", 900),
        ];
        table.sort(&mut rows);
        let pids: Vec<i32> = rows.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![3, 2, 1]);
    }
}
