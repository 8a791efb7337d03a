use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::kind_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Load plan preview (central panel, Loader view)
// ---------------------------------------------------------------------------

/// Render the plan preview for the current root path.
pub fn plan_view(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        let can_preview = !state.config.root_path.trim().is_empty();
        if ui
            .add_enabled(can_preview, egui::Button::new("Preview load plan"))
            .clicked()
        {
            state.preview_plan();
        }
        if let Some(plan) = &state.plan_preview {
            ui.label(format!(
                "{} of {} groups, {} files",
                plan.selected.len(),
                plan.total_groups,
                plan.len()
            ));
        }
    });
    ui.separator();

    let Some(plan) = &state.plan_preview else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Drop a folder with deformations/ and deformed/ to load it");
        });
        return;
    };
    if plan.is_empty() {
        ui.label("No files match the current selection.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Group");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Kind");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Path");
            });
        })
        .body(|body| {
            body.rows(18.0, plan.instructions.len(), |mut row| {
                let instruction = &plan.instructions[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(instruction.group.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(
                        RichText::new(instruction.kind.to_string()).color(kind_color(instruction.kind)),
                    );
                });
                row.col(|ui: &mut Ui| {
                    ui.label(instruction.path.display().to_string());
                });
            });
        });
}
