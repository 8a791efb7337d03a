use std::path::{Path, PathBuf};
use std::time::Instant;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};

use crate::data::model::ArtifactKind;
use crate::state::{AppState, Panel};

// ---------------------------------------------------------------------------
// Left side panel – loader inputs and drop zone
// ---------------------------------------------------------------------------

/// Render the loader controls.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Deform Loader");
    ui.separator();

    ui.strong("Data directory:");
    ui.horizontal(|ui: &mut Ui| {
        let browse = ui.button("…").on_hover_text("Browse for the original data directory");
        ui.add(
            egui::TextEdit::singleline(&mut state.config.data_dir)
                .hint_text("/data/LungCT_preprocessed")
                .desired_width(f32::INFINITY),
        );
        if browse.clicked() {
            if let Some(dir) = pick_folder("Original data directory") {
                state.config.data_dir = dir.display().to_string();
            }
        }
    });
    ui.add_space(6.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Indices:");
        ui.add(
            egui::TextEdit::singleline(&mut state.config.indices_text)
                .hint_text("all")
                .desired_width(f32::INFINITY),
        )
        .on_hover_text("Enter comma-separated indices (e.g., 0,3,4).\nEmpty input means all");
    });
    ui.add_space(6.0);

    ui.checkbox(&mut state.config.find_originals, "Load original images")
        .on_hover_text("Look up <moving> and <fixed> images in the data directory");
    ui.checkbox(&mut state.config.confirm_group_count, "Ask how many groups to load");
    ui.checkbox(
        &mut state.config.collapse_segmentations,
        "Collapse segmentations after loading",
    );
    ui.separator();

    if drop_zone(ui).clicked() {
        if let Some(dir) = pick_folder("Open results folder") {
            state.submit_folder(dir);
        }
    }

    ui.add_space(8.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.config.root_path)
                .hint_text("Results folder")
                .desired_width(ui.available_width() - 50.0),
        );
        let can_load = !state.config.root_path.trim().is_empty();
        if ui.add_enabled(can_load, egui::Button::new("Load")).clicked() {
            let root = PathBuf::from(state.config.root_path.trim());
            state.submit_folder(root);
        }
    });
}

/// Dashed-frame target highlighted while files hover over the window.
fn drop_zone(ui: &mut Ui) -> egui::Response {
    let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    let (fill, stroke) = if hovering {
        (
            Color32::from_rgb(0xEE, 0xEE, 0xFF),
            Stroke::new(2.0, Color32::from_rgb(0x44, 0x44, 0xAA)),
        )
    } else {
        (Color32::TRANSPARENT, Stroke::new(2.0, Color32::from_gray(0x99)))
    };

    egui::Frame::group(ui.style())
        .fill(fill)
        .stroke(stroke)
        .inner_margin(16.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_min_width(ui.available_width());
            ui.set_min_height(100.0);
            ui.vertical_centered(|ui: &mut Ui| {
                ui.add_space(30.0);
                let text = RichText::new("Drop folder here").size(16.0);
                ui.label(if hovering { text.color(Color32::from_rgb(0x44, 0x44, 0xAA)) } else { text });
            });
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_text("Drop or click to pick a folder with deformations/ and deformed/")
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                ui.close_menu();
                if let Some(dir) = pick_folder("Open results folder") {
                    state.submit_folder(dir);
                }
            }
            if ui.button("Export load plan…").clicked() {
                ui.close_menu();
                export_plan_dialog(state);
            }
            if ui.button("Clear scene").clicked() {
                ui.close_menu();
                state.clear_scene();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.panel, Panel::Loader, "Loader");
        ui.selectable_value(&mut state.panel, Panel::Data, "Data");

        ui.separator();

        ui.label(format!(
            "{} transforms, {} volumes, {} segmentations in {} groups",
            state.scene.count(ArtifactKind::Transform),
            state.scene.count(ArtifactKind::Volume),
            state.scene.count(ArtifactKind::Segmentation),
            state.scene.folders().len()
        ));

        if let Some(msg) = state.notifications.status_text(Instant::now()) {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_folder(title: &str) -> Option<PathBuf> {
    rfd::FileDialog::new().set_title(title).pick_folder()
}

/// Ask for a results folder (defaulting to the current one) and a CSV target.
pub fn export_plan_dialog(state: &mut AppState) {
    let current = state.config.root_path.trim().to_string();
    let root = if current.is_empty() || !Path::new(&current).is_dir() {
        match pick_folder("Folder to plan") {
            Some(dir) => dir,
            None => return,
        }
    } else {
        PathBuf::from(current)
    };

    let target = rfd::FileDialog::new()
        .set_title("Export load plan")
        .add_filter("CSV", &["csv"])
        .set_file_name("load_plan.csv")
        .save_file();

    if let Some(target) = target {
        state.export_plan(&root, &target);
    }
}
