use eframe::egui::{self, Align2, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Modal windows
// ---------------------------------------------------------------------------

/// Error dialog; stays open until dismissed.
pub fn error_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.notifications.error.clone() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(message);
            ui.add_space(8.0);
            ui.vertical_centered(|ui: &mut Ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

    if dismissed {
        state.notifications.error = None;
    }
}

/// "Select Groups to Load" dialog with a group-count slider.
pub fn group_dialog(ctx: &egui::Context, state: &mut AppState) {
    let mut accepted = false;
    let mut rejected = false;

    let Some(dialog) = state.group_dialog.as_mut() else {
        return;
    };

    egui::Window::new("Select Groups to Load")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(dialog.summary());
            ui.add_space(6.0);
            ui.label(dialog.label());
            ui.add(egui::Slider::new(&mut dialog.count, 1..=dialog.available.max(1)).show_value(false));
            ui.add_space(6.0);
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("OK").clicked() {
                    accepted = true;
                }
                if ui.button("Cancel").clicked() {
                    rejected = true;
                }
            });
        });

    if accepted {
        state.confirm_group_dialog();
    } else if rejected {
        state.cancel_group_dialog();
    }
}
