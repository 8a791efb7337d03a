use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;

use crate::config::LoaderConfig;
use crate::state::{AppState, Panel};
use crate::ui::{dialogs, outline, panels, plan};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DeformLoaderApp {
    pub state: AppState,
}

impl DeformLoaderApp {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Only the first dropped directory is used; plain files are ignored.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }

        match dropped.into_iter().find(|p| p.is_dir()) {
            Some(root) => {
                log::info!("Folder dropped: {}", root.display());
                self.state.submit_folder(root);
            }
            None => log::warn!("Dropped items contain no folder"),
        }
    }
}

impl eframe::App for DeformLoaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let modal_open =
            self.state.notifications.error.is_some() || self.state.group_dialog.is_some();
        if !modal_open {
            self.handle_dropped_files(ctx);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: inputs and drop zone ----
        egui::SidePanel::left("loader_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!modal_open, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
            });

        // ---- Central panel: plan preview or scene outline ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.panel {
            Panel::Loader => plan::plan_view(ui, &mut self.state),
            Panel::Data => outline::scene_outline(ui, &mut self.state),
        });

        dialogs::group_dialog(ctx, &mut self.state);
        dialogs::error_dialog(ctx, &mut self.state);

        // Repaint once the status line is due to disappear.
        if let Some(deadline) = self.state.notifications.status_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}
