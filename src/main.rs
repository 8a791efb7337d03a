mod app;
mod color;
mod config;
mod data;
mod scene;
mod state;
mod ui;

use app::DeformLoaderApp;
use config::LoaderConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match LoaderConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e:#}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Deform Loader",
        options,
        Box::new(|_cc| Ok(Box::new(DeformLoaderApp::new(config)))),
    )
}
