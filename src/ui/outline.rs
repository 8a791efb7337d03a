use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::kind_color;
use crate::scene::SceneNode;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Scene outline (central panel, Data view)
// ---------------------------------------------------------------------------

/// Render the loaded scene, one collapsible folder per group.
pub fn scene_outline(ui: &mut Ui, state: &mut AppState) {
    if state.scene.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing loaded yet");
        });
        return;
    }

    let mut toggled = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let loose: Vec<&SceneNode> = state.scene.nodes_in(None).collect();
            for node in loose {
                node_row(ui, node, &mut toggled);
            }

            for (index, folder) in state.scene.folders().iter().enumerate() {
                let color = state.folder_colors.color_for(index);
                egui::CollapsingHeader::new(RichText::new(folder.label()).strong().color(color))
                    .id_salt(("folder", index))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        for node in state.scene.nodes_in(Some(index)) {
                            node_row(ui, node, &mut toggled);
                        }
                    });
            }
        });

    for id in toggled {
        if let Some(node) = state.scene.node_mut(id) {
            node.expanded = !node.expanded;
        }
    }
}

/// One node; its `expanded` flag drives the header, clicks are queued in `toggled`.
fn node_row(ui: &mut Ui, node: &SceneNode, toggled: &mut Vec<usize>) {
    let title = RichText::new(format!("{}  [{}]", node.name, node.kind)).color(kind_color(node.kind));
    let response = egui::CollapsingHeader::new(title)
        .id_salt(("node", node.id))
        .open(Some(node.expanded))
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new(("node_details", node.id))
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Path");
                    ui.label(node.path.display().to_string());
                    ui.end_row();
                    ui.label("Size");
                    ui.label(format_size(node.size_bytes));
                    ui.end_row();
                });
        });
    if response.header_response.clicked() {
        toggled.push(node.id);
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
