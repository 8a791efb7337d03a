use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::color::GroupColors;
use crate::config::{LoaderConfig, MAX_STATUS_SECONDS};
use crate::data::loader::{self, LoadRequest, Messenger};
use crate::data::model::LoadPlan;
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// Notifications – error dialog and transient status line
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Notifications {
    /// Message of the open error dialog, if any.
    pub error: Option<String>,
    status: Option<(String, Instant)>,
}

impl Notifications {
    /// Current status text, dropping it once expired.
    pub fn status_text(&mut self, now: Instant) -> Option<&str> {
        if matches!(&self.status, Some((_, until)) if *until <= now) {
            self.status = None;
        }
        self.status.as_ref().map(|(text, _)| text.as_str())
    }

    /// When the status line should next be cleared.
    pub fn status_deadline(&self) -> Option<Instant> {
        self.status.as_ref().map(|(_, until)| *until)
    }
}

impl Messenger for Notifications {
    fn error_dialog(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn status(&mut self, message: &str, duration: Duration) {
        let now = Instant::now();
        let max = Duration::from_secs_f32(MAX_STATUS_SECONDS);
        let until = now
            .checked_add(duration.min(max))
            .or_else(|| now.checked_add(max))
            .unwrap_or(now);
        self.status = Some((message.to_string(), until));
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Loader,
    Data,
}

/// Pending group-count confirmation for a dropped folder.
#[derive(Debug, Clone)]
pub struct GroupDialog {
    pub root: PathBuf,
    /// Groups found in `deformations`.
    pub total_groups: usize,
    /// Groups selected by the indices field.
    pub available: usize,
    /// Slider value, `1..=available`.
    pub count: usize,
}

impl GroupDialog {
    /// Header text: groups found, and how many the indices selected.
    pub fn summary(&self) -> String {
        let found = if self.available == self.total_groups {
            format!("Found {} groups.", self.total_groups)
        } else {
            format!(
                "Found {} groups, {} selected by indices.",
                self.total_groups, self.available
            )
        };
        format!("{found}\nEach group contains:\n- 1 deformation field\n- 1 volume\n- 1 segmentation")
    }

    pub fn label(&self) -> String {
        format!(
            "Loading: {} group{}",
            self.count,
            if self.count > 1 { "s" } else { "" }
        )
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Current field values; read at submit time.
    pub config: LoaderConfig,
    pub scene: Scene,
    pub notifications: Notifications,
    pub panel: Panel,
    pub group_dialog: Option<GroupDialog>,
    /// Colour per scene folder, rebuilt after each load.
    pub folder_colors: GroupColors,
    /// Plan computed by "Preview" without loading anything.
    pub plan_preview: Option<LoadPlan>,
}

impl AppState {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            scene: Scene::default(),
            notifications: Notifications::default(),
            panel: Panel::default(),
            group_dialog: None,
            folder_colors: GroupColors::default(),
            plan_preview: None,
        }
    }

    fn request(&self, root: &Path) -> LoadRequest {
        LoadRequest::from_config(root, &self.config)
    }

    /// Entry point for a dropped or picked folder.
    ///
    /// Either loads straight away or opens the group-count dialog.
    pub fn submit_folder(&mut self, root: PathBuf) {
        self.config.root_path = root.display().to_string();

        if !self.config.confirm_group_count {
            self.load(&root, None);
            return;
        }

        match loader::preview(&self.request(&root)) {
            Ok(preview) if preview.selected.is_empty() => {
                self.notifications.status(
                    &format!("No groups to load in {}", root.display()),
                    self.config.status_duration(),
                );
            }
            Ok(preview) => {
                log::debug!(
                    "Found {} groups, {} selected",
                    preview.total_groups,
                    preview.selected.len()
                );
                self.group_dialog = Some(GroupDialog {
                    root,
                    total_groups: preview.total_groups,
                    available: preview.selected.len(),
                    count: 1,
                });
            }
            Err(e) => {
                log::error!("Error loading data from {}: {e}", root.display());
                self.notifications.error_dialog(&e.to_string());
            }
        }
    }

    /// Group dialog accepted.
    pub fn confirm_group_dialog(&mut self) {
        if let Some(dialog) = self.group_dialog.take() {
            self.load(&dialog.root, Some(dialog.count));
        }
    }

    pub fn cancel_group_dialog(&mut self) {
        if let Some(dialog) = self.group_dialog.take() {
            log::info!("Load of {} cancelled", dialog.root.display());
        }
    }

    fn load(&mut self, root: &Path, limit: Option<usize>) {
        let request = match limit {
            Some(n) => self.request(root).with_limit(n),
            None => self.request(root),
        };

        let duration = self.config.status_duration();
        let report = loader::run_load(&request, &mut self.scene, &mut self.notifications, duration);
        self.folder_colors = GroupColors::new(0..self.scene.folders().len());

        if report.is_some() {
            self.panel = Panel::Data;
        }
    }

    /// Compute the plan for the root path field without loading it.
    pub fn preview_plan(&mut self) {
        let root = PathBuf::from(self.config.root_path.trim());
        match loader::plan_load(&self.request(&root)) {
            Ok(plan) => {
                log::debug!("Previewed {} instructions for {}", plan.len(), root.display());
                self.plan_preview = Some(plan);
            }
            Err(e) => {
                log::error!("Error planning {}: {e}", root.display());
                self.plan_preview = None;
                self.notifications.error_dialog(&e.to_string());
            }
        }
    }

    /// Write the plan for `root` to a CSV file.
    pub fn export_plan(&mut self, root: &Path, target: &Path) {
        let result = loader::plan_load(&self.request(root))
            .map_err(anyhow::Error::from)
            .and_then(|plan| {
                let file = std::fs::File::create(target)?;
                loader::write_plan_csv(&plan, file)?;
                Ok(plan.len())
            });

        match result {
            Ok(n) => {
                log::info!("Wrote {n} load instructions to {}", target.display());
                self.notifications.status(
                    &format!("Exported {n} instructions to {}", target.display()),
                    self.config.status_duration(),
                );
            }
            Err(e) => {
                log::error!("Failed to export load plan: {e:#}");
                self.notifications.error_dialog(&format!("Error: {e:#}"));
            }
        }
    }

    pub fn clear_scene(&mut self) {
        self.scene.clear();
        self.folder_colors = GroupColors::default();
    }
}
