use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use super::error::LoadError;
use super::matcher::{build_load_plan, enumerate_groups};
use super::model::{ArtifactKind, LoadInstruction, LoadPlan};
use super::originals::OriginalsSearch;
use super::selection::{limit_selection, resolve_selection};
use crate::config::LoaderConfig;

// ---------------------------------------------------------------------------
// Host boundary
// ---------------------------------------------------------------------------

/// Identifier the host hands back for a loaded node.
pub type NodeId = usize;

/// Scene operations the loader drives. Each load either adds a node or
/// reports its own error.
pub trait SceneHost {
    fn load_transform(&mut self, path: &Path) -> Result<NodeId>;
    fn load_volume(&mut self, path: &Path) -> Result<NodeId>;
    fn load_segmentation(&mut self, path: &Path) -> Result<NodeId>;
    /// Called before the first artifact of each group; later nodes belong to it.
    fn begin_group(&mut self, _root: &Path, _group: usize) {}
    /// Collapse every segmentation item in the scene outline.
    fn collapse_segmentations(&mut self);
}

/// User-facing notifications.
pub trait Messenger {
    /// Blocking error dialog.
    fn error_dialog(&mut self, message: &str);
    /// Transient status line, cleared after `duration`.
    fn status(&mut self, message: &str, duration: Duration);
}

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

/// Everything one load needs, resolved from the GUI at submit time.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub root: PathBuf,
    pub indices_text: String,
    pub extensions: Vec<String>,
    pub originals: Option<OriginalsSearch>,
    pub collapse_segmentations: bool,
    /// Load only the first `n` selected groups.
    pub limit: Option<usize>,
}

impl LoadRequest {
    pub fn from_config(root: impl Into<PathBuf>, config: &LoaderConfig) -> Self {
        let originals = if config.find_originals {
            OriginalsSearch::new(&config.data_dir)
        } else {
            None
        };
        Self {
            root: root.into(),
            indices_text: config.indices_text.clone(),
            extensions: config.extensions.clone(),
            originals,
            collapse_segmentations: config.collapse_segmentations,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub total_groups: usize,
    pub groups_loaded: usize,
    pub instructions_executed: usize,
}

/// Groups found and selected, before anything is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPreview {
    pub total_groups: usize,
    pub selected: BTreeSet<usize>,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Enumerate and resolve the selection without touching `deformed`.
pub fn preview(request: &LoadRequest) -> Result<SelectionPreview, LoadError> {
    let files = enumerate_groups(&request.root, &request.extensions)?;
    let selected = resolve_selection(files.len(), &request.indices_text)?;
    Ok(SelectionPreview {
        total_groups: files.len(),
        selected: limit_selection(&selected, request.limit),
    })
}

/// Build the full load plan for a request.
pub fn plan_load(request: &LoadRequest) -> Result<LoadPlan, LoadError> {
    let files = enumerate_groups(&request.root, &request.extensions)?;
    let selected = resolve_selection(files.len(), &request.indices_text)?;
    let selected = limit_selection(&selected, request.limit);
    log::debug!(
        "Selected groups {:?} of {} in {}",
        selected,
        files.len(),
        request.root.display()
    );

    let instructions = build_load_plan(
        &request.root,
        &files,
        &selected,
        &request.extensions,
        request.originals.as_ref(),
    );

    Ok(LoadPlan {
        root: request.root.clone(),
        total_groups: files.len(),
        selected,
        instructions,
    })
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run every instruction in order and return how many ran.
///
/// Stops at the first failure. Instructions that already ran stay in the
/// scene.
pub fn execute_plan(plan: &LoadPlan, host: &mut impl SceneHost) -> Result<usize, LoadError> {
    let mut current_group = None;
    for (executed, instruction) in plan.instructions.iter().enumerate() {
        if current_group != Some(instruction.group) {
            current_group = Some(instruction.group);
            host.begin_group(&plan.root, instruction.group);
        }
        execute_one(instruction, host).map_err(|e| LoadError::unexpected(executed, e))?;
    }
    Ok(plan.len())
}

fn execute_one(instruction: &LoadInstruction, host: &mut impl SceneHost) -> Result<NodeId> {
    let path = instruction.path.as_path();
    let loaded = match instruction.kind {
        ArtifactKind::Transform => {
            log::info!("Loading displacement field: {}", path.display());
            host.load_transform(path)
        }
        ArtifactKind::Volume => {
            log::info!("Loading volume: {}", path.display());
            host.load_volume(path)
        }
        ArtifactKind::Segmentation => {
            log::info!("Loading segmentation: {}", path.display());
            host.load_segmentation(path)
        }
    };
    loaded.with_context(|| format!("loading {} {}", instruction.kind, path.display()))
}

/// Plan and execute one load, then tidy the outline.
pub fn load_from_folder(
    request: &LoadRequest,
    host: &mut impl SceneHost,
) -> Result<LoadReport, LoadError> {
    let plan = plan_load(request)?;
    let executed = execute_plan(&plan, host)?;

    if request.collapse_segmentations {
        host.collapse_segmentations();
    }

    Ok(LoadReport {
        total_groups: plan.total_groups,
        groups_loaded: plan.selected.len(),
        instructions_executed: executed,
    })
}

/// Top-level entry point for GUI events: every error is logged and shown,
/// never propagated.
pub fn run_load(
    request: &LoadRequest,
    host: &mut impl SceneHost,
    messenger: &mut impl Messenger,
    status_duration: Duration,
) -> Option<LoadReport> {
    match load_from_folder(request, host) {
        Ok(report) => {
            log::info!(
                "Loaded {} items from {} of {} groups in {}",
                report.instructions_executed,
                report.groups_loaded,
                report.total_groups,
                request.root.display()
            );
            messenger.status(
                &format!(
                    "Loaded {} of {} groups ({} items)",
                    report.groups_loaded, report.total_groups, report.instructions_executed
                ),
                status_duration,
            );
            Some(report)
        }
        Err(e) => {
            log::error!("Error loading data from {}: {e}", request.root.display());
            if let LoadError::UnexpectedLoadError { executed, .. } = &e {
                log::warn!("{executed} items loaded before the failure remain in the scene");
            }
            messenger.error_dialog(&e.to_string());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write a plan as CSV with a `group,kind,path` header.
pub fn write_plan_csv(plan: &LoadPlan, writer: impl Write) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for instruction in &plan.instructions {
        csv.serialize(instruction)
            .with_context(|| format!("writing {}", instruction.path.display()))?;
    }
    csv.flush().context("flushing CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::bail;

    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        loaded: Vec<(ArtifactKind, PathBuf)>,
        fail_on: Option<PathBuf>,
        collapsed: bool,
    }

    impl RecordingHost {
        fn record(&mut self, kind: ArtifactKind, path: &Path) -> Result<NodeId> {
            if self.fail_on.as_deref() == Some(path) {
                bail!("cannot read {}", path.display());
            }
            self.loaded.push((kind, path.to_path_buf()));
            Ok(self.loaded.len() - 1)
        }
    }

    impl SceneHost for RecordingHost {
        fn load_transform(&mut self, path: &Path) -> Result<NodeId> {
            self.record(ArtifactKind::Transform, path)
        }
        fn load_volume(&mut self, path: &Path) -> Result<NodeId> {
            self.record(ArtifactKind::Volume, path)
        }
        fn load_segmentation(&mut self, path: &Path) -> Result<NodeId> {
            self.record(ArtifactKind::Segmentation, path)
        }
        fn collapse_segmentations(&mut self) {
            self.collapsed = true;
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        errors: Vec<String>,
        statuses: Vec<(String, Duration)>,
    }

    impl Messenger for RecordingMessenger {
        fn error_dialog(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
        fn status(&mut self, message: &str, duration: Duration) {
            self.statuses.push((message.to_string(), duration));
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for case in ["a", "b", "c"] {
            touch(&root.join(format!("deformations/{case}_deformation_x.nii.gz")));
            touch(&root.join(format!("deformed/{case}_deformed_x.nii.gz")));
        }
        touch(&root.join("deformed/b_deformed_x_seg.nii.gz"));
        dir
    }

    fn request(root: &Path, indices: &str) -> LoadRequest {
        let config = LoaderConfig {
            indices_text: indices.to_string(),
            ..LoaderConfig::default()
        };
        LoadRequest::from_config(root, &config)
    }

    #[test]
    fn loads_selected_groups_in_order() {
        let dir = fixture();
        let root = dir.path();
        let mut host = RecordingHost::default();

        let report = load_from_folder(&request(root, "2, 1"), &mut host).unwrap();

        assert_eq!(
            report,
            LoadReport {
                total_groups: 3,
                groups_loaded: 2,
                instructions_executed: 5
            }
        );
        let kinds: Vec<_> = host.loaded.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            [
                ArtifactKind::Transform,
                ArtifactKind::Volume,
                ArtifactKind::Segmentation,
                ArtifactKind::Transform,
                ArtifactKind::Volume,
            ]
        );
        assert_eq!(host.loaded[0].1, root.join("deformations/b_deformation_x.nii.gz"));
        assert!(host.collapsed);
    }

    #[test]
    fn limit_caps_the_number_of_groups() {
        let dir = fixture();
        let plan = plan_load(&request(dir.path(), "").with_limit(1)).unwrap();
        assert_eq!(plan.total_groups, 3);
        assert_eq!(plan.selected, BTreeSet::from([0]));
        assert_eq!(plan.len(), 2);

        let preview = preview(&request(dir.path(), "0,2").with_limit(5)).unwrap();
        assert_eq!(preview.selected, BTreeSet::from([0, 2]));
    }

    #[test]
    fn execution_stops_at_first_failure() {
        let dir = fixture();
        let root = dir.path();
        let mut host = RecordingHost {
            fail_on: Some(root.join("deformed/b_deformed_x.nii.gz")),
            ..RecordingHost::default()
        };

        let plan = plan_load(&request(root, "")).unwrap();
        let err = execute_plan(&plan, &mut host).unwrap_err();

        match err {
            LoadError::UnexpectedLoadError { executed, .. } => assert_eq!(executed, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(host.loaded.len(), 3);
    }

    #[test]
    fn run_load_reports_errors_through_messenger() {
        let dir = fixture();
        let mut host = RecordingHost::default();
        let mut messenger = RecordingMessenger::default();

        let report = run_load(
            &request(dir.path(), "0, abc"),
            &mut host,
            &mut messenger,
            Duration::from_secs(3),
        );

        assert!(report.is_none());
        assert!(host.loaded.is_empty());
        assert_eq!(messenger.errors.len(), 1);
        assert!(messenger.errors[0].starts_with("Invalid indices format"));
        assert!(messenger.statuses.is_empty());
    }

    #[test]
    fn run_load_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = RecordingHost::default();
        let mut messenger = RecordingMessenger::default();

        let report = run_load(
            &request(dir.path(), ""),
            &mut host,
            &mut messenger,
            Duration::from_secs(3),
        );

        assert!(report.is_none());
        assert!(messenger.errors[0].contains("Deformations directory not found"));
        assert!(!host.collapsed);
    }

    #[test]
    fn run_load_shows_status_on_success() {
        let dir = fixture();
        let mut host = RecordingHost::default();
        let mut messenger = RecordingMessenger::default();

        let report = run_load(
            &request(dir.path(), ""),
            &mut host,
            &mut messenger,
            Duration::from_secs(3),
        );

        assert_eq!(report.map(|r| r.instructions_executed), Some(7));
        assert!(messenger.errors.is_empty());
        assert_eq!(
            messenger.statuses,
            [("Loaded 3 of 3 groups (7 items)".to_string(), Duration::from_secs(3))]
        );
    }

    #[test]
    fn plan_exports_as_csv() {
        let dir = fixture();
        let root = dir.path();
        let plan = plan_load(&request(root, "1")).unwrap();

        let mut buf = Vec::new();
        write_plan_csv(&plan, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "group,kind,path");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("1,transform,"));
        assert!(lines[3].starts_with("1,segmentation,"));
    }

    fn registration_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        touch(&base.join("results/deformations/x_deformation_to_y.nii.gz"));
        touch(&base.join("results/deformed/x_deformed_to_y.nii.gz"));
        touch(&base.join("results/deformed/x_deformed_to_y_seg.nii.gz"));
        touch(&base.join("data/images/x.nii.gz"));
        touch(&base.join("data/images/y.nii.gz"));
        touch(&base.join("data/masks/y.nii.gz"));
        dir
    }

    #[test]
    fn originals_follow_the_group_artifacts() {
        let dir = registration_fixture();
        let base = dir.path();
        let root = base.join("results");
        let data = base.join("data");
        let config = LoaderConfig {
            data_dir: data.display().to_string(),
            find_originals: true,
            ..LoaderConfig::default()
        };

        let plan = plan_load(&LoadRequest::from_config(&root, &config)).unwrap();
        assert_eq!(
            plan.instructions,
            [
                LoadInstruction::new(
                    0,
                    ArtifactKind::Transform,
                    root.join("deformations/x_deformation_to_y.nii.gz")
                ),
                LoadInstruction::new(0, ArtifactKind::Volume, root.join("deformed/x_deformed_to_y.nii.gz")),
                LoadInstruction::new(
                    0,
                    ArtifactKind::Segmentation,
                    root.join("deformed/x_deformed_to_y_seg.nii.gz")
                ),
                LoadInstruction::new(0, ArtifactKind::Volume, data.join("images/x.nii.gz")),
                LoadInstruction::new(0, ArtifactKind::Volume, data.join("images/y.nii.gz")),
                LoadInstruction::new(0, ArtifactKind::Segmentation, data.join("masks/y.nii.gz")),
            ]
        );

        let mut host = RecordingHost::default();
        let report = load_from_folder(&LoadRequest::from_config(&root, &config), &mut host).unwrap();
        assert_eq!(report.instructions_executed, 6);
        assert_eq!(host.loaded[3], (ArtifactKind::Volume, data.join("images/x.nii.gz")));
    }

    #[test]
    fn originals_lookup_can_be_turned_off() {
        let dir = registration_fixture();
        let base = dir.path();
        let root = base.join("results");

        let disabled = LoaderConfig {
            data_dir: base.join("data").display().to_string(),
            find_originals: false,
            ..LoaderConfig::default()
        };
        let request = LoadRequest::from_config(&root, &disabled);
        assert!(request.originals.is_none());
        let plan = plan_load(&request).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.instructions.iter().all(|i| i.path.starts_with(&root)));

        let no_data_dir = LoaderConfig {
            find_originals: true,
            ..LoaderConfig::default()
        };
        assert!(LoadRequest::from_config(&root, &no_data_dir).originals.is_none());
    }
}
