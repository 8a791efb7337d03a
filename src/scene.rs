use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::data::loader::{NodeId, SceneHost};
use crate::data::model::ArtifactKind;

/// Image/transform containers the scene accepts. Contents are never parsed.
pub const KNOWN_EXTENSIONS: [&str; 6] = [".nii.gz", ".nii", ".nrrd", ".nhdr", ".mha", ".mhd"];

/// Whether the scene can hold files ending in `ext`.
pub fn is_supported(ext: &str) -> bool {
    KNOWN_EXTENSIONS.contains(&ext)
}

// ---------------------------------------------------------------------------
// SceneNode – one loaded file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    /// Display name, unique within the scene.
    pub name: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Index into [`Scene::folders`], if loaded as part of a group.
    pub folder: Option<usize>,
    /// Outline display flag.
    pub expanded: bool,
}

/// Outline folder for one group of one dropped root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFolder {
    pub root: PathBuf,
    pub group: usize,
}

impl SceneFolder {
    /// `<root dir name> / group <i>`.
    pub fn label(&self) -> String {
        let root = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string());
        format!("{root} / group {}", self.group)
    }
}

// ---------------------------------------------------------------------------
// Scene – the in-process host
// ---------------------------------------------------------------------------

/// Everything loaded so far, in creation order.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    folders: Vec<SceneFolder>,
    current_folder: Option<usize>,
    next_id: NodeId,
}

impl Scene {
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn folders(&self) -> &[SceneFolder] {
        &self.folders
    }

    /// Nodes of one folder, or the loose ones for `None`.
    pub fn nodes_in(&self, folder: Option<usize>) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |n| n.folder == folder)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn count(&self, kind: ArtifactKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Remove every node. Ids keep increasing.
    pub fn clear(&mut self) {
        log::info!("Clearing {} scene nodes", self.nodes.len());
        self.nodes.clear();
        self.folders.clear();
        self.current_folder = None;
    }

    fn add(&mut self, kind: ArtifactKind, path: &Path) -> Result<NodeId> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("{} does not exist", path.display()))?;
        if !meta.is_file() {
            bail!("{} is not a file", path.display());
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no readable file name", path.display()))?;
        let Some(ext) = KNOWN_EXTENSIONS.iter().find(|ext| file_name.ends_with(*ext)) else {
            bail!("Unsupported file format: {file_name}");
        };

        let stem = &file_name[..file_name.len() - ext.len()];
        let name = self.unique_name(stem);
        let id = self.next_id;
        self.next_id += 1;

        log::debug!("Added {kind} node {id} '{name}'");
        self.nodes.push(SceneNode {
            id,
            name,
            kind,
            path: path.to_path_buf(),
            size_bytes: meta.len(),
            folder: self.current_folder,
            expanded: true,
        });
        Ok(id)
    }

    /// `stem`, or `stem_1`, `stem_2`, ... when already taken.
    fn unique_name(&self, stem: &str) -> String {
        let taken = |candidate: &str| self.nodes.iter().any(|n| n.name == candidate);
        if !taken(stem) {
            return stem.to_string();
        }
        (1..)
            .map(|i| format!("{stem}_{i}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| stem.to_string())
    }
}

impl SceneHost for Scene {
    fn load_transform(&mut self, path: &Path) -> Result<NodeId> {
        self.add(ArtifactKind::Transform, path)
    }

    fn load_volume(&mut self, path: &Path) -> Result<NodeId> {
        self.add(ArtifactKind::Volume, path)
    }

    fn load_segmentation(&mut self, path: &Path) -> Result<NodeId> {
        self.add(ArtifactKind::Segmentation, path)
    }

    fn begin_group(&mut self, root: &Path, group: usize) {
        let folder = SceneFolder {
            root: root.to_path_buf(),
            group,
        };
        let index = match self.folders.iter().position(|f| *f == folder) {
            Some(index) => index,
            None => {
                self.folders.push(folder);
                self.folders.len() - 1
            }
        };
        self.current_folder = Some(index);
    }

    fn collapse_segmentations(&mut self) {
        for node in &mut self.nodes {
            if node.kind == ArtifactKind::Segmentation {
                node.expanded = false;
            }
        }
    }
}
