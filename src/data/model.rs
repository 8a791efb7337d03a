use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// ArtifactKind – what the host should do with a file
// ---------------------------------------------------------------------------

/// The three artifact kinds a group can contribute to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Transform,
    Volume,
    Segmentation,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Transform => write!(f, "transform"),
            ArtifactKind::Volume => write!(f, "volume"),
            ArtifactKind::Segmentation => write!(f, "segmentation"),
        }
    }
}

// ---------------------------------------------------------------------------
// DeformationFile – one entry of the sorted `deformations` listing
// ---------------------------------------------------------------------------

/// A deformation file and its stable index in the sorted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeformationFile {
    pub index: usize,
    /// Bare filename, e.g. `caseA_deformation_001.nii.gz`.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Group – the artifacts derived from one deformation file
// ---------------------------------------------------------------------------

/// Artifacts belonging to one deformation file. Volume and segmentation are
/// only set when the derived path exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub index: usize,
    pub transform: PathBuf,
    /// Deformation filename after the `_deformation_` → `_deformed_` rewrite.
    pub base_name: String,
    pub volume: Option<PathBuf>,
    pub segmentation: Option<PathBuf>,
    /// Pre-registration moving/fixed images found under the data directory.
    pub originals: Vec<(ArtifactKind, PathBuf)>,
}

impl Group {
    /// Flatten into load instructions: transform → volume → segmentation → originals.
    pub fn instructions(&self) -> Vec<LoadInstruction> {
        let mut out = vec![LoadInstruction::new(
            self.index,
            ArtifactKind::Transform,
            self.transform.clone(),
        )];
        if let Some(volume) = &self.volume {
            out.push(LoadInstruction::new(
                self.index,
                ArtifactKind::Volume,
                volume.clone(),
            ));
        }
        if let Some(seg) = &self.segmentation {
            out.push(LoadInstruction::new(
                self.index,
                ArtifactKind::Segmentation,
                seg.clone(),
            ));
        }
        out.extend(
            self.originals
                .iter()
                .map(|(kind, path)| LoadInstruction::new(self.index, *kind, path.clone())),
        );
        out
    }
}

// ---------------------------------------------------------------------------
// LoadInstruction / LoadPlan
// ---------------------------------------------------------------------------

/// One unit of work handed to the host loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadInstruction {
    pub group: usize,
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl LoadInstruction {
    pub fn new(group: usize, kind: ArtifactKind, path: PathBuf) -> Self {
        Self { group, kind, path }
    }
}

/// The ordered instructions for one load, plus what they were derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    pub root: PathBuf,
    /// Number of deformation files found (N).
    pub total_groups: usize,
    /// Selected group indices, ascending.
    pub selected: BTreeSet<usize>,
    pub instructions: Vec<LoadInstruction>,
}

impl LoadPlan {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
