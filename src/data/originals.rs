use std::fs;
use std::path::{Path, PathBuf};

use super::model::ArtifactKind;

/// Separator between the moving and fixed image names in a deformed filename.
pub const DEFORMED_TO: &str = "_deformed_to_";
const ORIGINAL_EXTENSION: &str = ".nii.gz";
const LABEL_MARKERS: [&str; 3] = ["mask", "seg", "label"];

// ---------------------------------------------------------------------------
// Lookup of pre-registration images
// ---------------------------------------------------------------------------

/// Finds the moving and fixed images a deformed volume was produced from.
///
/// A deformed stem such as `lung01_deformed_to_lung02` names the moving image
/// `lung01.nii.gz` and the fixed image `lung02.nii.gz`; both are searched for
/// anywhere below `data_dir`.
#[derive(Debug, Clone)]
pub struct OriginalsSearch {
    data_dir: PathBuf,
}

impl OriginalsSearch {
    /// `None` for an empty data directory, which disables the lookup.
    pub fn new(data_dir: impl Into<PathBuf>) -> Option<Self> {
        let data_dir = data_dir.into();
        if data_dir.as_os_str().is_empty() {
            return None;
        }
        Some(Self { data_dir })
    }

    /// Locate originals for a deformed stem (extension already stripped).
    ///
    /// Returns nothing when the stem has no `_deformed_to_` separator.
    pub fn find(&self, deformed_stem: &str) -> Vec<(ArtifactKind, PathBuf)> {
        let Some((moving, fixed)) = split_pair(deformed_stem) else {
            log::debug!("No moving/fixed pair in {deformed_stem}");
            return Vec::new();
        };

        let mut out = Vec::new();
        for name in [moving, fixed] {
            let target = format!("{name}{ORIGINAL_EXTENSION}");
            let mut hits = Vec::new();
            collect_named(&self.data_dir, &target, &mut hits);
            hits.sort();
            out.extend(hits.into_iter().map(|path| (self.classify(&path), path)));
        }
        out
    }

    /// Label maps are recognised by a marker anywhere in their full path.
    pub fn classify(&self, path: &Path) -> ArtifactKind {
        let lowered = path.to_string_lossy().to_lowercase();
        if LABEL_MARKERS.iter().any(|m| lowered.contains(m)) {
            ArtifactKind::Segmentation
        } else {
            ArtifactKind::Volume
        }
    }
}

/// `moving_deformed_to_fixed` → `("moving", "fixed")`.
pub fn split_pair(stem: &str) -> Option<(&str, &str)> {
    stem.split_once(DEFORMED_TO)
}

/// Recursively collect files called `file_name` below `dir`.
///
/// Symlinked directories are not entered.
fn collect_named(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot search {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            collect_named(&path, file_name, out);
        } else if file_type.is_symlink() && path.is_dir() {
            log::debug!("Not following directory link {}", path.display());
        } else if entry.file_name() == file_name {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn empty_data_dir_disables_lookup() {
        assert!(OriginalsSearch::new("").is_none());
        assert!(OriginalsSearch::new("/data").is_some());
    }

    #[test]
    fn split_requires_separator() {
        assert_eq!(split_pair("a_deformed_to_b"), Some(("a", "b")));
        assert_eq!(split_pair("a_deformed_b"), None);
    }

    #[test]
    fn finds_moving_then_fixed_and_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path();
        touch(&data.join("imagesTr/lung01.nii.gz"));
        touch(&data.join("masksTr/lung01.nii.gz"));
        touch(&data.join("imagesTr/lung02.nii.gz"));
        touch(&data.join("nested/deeper/Labels/lung02.nii.gz"));
        touch(&data.join("imagesTr/lung03.nii.gz"));

        let search = OriginalsSearch::new(data).unwrap();
        let found = search.find("lung01_deformed_to_lung02");

        assert_eq!(
            found,
            vec![
                (ArtifactKind::Volume, data.join("imagesTr/lung01.nii.gz")),
                (ArtifactKind::Segmentation, data.join("masksTr/lung01.nii.gz")),
                (ArtifactKind::Volume, data.join("imagesTr/lung02.nii.gz")),
                (
                    ArtifactKind::Segmentation,
                    data.join("nested/deeper/Labels/lung02.nii.gz")
                ),
            ]
        );
    }

    #[test]
    fn classification_checks_the_full_path() {
        let search = OriginalsSearch::new("/data/segmentation_study").unwrap();
        assert_eq!(
            search.classify(Path::new("/data/segmentation_study/images/ct.nii.gz")),
            ArtifactKind::Segmentation
        );
        assert_eq!(
            search.classify(Path::new("/data/LABELS/ct.nii.gz")),
            ArtifactKind::Segmentation
        );
        assert_eq!(
            search.classify(Path::new("/data/study/images/ct.nii.gz")),
            ArtifactKind::Volume
        );
    }

    #[cfg(unix)]
    #[test]
    fn directory_links_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path();
        touch(&data.join("images/a.nii.gz"));
        std::os::unix::fs::symlink(data, data.join("images/loop")).unwrap();

        let search = OriginalsSearch::new(data).unwrap();
        let found = search.find("a_deformed_to_b");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, data.join("images/a.nii.gz"));
    }

    #[test]
    fn no_separator_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x/case.nii.gz"));
        let search = OriginalsSearch::new(dir.path()).unwrap();
        assert!(search.find("case").is_empty());
    }
}
