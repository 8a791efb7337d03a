use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::LoadError;
use super::model::{DeformationFile, Group, LoadInstruction};
use super::originals::OriginalsSearch;

pub const DEFORMATIONS_DIR: &str = "deformations";
pub const DEFORMED_DIR: &str = "deformed";

const DEFORMATION_TAG: &str = "_deformation_";
const DEFORMED_TAG: &str = "_deformed_";
const SEGMENTATION_SUFFIX: &str = "_seg";

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// List the deformation files of `root`, sorted by filename.
///
/// The position in the returned vector is the group index used by the
/// indices field. Sorting is plain byte order so indices match across
/// platforms and locales.
pub fn enumerate_groups(root: &Path, extensions: &[String]) -> Result<Vec<DeformationFile>, LoadError> {
    let dir = root.join(DEFORMATIONS_DIR);
    let entries = fs::read_dir(&dir).map_err(|source| LoadError::DirectoryNotFound {
        path: dir.clone(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::unexpected(0, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("Skipping non UTF-8 filename in {}", dir.display());
            continue;
        };
        if matching_extension(&name, extensions).is_some() {
            names.push(name);
        }
    }
    names.sort_unstable();

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(index, name)| DeformationFile { index, name })
        .collect())
}

/// Return the supported extension `name` ends with, preferring the longest.
pub fn matching_extension<'a>(name: &str, extensions: &'a [String]) -> Option<&'a str> {
    extensions
        .iter()
        .filter(|ext| !ext.is_empty() && name.ends_with(ext.as_str()))
        .max_by_key(|ext| ext.len())
        .map(String::as_str)
}

// ---------------------------------------------------------------------------
// Filename derivation
// ---------------------------------------------------------------------------

/// `caseA_deformation_001.nii.gz` → `caseA_deformed_001.nii.gz`.
///
/// Only the first occurrence is rewritten. Names without the tag come back
/// unchanged.
pub fn deformed_name(deformation_name: &str) -> String {
    deformation_name.replacen(DEFORMATION_TAG, DEFORMED_TAG, 1)
}

/// `x.nii.gz` → `x_seg.nii.gz`. `None` when `base_name` has no supported extension.
pub fn segmentation_name(base_name: &str, extensions: &[String]) -> Option<String> {
    let ext = matching_extension(base_name, extensions)?;
    let stem = &base_name[..base_name.len() - ext.len()];
    Some(format!("{stem}{SEGMENTATION_SUFFIX}{ext}"))
}

/// Strip the supported extension, if any.
pub fn strip_extension<'a>(name: &'a str, extensions: &[String]) -> &'a str {
    match matching_extension(name, extensions) {
        Some(ext) => &name[..name.len() - ext.len()],
        None => name,
    }
}

// ---------------------------------------------------------------------------
// Plan building
// ---------------------------------------------------------------------------

/// Resolve the on-disk artifacts of one deformation file.
pub fn derive_group(
    root: &Path,
    file: &DeformationFile,
    extensions: &[String],
    originals: Option<&OriginalsSearch>,
) -> Group {
    let deformed_dir = root.join(DEFORMED_DIR);
    let base_name = deformed_name(&file.name);

    let volume = existing(deformed_dir.join(&base_name));
    let segmentation = segmentation_name(&base_name, extensions)
        .and_then(|seg_name| existing(deformed_dir.join(seg_name)));

    let originals = originals
        .map(|search| search.find(strip_extension(&base_name, extensions)))
        .unwrap_or_default();

    Group {
        index: file.index,
        transform: root.join(DEFORMATIONS_DIR).join(&file.name),
        base_name,
        volume,
        segmentation,
        originals,
    }
}

/// Build the ordered instructions for the selected groups.
///
/// Groups are visited in ascending index order; indices past the end of
/// `files` are ignored. Within a group the order is transform, volume,
/// segmentation, then any originals.
pub fn build_load_plan(
    root: &Path,
    files: &[DeformationFile],
    selected: &BTreeSet<usize>,
    extensions: &[String],
    originals: Option<&OriginalsSearch>,
) -> Vec<LoadInstruction> {
    selected
        .iter()
        .filter_map(|&i| files.get(i))
        .flat_map(|file| derive_group(root, file, extensions, originals).instructions())
        .collect()
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}
