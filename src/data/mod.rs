/// Data layer: group matching, selection and load planning.
///
/// Architecture:
/// ```text
///  root/deformations/*.nii.gz
///        │
///        ▼
///   ┌──────────┐
///   │ matcher   │  sorted listing → DeformationFile[i]
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection  │  indices text → {i}
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ matcher   │  root/deformed + originals → LoadPlan
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ loader    │  LoadPlan → SceneHost calls
///   └──────────┘
/// ```

pub mod error;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod originals;
pub mod selection;
