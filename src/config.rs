use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scene;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DEFORM_LOADER_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "deform-loader.json";
/// Longest time a status message stays on screen.
pub const MAX_STATUS_SECONDS: f32 = 3600.0;

// ---------------------------------------------------------------------------
// LoaderConfig – the values the GUI passes into each load
// ---------------------------------------------------------------------------

/// Loader settings. Read once at start-up, then edited in the side panel.
/// Missing fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Last folder loaded or typed in; empty until the user picks one.
    pub root_path: String,
    /// Where the original moving/fixed images live.
    pub data_dir: String,
    /// Comma-separated group indices; empty means all.
    pub indices_text: String,
    /// Filename suffixes accepted in `deformations`.
    pub extensions: Vec<String>,
    /// Also load the pre-registration images from `data_dir`.
    pub find_originals: bool,
    /// Ask how many groups to load before loading.
    pub confirm_group_count: bool,
    /// Collapse segmentation items in the outline after a load.
    pub collapse_segmentations: bool,
    pub status_seconds: f32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            data_dir: String::new(),
            indices_text: String::new(),
            extensions: vec![".nii.gz".into(), ".nii".into(), ".nrrd".into()],
            find_originals: true,
            confirm_group_count: false,
            collapse_segmentations: true,
            status_seconds: 4.0,
        }
    }
}

impl LoaderConfig {
    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: LoaderConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Resolve the start-up config.
    ///
    /// An explicit `DEFORM_LOADER_CONFIG` must load; the working-directory
    /// file is optional and falls back to defaults when broken.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            log::info!("Using config {}", path.display());
            return Self::from_file(&path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if !local.exists() {
            return Ok(Self::default());
        }
        match Self::from_file(local) {
            Ok(config) => {
                log::info!("Using config {}", local.display());
                Ok(config)
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", local.display());
                Ok(Self::default())
            }
        }
    }

    /// How long status messages stay visible, within `0..=MAX_STATUS_SECONDS`.
    pub fn status_duration(&self) -> Duration {
        let fallback = Duration::from_secs_f32(Self::default().status_seconds);
        if !self.status_seconds.is_finite() {
            return fallback;
        }
        Duration::try_from_secs_f32(self.status_seconds.clamp(0.0, MAX_STATUS_SECONDS))
            .unwrap_or(fallback)
    }

    /// Drop blank and unloadable extensions and make sure each starts with a dot.
    fn normalized(mut self) -> Self {
        self.extensions = self
            .extensions
            .into_iter()
            .map(|ext| ext.trim().to_string())
            .filter(|ext| !ext.is_empty())
            .map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
            .filter(|ext| {
                let ok = scene::is_supported(ext);
                if !ok {
                    log::warn!(
                        "Ignoring extension {ext}: the scene loads only {}",
                        scene::KNOWN_EXTENSIONS.join(", ")
                    );
                }
                ok
            })
            .collect();
        if self.extensions.is_empty() {
            log::warn!("No deformation extensions configured, using defaults");
            self.extensions = Self::default().extensions;
        }
        if !self.status_seconds.is_finite() {
            self.status_seconds = Self::default().status_seconds;
        }
        self.status_seconds = self.status_seconds.clamp(0.0, MAX_STATUS_SECONDS);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "data_dir": "/data/LungCT", "indices_text": "0,3" }"#).unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, "/data/LungCT");
        assert_eq!(config.indices_text, "0,3");
        assert_eq!(config.extensions, LoaderConfig::default().extensions);
        assert!(config.collapse_segmentations);
    }

    #[test]
    fn extensions_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "extensions": ["nii.gz", " ", ".nrrd"] }"#).unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.extensions, [".nii.gz", ".nrrd"]);

        std::fs::write(&path, r#"{ "extensions": [] }"#).unwrap();
        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.extensions, LoaderConfig::default().extensions);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LoaderConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }

    #[test]
    fn negative_status_duration_is_zero() {
        let config = LoaderConfig {
            status_seconds: -1.0,
            ..LoaderConfig::default()
        };
        assert_eq!(config.status_duration(), Duration::ZERO);
    }

    #[test]
    fn huge_status_seconds_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "status_seconds": 1e30 }"#).unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.status_seconds, MAX_STATUS_SECONDS);
        assert_eq!(config.status_duration(), Duration::from_secs(3600));

        let edited = LoaderConfig {
            status_seconds: f32::MAX,
            ..LoaderConfig::default()
        };
        assert_eq!(edited.status_duration(), Duration::from_secs(3600));
    }

    #[test]
    fn unloadable_extensions_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "extensions": [".h5", "nrrd", ".txt"] }"#).unwrap();

        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.extensions, [".nrrd"]);

        std::fs::write(&path, r#"{ "extensions": [".h5"] }"#).unwrap();
        let config = LoaderConfig::from_file(&path).unwrap();
        assert_eq!(config.extensions, LoaderConfig::default().extensions);
    }
}
