use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::TimeWrapMode;
use crate::error::{AssetError, Result};

use super::{asset_directory, open_file};

/// JSON description of a model plus the clips to evaluate against it. Paths
/// are relative to the manifest file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssetManifest {
    pub model: PathBuf,
    #[serde(default)]
    pub animations: Vec<PathBuf>,
    #[serde(default)]
    pub sample_times: Vec<f32>,
    #[serde(default)]
    pub time_wrap: TimeWrapMode,
}
impl AssetManifest {
    /// Parses the manifest and qualifies its paths with the manifest directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json_reader = open_file(path)?;
        let manifest: AssetManifest = serde_json::from_reader(json_reader)
            .map_err(|source| AssetError::Manifest { path: path.to_path_buf(), source })?;
        Ok(manifest.relative_to(&asset_directory(path)))
    }

    pub fn relative_to(self, directory: &Path) -> Self {
        Self {
            model: directory.join(self.model),
            animations: self.animations.into_iter().map(|a| directory.join(a)).collect(),
            ..self
        }
    }
}
