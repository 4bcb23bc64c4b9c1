//! Manifest persistence: plain UTF-8 JSON, atomic write-then-rename so a
//! crash mid-save never leaves a half-written manifest.

use std::path::PathBuf;

use reliquary_core::models::BackupManifest;
use reliquary_core::ReliquaryResult;

pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the manifest, or an empty one when the file does not exist yet.
    pub fn load(&self) -> ReliquaryResult<BackupManifest> {
        if !self.path.exists() {
            return Ok(BackupManifest::default());
        }
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Rewrite the manifest wholesale.
    pub fn save(&self, manifest: &BackupManifest) -> ReliquaryResult<()> {
        let bytes = serde_json::to_vec_pretty(manifest)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
