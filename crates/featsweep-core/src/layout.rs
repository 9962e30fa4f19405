use crate::error::SweepResult;
use crate::identifier::FeatureId;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ARTIFACT_PREFIX: &str = "feature_";
pub const DEFAULT_ARTIFACT_EXTENSION: &str = ".json";

/// Filesystem layout for analysis artifacts.
///
/// Artifacts live flat in one directory: `<root>/<prefix><id><extension>`,
/// e.g. `output/feature_16751.json`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    prefix: String,
    extension: String,
}

impl OutputLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self::with_naming(root, DEFAULT_ARTIFACT_PREFIX, DEFAULT_ARTIFACT_EXTENSION)
    }

    #[must_use]
    pub fn with_naming(root: PathBuf, prefix: &str, extension: &str) -> Self {
        Self { root, prefix: prefix.to_string(), extension: extension.to_string() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn artifact_file_name(&self, id: FeatureId) -> String {
        format!("{}{}{}", self.prefix, id, self.extension)
    }

    #[must_use]
    pub fn artifact_path(&self, id: FeatureId) -> PathBuf {
        self.root.join(self.artifact_file_name(id))
    }

    #[must_use]
    pub fn artifact_exists(&self, id: FeatureId) -> bool {
        self.artifact_path(id).exists()
    }

    /// Create the output directory and any missing parents. Idempotent.
    pub fn ensure_root(&self) -> SweepResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}
