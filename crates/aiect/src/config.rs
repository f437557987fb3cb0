//! Generator configuration.

use std::path::{Path, PathBuf};

use aiect_emit::{DEFAULT_SCRIPT_FILE, ScriptConfig};
use aiect_manifest::DEFAULT_MANIFEST_FILE;

/// Where the generator reads and writes, and how the script is rendered.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Directory the manifest and script paths are relative to.
    pub work_dir: PathBuf,
    /// Manifest file name.
    pub manifest_file: PathBuf,
    /// CT script file name.
    pub output_file: PathBuf,
    /// Script rendering options.
    pub script: ScriptConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            manifest_file: PathBuf::from(DEFAULT_MANIFEST_FILE),
            output_file: PathBuf::from(DEFAULT_SCRIPT_FILE),
            script: ScriptConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Default file names inside `work_dir`.
    #[must_use]
    pub fn in_dir(work_dir: impl AsRef<Path>) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the manifest file name.
    #[must_use]
    pub fn with_manifest_file(mut self, name: impl Into<PathBuf>) -> Self {
        self.manifest_file = name.into();
        self
    }

    /// Set the CT script file name.
    #[must_use]
    pub fn with_output_file(mut self, name: impl Into<PathBuf>) -> Self {
        self.output_file = name.into();
        self
    }

    /// Set script rendering options.
    #[must_use]
    pub fn with_script(mut self, script: ScriptConfig) -> Self {
        self.script = script;
        self
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.join(&self.manifest_file)
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_file)
    }
}
