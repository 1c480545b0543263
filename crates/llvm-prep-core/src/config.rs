use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::source;

/// CMake configure options (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmakeConfig {
    /// Generator passed to `-G`.
    pub generator: String,
    /// `CMAKE_BUILD_TYPE`.
    pub build_type: String,
    /// `CMAKE_EXPORT_COMPILE_COMMANDS`.
    pub export_compile_commands: bool,
    /// `LLVM_TARGETS_TO_BUILD`, joined with `;`.
    pub targets: Vec<String>,
    /// `CLANG_INCLUDE_TESTS`.
    pub include_tests: bool,
    /// `LLVM_ENABLE_ASSERTIONS`.
    pub assertions: bool,
    /// `LLVM_ENABLE_PROJECTS`; omitted from the command line when empty.
    #[serde(default)]
    pub projects: Vec<String>,
}

impl Default for CmakeConfig {
    fn default() -> Self {
        Self {
            generator: "Ninja".to_string(),
            build_type: "Release".to_string(),
            export_compile_commands: true,
            targets: vec!["X86".to_string()],
            include_tests: true,
            assertions: true,
            projects: Vec::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/llvm-prep/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Upstream llvm-project commit to fetch.
    pub commit: String,
    /// Local file name of the downloaded archive.
    pub archive_name: String,
    /// SHA-256 recorded for the archive of `commit`. Only logged against, never enforced.
    #[serde(default)]
    pub expected_sha256: Option<String>,
    /// Name of the build directory created inside the source tree.
    pub build_dir: String,
    /// Parallel jobs passed to ninja as `-jN`.
    pub build_jobs: u32,
    /// Run the install step through sudo.
    pub install_with_sudo: bool,
    #[serde(default)]
    pub cmake: CmakeConfig,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            commit: source::DEFAULT_COMMIT.to_string(),
            archive_name: "llvm.tar.gz".to_string(),
            expected_sha256: Some(source::DEFAULT_ARCHIVE_SHA256.to_string()),
            build_dir: "build".to_string(),
            build_jobs: 3,
            install_with_sudo: true,
            cmake: CmakeConfig::default(),
        }
    }
}

impl PrepConfig {
    /// Download URL for the configured commit.
    pub fn archive_url(&self) -> String {
        source::archive_url(&self.commit)
    }

    /// Top-level directory the archive extracts to.
    pub fn source_dir_name(&self) -> String {
        source::extracted_dir_name(&self.commit)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("llvm-prep")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PrepConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PrepConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from(path: &Path) -> Result<PrepConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: PrepConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
