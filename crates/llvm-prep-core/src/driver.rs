//! Fetch-build-install sequence for the pinned LLVM snapshot.
//!
//! Steps run strictly in order: download, extract, enter the source tree,
//! create the build dir, configure, build, install. Download, extract and the
//! tool steps are best-effort: a failure is logged and the next step runs
//! anyway, so a broken download surfaces when the source tree is missing.
//! The process working directory is never changed; each tool is spawned with
//! the build dir as its current dir.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum;
use crate::config::PrepConfig;
use crate::extract;
use crate::fetch::{self, FetchOptions};
use crate::toolchain::{self, ToolStep};

/// Stage of the sequence, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Extract,
    Configure,
    Build,
    Install,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Download => "download",
            Stage::Extract => "extract",
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Install => "install",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Ok,
    /// Tool exited non-zero (`None` when killed by a signal).
    Exited(Option<i32>),
    /// Stage failed before producing a result; the message is the error chain.
    Failed(String),
}

impl StageStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, StageStatus::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Outcome of a full [`Driver::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub build_dir: PathBuf,
    pub stages: Vec<StageRecord>,
}

impl RunReport {
    pub fn all_ok(&self) -> bool {
        self.stages.iter().all(|r| r.status.is_ok())
    }
}

pub struct Driver<'a> {
    cfg: &'a PrepConfig,
    work_dir: PathBuf,
    archive_url: String,
    fetch_opts: FetchOptions,
    tool_dir: Option<PathBuf>,
}

/// Result of comparing the downloaded archive against the recorded digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestCheck {
    /// No digest recorded for this commit.
    NotRecorded,
    Match,
    Mismatch { actual: String },
    /// Archive could not be hashed; the message is the error chain.
    Unreadable(String),
}

impl<'a> Driver<'a> {
    pub fn new(cfg: &'a PrepConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            cfg,
            work_dir: work_dir.into(),
            archive_url: cfg.archive_url(),
            fetch_opts: FetchOptions::default(),
            tool_dir: None,
        }
    }

    /// Fetch from `url` instead of the GitHub archive (mirrors, local servers).
    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url = url.into();
        self
    }

    pub fn with_fetch_options(mut self, opts: FetchOptions) -> Self {
        self.fetch_opts = opts;
        self
    }

    /// Look for cmake, ninja and sudo in `dir` before falling back to PATH.
    pub fn with_tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    pub fn archive_url(&self) -> &str {
        &self.archive_url
    }

    pub fn archive_path(&self) -> PathBuf {
        self.work_dir.join(&self.cfg.archive_name)
    }

    pub fn source_dir(&self) -> PathBuf {
        self.work_dir.join(self.cfg.source_dir_name())
    }

    /// Download the archive for the configured commit into the work dir.
    pub fn download(&self) -> Result<u64> {
        let url = self.archive_url.as_str();
        let dest = self.archive_path();
        let bytes = fetch::download_to_file(url, &dest, self.fetch_opts)
            .with_context(|| format!("download {}", url))?;
        tracing::info!("downloaded {} ({} bytes)", dest.display(), bytes);
        self.log_archive_digest(&dest);
        Ok(bytes)
    }

    /// Compare the archive digest against the recorded one. Informational only.
    pub fn check_archive_digest(&self, archive: &Path) -> DigestCheck {
        let Some(expected) = self.cfg.expected_sha256.as_deref() else {
            return DigestCheck::NotRecorded;
        };
        match checksum::sha256_path(archive) {
            Ok(actual) if actual.eq_ignore_ascii_case(expected) => DigestCheck::Match,
            Ok(actual) => DigestCheck::Mismatch { actual },
            Err(e) => DigestCheck::Unreadable(format!("{:#}", e)),
        }
    }

    fn log_archive_digest(&self, archive: &Path) {
        match self.check_archive_digest(archive) {
            DigestCheck::NotRecorded => {}
            DigestCheck::Match => tracing::info!("archive sha256 matches recorded digest"),
            DigestCheck::Mismatch { actual } => tracing::warn!(
                "archive sha256 {} differs from recorded {}",
                actual,
                self.cfg.expected_sha256.as_deref().unwrap_or_default()
            ),
            DigestCheck::Unreadable(e) => {
                tracing::warn!("could not hash {}: {}", archive.display(), e)
            }
        }
    }

    /// Unpack the downloaded archive into the work dir.
    pub fn extract(&self) -> Result<()> {
        let top = extract::extract_tar_gz(&self.archive_path(), &self.work_dir)?;
        tracing::debug!("archive top-level entries: {:?}", top);
        Ok(())
    }

    /// Enter the extracted source tree and create its build dir. Returns the build dir.
    ///
    /// Fails when the tree is missing or the build dir already exists.
    pub fn enter_source_tree(&self) -> Result<PathBuf> {
        let source_dir = self.source_dir();
        if !source_dir.is_dir() {
            anyhow::bail!("source directory {} not found", source_dir.display());
        }
        let build_dir = source_dir.join(&self.cfg.build_dir);
        fs::create_dir(&build_dir)
            .with_context(|| format!("create build directory {}", build_dir.display()))?;
        tracing::info!("created {}", build_dir.display());
        Ok(build_dir)
    }

    /// The configure, build and install commands, in order.
    pub fn tool_steps(&self) -> [(Stage, ToolStep); 3] {
        [
            (Stage::Configure, toolchain::configure_step(&self.cfg.cmake)),
            (Stage::Build, toolchain::build_step(self.cfg.build_jobs)),
            (Stage::Install, toolchain::install_step(self.cfg.install_with_sudo)),
        ]
    }

    /// Run the tool steps in `build_dir`. A non-zero exit does not stop later steps.
    pub fn run_tools(&self, build_dir: &Path) -> Result<Vec<StageRecord>> {
        let mut records = Vec::with_capacity(3);
        for (stage, step) in self.tool_steps() {
            let step = match &self.tool_dir {
                Some(dir) => step.search_at(dir),
                None => step,
            };
            let status = step.run_in(build_dir)?;
            let status = if status.success() {
                StageStatus::Ok
            } else {
                tracing::warn!("{} step `{}` exited with {}", stage, step, status);
                StageStatus::Exited(status.code())
            };
            records.push(StageRecord { stage, status });
        }
        Ok(records)
    }

    /// Run the full sequence.
    pub fn run(&self) -> Result<RunReport> {
        let mut stages = Vec::with_capacity(5);

        let download = self.download().map(|_| ());
        stages.push(best_effort(Stage::Download, download));

        let extracted = self.extract();
        stages.push(best_effort(Stage::Extract, extracted));

        let build_dir = self.enter_source_tree()?;
        stages.extend(self.run_tools(&build_dir)?);

        Ok(RunReport { build_dir, stages })
    }
}

fn best_effort(stage: Stage, result: Result<()>) -> StageRecord {
    let status = match result {
        Ok(()) => StageStatus::Ok,
        Err(e) => {
            tracing::warn!("{} failed, continuing: {:#}", stage, e);
            StageStatus::Failed(format!("{:#}", e))
        }
    };
    StageRecord { stage, status }
}
