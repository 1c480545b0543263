//! `llvm-prep build` – download, extract, configure, build and install.

use anyhow::Result;
use llvm_prep_core::config::PrepConfig;
use llvm_prep_core::driver::{Driver, StageStatus};
use std::path::Path;

/// Command-line values that take precedence over the loaded config.
#[derive(Debug, Default)]
pub struct BuildOverrides {
    pub commit: Option<String>,
    pub jobs: Option<u32>,
    pub no_sudo: bool,
}

impl BuildOverrides {
    pub fn apply(self, mut cfg: PrepConfig) -> PrepConfig {
        if let Some(commit) = self.commit {
            if commit != cfg.commit {
                // The recorded digest belongs to the configured commit only.
                cfg.expected_sha256 = None;
            }
            cfg.commit = commit;
        }
        if let Some(jobs) = self.jobs {
            cfg.build_jobs = jobs;
        }
        if self.no_sudo {
            cfg.install_with_sudo = false;
        }
        cfg
    }
}

pub fn run_build(cfg: PrepConfig, overrides: BuildOverrides, work_dir: &Path) -> Result<()> {
    let cfg = overrides.apply(cfg);
    let driver = Driver::new(&cfg, work_dir);
    println!("{}", driver.archive_url());

    let report = driver.run()?;
    for record in &report.stages {
        let status = match &record.status {
            StageStatus::Ok => "ok".to_string(),
            StageStatus::Exited(Some(code)) => format!("exited with status {}", code),
            StageStatus::Exited(None) => "terminated by signal".to_string(),
            StageStatus::Failed(msg) => format!("failed: {}", msg),
        };
        println!("{:<10} {}", record.stage, status);
    }
    if !report.all_ok() {
        tracing::warn!("build finished with failed steps in {}", report.build_dir.display());
    }
    Ok(())
}
