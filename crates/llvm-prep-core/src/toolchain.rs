//! External build tool invocations: cmake configure, ninja build, ninja install.

use crate::config::CmakeConfig;
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus};

/// CMake `-S` argument, relative to the build directory.
pub const CMAKE_SOURCE_REL: &str = "../llvm";

/// The tool could not be started at all (not on PATH, not executable).
#[derive(Debug, thiserror::Error)]
#[error("failed to run `{cmd}`")]
pub struct StepError {
    pub cmd: String,
    #[source]
    pub source: std::io::Error,
}

/// One external command with a fixed argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStep {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolStep {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Use `dir/<program>` when that file exists, otherwise keep the PATH lookup.
    pub fn search_at(mut self, dir: &Path) -> Self {
        let exe_path = dir.join(&self.program);
        if exe_path.exists() {
            self.program = exe_path.to_string_lossy().into_owned();
        }
        self
    }

    /// Run to completion in `cwd`, inheriting stdio. A non-zero exit is returned, not raised.
    pub fn run_in(&self, cwd: &Path) -> Result<ExitStatus, StepError> {
        tracing::info!("running `{}` in {}", self, cwd.display());
        Command::new(&self.program)
            .args(&self.args)
            .current_dir(cwd)
            .status()
            .map_err(|source| StepError {
                cmd: self.to_string(),
                source,
            })
    }
}

impl fmt::Display for ToolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}

fn on_off(v: bool) -> &'static str {
    if v {
        "ON"
    } else {
        "OFF"
    }
}

/// `cmake -S ../llvm -G <generator> -D...` as configured.
pub fn configure_step(cmake: &CmakeConfig) -> ToolStep {
    let mut step = ToolStep::new("cmake")
        .arg("-S")
        .arg(CMAKE_SOURCE_REL)
        .arg("-G")
        .arg(cmake.generator.as_str());
    if !cmake.projects.is_empty() {
        step = step.arg(format!("-DLLVM_ENABLE_PROJECTS={}", cmake.projects.join(";")));
    }
    step.arg(format!("-DCMAKE_BUILD_TYPE={}", cmake.build_type))
        .arg(format!(
            "-DCMAKE_EXPORT_COMPILE_COMMANDS={}",
            on_off(cmake.export_compile_commands)
        ))
        .arg(format!("-DLLVM_TARGETS_TO_BUILD={}", cmake.targets.join(";")))
        .arg(format!("-DCLANG_INCLUDE_TESTS={}", on_off(cmake.include_tests)))
        .arg(format!("-DLLVM_ENABLE_ASSERTIONS={}", on_off(cmake.assertions)))
}

/// `ninja -j<jobs>`.
pub fn build_step(jobs: u32) -> ToolStep {
    ToolStep::new("ninja").arg(format!("-j{}", jobs))
}

/// `sudo ninja install`, or plain `ninja install` without sudo.
pub fn install_step(with_sudo: bool) -> ToolStep {
    if with_sudo {
        ToolStep::new("sudo").arg("ninja").arg("install")
    } else {
        ToolStep::new("ninja").arg("install")
    }
}
