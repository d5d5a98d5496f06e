//! Test-only helpers for building units and shell-backed executors.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;

use crate::core::unit::StaticUnit;
use crate::execute::{Executor, ExecutorSettings};
use crate::io::process::{CommandOutput, LaunchRequest, Launcher, ProcessLauncher};
use crate::io::script::ScriptGenerator;

/// Unit named `name` at a fixed source path with the given methods.
pub fn unit(name: &str, methods: &[&str]) -> StaticUnit {
    StaticUnit::new(
        name,
        format!("/fixtures/{name}.php"),
        methods.iter().copied(),
    )
}

/// Settings that run scripts with `sh` from `script_dir`.
pub fn sh_settings(script_dir: &Path, timeout: Option<Duration>) -> ExecutorSettings {
    ExecutorSettings {
        runtime: "sh".to_string(),
        bootstrap: None,
        script_dir: script_dir.to_path_buf(),
        script_suffix: ".sh".to_string(),
        timeout,
        output_limit_bytes: 64 * 1024,
    }
}

/// Executor running `template` as a shell script.
pub fn sh_executor(
    script_dir: &Path,
    template: &str,
    timeout: Option<Duration>,
) -> Result<Executor<RecordingLauncher>> {
    let generator = ScriptGenerator::from_source(template)?;
    Executor::new(
        sh_settings(script_dir, timeout),
        generator,
        RecordingLauncher::default(),
    )
}

/// Number of entries currently in `dir`.
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Real process launcher that remembers every script path it ran.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    inner: ProcessLauncher,
    scripts: Mutex<Vec<PathBuf>>,
}

impl RecordingLauncher {
    pub fn scripts(&self) -> Vec<PathBuf> {
        self.scripts
            .lock()
            .map(|scripts| scripts.clone())
            .unwrap_or_default()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, request: &LaunchRequest) -> Result<CommandOutput> {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push(request.script_path.clone());
        }
        self.inner.launch(request)
    }
}
