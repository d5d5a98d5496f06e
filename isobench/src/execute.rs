//! Orchestration of a single subject execution.
//!
//! `validate → generate → write → launch → decode → cleanup`. Any failure
//! short-circuits the remaining phases, but a script that was written is always
//! removed before `execute` returns.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::bootstrap::{resolve_against_config, resolve_bootstrap};
use crate::core::decoder::ResultDecoder;
use crate::core::types::{ExecutionRequest, ExecutionResult, Phase};
use crate::core::unit::BenchmarkUnit;
use crate::core::validator::validate_request;
use crate::error::ExecuteError;
use crate::io::config::{DEFAULT_OUTPUT_LIMIT_BYTES, HarnessConfig};
use crate::io::process::{CommandOutput, LaunchRequest, Launcher, ProcessLauncher};
use crate::io::script::ScriptGenerator;
use crate::io::temp_script::TemporaryScript;

/// Settings shared by every execution of one executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Executable that runs generated scripts.
    pub runtime: String,
    /// Resolved bootstrap file, if any.
    pub bootstrap: Option<PathBuf>,
    /// Directory temporary scripts are created in.
    pub script_dir: PathBuf,
    /// Suffix of temporary script files.
    pub script_suffix: String,
    /// Kill the subject after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Per-stream capture bound.
    pub output_limit_bytes: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            runtime: "php".to_string(),
            bootstrap: None,
            script_dir: std::env::temp_dir(),
            script_suffix: ".php".to_string(),
            timeout: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl ExecutorSettings {
    /// Settings from a loaded config, resolving relative paths against the
    /// directory holding `config_path`.
    pub fn from_config(config_path: &Path, config: &HarnessConfig) -> Self {
        let script_dir = match config.script_dir.as_deref().filter(|dir| !dir.is_empty()) {
            Some(dir) => resolve_against_config(Path::new(dir), config_path),
            None => std::env::temp_dir(),
        };
        Self {
            runtime: config.runtime.clone(),
            bootstrap: resolve_bootstrap(config.bootstrap.as_deref(), config_path),
            script_dir,
            script_suffix: config.script_suffix.clone(),
            timeout: config.timeout(),
            output_limit_bytes: config.output_limit_bytes,
        }
    }
}

/// Runs subjects in isolated processes.
///
/// Holds no per-execution state, so one executor can serve concurrent callers
/// when its launcher is `Sync`.
pub struct Executor<L = ProcessLauncher> {
    settings: ExecutorSettings,
    generator: ScriptGenerator,
    decoder: ResultDecoder,
    launcher: L,
}

impl Executor<ProcessLauncher> {
    /// Executor configured from a harness config file's contents.
    pub fn from_config(config_path: &Path, config: &HarnessConfig) -> Result<Self> {
        let generator = match config.template.as_deref().filter(|path| !path.is_empty()) {
            Some(template) => {
                ScriptGenerator::from_path(&resolve_against_config(Path::new(template), config_path))?
            }
            None => ScriptGenerator::builtin(),
        };
        Self::new(
            ExecutorSettings::from_config(config_path, config),
            generator,
            ProcessLauncher,
        )
    }
}

impl<L: Launcher> Executor<L> {
    pub fn new(settings: ExecutorSettings, generator: ScriptGenerator, launcher: L) -> Result<Self> {
        let decoder = ResultDecoder::new().context("build result decoder")?;
        Ok(Self {
            settings,
            generator,
            decoder,
            launcher,
        })
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Render the script `execute` would run, without writing or running it.
    pub fn render(
        &self,
        unit: &dyn BenchmarkUnit,
        request: &ExecutionRequest,
    ) -> Result<String, ExecuteError> {
        validate_request(unit, request)?;
        self.generator
            .generate(self.settings.bootstrap.as_deref(), unit, request)
    }

    /// Run `request` against `unit` once and return the metrics it reported.
    #[instrument(skip_all, fields(unit = unit.name(), subject = request.subject(), revolutions = request.revolutions()))]
    pub fn execute(
        &self,
        unit: &dyn BenchmarkUnit,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, ExecuteError> {
        debug!(phase = %Phase::Validating, "executing subject");
        let script = self.render(unit, request)?;

        debug!(phase = %Phase::Writing, dir = %self.settings.script_dir.display());
        let temp = TemporaryScript::create(
            &self.settings.script_dir,
            &self.settings.script_suffix,
            &script,
        )?;

        let outcome = self.run_script(&temp, script);

        debug!(phase = %Phase::Cleanup);
        temp.remove();

        match &outcome {
            Ok(result) => info!(time = result.time, memory = result.memory, "subject succeeded"),
            Err(err) => warn!(phase = %err.phase(), err = %err, "subject failed"),
        }
        outcome
    }

    fn run_script(
        &self,
        temp: &TemporaryScript,
        script: String,
    ) -> Result<ExecutionResult, ExecuteError> {
        debug!(phase = %Phase::Launching, script = %temp.path().display());
        let request = LaunchRequest {
            runtime: self.settings.runtime.clone(),
            script_path: temp.path().to_path_buf(),
            timeout: self.settings.timeout,
            output_limit_bytes: self.settings.output_limit_bytes,
        };
        let output = self
            .launcher
            .launch(&request)
            .map_err(|err| ExecuteError::Launch {
                runtime: self.settings.runtime.clone(),
                message: format!("{err:#}"),
            })?;

        let stdout = check_exit(&output, script, self.settings.timeout)?;

        debug!(phase = %Phase::Decoding);
        if output.stdout_truncated > 0 {
            return Err(ExecuteError::MalformedResult {
                raw_output: stdout,
                reason: format!("stdout truncated by {} bytes", output.stdout_truncated),
            });
        }
        self.decoder.decode(&stdout)
    }
}

/// Turn a finished process into its stdout, or the matching failure.
fn check_exit(
    output: &CommandOutput,
    script: String,
    timeout: Option<Duration>,
) -> Result<String, ExecuteError> {
    let stdout = output.stdout_lossy();
    if output.timed_out {
        return Err(ExecuteError::TimedOut {
            timeout: timeout.unwrap_or_default(),
            stdout,
            stderr: output.stderr_lossy(),
            script,
        });
    }
    if !output.status.success() {
        return Err(ExecuteError::SubjectExecutionFailed {
            exit_code: output.status.code(),
            stdout,
            stderr: output.stderr_lossy(),
            script,
        });
    }
    Ok(stdout)
}
