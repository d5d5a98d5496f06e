//! Errors surfaced by a subject execution.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{HookKind, Phase};

/// Why an execution did not produce a result.
///
/// None of these are retried inside the harness; a hidden retry would skew the
/// timing the caller aggregates.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("unknown {kind} method \"{name}\" in benchmark unit \"{unit}\"")]
    UnknownHookMethod {
        kind: HookKind,
        name: String,
        unit: String,
    },

    #[error("template references unknown placeholder \"{name}\"")]
    UnknownPlaceholder { name: String },

    #[error("could not render script: {message}")]
    Render { message: String },

    #[error("could not write script {}: {source}", path.display())]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not launch `{runtime}`: {message}")]
    Launch { runtime: String, message: String },

    #[error("subject execution failed with status {}: {}", display_code(*exit_code), stderr.trim())]
    SubjectExecutionFailed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        script: String,
    },

    #[error("subject execution timed out after {timeout:?}")]
    TimedOut {
        timeout: Duration,
        stdout: String,
        stderr: String,
        script: String,
    },

    #[error("could not decode executor result ({reason}), got: {raw_output}")]
    MalformedResult { raw_output: String, reason: String },
}

impl ExecuteError {
    /// Phase the execution was in when this error was raised.
    pub fn phase(&self) -> Phase {
        match self {
            ExecuteError::UnknownHookMethod { .. } => Phase::Validating,
            ExecuteError::UnknownPlaceholder { .. } | ExecuteError::Render { .. } => {
                Phase::Generating
            }
            ExecuteError::ScriptWrite { .. } => Phase::Writing,
            ExecuteError::Launch { .. }
            | ExecuteError::SubjectExecutionFailed { .. }
            | ExecuteError::TimedOut { .. } => Phase::Launching,
            ExecuteError::MalformedResult { .. } => Phase::Decoding,
        }
    }

    /// The generated script, for errors raised after it ran.
    pub fn script(&self) -> Option<&str> {
        match self {
            ExecuteError::SubjectExecutionFailed { script, .. }
            | ExecuteError::TimedOut { script, .. } => Some(script),
            _ => None,
        }
    }
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}
