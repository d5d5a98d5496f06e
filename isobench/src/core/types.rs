//! Shared types for a single subject execution.
//!
//! A request is built once per subject/parameter-set combination and borrowed by
//! the executor; a result is handed to the caller and never touched again.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the measured revolutions a hook runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    Before,
    After,
}

impl HookKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::Before => "before",
            HookKind::After => "after",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of an execution, in the order the executor walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Generating,
    Writing,
    Launching,
    Decoding,
    Cleanup,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Validating => "validating",
            Phase::Generating => "generating",
            Phase::Writing => "writing",
            Phase::Launching => "launching",
            Phase::Decoding => "decoding",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to run one subject once.
///
/// Parameters are kept in a `BTreeMap` so the rendered script is byte-for-byte
/// deterministic for equal requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    subject: String,
    revolutions: u64,
    before_hooks: Vec<String>,
    after_hooks: Vec<String>,
    parameters: BTreeMap<String, serde_json::Value>,
}

impl ExecutionRequest {
    /// Request for `subject` with zero revolutions, no hooks and no parameters.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            revolutions: 0,
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_revolutions(mut self, revolutions: u64) -> Self {
        self.revolutions = revolutions;
        self
    }

    /// Hooks run in the given order before the measured revolutions.
    pub fn with_before_hooks<I, S>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before_hooks = hooks.into_iter().map(Into::into).collect();
        self
    }

    /// Hooks run in the given order after the measured revolutions.
    pub fn with_after_hooks<I, S>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after_hooks = hooks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameters(mut self, parameters: BTreeMap<String, serde_json::Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn revolutions(&self) -> u64 {
        self.revolutions
    }

    pub fn before_hooks(&self) -> &[String] {
        &self.before_hooks
    }

    pub fn after_hooks(&self) -> &[String] {
        &self.after_hooks
    }

    pub fn parameters(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.parameters
    }

    pub fn hooks(&self, kind: HookKind) -> &[String] {
        match kind {
            HookKind::Before => &self.before_hooks,
            HookKind::After => &self.after_hooks,
        }
    }
}

/// Metrics reported by one successful subject run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Elapsed time across all revolutions, in the unit the script reports.
    pub time: f64,
    /// Peak memory, in bytes.
    pub memory: f64,
    /// Any further named metrics the script printed.
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl ExecutionResult {
    pub fn new(time: f64, memory: f64) -> Self {
        Self {
            time,
            memory,
            metrics: BTreeMap::new(),
        }
    }
}
