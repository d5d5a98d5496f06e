//! Decoding of the record a subject script prints on stdout.

use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::debug;

use crate::core::types::ExecutionResult;
use crate::error::ExecuteError;

const RESULT_SCHEMA: &str = include_str!("../../schemas/result/v1.schema.json");

/// Parses subject stdout into an [`ExecutionResult`].
///
/// The output must be a single JSON object (surrounding whitespace allowed)
/// conforming to `schemas/result/v1.schema.json`. Anything else is fatal for the
/// execution that produced it.
pub struct ResultDecoder {
    validator: Validator,
}

impl ResultDecoder {
    pub fn new() -> anyhow::Result<Self> {
        let schema: Value = serde_json::from_str(RESULT_SCHEMA)?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| anyhow::anyhow!("compile result schema: {err}"))?;
        Ok(Self { validator })
    }

    pub fn decode(&self, stdout: &str) -> Result<ExecutionResult, ExecuteError> {
        let malformed = |reason: String| ExecuteError::MalformedResult {
            raw_output: stdout.to_string(),
            reason,
        };

        if stdout.trim().is_empty() {
            return Err(malformed("empty output".to_string()));
        }
        let value: Value =
            serde_json::from_str(stdout).map_err(|err| malformed(format!("invalid json: {err}")))?;

        let violations: Vec<String> = self
            .validator
            .iter_errors(&value)
            .map(|err| err.to_string())
            .collect();
        if !violations.is_empty() {
            return Err(malformed(format!(
                "schema validation failed: {}",
                violations.join("; ")
            )));
        }

        let result: ExecutionResult =
            serde_json::from_value(value).map_err(|err| malformed(err.to_string()))?;
        debug!(time = result.time, memory = result.memory, "decoded result");
        Ok(result)
    }
}
