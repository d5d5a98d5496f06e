//! Lifecycle hook validation.
//!
//! Runs before any script is generated, so a misconfigured hook never costs a
//! process spawn or a temporary file.

use tracing::debug;

use crate::core::types::{ExecutionRequest, HookKind};
use crate::core::unit::BenchmarkUnit;
use crate::error::ExecuteError;

/// Check that every name in `hooks` is a method of `unit`.
///
/// Stops at the first missing name.
pub fn validate(
    unit: &dyn BenchmarkUnit,
    kind: HookKind,
    hooks: &[String],
) -> Result<(), ExecuteError> {
    match hooks.iter().find(|hook| !unit.has_method(hook)) {
        Some(missing) => {
            debug!(unit = unit.name(), %kind, hook = %missing, "unknown hook method");
            Err(ExecuteError::UnknownHookMethod {
                kind,
                name: missing.clone(),
                unit: unit.name().to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Validate before-hooks, then after-hooks, of `request`.
pub fn validate_request(
    unit: &dyn BenchmarkUnit,
    request: &ExecutionRequest,
) -> Result<(), ExecuteError> {
    validate(unit, HookKind::Before, request.before_hooks())?;
    validate(unit, HookKind::After, request.after_hooks())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::unit::StaticUnit;

    fn unit() -> StaticUnit {
        StaticUnit::new(
            "SortBench",
            "bench/SortBench.php",
            ["benchSort", "setUp", "tearDown"],
        )
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn known_hooks_pass() {
        validate(&unit(), HookKind::Before, &names(&["setUp"])).expect("valid");
        validate(&unit(), HookKind::After, &names(&["tearDown", "setUp"])).expect("valid");
        validate(&unit(), HookKind::After, &[]).expect("empty list is valid");
    }

    #[test]
    fn first_missing_hook_is_reported() {
        let err = validate(&unit(), HookKind::Before, &names(&["setUp", "seed", "warm"]))
            .expect_err("seed is missing");
        match err {
            ExecuteError::UnknownHookMethod { kind, name, unit } => {
                assert_eq!(kind, HookKind::Before);
                assert_eq!(name, "seed");
                assert_eq!(unit, "SortBench");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn request_checks_before_hooks_first() {
        let request = ExecutionRequest::new("benchSort")
            .with_before_hooks(["missingBefore"])
            .with_after_hooks(["missingAfter"]);
        let err = validate_request(&unit(), &request).expect_err("invalid");
        assert!(matches!(
            err,
            ExecuteError::UnknownHookMethod { kind: HookKind::Before, ref name, .. } if name == "missingBefore"
        ));
    }

    #[test]
    fn request_reports_after_hook_kind() {
        let request = ExecutionRequest::new("benchSort")
            .with_before_hooks(["setUp"])
            .with_after_hooks(["cleanUp"]);
        let err = validate_request(&unit(), &request).expect_err("invalid");
        assert_eq!(
            err.to_string(),
            "unknown after method \"cleanUp\" in benchmark unit \"SortBench\""
        );
    }
}
