//! Stable exit codes for the `isobench` binary.

use crate::error::ExecuteError;

/// The subject ran and its result was decoded.
pub const OK: i32 = 0;
/// Invalid arguments, configuration, template or hooks.
pub const INVALID: i32 = 1;
/// The subject process exited unsuccessfully.
pub const SUBJECT_FAILED: i32 = 2;
/// The subject process succeeded but printed no valid result record.
pub const MALFORMED: i32 = 3;
/// The subject process was killed after the configured timeout.
pub const TIMED_OUT: i32 = 4;

/// Map a harness error onto its exit code.
pub fn for_error(err: &ExecuteError) -> i32 {
    match err {
        ExecuteError::SubjectExecutionFailed { .. } => SUBJECT_FAILED,
        ExecuteError::MalformedResult { .. } => MALFORMED,
        ExecuteError::TimedOut { .. } => TIMED_OUT,
        _ => INVALID,
    }
}
