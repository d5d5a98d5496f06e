//! Isolated subject execution harness.
//!
//! Measures a single benchmark subject by rendering a self-contained script,
//! running it in a separate process and decoding the metrics it prints. The
//! crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (hook validation, bootstrap
//!   resolution, literal serialization, result decoding). No I/O.
//! - **[`io`]**: Side-effecting operations (config files, script rendering and
//!   storage, process execution).
//!
//! [`execute`] sequences both halves and owns the cleanup guarantee.

pub mod core;
pub mod error;
pub mod execute;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::types::{ExecutionRequest, ExecutionResult, HookKind, Phase};
pub use crate::core::unit::{BenchmarkUnit, StaticUnit};
pub use crate::error::ExecuteError;
pub use crate::execute::{Executor, ExecutorSettings};
