//! I/O helpers for the harness.

pub mod config;
pub mod process;
pub mod script;
pub mod temp_script;
