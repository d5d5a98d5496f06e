//! Pure harness logic. Nothing in here touches the filesystem or spawns processes.

pub mod bootstrap;
pub mod decoder;
pub mod literal;
pub mod types;
pub mod unit;
pub mod validator;
