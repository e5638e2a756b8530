//! Shared library modules providing error types, file utilities, and telemetry initialization.

pub mod errors;
pub mod fs;
pub mod interpreter;
pub mod paths;
pub mod telemetry;
