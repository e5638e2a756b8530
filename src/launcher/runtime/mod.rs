//! Launch orchestration and exit code mapping.
mod startup;

pub use startup::{run_launcher, RuntimeExit};
