//! Launcher: base directory, virtual environment and delegated program.
pub mod config;
pub mod delegate;
pub mod environment;
pub mod plan;
pub mod runtime;

pub use delegate::{cancel_child, run_delegate, Cancellation, DelegateOutcome};
pub use environment::{resolve_base_dir, ActivatedEnvironment};
pub use plan::{resolve_program, LaunchPlan, LaunchPlanSummary};
