//! CLI entrypoint module structure.

pub mod args;
pub mod profile;

pub use args::LaunchArgs;
pub use profile::{
    resolve_base_dir_override, resolve_base_dir_override_from, resolve_config_source,
    resolve_config_source_from, resolve_dry_run, LaunchProfile,
};
