//! Shared helpers reused across modules (e.g., path validation).

use std::path::{Component, Path};

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Returns true if the path is non-empty, relative and never climbs out with `..`.
pub fn is_contained_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Returns true if the value names a single file without any directory part.
pub fn is_bare_file_name(value: &str) -> bool {
    let path = Path::new(value);
    !value.trim().is_empty()
        && path.components().count() == 1
        && matches!(path.components().next(), Some(Component::Normal(_)))
}
