//! Centralized path helpers for cache and log locations.

use std::path::PathBuf;

use crate::core::app;

/// Project directories from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Cache directory (~/.cache/ponder-orb/).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Operational log file used in local mode, where stderr would corrupt the display.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|d| d.join(format!("{}.log", app::NAME)))
}
