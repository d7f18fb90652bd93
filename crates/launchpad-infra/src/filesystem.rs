//! Data directory layout.

use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "LAUNCHPAD_DATA_DIR";

/// Resolve the Launchpad data directory.
///
/// Priority:
/// 1. `LAUNCHPAD_DATA_DIR` environment variable
/// 2. `~/.launchpad`
/// 3. `.launchpad` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_VAR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".launchpad");
    }

    PathBuf::from(".launchpad")
}
