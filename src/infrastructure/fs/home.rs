//! Home directory resolution with test isolation support.
//!
//! `dirs::home_dir()` ignores `HOME` on some platforms, so tests point the
//! tool at a scratch directory through `KVDEPLOY_TEST_HOME` instead.

use std::path::PathBuf;

/// Overrides the home directory for every kvdeploy-internal path
pub const KVDEPLOY_TEST_HOME_VAR: &str = "KVDEPLOY_TEST_HOME";

/// Home directory for the user config file and default tool state
pub fn kvdeploy_home_dir() -> Option<PathBuf> {
    std::env::var(KVDEPLOY_TEST_HOME_VAR)
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// `~/.kvdeploy`
pub fn kvdeploy_dir() -> Option<PathBuf> {
    kvdeploy_home_dir().map(|home| home.join(".kvdeploy"))
}
