//! File System Implementations

mod home;
mod local;

pub use home::{kvdeploy_dir, kvdeploy_home_dir, KVDEPLOY_TEST_HOME_VAR};
pub use local::LocalFs;
