//! Configuration module for kvdeploy
//!
//! Resolution order:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (KVDEPLOY_*)
//! 3. `--config` file, else `$KVDEPLOY_CONFIG`, else `~/.kvdeploy/config.toml`
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{expand_home, ConfigWarning, CONFIG_ENV_VAR};
pub use types::{
    ColorMode, Config, DeployConfig, FailoverConfig, NodeConfig, OutputConfig, PathsConfig,
    RemoteConfig, TransferTool,
};
