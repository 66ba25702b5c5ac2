//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::PromotionCheck;
use crate::error::{DeployError, DeployResult};
use crate::infrastructure::fs::{kvdeploy_dir, kvdeploy_home_dir};

use super::types::{ColorMode, Config, TransferTool};

/// Points at a config file, ahead of the user config
pub const CONFIG_ENV_VAR: &str = "KVDEPLOY_CONFIG";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> DeployResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| DeployError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| DeployError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Candidate config files, most specific first
fn candidates(explicit: Option<&Path>) -> Vec<(PathBuf, bool)> {
    let mut paths = Vec::new();
    if let Some(path) = explicit {
        paths.push((path.to_path_buf(), true));
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            paths.push((PathBuf::from(path), true));
        }
    }
    if let Some(dir) = kvdeploy_dir() {
        paths.push((dir.join("config.toml"), false));
    }
    paths
}

/// First config found along the lookup order, with env overrides applied
///
/// A file named explicitly (flag or `$KVDEPLOY_CONFIG`) must exist; the
/// user config is optional.
pub fn discover(explicit: Option<&Path>) -> DeployResult<(Config, Vec<ConfigWarning>)> {
    for (path, required) in candidates(explicit) {
        if path.exists() {
            let (config, warnings) = load_with_warnings(&path)?;
            return Ok((with_env_overrides(config), warnings));
        }
        if required {
            return Err(DeployError::Config {
                file: path,
                message: "file does not exist".to_string(),
            });
        }
    }
    Ok((with_env_overrides(Config::default()), Vec::new()))
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env(key).and_then(|v| v.trim().parse().ok())
}

/// Apply environment variable overrides (KVDEPLOY_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Some(dir) = env("KVDEPLOY_BASE_DIRECTORY") {
        config.paths.base_directory = PathBuf::from(dir);
    }
    if let Some(dir) = env("KVDEPLOY_CLI_ROOT") {
        config.paths.cli_root = Some(PathBuf::from(dir));
    }
    if let Some(user) = env("KVDEPLOY_SSH_USER") {
        config.remote.user = Some(user);
    }
    if let Some(port) = env_parsed("KVDEPLOY_SSH_PORT") {
        config.remote.port = Some(port);
    }
    if let Some(tool) = env("KVDEPLOY_TRANSFER") {
        config.remote.transfer = match tool.to_lowercase().as_str() {
            "rsync" => TransferTool::Rsync,
            "scp" => TransferTool::Scp,
            _ => TransferTool::Auto,
        };
    }
    if let Some(n) = env_parsed("KVDEPLOY_MAX_PARALLEL_HOSTS") {
        config.deploy.max_parallel_hosts = n;
    }
    if let Some(n) = env_parsed("KVDEPLOY_FAILOVER_ROUNDS") {
        config.failover.max_rounds = n;
    }
    if let Some(secs) = env_parsed("KVDEPLOY_FAILOVER_DELAY_SECS") {
        config.failover.round_delay_secs = secs;
    }
    if let Some(check) = env("KVDEPLOY_PROMOTION_CHECK") {
        config.failover.check = match check.to_lowercase().as_str() {
            "role" => PromotionCheck::Role,
            _ => PromotionCheck::Response,
        };
    }
    if let Some(color) = env("KVDEPLOY_COLOR") {
        config.output.color = match color.to_lowercase().as_str() {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        };
    }
    if env("NO_COLOR").is_some() {
        config.output.color = ColorMode::Never;
    }
    config
}

/// Expand a leading `~` against the (test-overridable) home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match kvdeploy_home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "paths",
        "base_directory",
        "cli_root",
        "remote",
        "user",
        "port",
        "connect_timeout_secs",
        "command_timeout_secs",
        "transfer_timeout_secs",
        "transfer",
        "extra_args",
        "deploy",
        "max_parallel_hosts",
        "install_command",
        "node_up_timeout_secs",
        "failover",
        "max_rounds",
        "round_delay_secs",
        "timeout_key",
        "widened_timeout",
        "promoted_response",
        "check",
        "node",
        "cli",
        "start",
        "stop",
        "configure",
        "reset",
        "output",
        "color",
        "unicode",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
