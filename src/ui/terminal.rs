//! What the attached terminal can do
//!
//! Progress goes to stderr and prompts read stdin, so both streams are
//! probed separately.

use is_terminal::IsTerminal;

const CI_MARKERS: &[&str] = &["CI", "GITHUB_ACTIONS", "GITLAB_CI", "JENKINS_HOME", "BUILDKITE"];
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// stderr is a terminal
    pub is_tty: bool,
    /// stdin is a terminal and nobody is running us from CI
    pub interactive: bool,
    pub supports_color: bool,
    pub supports_unicode: bool,
    pub is_ci: bool,
}

pub fn detect_capabilities() -> TerminalCapabilities {
    TerminalCapabilities::probe(
        |key| std::env::var(key).ok(),
        std::io::stderr().is_terminal(),
        std::io::stdin().is_terminal(),
    )
}

impl TerminalCapabilities {
    fn probe(env: impl Fn(&str) -> Option<String>, stderr_tty: bool, stdin_tty: bool) -> Self {
        let dumb = env("TERM").is_some_and(|t| t.eq_ignore_ascii_case("dumb"));
        let is_ci = CI_MARKERS.iter().any(|key| env(key).is_some());

        // The first locale variable that is set decides
        let utf8_locale = LOCALE_VARS
            .iter()
            .find_map(|key| env(key).filter(|v| !v.is_empty()))
            .map_or(true, |v| {
                let v = v.to_ascii_lowercase();
                v.contains("utf-8") || v.contains("utf8")
            });

        Self {
            is_tty: stderr_tty,
            interactive: stdin_tty && !is_ci,
            supports_color: stderr_tty && !dumb && env("NO_COLOR").is_none(),
            supports_unicode: !dumb && utf8_locale,
            is_ci,
        }
    }
}
