use kvdeploy::config::{ColorMode, Config};
use kvdeploy::infrastructure::ConsoleStyle;

use crate::ui::terminal::{detect_capabilities, TerminalCapabilities};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    pub json: bool,
    pub verbose: u8,
    pub caps: TerminalCapabilities,
    pub color: bool,
    pub unicode: bool,
}

impl UiContext {
    pub fn new(json: bool, verbose: u8, config: &Config) -> Self {
        Self::from_caps(json, verbose, config, detect_capabilities())
    }

    pub(crate) fn from_caps(
        json: bool,
        verbose: u8,
        config: &Config,
        caps: TerminalCapabilities,
    ) -> Self {
        let color = match config.output.color {
            ColorMode::Never => false,
            ColorMode::Always => true,
            ColorMode::Auto => caps.supports_color && !caps.is_ci,
        };
        Self {
            json,
            verbose,
            caps,
            color: color && !json,
            unicode: config.output.unicode && caps.supports_unicode,
        }
    }

    /// Prompts need a human on stdin and a human-readable stream
    pub fn can_prompt(&self) -> bool {
        !self.json && self.caps.interactive
    }

    pub fn console_style(&self) -> ConsoleStyle {
        ConsoleStyle {
            color: self.color,
            unicode: self.unicode,
        }
    }
}
