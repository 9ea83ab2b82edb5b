//! Terminal styling.

use std::io::{self, IsTerminal};

use clap::ColorChoice;
use owo_colors::{OwoColorize, Style};

/// Resolved color decision for one output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Always,
    Never,
}

impl ColorMode {
    /// Resolve `--color` against `NO_COLOR` and whether the stream is a terminal.
    pub fn resolve(choice: ColorChoice, is_terminal: bool) -> Self {
        match choice {
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
            ColorChoice::Auto => {
                if is_terminal && std::env::var_os("NO_COLOR").is_none() {
                    Self::Always
                } else {
                    Self::Never
                }
            }
        }
    }

    pub fn for_stdout(choice: ColorChoice) -> Self {
        Self::resolve(choice, io::stdout().is_terminal())
    }

    pub fn for_stderr(choice: ColorChoice) -> Self {
        Self::resolve(choice, io::stderr().is_terminal())
    }
}

/// Applies styles only when color is enabled.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    mode: ColorMode,
}

impl Palette {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    pub fn plain() -> Self {
        Self::new(ColorMode::Never)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        match self.mode {
            ColorMode::Always => text.style(style).to_string(),
            ColorMode::Never => text.to_string(),
        }
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, Style::new().red().bold())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow().bold())
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Style::new().green().bold())
    }

    pub fn hint(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan().bold())
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().bright_black())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_choice_wins() {
        assert_eq!(ColorMode::resolve(ColorChoice::Always, false), ColorMode::Always);
        assert_eq!(ColorMode::resolve(ColorChoice::Never, true), ColorMode::Never);
        assert_eq!(ColorMode::resolve(ColorChoice::Auto, false), ColorMode::Never);
    }

    #[test]
    fn test_plain_palette_adds_nothing() {
        assert_eq!(Palette::plain().error("boom"), "boom");
        assert_ne!(Palette::new(ColorMode::Always).error("boom"), "boom");
    }
}
