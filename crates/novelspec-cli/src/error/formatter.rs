//! Error formatting for CLI output.

use std::fmt::Write as _;

use crate::error::CliError;
use crate::output::Palette;

/// Error output formatter
pub struct ErrorFormatter {
    palette: Palette,
    verbose: bool,
}

impl ErrorFormatter {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Format an error to a string
    pub fn format(&self, error: &CliError) -> String {
        let mut output = String::new();
        let prefix = self.palette.error(&format!("error[{}]:", error.code()));
        let _ = writeln!(output, "{prefix} {error}");

        if self.verbose {
            self.format_source_chain(&mut output, error);
        }

        if let CliError::Io { path: Some(p), .. } = error {
            let _ = writeln!(output, "  {} {}", self.palette.dim("path:"), p.display());
        }

        if let Some(hint) = error.hint() {
            let _ = writeln!(output, "{} {hint}", self.palette.hint("hint:"));
        }

        let suggestions = error.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(output, "{}", self.palette.warning("suggestions:"));
            for suggestion in suggestions {
                let _ = writeln!(output, "  - {suggestion}");
            }
        }

        output
    }

    /// Format as JSON
    pub fn format_json(&self, error: &CliError) -> String {
        let json = serde_json::json!({
            "success": false,
            "error": {
                "code": error.code(),
                "message": error.to_string(),
                "hint": error.hint(),
                "suggestions": error.suggestions(),
            }
        });

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| error.to_string())
    }

    fn format_source_chain(&self, output: &mut String, error: &CliError) {
        let mut current = std::error::Error::source(error);
        if current.is_none() {
            return;
        }

        let _ = writeln!(output, "{}", self.palette.dim("caused by:"));
        let mut depth = 0;
        while let Some(src) = current {
            let _ = writeln!(output, "  {depth}: {src}");
            current = src.source();
            depth += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_format() {
        let err = CliError::not_found_with_suggestions(
            "change",
            "add-ch-1",
            vec!["add-ch-11".to_string()],
        );
        let text = ErrorFormatter::new(Palette::plain()).format(&err);
        assert!(text.starts_with("error[E005]: change not found: add-ch-1\n"));
        assert!(text.contains("hint: See suggestions below"));
        assert!(text.contains("  - add-ch-11"));
    }

    #[test]
    fn test_json_format() {
        let err = CliError::user_with_hint("no", "use --yes");
        let json: serde_json::Value =
            serde_json::from_str(&ErrorFormatter::new(Palette::plain()).format_json(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "E010");
        assert_eq!(json["error"]["hint"], "use --yes");
    }
}
