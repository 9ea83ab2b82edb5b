//! Interactive prompts for CLI user input.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::CliError;

/// Whether stdin is attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Interpret a y/n answer. Empty input takes the default.
pub fn parse_answer(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask a yes/no question on stderr and read the answer from stdin.
pub fn confirm(question: &str, default: bool) -> Result<bool, CliError> {
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    let stdin = io::stdin();
    let mut stderr = io::stderr();

    loop {
        write!(stderr, "? {question} {suffix} ")?;
        stderr.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(false);
        }

        match parse_answer(&line, default) {
            Some(answer) => return Ok(answer),
            None => writeln!(stderr, "Please answer y or n.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n", false), Some(true));
        assert_eq!(parse_answer(" YES ", false), Some(true));
        assert_eq!(parse_answer("n", true), Some(false));
        assert_eq!(parse_answer("", false), Some(false));
        assert_eq!(parse_answer("maybe", false), None);
    }
}
