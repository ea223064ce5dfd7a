// ABOUTME: Console reporting for transfer progress and outcomes
// ABOUTME: Formats status and failure lines on stderr with optional color

use crate::error::TransferError;
use crate::transfer::TransferOutcome;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Reporting capability handed to the command layer so transfer logic
/// never prints. Everything goes to stderr, keeping stdout clean for
/// downloaded bytes.
pub struct CliOutput {
    use_color: bool,
}

impl CliOutput {
    pub fn new() -> Self {
        Self {
            use_color: std::io::stderr().is_terminal(),
        }
    }

    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        } else {
            eprintln!("warning: {}", message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.use_color {
            eprintln!("{}", message.cyan());
        } else {
            eprintln!("{}", message);
        }
    }

    /// Progress line for a step in flight
    pub fn status(&self, message: &str) {
        if self.use_color {
            eprintln!("{}", message.dimmed());
        } else {
            eprintln!("{}", message);
        }
    }

    /// Report a finished HTTP exchange: a status line, plus the response
    /// body when the server refused.
    pub fn outcome(&self, what: &str, outcome: &TransferOutcome) {
        if outcome.success {
            self.success(&format!("{} {}", outcome.status, what));
        } else {
            self.error(&format!("{} failed with status {}", what, outcome.status));
            if !outcome.body.is_empty() {
                eprintln!("{}", outcome.body);
            }
        }
    }

    /// Report a failed operation, with a hint when the error carries one.
    pub fn failure(&self, err: &TransferError) {
        self.error(&err.to_string());
        if let TransferError::Protocol { body, .. } = err {
            if !body.is_empty() {
                eprintln!("{}", body);
            }
        }
        if let Some(help) = err.help_text() {
            self.status(help);
        }
    }
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_output_creation() {
        let _out = CliOutput::new();

        let colored = CliOutput::with_color(true);
        assert!(colored.use_color);

        let plain = CliOutput::with_color(false);
        assert!(!plain.use_color);
    }

    #[test]
    fn test_reporting_methods_do_not_panic() {
        let out = CliOutput::with_color(false);
        out.error("an error");
        out.warning("a warning");
        out.success("200 notes.txt");
        out.status("Preview file notes.txt ...");
        out.outcome(
            "notes.txt",
            &TransferOutcome {
                success: true,
                status: 200,
                body: String::new(),
            },
        );
        out.outcome(
            "notes.txt",
            &TransferOutcome {
                success: false,
                status: 500,
                body: "server said no".to_string(),
            },
        );
        out.failure(&TransferError::NoLatestFile);
    }

    #[test]
    fn test_default_trait() {
        let _out: CliOutput = Default::default();
    }
}
