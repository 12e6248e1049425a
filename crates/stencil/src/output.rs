//! Colored terminal output utilities.

use std::fmt::Display;

use console::{Style, Term};

/// Terminal output formatter.
///
/// Everything goes to stderr so rendered output piped elsewhere stays clean.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print a `label: value` line with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let label = self.dim.apply_to(format!("{label}:"));
        let _ = self.term.write_line(&format!("{label} {value}"));
    }

    /// Print an engine name, highlighted, followed by a dimmed note.
    pub(crate) fn engine(&self, name: &str, note: &str) {
        let _ = self.term.write_line(&format!(
            "{} {}",
            self.cyan_bold.apply_to(name),
            self.dim.apply_to(note)
        ));
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
