//! Terminal reporting for the export command.

use console::{Style, Term};

/// Colour of a message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Heading,
    Good,
    Warn,
    Bad,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Heading => Style::new().cyan().bold(),
            Self::Good => Style::new().green(),
            Self::Warn => Style::new().yellow(),
            Self::Bad => Style::new().red(),
        }
    }
}

/// Writes progress, banner and summary lines to stderr.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Write one line in the given tone.
    pub(crate) fn line(&self, tone: Tone, msg: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }

    /// Write an aligned `label value` banner row.
    pub(crate) fn field(&self, label: &str, value: &str) {
        let label = Style::new().dim().apply_to(field_label(label));
        let _ = self.term.write_line(&format!("  {label} {value}"));
    }

    /// Write a horizontal rule.
    pub(crate) fn rule(&self) {
        let _ = self.term.write_line(&"-".repeat(RULE_WIDTH));
    }
}

const RULE_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 12;

fn field_label(label: &str) -> String {
    format!("{label:<LABEL_WIDTH$}")
}
