//! Console printer with ANSI colors, used for verbose agent progress and the
//! CLI report.

use serde::{Deserialize, Serialize};

/// Colors available to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    BoldRed,
    BoldGreen,
    BoldYellow,
    BoldCyan,
    BoldPurple,
}

impl PrinterColor {
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldRed => "\x1b[1;31m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldPurple => "\x1b[1;35m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Stateless colored printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer;

impl Printer {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `content` in the escape codes for `color`.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        format!("{}{}{}", color.ansi_code(), content, RESET)
    }

    /// Print a line to stdout.
    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }

    /// Print a line to stderr.
    pub fn eprint(&self, content: &str, color: PrinterColor) {
        eprintln!("{}", self.paint(content, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_and_resets() {
        let painted = Printer::new().paint("done", PrinterColor::BoldGreen);
        assert!(painted.starts_with("\x1b[1;32m"));
        assert!(painted.ends_with(RESET));
        assert!(painted.contains("done"));
    }
}
