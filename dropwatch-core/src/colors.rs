//! Catppuccin-inspired color palette for terminal output.
//!
//! Uses standard ANSI bright colors for maximum terminal compatibility,
//! mapped to approximate Catppuccin Frappe aesthetics.

use colored::{ColoredString, Colorize};

/// Extension trait for applying Catppuccin-inspired colors to strings.
pub trait CatppuccinExt {
    fn ctp_red(&self) -> ColoredString;
    fn ctp_yellow(&self) -> ColoredString;
    fn ctp_green(&self) -> ColoredString;
    fn sky(&self) -> ColoredString;
    fn lavender(&self) -> ColoredString;
    fn ctp_white(&self) -> ColoredString;
    fn subtext0(&self) -> ColoredString;
    fn overlay1(&self) -> ColoredString;
}

impl<S: AsRef<str>> CatppuccinExt for S {
    fn ctp_red(&self) -> ColoredString {
        self.as_ref().bright_red()
    }

    fn ctp_yellow(&self) -> ColoredString {
        self.as_ref().bright_yellow()
    }

    fn ctp_green(&self) -> ColoredString {
        self.as_ref().bright_green()
    }

    fn sky(&self) -> ColoredString {
        self.as_ref().bright_cyan()
    }

    // Lavender -> bright purple/magenta
    fn lavender(&self) -> ColoredString {
        self.as_ref().bright_purple()
    }

    fn ctp_white(&self) -> ColoredString {
        self.as_ref().bright_white()
    }

    fn subtext0(&self) -> ColoredString {
        self.as_ref().white()
    }

    // Overlay1 -> bright black (gray)
    fn overlay1(&self) -> ColoredString {
        self.as_ref().bright_black()
    }
}
