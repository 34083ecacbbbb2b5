// SPDX-License-Identifier: MIT

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers and entity names.
    pub const HEADER: u8 = 74;
    /// Muted / secondary text: status lines, hints.
    pub const MUTED: u8 = 245;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR` (non-empty) disables -> `FOREMAN_COLOR` (non-empty)
/// forces -> TTY check.
pub fn should_colorize() -> bool {
    if crate::env::is_set(crate::env::NO_COLOR) {
        return false;
    }
    if crate::env::is_set(crate::env::FORCE_COLOR) {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::MUTED)))))
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

/// Format text with the header color.
pub fn header(text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(codes::HEADER), text, RESET)
    } else {
        text.to_string()
    }
}

/// Format text with the muted color.
pub fn muted(text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(codes::MUTED), text, RESET)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
