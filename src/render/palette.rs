//! Terminal colors for the status line.

use crossterm::style::{
    Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor, Stylize,
};
use usageline_core::Severity;

/// Emits ANSI escapes when enabled, bare text otherwise
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether escapes are emitted at all
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Foreground-colored text
    pub fn fg(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold foreground-colored text
    pub fn bold(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Dimmed text for separators and secondary details
    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            text.dim().to_string()
        } else {
            text.to_string()
        }
    }

    /// Text drawn on a colored background, leaving colors reset afterwards
    pub fn block(&self, text: &str, fg: Color, bg: Color) -> String {
        if self.enabled {
            format!(
                "{}{}{}{}",
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                text,
                ResetColor
            )
        } else {
            text.to_string()
        }
    }

    /// Bold text on a colored background; attributes and colors reset afterwards
    pub fn bold_block(&self, text: &str, fg: Color, bg: Color) -> String {
        if self.enabled {
            format!(
                "{}{}{}{}{}",
                SetAttribute(Attribute::Bold),
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                text,
                SetAttribute(Attribute::Reset)
            )
        } else {
            text.to_string()
        }
    }

    /// Color for a severity band
    pub fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Low => Color::Green,
            Severity::Medium => Color::Yellow,
            Severity::High => Color::Red,
        }
    }

    /// Text colored by severity
    pub fn severity(&self, text: &str, severity: Severity) -> String {
        self.fg(text, Self::severity_color(severity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_palette_is_plain() {
        let palette = Palette::new(false);
        assert_eq!(palette.fg("x", Color::Red), "x");
        assert_eq!(palette.bold("x", Color::Red), "x");
        assert_eq!(palette.dim("x"), "x");
        assert_eq!(palette.block("x", Color::Black, Color::Blue), "x");
        assert_eq!(palette.severity("44%", Severity::High), "44%");
    }

    #[test]
    fn test_enabled_palette_emits_escapes() {
        temp_env::with_var_unset("NO_COLOR", || {
            let palette = Palette::new(true);
            let out = palette.severity("44%", Severity::Low);
            assert!(out.contains("44%"));
            assert!(out.contains("\u{1b}["));

            let block = palette.block(" 5h ", Color::Black, Color::Green);
            assert!(block.starts_with("\u{1b}["));
            assert!(block.ends_with("\u{1b}[0m"));
        });
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(Palette::severity_color(Severity::Low), Color::Green);
        assert_eq!(Palette::severity_color(Severity::Medium), Color::Yellow);
        assert_eq!(Palette::severity_color(Severity::High), Color::Red);
    }
}
