//! Plain style: colored text with thin dividers.

use crossterm::style::Color;

use super::palette::Palette;
use super::view::{StatusView, UsageView, WindowView};
use super::Presenter;

const DIVIDER: &str = " │ ";
const WARNING: &str = "⚠";

/// Colored text separated by `│`
pub struct PlainPresenter {
    palette: Palette,
}

impl PlainPresenter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    fn base_line(&self, view: &StatusView) -> String {
        let p = &self.palette;
        let mut parts = vec![p.bold(&view.model, Color::Cyan)];

        if let Some(dir) = &view.directory {
            parts.push(p.fg(dir, Color::Blue));
        }
        if let Some(branch) = &view.branch {
            parts.push(p.fg(&format!("⎇ {}", branch), Color::Magenta));
        }
        if let Some(ctx) = &view.context {
            let mut segment = p.severity(&ctx.label(), ctx.severity);
            if ctx.warning {
                segment.push(' ');
                segment.push_str(&p.bold(WARNING, Color::Red));
            }
            parts.push(segment);
        }

        parts.join(p.dim(DIVIDER).as_str())
    }

    fn window_line(&self, window: &WindowView) -> String {
        let mut line = self.palette.severity(&window.headline(), window.severity);
        let reset = window.reset_text();
        if !reset.is_empty() {
            line.push(' ');
            line.push_str(&self.palette.dim(&reset));
        }
        line
    }

    fn model_line(&self, usage: &UsageView) -> Option<String> {
        if usage.models.is_empty() {
            return None;
        }
        let p = &self.palette;
        let parts: Vec<String> = usage
            .models
            .iter()
            .map(|model| {
                let label = model.label();
                match (model.severity, model.active) {
                    (Some(severity), true) => {
                        p.bold(&label, Palette::severity_color(severity))
                    }
                    (Some(severity), false) => p.severity(&label, severity),
                    (None, _) => p.dim(&label),
                }
            })
            .collect();
        Some(parts.join(p.dim(" · ").as_str()))
    }
}

impl Presenter for PlainPresenter {
    fn render(&self, view: &StatusView) -> String {
        let mut lines = vec![self.base_line(view)];

        if let Some(usage) = &view.usage {
            lines.push(self.window_line(&usage.five_hour));
            if let Some(seven_day) = &usage.seven_day {
                lines.push(self.window_line(seven_day));
            }
            if let Some(models) = self.model_line(usage) {
                lines.push(models);
            }
        }

        lines.join("\n")
    }
}
