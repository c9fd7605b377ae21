//! Powerline style: background-colored segments joined by arrow glyphs.

use crossterm::style::Color;

use super::palette::Palette;
use super::view::{StatusView, WindowView};
use super::Presenter;

const ARROW: &str = "\u{e0b0}";
const THIN_ARROW: &str = "\u{e0b1}";

struct Segment {
    text: String,
    fg: Color,
    bg: Color,
    bold: bool,
}

impl Segment {
    fn new(text: impl Into<String>, fg: Color, bg: Color) -> Self {
        Self {
            text: text.into(),
            fg,
            bg,
            bold: false,
        }
    }

    fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// Segments with colored backgrounds and powerline arrows
pub struct PowerlinePresenter {
    palette: Palette,
}

impl PowerlinePresenter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    fn chain(&self, segments: &[Segment]) -> String {
        if !self.palette.enabled() {
            return segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(format!(" {} ", THIN_ARROW).as_str());
        }

        let mut out = String::new();
        for (i, seg) in segments.iter().enumerate() {
            let text = format!(" {} ", seg.text);
            if seg.bold {
                out.push_str(&self.palette.bold_block(&text, seg.fg, seg.bg));
            } else {
                out.push_str(&self.palette.block(&text, seg.fg, seg.bg));
            }
            match segments.get(i + 1) {
                Some(next) => out.push_str(&self.palette.block(ARROW, seg.bg, next.bg)),
                None => out.push_str(&self.palette.fg(ARROW, seg.bg)),
            }
        }
        out
    }

    fn window_segments(window: &WindowView) -> Vec<Segment> {
        let mut segments = vec![Segment::new(
            window.headline(),
            Color::Black,
            Palette::severity_color(window.severity),
        )];
        let reset = window.reset_text();
        if !reset.is_empty() {
            segments.push(Segment::new(reset, Color::White, Color::DarkGrey));
        }
        segments
    }

    fn base_segments(view: &StatusView) -> Vec<Segment> {
        let mut segments = vec![Segment::new(view.model.as_str(), Color::Black, Color::Cyan)];
        if let Some(dir) = &view.directory {
            segments.push(Segment::new(dir.as_str(), Color::White, Color::Blue));
        }
        if let Some(branch) = &view.branch {
            segments.push(Segment::new(
                format!("⎇ {}", branch),
                Color::White,
                Color::Magenta,
            ));
        }
        if let Some(ctx) = &view.context {
            let text = if ctx.warning {
                format!("{} ⚠", ctx.label())
            } else {
                ctx.label()
            };
            segments.push(Segment::new(
                text,
                Color::Black,
                Palette::severity_color(ctx.severity),
            ));
        }
        segments
    }
}

impl Presenter for PowerlinePresenter {
    fn render(&self, view: &StatusView) -> String {
        let mut lines = vec![self.chain(&Self::base_segments(view))];

        if let Some(usage) = &view.usage {
            lines.push(self.chain(&Self::window_segments(&usage.five_hour)));
            if let Some(seven_day) = &usage.seven_day {
                lines.push(self.chain(&Self::window_segments(seven_day)));
            }
            if !usage.models.is_empty() {
                let segments: Vec<Segment> = usage
                    .models
                    .iter()
                    .map(|model| {
                        let bg = model
                            .severity
                            .map(Palette::severity_color)
                            .unwrap_or(Color::DarkGrey);
                        Segment::new(model.label(), Color::Black, bg).bold(model.active)
                    })
                    .collect();
                lines.push(self.chain(&segments));
            }
        }

        lines.join("\n")
    }
}
