//! Presentation strategies for the status line.
//!
//! A [`StatusView`] is built once per render; a [`Presenter`] turns it into
//! the final text, so styles differ only in layout and color.

mod palette;
mod plain;
mod powerline;
pub mod view;

pub use palette::Palette;
pub use plain::PlainPresenter;
pub use powerline::PowerlinePresenter;
pub use view::{StatusView, ViewOptions};

use crate::config::RenderStyle;

/// Turns a view into printable text (may contain ANSI escapes)
pub trait Presenter {
    fn render(&self, view: &StatusView) -> String;
}

/// Presenter for a configured style
pub fn presenter_for(style: RenderStyle, palette: Palette) -> Box<dyn Presenter> {
    match style {
        RenderStyle::Plain => Box::new(PlainPresenter::new(palette)),
        RenderStyle::Powerline => Box::new(PowerlinePresenter::new(palette)),
    }
}
