mod settings;

pub use settings::{Config, DisplaySettings, RenderStyle, Settings};
