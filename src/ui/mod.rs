//! TUI module for the vocabulary tracker.

mod app;
pub mod theme;
mod widgets;

pub use app::App;
pub use theme::Theme;
