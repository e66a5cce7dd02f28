use ratatui::style::{Color as TermColor, Modifier, Style};

use crate::stimulus::Color;

pub const DOT: &str = "●";
pub const ARROW: &str = "→";
pub const CHECK: &str = "✓";
pub const CROSS: &str = "✗";
pub const STAR: &str = "★";
pub const TROPHY: &str = "🏆";
pub const BRAIN: &str = "🧠";

fn bold(fg: TermColor) -> Style {
    Style::default().fg(fg).add_modifier(Modifier::BOLD)
}

pub fn header() -> Style {
    bold(TermColor::LightCyan)
}

pub fn success() -> Style {
    bold(TermColor::LightGreen)
}

pub fn error() -> Style {
    bold(TermColor::LightRed)
}

pub fn warning() -> Style {
    bold(TermColor::LightYellow)
}

pub fn info() -> Style {
    bold(TermColor::LightBlue)
}

pub fn accent() -> Style {
    bold(TermColor::LightMagenta)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn strong() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Terminal color used to paint a stimulus dot.
pub fn dot_color(color: Color) -> TermColor {
    match color {
        Color::Red => TermColor::LightRed,
        Color::Green => TermColor::LightGreen,
        Color::Yellow => TermColor::LightYellow,
        Color::Blue => TermColor::LightBlue,
        Color::Magenta => TermColor::LightMagenta,
        Color::Cyan => TermColor::LightCyan,
        Color::Orange => TermColor::Indexed(208),
        Color::Pink => TermColor::Indexed(213),
    }
}
