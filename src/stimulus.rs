/// A cell on the square grid, addressed by zero-based row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from(v: (usize, usize)) -> Self {
        Position { row: v.0, col: v.1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Orange,
    Pink,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::Orange,
        Color::Pink,
    ];
}

/// One presentation: a colored dot at a grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stimulus {
    pub position: Position,
    pub color: Color,
}

impl Stimulus {
    pub fn new(position: impl Into<Position>, color: Color) -> Self {
        Self {
            position: position.into(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_display_is_uppercase() {
        assert_eq!(Color::Red.to_string(), "RED");
        assert_eq!(Color::Orange.to_string(), "ORANGE");
    }

    #[test]
    fn all_colors_are_distinct() {
        let unique: std::collections::HashSet<_> = Color::ALL.iter().collect();
        assert_eq!(unique.len(), Color::ALL.len());
    }

    #[test]
    fn stimulus_from_tuple() {
        let s = Stimulus::new((1, 2), Color::Cyan);
        assert_eq!(s.position, Position::new(1, 2));
        assert_eq!(s.color, Color::Cyan);
    }
}
