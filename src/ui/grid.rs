use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::theme;
use crate::stimulus::Stimulus;

const CELL_W: usize = 5;

fn border(size: usize, left: &str, join: &str, right: &str) -> String {
    let cell = "═".repeat(CELL_W);
    let mut line = String::from(left);
    line.push_str(&vec![cell; size].join(join));
    line.push_str(right);
    line
}

/// Box-drawn `size`×`size` grid with the stimulus dot painted in its cell.
pub fn grid_lines(size: usize, stimulus: &Stimulus) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(size * 2 + 1);
    lines.push(Line::raw(border(size, "╔", "╦", "╗")));

    let left_pad = (CELL_W - 1) / 2;
    let right_pad = CELL_W - 1 - left_pad;

    for row in 0..size {
        let mut spans = vec![Span::raw("║")];
        for col in 0..size {
            if stimulus.position.row == row && stimulus.position.col == col {
                spans.push(Span::raw(" ".repeat(left_pad)));
                spans.push(Span::styled(
                    theme::DOT,
                    Style::default().fg(theme::dot_color(stimulus.color)),
                ));
                spans.push(Span::raw(" ".repeat(right_pad)));
            } else {
                spans.push(Span::raw(" ".repeat(CELL_W)));
            }
            spans.push(Span::raw("║"));
        }
        lines.push(Line::from(spans));
        if row + 1 < size {
            lines.push(Line::raw(border(size, "╠", "╬", "╣")));
        }
    }

    lines.push(Line::raw(border(size, "╚", "╩", "╝")));
    lines
}

/// `[████░░░░]` filled in proportion to `current / total`.
pub fn progress_bar(current: usize, total: usize, width: usize) -> String {
    let filled = (current * width / total.max(1)).min(width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}
