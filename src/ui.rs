pub mod grid;
pub mod theme;

use std::io;

use ratatui::{
    backend::Backend,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use crate::display::{Feedback, Redraw, StimulusView, TrialDisplay};
use crate::scores::{level_label, top_records, ScoreTable};
use crate::session::{SessionConfig, SessionState, SessionSummary};
use crate::stimulus::Stimulus;

const PROGRESS_WIDTH: usize = 30;
const TOP_SCORES: usize = 10;

/// One selectable line in a settings step. `marked` flags the recommended
/// choice.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuOption {
    pub key: char,
    pub label: String,
    pub detail: String,
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsStep {
    pub number: usize,
    pub of: usize,
    pub title: &'static str,
    pub options: Vec<MenuOption>,
}

#[derive(Debug, Clone)]
struct ScoreRow {
    level: String,
    accuracy: f64,
    score: u32,
    total: u32,
    date: String,
}

#[derive(Debug, Clone)]
struct StimulusScreen {
    stimulus: Stimulus,
    n: usize,
    grid_size: usize,
    view: StimulusView,
    score: u32,
    opportunities: u32,
    accuracy: f64,
    feedback: Option<Feedback>,
}

#[derive(Debug, Clone)]
enum Screen {
    Blank,
    Ready {
        n: usize,
        grid_size: usize,
        trials: usize,
        window_secs: f64,
    },
    Stimulus(StimulusScreen),
    Memorized,
    Help,
    Scores(Vec<ScoreRow>),
    Summary(SessionSummary),
    Menu,
    Settings(SettingsStep),
    Farewell,
}

/// Renders every screen of the game onto a ratatui terminal.
pub struct TerminalDisplay<B: Backend> {
    terminal: Terminal<B>,
    screen: Screen,
    warnings: Vec<String>,
}

impl<B: Backend> TerminalDisplay<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            screen: Screen::Blank,
            warnings: Vec::new(),
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Adds a warning line shown at the bottom of every screen until
    /// `clear_warnings` is called.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Drops the warning footer. Takes effect on the next draw.
    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    fn set(&mut self, screen: Screen) -> io::Result<()> {
        self.screen = screen;
        self.redraw()
    }

    pub fn show_menu(&mut self) -> io::Result<()> {
        self.set(Screen::Menu)
    }

    pub fn show_settings(&mut self, step: SettingsStep) -> io::Result<()> {
        self.set(Screen::Settings(step))
    }

    pub fn show_farewell(&mut self) -> io::Result<()> {
        self.set(Screen::Farewell)
    }
}

impl<B: Backend> Redraw for TerminalDisplay<B> {
    fn redraw(&mut self) -> io::Result<()> {
        self.terminal
            .draw(|f| render(f, &self.screen, &self.warnings))?;
        Ok(())
    }
}

impl<B: Backend> TrialDisplay for TerminalDisplay<B> {
    fn show_ready(&mut self, config: &SessionConfig) -> io::Result<()> {
        self.set(Screen::Ready {
            n: config.n(),
            grid_size: config.grid_size(),
            trials: config.trial_count(),
            window_secs: config.response_window().as_secs_f64(),
        })
    }

    fn show_stimulus(
        &mut self,
        stimulus: &Stimulus,
        config: &SessionConfig,
        state: &SessionState,
        view: StimulusView,
    ) -> io::Result<()> {
        self.set(Screen::Stimulus(StimulusScreen {
            stimulus: *stimulus,
            n: config.n(),
            grid_size: config.grid_size(),
            view,
            score: state.score,
            opportunities: state.opportunities,
            accuracy: state.accuracy().unwrap_or(0.0),
            feedback: None,
        }))
    }

    fn show_feedback(&mut self, feedback: Feedback) -> io::Result<()> {
        if let Screen::Stimulus(ref mut s) = self.screen {
            s.feedback = Some(feedback);
        }
        self.redraw()
    }

    fn show_memorized(&mut self) -> io::Result<()> {
        self.set(Screen::Memorized)
    }

    fn show_help(&mut self) -> io::Result<()> {
        self.set(Screen::Help)
    }

    fn show_scores(&mut self, table: &ScoreTable) -> io::Result<()> {
        let rows = top_records(table, TOP_SCORES)
            .into_iter()
            .map(|(key, record)| ScoreRow {
                level: level_label(key),
                accuracy: record.accuracy,
                score: record.score,
                total: record.total,
                date: record.date.chars().take(10).collect(),
            })
            .collect();
        self.set(Screen::Scores(rows))
    }

    fn show_summary(&mut self, summary: &SessionSummary) -> io::Result<()> {
        self.set(Screen::Summary(summary.clone()))
    }

    fn show_warning(&mut self, message: &str) -> io::Result<()> {
        self.push_warning(message);
        self.redraw()
    }
}

fn render(f: &mut Frame, screen: &Screen, warnings: &[String]) {
    let area = f.area();
    let lines = match screen {
        Screen::Blank => Vec::new(),
        Screen::Ready {
            n,
            grid_size,
            trials,
            window_secs,
        } => ready_lines(*n, *grid_size, *trials, *window_secs),
        Screen::Stimulus(s) => stimulus_lines(s),
        Screen::Memorized => vec![
            Line::styled(format!("Memory phase complete! {}", theme::CHECK), theme::success()),
            Line::styled("Game starting...", theme::info()),
        ],
        Screen::Help => help_lines(),
        Screen::Scores(rows) => score_lines(rows),
        Screen::Summary(summary) => summary_lines(summary),
        Screen::Menu => menu_lines(),
        Screen::Settings(step) => settings_lines(step),
        Screen::Farewell => vec![Line::styled(
            format!("Thanks for training! Keep improving! {}", theme::BRAIN),
            theme::success(),
        )],
    };

    let footer = warnings.len().min(area.height as usize) as u16;
    let body = Rect {
        height: area.height - footer,
        ..area
    };
    render_centered(f, body, lines);

    if footer > 0 {
        let footer_area = Rect {
            y: area.y + area.height - footer,
            height: footer,
            ..area
        };
        let warning_lines: Vec<Line> = warnings
            .iter()
            .map(|w| Line::styled(format!("⚠ {w}"), theme::warning()))
            .collect();
        f.render_widget(
            Paragraph::new(warning_lines).alignment(Alignment::Center),
            footer_area,
        );
    }
}

fn render_centered(f: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let height = (lines.len() as u16).min(area.height);
    let rect = Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    };
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}

fn banner(title: &str) -> Vec<Line<'static>> {
    let rule = "═".repeat(title.width() + 8);
    vec![
        Line::styled(rule.clone(), theme::header()),
        Line::styled(format!("{} {title} {}", theme::BRAIN, theme::BRAIN), theme::header()),
        Line::styled(rule, theme::header()),
        Line::default(),
    ]
}

fn press_any_key(what: &str) -> Line<'static> {
    Line::styled(format!("Press any key to {what}..."), theme::dim())
}

fn ready_lines(n: usize, grid_size: usize, trials: usize, window_secs: f64) -> Vec<Line<'static>> {
    let item = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label}: "), theme::info()),
            Span::styled(value, theme::strong()),
        ])
    };
    let mut lines = banner("GAME READY");
    lines.extend([
        item("N-Back Level", n.to_string()),
        item("Grid Size", format!("{grid_size}×{grid_size}")),
        item("Trials", trials.to_string()),
        item("Response Time", format!("{window_secs:.1}s")),
        Line::default(),
        Line::styled(
            format!("First, memorize {n} position/color pairs"),
            theme::warning(),
        ),
        Line::styled("Then respond to matches during the game", theme::dim()),
        Line::default(),
        Line::styled("Press any key to begin training...", theme::success()),
    ]);
    lines
}

fn stimulus_lines(s: &StimulusScreen) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(
            format!("DUAL N-BACK TRAINER  {}  Level: {}", theme::BRAIN, s.n),
            theme::header(),
        ),
        Line::default(),
    ];

    if let StimulusView::Trial { number, of } = s.view {
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "Trial: {number}/{of} {} Score: ",
                    grid::progress_bar(number, of, PROGRESS_WIDTH)
                ),
                theme::info(),
            ),
            Span::styled(s.score.to_string(), theme::success()),
            Span::styled(
                format!("/{} ({:.1}%)", s.opportunities, s.accuracy),
                theme::info(),
            ),
        ]));
        lines.push(Line::default());
    }

    lines.extend(grid::grid_lines(s.grid_size, &s.stimulus));
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("L", theme::info()),
        Span::raw(" Location   "),
        Span::styled("A", theme::info()),
        Span::raw(" Color   "),
        Span::styled("SPACE", theme::info()),
        Span::raw(" Both   "),
        Span::styled("[H]elp [Q]uit [S]cores", theme::dim()),
    ]));
    lines.push(Line::default());

    match s.view {
        StimulusView::Memorize { item, of } => lines.push(Line::styled(
            format!("Memorize item {item} of {of}"),
            theme::warning(),
        )),
        StimulusView::Trial { .. } => lines.push(feedback_line(s.feedback)),
    }
    lines
}

fn feedback_line(feedback: Option<Feedback>) -> Line<'static> {
    match feedback {
        None => Line::default(),
        Some(Feedback::TimesUp) => Line::styled("⏱ Time's up!", theme::dim()),
        Some(Feedback::Incorrect) => {
            Line::styled(format!("{} Incorrect!", theme::CROSS), theme::error())
        }
        Some(Feedback::Correct { points }) => Line::styled(
            format!(
                "{} Correct! +{points} point{}",
                theme::CHECK,
                if points > 1 { "s" } else { "" }
            ),
            theme::success(),
        ),
    }
}

fn help_lines() -> Vec<Line<'static>> {
    let arrow = |text: &str| {
        Line::from(vec![
            Span::styled(theme::ARROW, theme::success()),
            Span::raw(format!(" {text}")),
        ])
    };
    let control = |key: &str, text: &str| {
        Line::from(vec![
            Span::styled(format!("{key:<10}"), theme::info()),
            Span::raw(text.to_string()),
        ])
    };

    let mut lines = banner("HELP GUIDE");
    lines.extend([
        Line::styled("What is Dual N-Back?", theme::strong()),
        Line::raw("A cognitive training task that improves working memory"),
        Line::raw("by tracking both position and color sequences."),
        Line::default(),
        Line::styled("How to Play:", theme::strong()),
        arrow("Watch the colored dot appear on the grid"),
        arrow("Remember positions and colors from N steps back"),
        arrow("Press keys when you detect a match"),
        Line::default(),
        Line::styled("Controls:", theme::strong()),
        control("L", "Match in location/position"),
        control("A", "Match in color"),
        control("SPACE", "Both location AND color match"),
        control("H", "Show this help"),
        control("Q", "Quit to menu"),
        control("S", "View high scores"),
        Line::default(),
        press_any_key("continue"),
    ]);
    lines
}

fn score_lines(rows: &[ScoreRow]) -> Vec<Line<'static>> {
    let mut lines = banner(&format!("{} HIGH SCORES {}", theme::TROPHY, theme::TROPHY));

    if rows.is_empty() {
        lines.push(Line::styled("No high scores yet!", theme::dim()));
        lines.push(Line::styled("Play some games to set records.", theme::dim()));
    } else {
        lines.push(Line::styled(
            format!(
                "{:<4} {:<12} {:<12} {:<15} {:<12}",
                "#", "Level", "Accuracy", "Score", "Date"
            ),
            theme::strong(),
        ));
        lines.push(Line::styled("─".repeat(60), theme::dim()));
        for (i, row) in rows.iter().enumerate() {
            let rank = i + 1;
            let style = match rank {
                1 => theme::success(),
                2 | 3 => theme::info(),
                _ => ratatui::style::Style::default(),
            };
            lines.push(Line::styled(
                format!(
                    "{:<4} {:<12} {:<12} {:<15} {:<12}",
                    rank,
                    row.level,
                    format!("{:.1}%", row.accuracy),
                    format!("{}/{}", row.score, row.total),
                    row.date
                ),
                style,
            ));
        }
    }

    lines.push(Line::default());
    lines.push(press_any_key("continue"));
    lines
}

fn summary_lines(summary: &SessionSummary) -> Vec<Line<'static>> {
    let mut lines = banner(&format!(
        "{} TRAINING COMPLETE {}",
        theme::TROPHY,
        theme::TROPHY
    ));

    match (summary.accuracy, summary.rating()) {
        (Some(accuracy), Some(rating)) => {
            let style = match rating.stars() {
                4.. => theme::success(),
                3 => theme::info(),
                2 => theme::warning(),
                _ => theme::error(),
            };
            lines.push(Line::styled(rating.label(), style));
            lines.push(Line::styled(theme::STAR.repeat(rating.stars()), style));
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::styled("Final Score: ", theme::strong()),
                Span::styled(summary.score.to_string(), theme::success()),
                Span::raw(format!("/{}", summary.opportunities)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Accuracy: ", theme::strong()),
                Span::styled(format!("{accuracy:.1}%"), theme::info()),
            ]));
            if summary.new_record {
                lines.push(Line::default());
                lines.push(Line::styled(
                    format!("{} NEW HIGH SCORE! {}", theme::TROPHY, theme::TROPHY),
                    theme::success(),
                ));
            }
        }
        _ => lines.push(Line::styled(
            "No scoring opportunities in this session",
            theme::dim(),
        )),
    }

    lines.push(Line::default());
    lines.push(press_any_key("return to menu"));
    lines
}

fn menu_lines() -> Vec<Line<'static>> {
    let option = |key: &str, style, text: &str| {
        Line::from(vec![
            Span::styled(key.to_string(), style),
            Span::raw(format!(" {} {text}", theme::ARROW)),
        ])
    };
    vec![
        Line::styled(
            format!("{} DUAL N-BACK TRAINER {}", theme::BRAIN, theme::BRAIN),
            theme::header(),
        ),
        Line::styled("Cognitive Enhancement Training", theme::header()),
        Line::default(),
        Line::default(),
        option("1", theme::success(), "Start New Game"),
        Line::default(),
        option("2", theme::info(), "View High Scores"),
        Line::default(),
        option("3", theme::warning(), "Help & Instructions"),
        Line::default(),
        option("4", theme::error(), "Exit"),
        Line::default(),
        Line::default(),
        Line::styled("Select an option (1-4):", theme::dim()),
    ]
}

fn settings_lines(step: &SettingsStep) -> Vec<Line<'static>> {
    let mut lines = banner("GAME CONFIGURATION");
    lines.push(Line::styled(
        format!("Step {} of {}: {}", step.number, step.of, step.title),
        theme::accent(),
    ));
    lines.push(Line::default());
    for opt in &step.options {
        let mut spans = vec![
            Span::styled(opt.key.to_string(), theme::info()),
            Span::raw(format!(" {} {:<10}", theme::ARROW, opt.label)),
        ];
        if !opt.detail.is_empty() {
            spans.push(Span::styled(opt.detail.clone(), theme::dim()));
        }
        if opt.marked {
            spans.push(Span::styled(" (Recommended)", theme::success()));
        }
        lines.push(Line::from(spans));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::ScoreRecord;
    use crate::stimulus::Color;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn display() -> TerminalDisplay<TestBackend> {
        TerminalDisplay::new(Terminal::new(TestBackend::new(100, 40)).unwrap())
    }

    fn content(d: &TerminalDisplay<TestBackend>) -> String {
        d.terminal()
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn config() -> SessionConfig {
        SessionConfig::new(2, 3, 20, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn ready_screen_lists_settings() {
        let mut d = display();
        d.show_ready(&config()).unwrap();
        let text = content(&d);
        assert!(text.contains("GAME READY"));
        assert!(text.contains("Response Time: 2.0s"));
        assert!(text.contains("First, memorize 2 position/color pairs"));
    }

    #[test]
    fn memorize_screen_shows_item_counter() {
        let mut d = display();
        d.show_stimulus(
            &Stimulus::new((0, 0), Color::Red),
            &config(),
            &SessionState::default(),
            StimulusView::Memorize { item: 1, of: 2 },
        )
        .unwrap();
        let text = content(&d);
        assert!(text.contains("Memorize item 1 of 2"));
        assert!(text.contains(theme::DOT));
        assert!(!text.contains("Trial:"));
    }

    #[test]
    fn trial_screen_shows_progress_and_feedback() {
        let mut d = display();
        let state = SessionState {
            score: 3,
            opportunities: 4,
            current_trial_index: 4,
            running: true,
        };
        d.show_stimulus(
            &Stimulus::new((2, 2), Color::Blue),
            &config(),
            &state,
            StimulusView::Trial { number: 5, of: 20 },
        )
        .unwrap();
        let text = content(&d);
        assert!(text.contains("Trial: 5/20"));
        assert!(text.contains("(75.0%)"));

        d.show_feedback(Feedback::Correct { points: 2 }).unwrap();
        assert!(content(&d).contains("Correct! +2 points"));

        d.show_feedback(Feedback::TimesUp).unwrap();
        assert!(content(&d).contains("Time's up!"));
    }

    #[test]
    fn scores_screen_empty_and_filled() {
        let mut d = display();
        d.show_scores(&ScoreTable::new()).unwrap();
        assert!(content(&d).contains("No high scores yet!"));

        let mut table = ScoreTable::new();
        table.insert(
            "DN2_G8".into(),
            ScoreRecord {
                accuracy: 87.5,
                score: 7,
                total: 8,
                date: "2024-03-04 05:06:07".into(),
            },
        );
        d.show_scores(&table).unwrap();
        let text = content(&d);
        assert!(text.contains("N-2 Grid:8"));
        assert!(text.contains("87.5%"));
        assert!(text.contains("7/8"));
        assert!(text.contains("2024-03-04"));
        assert!(!text.contains("05:06:07"));
    }

    #[test]
    fn summary_with_and_without_opportunities() {
        let mut d = display();
        let mut summary = SessionSummary {
            n: 2,
            grid_size: 3,
            score: 2,
            opportunities: 2,
            accuracy: Some(100.0),
            new_record: true,
        };
        d.show_summary(&summary).unwrap();
        let text = content(&d);
        assert!(text.contains("OUTSTANDING!"));
        assert!(text.contains("Accuracy: 100.0%"));
        assert!(text.contains("NEW HIGH SCORE!"));

        summary.accuracy = None;
        summary.opportunities = 0;
        summary.score = 0;
        summary.new_record = false;
        d.show_summary(&summary).unwrap();
        assert!(content(&d).contains("No scoring opportunities in this session"));
    }

    #[test]
    fn warnings_persist_until_cleared() {
        let mut d = display();
        d.push_warning("Could not load scores");
        d.show_ready(&config()).unwrap();
        let text = content(&d);
        assert!(text.contains("GAME READY"));
        assert!(text.contains("Could not load scores"));

        d.show_menu().unwrap();
        assert!(content(&d).contains("Could not load scores"));

        d.clear_warnings();
        d.show_ready(&config()).unwrap();
        assert!(!content(&d).contains("Could not load scores"));
    }

    #[test]
    fn redraw_fills_a_resized_terminal() {
        let mut d = display();
        d.show_menu().unwrap();
        d.terminal.backend_mut().resize(60, 24);
        d.redraw().unwrap();
        let buffer = d.terminal().backend().buffer();
        assert_eq!((buffer.area.width, buffer.area.height), (60, 24));
        assert!(content(&d).contains("DUAL N-BACK TRAINER"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut d = TerminalDisplay::new(Terminal::new(TestBackend::new(10, 3)).unwrap());
        d.show_warning("a").unwrap();
        d.show_warning("b").unwrap();
        d.show_warning("c").unwrap();
        d.show_warning("d").unwrap();
        d.show_help().unwrap();
        d.show_stimulus(
            &Stimulus::new((8, 8), Color::Pink),
            &SessionConfig::new(8, 9, 80, Duration::from_secs(1)).unwrap(),
            &SessionState::default(),
            StimulusView::Trial { number: 80, of: 80 },
        )
        .unwrap();
    }
}
