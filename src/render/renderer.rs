use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
};

use crate::game::{Direction, GameState, Phase, Position};
use crate::metrics::SessionStats;
use crate::pose::Posture;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const SIDE_PANEL_WIDTH: u16 = 32;
/// Terminal columns per grid cell
const CELL_COLUMNS: u16 = 2;

/// What the posture panel shows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseView {
    /// A pose feed is attached
    pub active: bool,
    /// Posture currently accumulating dwell time
    pub pending: Option<Posture>,
    /// Dwell progress of the pending posture, 0..=1
    pub progress: f32,
    /// Most recent command the classifier emitted
    pub last_emitted: Option<Direction>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Grid cells that fit on the board for a terminal of `area`, as
    /// (columns, rows) in container units of one cell each
    pub fn board_capacity(area: Rect) -> (u32, u32) {
        let columns = area
            .width
            .saturating_sub(SIDE_PANEL_WIDTH)
            .saturating_sub(2)
            / CELL_COLUMNS;
        let rows = area
            .height
            .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT)
            .saturating_sub(2);
        (columns as u32, rows as u32)
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        grid: (u32, u32),
        stats: &SessionStats,
        pose: &PoseView,
    ) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, stats), chunks[0]);

        let body = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(SIDE_PANEL_WIDTH)])
            .split(chunks[1]);

        match state.phase() {
            Phase::GameOver => frame.render_widget(self.render_game_over(state, stats), body[0]),
            _ => frame.render_widget(self.render_grid(state, grid), body[0]),
        }

        self.render_side_panel(frame, body[1], stats, pose);

        frame.render_widget(self.render_controls(state), chunks[2]);
    }

    fn render_grid(&self, state: &GameState, (width, height): (u32, u32)) -> Paragraph<'_> {
        let mut lines = Vec::new();
        let head = state.head();

        for y in 0..height {
            let mut spans = Vec::new();

            for x in 0..width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.is_occupied_by_snake(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = match state.phase() {
            Phase::NotStarted => " Snake - press Space or raise a limb to start ",
            _ => " Snake ",
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, stats: &SessionStats) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(stats.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(stats.format_time(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_side_panel(&self, frame: &mut Frame, area: Rect, stats: &SessionStats, pose: &PoseView) {
        let sections = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        frame.render_widget(self.render_posture_pad(pose), sections[0]);

        let (label, ratio) = match pose.pending {
            Some(posture) => (posture.label(), pose.progress.clamp(0.0, 1.0) as f64),
            None => ("no posture", 0.0),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Hold "))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, sections[1]);

        frame.render_widget(self.render_fitness(stats), sections[2]);
    }

    /// Cross of the four postures, highlighting the pending one
    fn render_posture_pad(&self, pose: &PoseView) -> Paragraph<'_> {
        let cell = |posture: Posture, text: &'static str| {
            let style = if pose.pending == Some(posture) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Span::styled(text, style)
        };

        let last = match pose.last_emitted {
            Some(direction) => direction.as_str(),
            None => "-",
        };

        let text = vec![
            Line::from(cell(Posture::RightLegRaised, " R-leg ↑ ")),
            Line::from(vec![
                cell(Posture::LeftHandRaised, " ← L-hand "),
                Span::raw(" "),
                cell(Posture::RightHandRaised, " R-hand → "),
            ]),
            Line::from(cell(Posture::LeftLegRaised, " L-leg ↓ ")),
            Line::from(vec![
                Span::styled("last: ", Style::default().fg(Color::Yellow)),
                Span::raw(last),
            ]),
        ];

        let title = if pose.active { " Pose (live) " } else { " Pose (off) " };

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title))
    }

    fn render_fitness(&self, stats: &SessionStats) -> Paragraph<'_> {
        let row = |name: &'static str, value: String| {
            Line::from(vec![
                Span::styled(name, Style::default().fg(Color::Yellow)),
                Span::styled(value, Style::default().fg(Color::White)),
            ])
        };

        let text = vec![
            row("Food eaten:  ", stats.food_eaten.to_string()),
            row("Moves:       ", stats.moves.to_string()),
            row("Moves/min:   ", stats.moves_per_minute().to_string()),
            row("Games:       ", stats.games_played.to_string()),
            Line::from(""),
            row("Left hand:   ", stats.postures.left_hand.to_string()),
            row("Right hand:  ", stats.postures.right_hand.to_string()),
            row("Left leg:    ", stats.postures.left_leg.to_string()),
            row("Right leg:   ", stats.postures.right_leg.to_string()),
            row("Total moves: ", stats.total_moves.to_string()),
            row("Calories:    ", stats.calories().to_string()),
        ];

        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Stats "))
    }

    fn render_game_over(&self, state: &GameState, stats: &SessionStats) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Best: ", Style::default().fg(Color::Yellow)),
                Span::raw(stats.high_score.to_string()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to reset, ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to play again or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, state: &GameState) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" / "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" / raise a hand or knee to steer | "),
        ];
        if state.phase() != Phase::Running {
            spans.push(Span::styled("Space", Style::default().fg(Color::Green)));
            spans.push(Span::raw(" start | "));
        }
        spans.extend([
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ]);

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
