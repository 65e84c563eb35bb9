use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::scoring;
use crate::session::result::SessionSummary;
use crate::ui::theme::Theme;

/// End-of-lesson summary screen.
pub struct Dashboard<'a> {
    pub summary: &'a SessionSummary,
    pub previous_best_stars: Option<u8>,
    pub persistence_error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(summary: &'a SessionSummary, theme: &'a Theme) -> Self {
        Self {
            summary,
            previous_best_stars: None,
            persistence_error: None,
            theme,
        }
    }

    pub fn previous_best_stars(mut self, stars: Option<u8>) -> Self {
        self.previous_best_stars = stars;
        self
    }

    pub fn persistence_error(mut self, message: Option<&'a str>) -> Self {
        self.persistence_error = message;
        self
    }

    pub fn headline(&self) -> &'static str {
        if self.summary.is_excellent() {
            "Excellent work! Your fingers know where F and J live."
        } else {
            "Nice effort! Run it again to build muscle memory."
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let summary = self.summary;

        let block = Block::bordered()
            .title(" Lesson Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(5),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let stars = Paragraph::new(Line::from(Span::styled(
            scoring::star_string(summary.stars),
            Style::default()
                .fg(colors.warning())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        stars.render(layout[0], buf);

        let headline_color = if summary.is_excellent() {
            colors.success()
        } else {
            colors.accent()
        };
        Paragraph::new(Line::from(Span::styled(
            self.headline(),
            Style::default().fg(headline_color),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let acc_color = if summary.accuracy >= 0.95 {
            colors.success()
        } else if summary.accuracy >= 0.8 {
            colors.warning()
        } else {
            colors.error()
        };
        let label = Style::default().fg(colors.fg());
        let dim = Style::default().fg(colors.text_pending());
        let practice = vec![
            Line::from(vec![
                Span::styled("  Accuracy:     ", label),
                Span::styled(
                    format!("{:.0}%", summary.accuracy_percent()),
                    Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({}/{} correct)", summary.correct, summary.total_attempts()),
                    dim,
                ),
            ]),
            Line::from(vec![
                Span::styled("  Keys pressed: ", label),
                Span::styled(summary.total_attempts().to_string(), label),
            ]),
            Line::from(vec![
                Span::styled("  Best streak:  ", label),
                Span::styled(
                    summary.best_streak.to_string(),
                    Style::default().fg(colors.accent()),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Errors:       ", label),
                Span::styled(
                    summary.errors.to_string(),
                    Style::default().fg(if summary.errors == 0 {
                        colors.success()
                    } else {
                        colors.error()
                    }),
                ),
            ]),
        ];
        Paragraph::new(practice).render(layout[2], buf);

        let game = &summary.game;
        let game_lines = vec![
            Line::from(Span::styled(
                "  Mini-game",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("  Caught:       ", label),
                Span::styled(format!("{}/{}", game.caught, game.shown), label),
                Span::styled(format!("  (score {})", game.score), dim),
            ]),
            Line::from(vec![
                Span::styled("  Wasted:       ", label),
                Span::styled(game.wasted_presses.to_string(), label),
            ]),
        ];
        Paragraph::new(game_lines).render(layout[3], buf);

        let mut notes = Vec::new();
        if let Some(best) = self.previous_best_stars {
            notes.push(Line::from(Span::styled(
                format!("  Your best so far: {}", scoring::star_string(best)),
                dim,
            )));
        }
        if let Some(message) = self.persistence_error {
            notes.push(Line::from(Span::styled(
                format!("  {message}"),
                Style::default().fg(colors.warning()),
            )));
        }
        Paragraph::new(notes)
            .wrap(Wrap { trim: false })
            .render(layout[4], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [r/Enter] Practice again  ", Style::default().fg(colors.accent())),
            Span::styled("[x] Reset progress  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Home", Style::default().fg(colors.accent())),
        ]))
        .render(layout[5], buf);
    }
}
