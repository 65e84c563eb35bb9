use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::session::game::{GROUND, Game, Letter, LetterKind};
use crate::ui::theme::Theme;

/// Screen cell for a falling letter. F letters fall in the left half and J
/// letters in the right half; the id spreads them out within their half.
pub fn letter_cell(letter: &Letter, area: Rect) -> Option<(u16, u16)> {
    if area.width < 4 || area.height == 0 {
        return None;
    }
    let half = area.width / 2;
    let lane_x = match letter.kind {
        LetterKind::F => area.x,
        LetterKind::J => area.x + half,
    };
    let spread = half.saturating_sub(2).max(1);
    let x = lane_x + 1 + (letter.id.wrapping_mul(7) % spread as u64) as u16;

    let row = (letter.y / GROUND * area.height as f64).floor();
    if !(0.0..area.height as f64).contains(&row) {
        return None;
    }
    Some((x, area.y + row as u16))
}

pub struct GameField<'a> {
    pub game: &'a Game,
    pub theme: &'a Theme,
}

impl<'a> GameField<'a> {
    pub fn new(game: &'a Game, theme: &'a Theme) -> Self {
        Self { game, theme }
    }
}

impl Widget for GameField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stats = &self.game.stats;

        let title = format!(
            " {}s | Score {} | Caught {}/{} | {} ",
            self.game.time_left,
            stats.score,
            stats.caught,
            stats.shown,
            self.game.difficulty.label()
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 {
            return;
        }

        let sky = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
        let ground_y = inner.y + inner.height - 1;
        for x in inner.x..inner.x + inner.width {
            buf[(x, ground_y)]
                .set_symbol("\u{2594}")
                .set_style(Style::default().fg(colors.border()));
        }

        for letter in &self.game.letters {
            let Some((x, y)) = letter_cell(letter, sky) else {
                continue;
            };
            let color = match letter.kind {
                LetterKind::F => colors.accent(),
                LetterKind::J => colors.key_target(),
            };
            buf.set_string(
                x,
                y,
                letter.kind.as_char().to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
        }
    }
}
