use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::keyboard::finger::{self, Hand};
use crate::session::lesson::PressedKey;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyHighlight {
    None,
    Target,
    Correct,
    Incorrect,
}

/// How a single key is drawn. Feedback on the last press wins over the
/// target glow so a wrong press on the target key still shows red.
pub fn key_highlight(key: char, target: Option<char>, pressed: Option<PressedKey>) -> KeyHighlight {
    let key = key.to_ascii_uppercase();
    if let Some(pressed) = pressed
        && pressed.key.to_ascii_uppercase() == key
    {
        return if pressed.correct {
            KeyHighlight::Correct
        } else {
            KeyHighlight::Incorrect
        };
    }
    if target.map(|t| t.to_ascii_uppercase()) == Some(key) {
        KeyHighlight::Target
    } else {
        KeyHighlight::None
    }
}

const ROWS: &[&[char]] = &[
    &['Q', 'W', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P'],
    &['A', 'S', 'D', 'F', 'G', 'H', 'J', 'K', 'L', ';'],
    &['Z', 'X', 'C', 'V', 'B', 'N', 'M'],
];

pub struct KeyboardDiagram<'a> {
    pub target: Option<char>,
    pub pressed: Option<PressedKey>,
    pub theme: &'a Theme,
}

impl<'a> KeyboardDiagram<'a> {
    pub fn new(target: Option<char>, pressed: Option<PressedKey>, theme: &'a Theme) -> Self {
        Self {
            target,
            pressed,
            theme,
        }
    }
}

impl Widget for KeyboardDiagram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Keyboard ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 30 {
            return;
        }

        let key_width: u16 = 5;
        let offsets: &[u16] = &[1, 3, 5];
        let row_width = ROWS[1].len() as u16 * key_width + offsets[1];
        let left_pad = inner.width.saturating_sub(row_width) / 2;

        for (row_idx, row) in ROWS.iter().enumerate() {
            let y = inner.y + row_idx as u16;
            if y >= inner.y + inner.height {
                break;
            }

            let offset = left_pad + offsets.get(row_idx).copied().unwrap_or(0);

            for (col_idx, &key) in row.iter().enumerate() {
                let x = inner.x + offset + col_idx as u16 * key_width;
                if x + key_width > inner.x + inner.width {
                    break;
                }

                let zone = match finger::qwerty_finger(key).hand {
                    Hand::Left => colors.zone_left(),
                    Hand::Right => colors.zone_right(),
                };

                let highlight = key_highlight(key, self.target, self.pressed);
                let (style, display) = match highlight {
                    KeyHighlight::Correct => (
                        Style::default().fg(colors.bg()).bg(colors.success()),
                        format!("[{key} \u{2713}]"),
                    ),
                    KeyHighlight::Incorrect => (
                        Style::default().fg(colors.bg()).bg(colors.error()),
                        format!("[{key} \u{2715}]"),
                    ),
                    KeyHighlight::Target => (
                        Style::default()
                            .fg(colors.bg())
                            .bg(colors.key_target())
                            .add_modifier(Modifier::BOLD),
                        format!("[ {key} ]"),
                    ),
                    KeyHighlight::None => (
                        Style::default().fg(colors.fg()).bg(zone),
                        format!("[ {key} ]"),
                    ),
                };

                buf.set_string(x, y, &display, style);
                if finger::is_anchor(key) {
                    let key_col = match highlight {
                        KeyHighlight::Correct | KeyHighlight::Incorrect => 1,
                        KeyHighlight::Target | KeyHighlight::None => 2,
                    };
                    let cell = &mut buf[(x + key_col, y)];
                    cell.set_style(cell.style().add_modifier(Modifier::UNDERLINED));
                }
            }
        }
    }
}
