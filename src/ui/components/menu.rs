use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::scoring;
use crate::store::schema::Lesson1StoredData;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    StartLesson,
    ResetProgress,
    Quit,
}

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: vec![
                MenuItem {
                    key: "1".to_string(),
                    label: "Lesson 1: Home Row Anchors".to_string(),
                    description: "Find F and J, drill them, then catch falling letters".to_string(),
                    action: MenuAction::StartLesson,
                },
                MenuItem {
                    key: "x".to_string(),
                    label: "Reset Progress".to_string(),
                    description: "Clear saved results on this device".to_string(),
                    action: MenuAction::ResetProgress,
                },
                MenuItem {
                    key: "q".to_string(),
                    label: "Quit".to_string(),
                    description: "Leave quill".to_string(),
                    action: MenuAction::Quit,
                },
            ],
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "quill",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Learn to type, one key at a time",
                Style::default().fg(colors.fg()),
            )),
        ];

        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        title.render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{key}] {label}", key = item.key, label = item.label);
            let desc_text = format!("       {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    label_text,
                    Style::default()
                        .fg(if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(
                    desc_text,
                    Style::default().fg(colors.text_pending()),
                )),
            ];

            if let Some(&row) = menu_layout.get(i) {
                Paragraph::new(lines).render(row, buf);
            }
        }
    }
}

/// Card on the home screen summarizing the saved lesson-1 record.
pub struct RecordCard<'a> {
    pub record: Option<&'a Lesson1StoredData>,
    pub theme: &'a Theme,
}

impl<'a> RecordCard<'a> {
    pub fn new(record: Option<&'a Lesson1StoredData>, theme: &'a Theme) -> Self {
        Self { record, theme }
    }

    pub fn lines(&self) -> Vec<String> {
        let Some(record) = self.record else {
            return vec!["No saved progress yet.".to_string()];
        };

        let mut lines = vec![if record.completed {
            "Lesson 1 completed \u{2713}".to_string()
        } else {
            "Lesson 1 not completed yet".to_string()
        }];
        if let Some(stars) = record.best_stars {
            lines.push(format!("Best stars:      {}", scoring::star_string(stars)));
        }
        if let Some(accuracy) = record.best_accuracy {
            lines.push(format!("Best accuracy:   {:.0}%", accuracy * 100.0));
        }
        if let Some(score) = record.best_game_score {
            lines.push(format!("Best game score: {score}"));
        }
        if let Some(played) = record.last_played {
            lines.push(format!("Last played:     {}", played.format("%Y-%m-%d %H:%M UTC")));
        }
        lines
    }
}

impl Widget for RecordCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Your Progress ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let accent = self.record.is_some_and(|r| r.completed);
        let lines: Vec<Line> = self
            .lines()
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let style = if i == 0 && accent {
                    Style::default().fg(colors.success()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(format!(" {text}"), style))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
