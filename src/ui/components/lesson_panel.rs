use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::keyboard::finger;
use crate::session::lesson::{DISCOVERY_TARGET, Lesson};
use crate::session::stage::{IntroStep, Stage};
use crate::ui::theme::Theme;

/// Instruction text for the current stage, before feedback is appended.
pub fn instructions(lesson: &Lesson) -> Vec<String> {
    match lesson.stage() {
        Stage::Preflight if lesson.preflight_expired() => vec![
            "We didn't see any keys.".to_string(),
            "Check that your keyboard is connected, then press Enter to try again.".to_string(),
        ],
        Stage::Preflight => vec![
            "Keyboard check".to_string(),
            "Press any key to show us your keyboard works.".to_string(),
        ],
        Stage::Intro => match lesson.intro_step() {
            IntroStep::Posture => vec![
                "Sit up straight with both feet on the floor.".to_string(),
                "Rest your fingers lightly on the middle row of keys.".to_string(),
                "Feel the small bumps on F and J? Those are your anchors.".to_string(),
                "Press Enter to find them.".to_string(),
            ],
            IntroStep::DiscoverF => {
                let counts = lesson.intro_counts();
                vec![
                    format!("Find F with your {}.", finger::finger_name('F')),
                    format!("F presses: {}/{DISCOVERY_TARGET}", counts.f),
                ]
            }
            IntroStep::DiscoverJ => {
                let counts = lesson.intro_counts();
                vec![
                    format!("Find J with your {}.", finger::finger_name('J')),
                    format!("J presses: {}/{DISCOVERY_TARGET}", counts.j),
                ]
            }
            IntroStep::Ready => vec![
                "You found both anchors.".to_string(),
                "Press Enter to start practice.".to_string(),
            ],
        },
        Stage::DrillF | Stage::DrillJ | Stage::DrillMix => {
            let mut lines = vec![match lesson.drill().expected() {
                Some(key) => format!("Press {key} with your {}.", finger::finger_name(key)),
                None => "Drill complete.".to_string(),
            }];
            if lesson.can_skip() {
                lines.push("Stuck? Press Enter to skip this one.".to_string());
            }
            lines
        }
        Stage::GameTutorial => {
            let key = lesson.target_key().unwrap_or('F');
            vec![
                "In the game, letters fall from the sky.".to_string(),
                format!("Catch one by pressing its key. Try it: press {key}."),
            ]
        }
        Stage::Game => vec![],
        Stage::Summary => vec!["Lesson complete.".to_string()],
    }
}

/// Drill sequence with the current prompt bracketed and finished prompts
/// dimmed, e.g. `F F [F] F`.
fn drill_spans<'a>(lesson: &Lesson, theme: &'a Theme) -> Line<'a> {
    let colors = &theme.colors;
    let drill = lesson.drill();
    let spans = drill
        .sequence
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            if i < drill.index {
                Span::styled(format!(" {ch} "), Style::default().fg(colors.text_correct()))
            } else if i == drill.index {
                let style = if lesson.show_hint() {
                    Style::default()
                        .fg(colors.bg())
                        .bg(colors.key_target())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
                };
                Span::styled(format!("[{ch}]"), style)
            } else {
                Span::styled(format!(" {ch} "), Style::default().fg(colors.text_pending()))
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

pub struct LessonPanel<'a> {
    pub lesson: &'a Lesson,
    pub theme: &'a Theme,
}

impl<'a> LessonPanel<'a> {
    pub fn new(lesson: &'a Lesson, theme: &'a Theme) -> Self {
        Self { lesson, theme }
    }
}

impl Widget for LessonPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stage = self.lesson.stage();

        let block = Block::bordered()
            .title(format!(" {} ", stage.label()))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = vec![Line::from("")];
        for (i, text) in instructions(self.lesson).into_iter().enumerate() {
            let style = if i == 0 {
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(text, style)));
        }

        if stage.is_drill() {
            lines.push(Line::from(""));
            lines.push(drill_spans(self.lesson, self.theme));
        }

        if stage == Stage::GameTutorial
            && let Some(key) = self.lesson.target_key()
        {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                key.to_string(),
                Style::default()
                    .fg(colors.key_target())
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let feedback = self.lesson.feedback();
        if !feedback.is_empty() {
            let color = match self.lesson.last_pressed() {
                Some(pressed) if !pressed.correct => colors.error(),
                Some(_) => colors.success(),
                None => colors.accent(),
            };
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                feedback.to_string(),
                Style::default().fg(color),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
