use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::session::lesson::Lesson;
use crate::session::stage::{IntroStep, Stage};
use crate::ui::theme::Theme;

/// Overall position in the lesson, 0.0 at preflight and 1.0 on the summary.
/// Drills and the mini-game contribute partial progress within their step.
pub fn lesson_ratio(lesson: &Lesson) -> f64 {
    let stage = lesson.stage();
    let within = match stage {
        Stage::Intro => match lesson.intro_step() {
            IntroStep::Posture => 0.0,
            IntroStep::DiscoverF => 0.25,
            IntroStep::DiscoverJ => 0.5,
            IntroStep::Ready => 0.75,
        },
        Stage::DrillF | Stage::DrillJ | Stage::DrillMix => lesson.drill().progress(),
        Stage::GameTutorial => lesson.tutorial_step() as f64 / 2.0,
        Stage::Game => {
            let total = lesson.settings().game_seconds.max(1) as f64;
            1.0 - lesson.game().time_left as f64 / total
        }
        Stage::Preflight | Stage::Summary => 0.0,
    };
    let steps = (Stage::COUNT - 1) as f64;
    ((stage.ordinal() as f64 + within) / steps).clamp(0.0, 1.0)
}

pub struct ProgressBar<'a> {
    pub label: String,
    pub detail: String,
    pub ratio: f64,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, detail: &str, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            detail: detail.to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            theme,
        }
    }

    pub fn for_lesson(lesson: &Lesson, theme: &'a Theme) -> Self {
        let stage = lesson.stage();
        let label = format!(
            "Step {} of {}: {}",
            stage.ordinal() + 1,
            Stage::COUNT,
            stage.label()
        );
        let detail = if stage.is_drill() {
            let drill = lesson.drill();
            format!("{}/{}", drill.index, drill.sequence.len())
        } else if stage == Stage::Game {
            format!("{}s left", lesson.game().time_left)
        } else {
            String::new()
        };
        Self::new(&label, &detail, lesson_ratio(lesson), theme)
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        if !self.detail.is_empty() {
            let width = self.detail.chars().count() as u16;
            let label_x = inner.x + inner.width.saturating_sub(width) / 2;
            buf.set_string(label_x, inner.y, &self.detail, Style::default().fg(colors.fg()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::lesson::{Action, LessonEvent, LessonSettings};
    use std::time::Duration;

    #[test]
    fn test_ratio_moves_forward_through_lesson() {
        let mut lesson = Lesson::with_seed(LessonSettings::default(), 3);
        let t = Duration::ZERO;
        assert_eq!(lesson_ratio(&lesson), 0.0);

        lesson.apply(t, LessonEvent::Key('a'));
        let intro = lesson_ratio(&lesson);
        assert!(intro > 0.0);

        lesson.apply(t, LessonEvent::Action(Action::BeginDiscovery));
        let discover = lesson_ratio(&lesson);
        assert!(discover > intro);

        for ch in "fffjjj".chars() {
            lesson.apply(t, LessonEvent::Key(ch));
        }
        lesson.apply(t, LessonEvent::Action(Action::StartPractice));
        let drill_start = lesson_ratio(&lesson);
        lesson.apply(t, LessonEvent::Key('f'));
        assert!(lesson_ratio(&lesson) > drill_start);
    }

    #[test]
    fn test_progress_label_names_stage() {
        let theme = Theme::default();
        let lesson = Lesson::with_seed(LessonSettings::default(), 3);
        let bar = ProgressBar::for_lesson(&lesson, &theme);
        assert_eq!(bar.label, "Step 1 of 8: Keyboard check");
        assert!(bar.detail.is_empty());
    }
}
