use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::session::focus::FocusMonitor;
use crate::session::lesson::{Action, Lesson, LessonEvent};
use crate::session::result::SessionSummary;
use crate::session::stage::{IntroStep, Stage};
use crate::store::progress::ProgressStore;
use crate::store::schema::Lesson1StoredData;
use crate::store::storage::Storage;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

pub const SAVE_FAILED: &str =
    "We couldn't save your progress on this device, but you finished Lesson 1!";
pub const RESET_FAILED: &str = "We couldn't clear saved data, but you can still retry.";
pub const RESET_DONE: &str = "Saved progress cleared. Starting fresh on this device.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    Lesson,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub lesson: Lesson,
    pub focus: FocusMonitor,
    pub progress: ProgressStore<Box<dyn Storage>>,
    /// Lesson-1 record as last read from or written to storage.
    pub stored: Option<Lesson1StoredData>,
    /// Non-blocking persistence problem shown to the learner.
    pub persistence_error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    lesson_origin: Duration,
}

impl App {
    pub fn new(config: Config, storage: Box<dyn Storage>, theme: &'static Theme) -> Self {
        let progress = ProgressStore::new(storage);
        let stored = progress.lesson1();
        let lesson = Lesson::new(config.lesson_settings());
        let focus = FocusMonitor::new(config.idle_timeout());

        Self {
            screen: AppScreen::Home,
            config,
            theme,
            menu: Menu::new(theme),
            lesson,
            focus,
            progress,
            stored,
            persistence_error: None,
            notice: None,
            should_quit: false,
            lesson_origin: Duration::ZERO,
        }
    }

    /// Session clock of the running lesson for app time `now`.
    pub fn lesson_time(&self, now: Duration) -> Duration {
        now.saturating_sub(self.lesson_origin)
    }

    pub fn start_lesson(&mut self, now: Duration) {
        info!("lesson 1 started");
        self.lesson = Lesson::new(self.config.lesson_settings());
        self.lesson_origin = now;
        self.persistence_error = None;
        self.notice = None;
        self.focus.key_pressed(now);
        self.screen = AppScreen::Lesson;
    }

    pub fn go_home(&mut self) {
        self.screen = AppScreen::Home;
        self.stored = self.progress.lesson1();
    }

    pub fn tick(&mut self, now: Duration) {
        if self.screen == AppScreen::Lesson {
            self.send(now, LessonEvent::Tick);
        }
        let typing_expected =
            self.screen == AppScreen::Lesson && self.lesson.stage() != Stage::Summary;
        self.focus.check(now, typing_expected);
    }

    pub fn key_pressed(&mut self, now: Duration) {
        self.focus.key_pressed(now);
    }

    pub fn click(&mut self) {
        self.focus.acknowledge();
    }

    pub fn type_char(&mut self, now: Duration, ch: char) {
        self.send(now, LessonEvent::Key(ch));
    }

    pub fn action(&mut self, now: Duration, action: Action) {
        if action == Action::Restart {
            self.persistence_error = None;
        }
        self.send(now, LessonEvent::Action(action));
    }

    fn send(&mut self, now: Duration, event: LessonEvent) {
        let at = self.lesson_time(now);
        let outcome = self.lesson.apply(at, event);
        if let Some(summary) = outcome.finished {
            self.save_summary(&summary);
        }
    }

    fn save_summary(&mut self, summary: &SessionSummary) {
        match self.progress.record_session(summary, Utc::now()) {
            Ok(saved) => {
                self.stored = Some(saved);
                self.persistence_error = None;
            }
            Err(e) => {
                warn!("keeping summary in memory only: {e}");
                self.persistence_error = Some(SAVE_FAILED.to_string());
            }
        }
    }

    pub fn reset_device_progress(&mut self) {
        match self.progress.reset_progress() {
            Ok(()) => {
                self.stored = None;
                self.notice = Some(RESET_DONE.to_string());
            }
            Err(_) => {
                self.persistence_error = Some(RESET_FAILED.to_string());
            }
        }
    }

    /// What Enter does on the current lesson screen, if anything.
    pub fn primary_action(&self) -> Option<Action> {
        match self.lesson.stage() {
            Stage::Preflight if self.lesson.preflight_expired() => Some(Action::RetryPreflight),
            Stage::Intro => match self.lesson.intro_step() {
                IntroStep::Posture => Some(Action::BeginDiscovery),
                IntroStep::Ready => Some(Action::StartPractice),
                IntroStep::DiscoverF | IntroStep::DiscoverJ => None,
            },
            stage if stage.is_drill() && self.lesson.can_skip() => Some(Action::SkipPrompt),
            Stage::Summary => Some(Action::Restart),
            _ => None,
        }
    }

    /// Best stars from an earlier session that beat this one.
    pub fn better_previous_stars(&self) -> Option<u8> {
        let current = self.lesson.summary()?.stars;
        let best = self.stored.as_ref()?.best_stars?;
        (best > current).then_some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::STORAGE_KEY;
    use crate::store::storage::MemoryStorage;

    fn theme() -> &'static Theme {
        Box::leak(Box::new(Theme::default()))
    }

    fn app_with(storage: MemoryStorage) -> App {
        App::new(Config::default(), Box::new(storage), theme())
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn reach_game(app: &mut App, now: Duration) {
        app.start_lesson(now);
        app.type_char(now, 'a');
        app.action(now, Action::BeginDiscovery);
        for ch in "fffjjj".chars() {
            app.type_char(now, ch);
        }
        app.action(now, Action::StartPractice);
        for ch in "ffffffffffjjjjjjjjjjfjfjjffjfjfjfj".chars() {
            app.type_char(now, ch);
        }
        assert_eq!(app.lesson.stage(), Stage::Game);
    }

    fn play_through(app: &mut App, now: Duration) {
        reach_game(app, now);
        app.tick(now + secs(30));
        assert_eq!(app.lesson.stage(), Stage::Summary);
    }

    #[test]
    fn test_loads_stored_record_on_start() {
        let storage = MemoryStorage::with_entry(
            STORAGE_KEY,
            r#"{"lesson1":{"completed":true,"bestStars":4}}"#,
        );
        let app = app_with(storage);
        assert_eq!(app.screen, AppScreen::Home);
        assert_eq!(app.stored.as_ref().and_then(|s| s.best_stars), Some(4));
    }

    #[test]
    fn test_finished_lesson_is_saved_once() {
        let mut app = app_with(MemoryStorage::new());
        play_through(&mut app, secs(100));
        let saved = app.stored.clone().expect("saved record");
        assert!(saved.completed);
        assert!(app.persistence_error.is_none());

        let raw = app.progress.read();
        assert_eq!(raw.lesson1, Some(saved.clone()));

        app.tick(secs(200));
        app.type_char(secs(201), 'f');
        assert_eq!(app.progress.read().lesson1, Some(saved));
    }

    #[test]
    fn test_failed_save_keeps_summary() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let mut app = app_with(storage);
        play_through(&mut app, secs(0));
        assert_eq!(app.persistence_error.as_deref(), Some(SAVE_FAILED));
        assert!(app.lesson.summary().is_some());
        assert!(app.stored.is_none());
    }

    #[test]
    fn test_reset_device_progress() {
        let storage = MemoryStorage::with_entry(STORAGE_KEY, r#"{"lesson1":{"completed":true}}"#);
        let mut app = app_with(storage);
        app.reset_device_progress();
        assert!(app.stored.is_none());
        assert_eq!(app.notice.as_deref(), Some(RESET_DONE));
        assert!(app.progress.lesson1().is_none());
    }

    #[test]
    fn test_reset_failure_is_reported() {
        let mut storage = MemoryStorage::with_entry(STORAGE_KEY, r#"{"lesson1":{"completed":true}}"#);
        storage.fail_writes = true;
        let mut app = app_with(storage);
        app.reset_device_progress();
        assert_eq!(app.persistence_error.as_deref(), Some(RESET_FAILED));
        assert!(app.stored.is_some());
    }

    #[test]
    fn test_lesson_clock_starts_with_lesson() {
        let mut app = app_with(MemoryStorage::new());
        app.start_lesson(secs(50));
        app.tick(secs(54));
        assert!(!app.lesson.preflight_expired());
        assert_eq!(app.primary_action(), None);
        app.tick(secs(55));
        assert!(app.lesson.preflight_expired());
        assert_eq!(app.primary_action(), Some(Action::RetryPreflight));
    }

    #[test]
    fn test_primary_action_follows_intro() {
        let mut app = app_with(MemoryStorage::new());
        app.start_lesson(secs(0));
        app.type_char(secs(1), 'k');
        assert_eq!(app.primary_action(), Some(Action::BeginDiscovery));
        app.action(secs(1), Action::BeginDiscovery);
        assert_eq!(app.primary_action(), None);
    }

    #[test]
    fn test_idle_focus_flag() {
        let mut app = app_with(MemoryStorage::new());
        app.start_lesson(secs(0));
        app.focus.set_focus(false);
        app.tick(secs(10));
        assert!(app.focus.needs_refocus());
        app.click();
        assert!(!app.focus.needs_refocus());
    }

    #[test]
    fn test_better_previous_stars() {
        let storage = MemoryStorage::with_entry(
            STORAGE_KEY,
            r#"{"lesson1":{"completed":true,"bestStars":5}}"#,
        );
        let mut app = app_with(storage);
        app.start_lesson(secs(0));
        app.type_char(secs(0), 'a');
        app.action(secs(0), Action::BeginDiscovery);
        for ch in "xxxxfffjjj".chars() {
            app.type_char(secs(0), ch);
        }
        app.action(secs(0), Action::StartPractice);
        for ch in "ffffffffffjjjjjjjjjjfjfjjffjfjfjfj".chars() {
            app.type_char(secs(0), ch);
        }
        app.tick(secs(30));
        // 38 correct, 4 errors: 90% earns four stars.
        assert_eq!(app.lesson.summary().map(|s| s.stars), Some(4));
        assert_eq!(app.better_previous_stars(), Some(5));
    }

    #[test]
    fn test_key_after_game_clock_lands_on_summary() {
        let mut app = app_with(MemoryStorage::new());
        reach_game(&mut app, secs(10));
        let correct = app.lesson.correct();
        let errors = app.lesson.errors();

        // No tick in between: the countdown due at this instant fires before
        // the press, so the press is not scored as a wasted game key.
        app.type_char(secs(40), 'f');
        assert_eq!(app.lesson.stage(), Stage::Summary);
        let summary = app.lesson.summary().expect("summary");
        assert_eq!(summary.correct, correct);
        assert_eq!(summary.errors, errors);
        assert_eq!(summary.game.wasted_presses, 0);
        assert_eq!(app.lesson.errors(), errors);
    }
}
