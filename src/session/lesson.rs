use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::engine::scoring;
use crate::session::drill::{DRILL_F, DRILL_J, DRILL_MIX, DrillState};
use crate::session::feedback;
use crate::session::game::{COUNTDOWN_INTERVAL, Catch, FALL_INTERVAL, GAME_SECONDS, Game};
use crate::session::result::SessionSummary;
use crate::session::stage::{IntroStep, Stage};
use crate::session::timer::{Scheduler, TimerKind};

/// Correct presses of each anchor key needed during discovery.
pub const DISCOVERY_TARGET: u32 = 3;
pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Leave the posture checklist and start finding F.
    BeginDiscovery,
    /// Press the key being discovered on the learner's behalf.
    ShowMe,
    /// Leave the intro and start the F drill.
    StartPractice,
    /// Give up on the current drill prompt.
    SkipPrompt,
    /// Restart the keyboard check after it timed out.
    RetryPreflight,
    /// Throw the session away and start over at the keyboard check.
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonEvent {
    Key(char),
    Action(Action),
    Tick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressedKey {
    pub key: char,
    pub correct: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntroCounts {
    pub f: u32,
    pub j: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LessonSettings {
    pub preflight_timeout: Duration,
    pub game_seconds: u32,
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            preflight_timeout: PREFLIGHT_TIMEOUT,
            game_seconds: GAME_SECONDS,
        }
    }
}

/// Result of feeding one event into the lesson.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub stage: Stage,
    pub feedback: String,
    /// Set exactly once per session, on the event that reached the summary.
    pub finished: Option<SessionSummary>,
}

/// The lesson state machine.
///
/// Every input goes through [`Lesson::apply`], which first runs the timers
/// that came due by the given session time and then handles the event.
/// Stage-owned timers are cancelled whenever the stage changes, so a tick
/// from the mini-game can never land in the summary.
pub struct Lesson {
    settings: LessonSettings,
    stage: Stage,
    intro_step: IntroStep,
    intro_counts: IntroCounts,
    drill: DrillState,
    tutorial_step: u8,
    game: Game,
    feedback: String,
    last_pressed: Option<PressedKey>,
    correct: u32,
    errors: u32,
    streak: u32,
    best_streak: u32,
    keyboard_connected: bool,
    preflight_expired: bool,
    summary: Option<SessionSummary>,
    just_finished: Option<SessionSummary>,
    timers: Scheduler,
    now: Duration,
    rng: SmallRng,
}

impl Lesson {
    pub fn new(settings: LessonSettings) -> Self {
        Self::with_rng(settings, SmallRng::from_entropy())
    }

    /// Deterministic phrases and letter types, for tests and replays.
    pub fn with_seed(settings: LessonSettings, seed: u64) -> Self {
        Self::with_rng(settings, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(settings: LessonSettings, rng: SmallRng) -> Self {
        let mut lesson = Self {
            settings,
            stage: Stage::Preflight,
            intro_step: IntroStep::Posture,
            intro_counts: IntroCounts::default(),
            drill: DrillState::new(&DRILL_F),
            tutorial_step: 0,
            game: Game::new(settings.game_seconds),
            feedback: feedback::WELCOME.to_string(),
            last_pressed: None,
            correct: 0,
            errors: 0,
            streak: 0,
            best_streak: 0,
            keyboard_connected: false,
            preflight_expired: false,
            summary: None,
            just_finished: None,
            timers: Scheduler::new(),
            now: Duration::ZERO,
            rng,
        };
        lesson.enter_stage(Stage::Preflight);
        lesson
    }

    /// Single entry point: advance the clock to `at`, fire due timers, then
    /// handle `event`.
    pub fn apply(&mut self, at: Duration, event: LessonEvent) -> Outcome {
        self.run_timers(at);
        match event {
            LessonEvent::Key(ch) => self.handle_key(ch),
            LessonEvent::Action(action) => self.handle_action(action),
            LessonEvent::Tick => {}
        }
        Outcome {
            stage: self.stage,
            feedback: self.feedback.clone(),
            finished: self.just_finished.take(),
        }
    }

    fn run_timers(&mut self, at: Duration) {
        self.now = self.now.max(at);
        let until = self.now;
        while let Some((kind, due)) = self.timers.pop_due(until) {
            self.now = due;
            self.fire(kind);
        }
        self.now = until;
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::PreflightTimeout => {
                self.preflight_expired = true;
                self.feedback =
                    "We didn't see any keys. Plug in your keyboard or try again.".to_string();
            }
            TimerKind::LetterFall => {
                if self.game.fall() > 0 {
                    self.adapt_difficulty();
                }
            }
            TimerKind::LetterSpawn => {
                self.game.spawn(&mut self.rng);
                self.adapt_difficulty();
            }
            TimerKind::Countdown => {
                if self.game.count_down() {
                    self.feedback = "Time's up!".to_string();
                    self.enter_stage(Stage::Summary);
                }
            }
        }
    }

    fn enter_stage(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, at_ms = self.now.as_millis() as u64, "stage transition");
        self.stage = stage;
        self.timers.retain_scope(stage);

        match stage {
            Stage::Preflight => {
                self.preflight_expired = false;
                self.timers.once(
                    TimerKind::PreflightTimeout,
                    self.now + self.settings.preflight_timeout,
                );
            }
            Stage::Game => {
                self.game = Game::new(self.settings.game_seconds);
                self.timers.every(TimerKind::LetterFall, self.now, FALL_INTERVAL);
                self.timers.every(
                    TimerKind::LetterSpawn,
                    self.now,
                    self.game.difficulty.spawn_interval(),
                );
                self.timers.every(TimerKind::Countdown, self.now, COUNTDOWN_INTERVAL);
            }
            Stage::Summary => {
                if self.summary.is_none() {
                    let summary = SessionSummary::new(
                        self.correct,
                        self.errors,
                        self.best_streak,
                        self.game.stats,
                    );
                    info!(
                        accuracy = summary.accuracy,
                        stars = summary.stars,
                        game_score = summary.game.score,
                        "lesson complete"
                    );
                    self.summary = Some(summary);
                    self.just_finished = Some(summary);
                }
            }
            _ => {}
        }
    }

    fn adapt_difficulty(&mut self) {
        if let Some(difficulty) = self.game.adapt_difficulty() {
            debug!(difficulty = difficulty.label(), "game difficulty changed");
            self.timers
                .every(TimerKind::LetterSpawn, self.now, difficulty.spawn_interval());
        }
    }

    fn mark_correct(&mut self) {
        self.correct += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
    }

    fn mark_error(&mut self) {
        self.errors += 1;
        self.streak = 0;
    }

    fn handle_key(&mut self, raw: char) {
        let key = raw.to_ascii_uppercase();

        match self.stage {
            Stage::Preflight => {
                self.keyboard_connected = true;
                self.intro_step = IntroStep::Posture;
                self.feedback = "Great! Let's learn posture first.".to_string();
                self.enter_stage(Stage::Intro);
            }
            Stage::Intro => match self.intro_step {
                IntroStep::DiscoverF => self.discover(key, 'F'),
                IntroStep::DiscoverJ => self.discover(key, 'J'),
                IntroStep::Posture | IntroStep::Ready => {}
            },
            Stage::DrillF | Stage::DrillJ | Stage::DrillMix => self.drill_key(key),
            Stage::GameTutorial => self.tutorial_key(key),
            Stage::Game => self.game_key(key),
            Stage::Summary => {}
        }
    }

    fn discover(&mut self, key: char, expected: char) {
        let correct = key == expected;
        self.last_pressed = Some(PressedKey { key, correct });
        if !correct {
            self.mark_error();
            self.feedback = feedback::discover_retry(expected);
            return;
        }

        self.mark_correct();
        let count = if expected == 'F' {
            &mut self.intro_counts.f
        } else {
            &mut self.intro_counts.j
        };
        *count += 1;
        let count = *count;
        self.feedback = format!("{expected} presses: {count}/{DISCOVERY_TARGET}");

        if count >= DISCOVERY_TARGET {
            if expected == 'F' {
                self.intro_step = IntroStep::DiscoverJ;
                self.feedback = "Great! Now find J with your right pointer finger.".to_string();
            } else {
                self.intro_step = IntroStep::Ready;
                self.feedback = "Awesome! You found F and J. Ready for practice.".to_string();
            }
        }
    }

    fn drill_key(&mut self, key: char) {
        let Some(expected) = self.drill.expected() else {
            return;
        };
        let correct = key == expected;
        self.last_pressed = Some(PressedKey { key, correct });

        if correct {
            self.mark_correct();
            self.feedback = feedback::pick(feedback::POSITIVE, &mut self.rng).to_string();
            if self.drill.advance() {
                self.finish_drill();
            }
        } else {
            self.mark_error();
            self.drill.record_error();
            self.feedback = if self.drill.show_hint() {
                feedback::HINT.to_string()
            } else {
                feedback::pick(feedback::ERROR, &mut self.rng).to_string()
            };
        }
    }

    fn skip_prompt(&mut self) {
        if !self.stage.is_drill() || self.drill.is_complete() {
            return;
        }
        self.mark_error();
        self.feedback = feedback::SKIPPED.to_string();
        if self.drill.advance() {
            self.finish_drill();
        }
    }

    fn finish_drill(&mut self) {
        match self.stage {
            Stage::DrillF => {
                self.start_drill(Stage::DrillJ, &DRILL_J, feedback::press_with_finger('J'));
            }
            Stage::DrillJ => {
                self.start_drill(
                    Stage::DrillMix,
                    &DRILL_MIX,
                    "Time to switch between F and J!".to_string(),
                );
            }
            Stage::DrillMix => {
                self.feedback = "Great switching! Game time next.".to_string();
                self.tutorial_step = 0;
                self.enter_stage(Stage::GameTutorial);
            }
            _ => {}
        }
    }

    fn start_drill(&mut self, stage: Stage, sequence: &[char], message: String) {
        self.drill = DrillState::new(sequence);
        self.feedback = message;
        self.streak = 0;
        self.enter_stage(stage);
    }

    fn tutorial_key(&mut self, key: char) {
        let expected = self.tutorial_expected();
        let correct = key == expected;
        self.last_pressed = Some(PressedKey { key, correct });
        if !correct {
            self.feedback = feedback::tutorial_retry(key, expected);
            return;
        }

        self.tutorial_step += 1;
        if self.tutorial_step >= 2 {
            self.feedback = "Tutorial done! Let's play.".to_string();
            self.enter_stage(Stage::Game);
        } else {
            self.feedback = "Great! Now press J when you see it.".to_string();
        }
    }

    fn tutorial_expected(&self) -> char {
        if self.tutorial_step == 0 { 'F' } else { 'J' }
    }

    fn game_key(&mut self, key: char) {
        match self.game.press(key) {
            Catch::Caught(_) => {
                self.last_pressed = Some(PressedKey { key, correct: true });
                self.mark_correct();
                self.feedback = feedback::pick(feedback::POSITIVE, &mut self.rng).to_string();
            }
            Catch::Wasted => {
                self.last_pressed = Some(PressedKey { key, correct: false });
                self.mark_error();
                self.feedback = feedback::GAME_WASTED.to_string();
            }
        }
        self.adapt_difficulty();
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::BeginDiscovery => {
                if self.stage == Stage::Intro && self.intro_step == IntroStep::Posture {
                    self.intro_step = IntroStep::DiscoverF;
                    self.feedback = format!(
                        "Press F three times with your {}.",
                        crate::keyboard::finger::finger_name('F')
                    );
                }
            }
            Action::ShowMe => {
                if self.stage == Stage::Intro {
                    match self.intro_step {
                        IntroStep::DiscoverF => self.handle_key('F'),
                        IntroStep::DiscoverJ => self.handle_key('J'),
                        IntroStep::Posture | IntroStep::Ready => {}
                    }
                }
            }
            Action::StartPractice => {
                if self.stage == Stage::Intro && self.intro_step == IntroStep::Ready {
                    self.start_drill(Stage::DrillF, &DRILL_F, feedback::press_with_finger('F'));
                }
            }
            Action::SkipPrompt => self.skip_prompt(),
            Action::RetryPreflight => {
                if self.stage == Stage::Preflight {
                    self.feedback = feedback::WELCOME.to_string();
                    self.enter_stage(Stage::Preflight);
                }
            }
            Action::Restart => self.restart(),
        }
    }

    fn restart(&mut self) {
        info!("lesson restarted");
        self.intro_step = IntroStep::Posture;
        self.intro_counts = IntroCounts::default();
        self.drill = DrillState::new(&DRILL_F);
        self.tutorial_step = 0;
        self.game = Game::new(self.settings.game_seconds);
        self.feedback = feedback::WELCOME.to_string();
        self.last_pressed = None;
        self.correct = 0;
        self.errors = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.keyboard_connected = false;
        self.summary = None;
        self.just_finished = None;
        self.enter_stage(Stage::Preflight);
    }

    pub fn settings(&self) -> LessonSettings {
        self.settings
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn intro_step(&self) -> IntroStep {
        self.intro_step
    }

    pub fn intro_counts(&self) -> IntroCounts {
        self.intro_counts
    }

    pub fn drill(&self) -> &DrillState {
        &self.drill
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn tutorial_step(&self) -> u8 {
        self.tutorial_step
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn last_pressed(&self) -> Option<PressedKey> {
        self.last_pressed
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn accuracy(&self) -> f64 {
        scoring::accuracy(self.correct, self.errors)
    }

    pub fn keyboard_connected(&self) -> bool {
        self.keyboard_connected
    }

    pub fn preflight_expired(&self) -> bool {
        self.preflight_expired
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn timer_armed(&self, kind: TimerKind) -> bool {
        self.timers.is_armed(kind)
    }

    /// The key the learner should press next, if the stage has one.
    pub fn target_key(&self) -> Option<char> {
        match self.stage {
            Stage::Intro => match self.intro_step {
                IntroStep::Posture => None,
                IntroStep::DiscoverF => Some('F'),
                IntroStep::DiscoverJ | IntroStep::Ready => Some('J'),
            },
            Stage::DrillF | Stage::DrillJ | Stage::DrillMix => self.drill.expected(),
            Stage::GameTutorial => Some(self.tutorial_expected()),
            Stage::Preflight | Stage::Game | Stage::Summary => None,
        }
    }

    pub fn show_hint(&self) -> bool {
        self.stage.is_drill() && self.drill.show_hint()
    }

    pub fn can_skip(&self) -> bool {
        self.stage.is_drill() && self.drill.can_skip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::game::{Difficulty, GameStats, LetterKind};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn lesson() -> Lesson {
        Lesson::with_seed(LessonSettings::default(), 42)
    }

    fn press(lesson: &mut Lesson, keys: &str) {
        let at = lesson.now();
        for ch in keys.chars() {
            lesson.apply(at, LessonEvent::Key(ch));
        }
    }

    fn act(lesson: &mut Lesson, action: Action) -> Outcome {
        let at = lesson.now();
        lesson.apply(at, LessonEvent::Action(action))
    }

    fn to_drill_f(lesson: &mut Lesson) {
        press(lesson, "x");
        act(lesson, Action::BeginDiscovery);
        press(lesson, "fffjjj");
        act(lesson, Action::StartPractice);
    }

    fn to_game(lesson: &mut Lesson) {
        to_drill_f(lesson);
        press(lesson, &"f".repeat(10));
        press(lesson, &"j".repeat(10));
        press(lesson, "fjfjjffjfjfj");
        press(lesson, "fj");
        assert_eq!(lesson.stage(), Stage::Game);
    }

    #[test]
    fn test_starts_in_preflight_with_timeout_armed() {
        let lesson = lesson();
        assert_eq!(lesson.stage(), Stage::Preflight);
        assert!(lesson.timer_armed(TimerKind::PreflightTimeout));
        assert!(!lesson.keyboard_connected());
    }

    #[test]
    fn test_preflight_timeout_offers_retry_without_advancing() {
        let mut lesson = lesson();
        lesson.apply(ms(4999), LessonEvent::Tick);
        assert!(!lesson.preflight_expired());
        let outcome = lesson.apply(ms(5000), LessonEvent::Tick);
        assert!(lesson.preflight_expired());
        assert_eq!(outcome.stage, Stage::Preflight);

        act(&mut lesson, Action::RetryPreflight);
        assert!(!lesson.preflight_expired());
        lesson.apply(ms(9999), LessonEvent::Tick);
        assert!(!lesson.preflight_expired());
        lesson.apply(ms(10_000), LessonEvent::Tick);
        assert!(lesson.preflight_expired());
    }

    #[test]
    fn test_any_key_connects_keyboard() {
        let mut lesson = lesson();
        let outcome = lesson.apply(ms(100), LessonEvent::Key('q'));
        assert_eq!(outcome.stage, Stage::Intro);
        assert_eq!(lesson.intro_step(), IntroStep::Posture);
        assert!(lesson.keyboard_connected());
        assert!(!lesson.timer_armed(TimerKind::PreflightTimeout));
        lesson.apply(ms(6000), LessonEvent::Tick);
        assert!(!lesson.preflight_expired());
    }

    #[test]
    fn test_posture_ignores_keys_until_begin() {
        let mut lesson = lesson();
        press(&mut lesson, "x");
        press(&mut lesson, "ff");
        assert_eq!(lesson.intro_step(), IntroStep::Posture);
        assert_eq!(lesson.correct(), 0);
        act(&mut lesson, Action::BeginDiscovery);
        assert_eq!(lesson.intro_step(), IntroStep::DiscoverF);
        assert_eq!(lesson.target_key(), Some('F'));
    }

    #[test]
    fn test_discovery_errors_do_not_advance_counter() {
        let mut lesson = lesson();
        press(&mut lesson, "x");
        act(&mut lesson, Action::BeginDiscovery);
        press(&mut lesson, "ff");
        press(&mut lesson, "d");
        assert_eq!(lesson.intro_counts().f, 2);
        assert_eq!(lesson.errors(), 1);
        assert_eq!(lesson.streak(), 0);
        assert_eq!(lesson.best_streak(), 2);
        assert_eq!(
            lesson.last_pressed(),
            Some(PressedKey {
                key: 'D',
                correct: false
            })
        );
        press(&mut lesson, "f");
        assert_eq!(lesson.intro_step(), IntroStep::DiscoverJ);
        assert_eq!(lesson.target_key(), Some('J'));
    }

    #[test]
    fn test_show_me_presses_for_learner() {
        let mut lesson = lesson();
        press(&mut lesson, "x");
        act(&mut lesson, Action::BeginDiscovery);
        for _ in 0..6 {
            act(&mut lesson, Action::ShowMe);
        }
        assert_eq!(lesson.intro_step(), IntroStep::Ready);
        assert_eq!(lesson.intro_counts(), IntroCounts { f: 3, j: 3 });
        act(&mut lesson, Action::ShowMe);
        assert_eq!(lesson.correct(), 6);
    }

    #[test]
    fn test_start_practice_only_when_ready() {
        let mut lesson = lesson();
        press(&mut lesson, "x");
        act(&mut lesson, Action::StartPractice);
        assert_eq!(lesson.stage(), Stage::Intro);
        act(&mut lesson, Action::BeginDiscovery);
        press(&mut lesson, "fffjjj");
        act(&mut lesson, Action::StartPractice);
        assert_eq!(lesson.stage(), Stage::DrillF);
        assert_eq!(lesson.drill().sequence, DRILL_F.to_vec());
        assert_eq!(lesson.target_key(), Some('F'));
    }

    #[test]
    fn test_drill_errors_surface_hint_then_skip() {
        let mut lesson = lesson();
        to_drill_f(&mut lesson);
        press(&mut lesson, "jj");
        assert!(!lesson.show_hint());
        press(&mut lesson, "j");
        assert!(lesson.show_hint());
        assert_eq!(lesson.feedback(), feedback::HINT);
        assert!(!lesson.can_skip());
        press(&mut lesson, "jjjj");
        assert!(lesson.can_skip());
        assert_eq!(lesson.drill().index, 0);

        press(&mut lesson, "f");
        assert_eq!(lesson.drill().errors_on_prompt, 0);
        assert!(!lesson.show_hint());
    }

    #[test]
    fn test_skip_advances_one_and_counts_error() {
        let mut lesson = lesson();
        to_drill_f(&mut lesson);
        press(&mut lesson, "fff");
        let errors = lesson.errors();
        act(&mut lesson, Action::SkipPrompt);
        assert_eq!(lesson.drill().index, 4);
        assert_eq!(lesson.errors(), errors + 1);
        assert_eq!(lesson.streak(), 0);
        assert_eq!(lesson.drill().errors_on_prompt, 0);
    }

    #[test]
    fn test_skip_on_last_prompt_transitions() {
        let mut lesson = lesson();
        to_drill_f(&mut lesson);
        press(&mut lesson, &"f".repeat(9));
        act(&mut lesson, Action::SkipPrompt);
        assert_eq!(lesson.stage(), Stage::DrillJ);
        assert_eq!(lesson.drill().index, 0);
    }

    #[test]
    fn test_skip_outside_drill_is_ignored() {
        let mut lesson = lesson();
        press(&mut lesson, "x");
        act(&mut lesson, Action::SkipPrompt);
        assert_eq!(lesson.errors(), 0);
        assert_eq!(lesson.stage(), Stage::Intro);
    }

    #[test]
    fn test_drill_transitions_reset_streak() {
        let mut lesson = lesson();
        to_drill_f(&mut lesson);
        press(&mut lesson, &"f".repeat(10));
        assert_eq!(lesson.stage(), Stage::DrillJ);
        assert_eq!(lesson.streak(), 0);
        // Starting practice clears the discovery streak too.
        assert_eq!(lesson.best_streak(), 10);
        press(&mut lesson, &"j".repeat(10));
        assert_eq!(lesson.stage(), Stage::DrillMix);
        assert_eq!(lesson.target_key(), Some('F'));
        press(&mut lesson, "fjfjjffjfjfj");
        assert_eq!(lesson.stage(), Stage::GameTutorial);
        assert_eq!(lesson.drill().index, DRILL_MIX.len());
        assert_eq!(lesson.streak(), 12);
        assert_eq!(lesson.best_streak(), 12);
        assert_eq!(lesson.errors(), 0);
    }

    #[test]
    fn test_tutorial_wrong_press_has_no_penalty() {
        let mut lesson = lesson();
        to_drill_f(&mut lesson);
        press(&mut lesson, &"f".repeat(10));
        press(&mut lesson, &"j".repeat(10));
        press(&mut lesson, "fjfjjffjfjfj");
        let correct = lesson.correct();
        press(&mut lesson, "j");
        assert_eq!(lesson.tutorial_step(), 0);
        assert_eq!(lesson.errors(), 0);
        assert!(lesson.feedback().contains("press F"));
        press(&mut lesson, "f");
        assert_eq!(lesson.target_key(), Some('J'));
        press(&mut lesson, "j");
        assert_eq!(lesson.stage(), Stage::Game);
        assert_eq!(lesson.correct(), correct);
    }

    #[test]
    fn test_game_arms_its_timers() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        assert!(lesson.timer_armed(TimerKind::LetterFall));
        assert!(lesson.timer_armed(TimerKind::LetterSpawn));
        assert!(lesson.timer_armed(TimerKind::Countdown));
        assert_eq!(lesson.game().time_left, GAME_SECONDS);
    }

    #[test]
    fn test_game_spawns_and_counts_down() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        let start = lesson.now();
        lesson.apply(start + ms(1000), LessonEvent::Tick);
        assert_eq!(lesson.game().stats.shown, 1);
        assert_eq!(lesson.game().time_left, GAME_SECONDS - 1);
        // Nothing caught yet, so the first spawn already slows the game.
        assert_eq!(lesson.game().difficulty, Difficulty::Slow);
    }

    #[test]
    fn test_game_catch_and_waste_feed_counters() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        let start = lesson.now();
        lesson.apply(start + ms(1000), LessonEvent::Tick);
        let kind = lesson.game().letters[0].kind;
        let other = match kind {
            LetterKind::F => 'j',
            LetterKind::J => 'f',
        };
        let correct = lesson.correct();
        lesson.apply(start + ms(1010), LessonEvent::Key(kind.as_char()));
        assert_eq!(lesson.game().stats.caught, 1);
        assert_eq!(lesson.correct(), correct + 1);
        lesson.apply(start + ms(1020), LessonEvent::Key(other));
        assert_eq!(lesson.game().stats.wasted_presses, 1);
        assert_eq!(lesson.errors(), 1);
        assert_eq!(
            lesson.last_pressed(),
            Some(PressedKey {
                key: other.to_ascii_uppercase(),
                correct: false
            })
        );
    }

    #[test]
    fn test_game_ends_after_thirty_seconds_once() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        let start = lesson.now();
        let outcome = lesson.apply(start + ms(29_999), LessonEvent::Tick);
        assert_eq!(outcome.stage, Stage::Game);
        assert!(outcome.finished.is_none());

        let outcome = lesson.apply(start + ms(30_000), LessonEvent::Tick);
        assert_eq!(outcome.stage, Stage::Summary);
        let summary = outcome.finished.expect("summary on entry");
        assert_eq!(summary.game, lesson.game().stats);

        let outcome = lesson.apply(start + ms(31_000), LessonEvent::Key('f'));
        assert!(outcome.finished.is_none());
        assert_eq!(outcome.stage, Stage::Summary);
    }

    #[test]
    fn test_no_stale_game_ticks_after_summary() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        let start = lesson.now();
        lesson.apply(start + ms(30_000), LessonEvent::Tick);
        let stats = lesson.game().stats;
        assert!(!lesson.timer_armed(TimerKind::LetterFall));
        assert!(!lesson.timer_armed(TimerKind::LetterSpawn));
        lesson.apply(start + ms(60_000), LessonEvent::Tick);
        assert_eq!(lesson.game().stats, stats);
    }

    #[test]
    fn test_game_invariants_hold_through_play() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        let start = lesson.now();
        for step in 1..=290u64 {
            let at = start + ms(step * 100);
            let key = if step % 3 == 0 { 'f' } else { 'j' };
            lesson.apply(at, LessonEvent::Key(key));
            let stats: GameStats = lesson.game().stats;
            assert!(stats.caught + stats.missed <= stats.shown);
            assert_eq!(stats.score, stats.caught);
        }
    }

    #[test]
    fn test_restart_clears_session() {
        let mut lesson = lesson();
        to_game(&mut lesson);
        let start = lesson.now();
        lesson.apply(start + ms(30_000), LessonEvent::Tick);
        assert!(lesson.summary().is_some());

        let outcome = act(&mut lesson, Action::Restart);
        assert_eq!(outcome.stage, Stage::Preflight);
        assert!(lesson.summary().is_none());
        assert_eq!(lesson.correct(), 0);
        assert_eq!(lesson.best_streak(), 0);
        assert!(!lesson.keyboard_connected());
        assert!(lesson.timer_armed(TimerKind::PreflightTimeout));
    }
}
