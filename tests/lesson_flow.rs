use std::time::Duration;

use quill::session::game::{Difficulty, FALL_INTERVAL};
use quill::session::lesson::{Action, Lesson, LessonEvent, LessonSettings, Outcome};
use quill::session::stage::{IntroStep, Stage};
use quill::session::timer::TimerKind;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn lesson() -> Lesson {
    Lesson::with_seed(LessonSettings::default(), 42)
}

fn keys(lesson: &mut Lesson, at: Duration, text: &str) -> Vec<Outcome> {
    text.chars()
        .map(|ch| lesson.apply(at, LessonEvent::Key(ch)))
        .collect()
}

fn action(lesson: &mut Lesson, at: Duration, action: Action) -> Outcome {
    lesson.apply(at, LessonEvent::Action(action))
}

/// Plays from preflight to the first frame of the mini-game with no mistakes.
fn play_to_game(lesson: &mut Lesson, at: Duration) {
    keys(lesson, at, "a");
    action(lesson, at, Action::BeginDiscovery);
    keys(lesson, at, "fffjjj");
    action(lesson, at, Action::StartPractice);
    keys(lesson, at, "ffffffffff");
    keys(lesson, at, "jjjjjjjjjj");
    keys(lesson, at, "fjfjjffjfjfj");
    keys(lesson, at, "fj");
}

// ── Lesson walkthrough ──────────────────────────────────────────────────

#[test]
fn perfect_run_reaches_game_with_expected_counters() {
    let mut lesson = lesson();
    let t = ms(0);

    keys(&mut lesson, t, "q");
    assert_eq!(lesson.stage(), Stage::Intro);
    assert!(lesson.keyboard_connected());

    action(&mut lesson, t, Action::BeginDiscovery);
    assert_eq!(lesson.intro_step(), IntroStep::DiscoverF);
    keys(&mut lesson, t, "fff");
    assert_eq!(lesson.intro_step(), IntroStep::DiscoverJ);
    keys(&mut lesson, t, "JJJ");
    assert_eq!(lesson.intro_step(), IntroStep::Ready);

    action(&mut lesson, t, Action::StartPractice);
    assert_eq!(lesson.stage(), Stage::DrillF);
    keys(&mut lesson, t, "ffffffffff");
    assert_eq!(lesson.stage(), Stage::DrillJ);
    assert_eq!(lesson.best_streak(), 10);
    assert_eq!(lesson.streak(), 0);

    keys(&mut lesson, t, "jjjjjjjjjj");
    assert_eq!(lesson.stage(), Stage::DrillMix);
    keys(&mut lesson, t, "fjfjjffjfjfj");
    assert_eq!(lesson.stage(), Stage::GameTutorial);
    assert_eq!(lesson.correct(), 38);
    assert_eq!(lesson.errors(), 0);
    assert_eq!(lesson.streak(), 12);
    assert_eq!(lesson.best_streak(), 12);

    keys(&mut lesson, t, "f");
    assert_eq!(lesson.target_key(), Some('J'));
    keys(&mut lesson, t, "j");
    assert_eq!(lesson.stage(), Stage::Game);
    assert!(lesson.timer_armed(TimerKind::LetterFall));
    assert!(lesson.timer_armed(TimerKind::LetterSpawn));
    assert!(lesson.timer_armed(TimerKind::Countdown));
}

#[test]
fn session_finishes_exactly_once_after_game_clock() {
    let mut lesson = lesson();
    play_to_game(&mut lesson, ms(0));

    let mut finished = 0;
    let mut t = ms(0);
    while t <= ms(32_000) {
        let outcome = lesson.apply(t, LessonEvent::Tick);
        if outcome.finished.is_some() {
            finished += 1;
            assert_eq!(t, ms(30_000));
        }
        t += ms(40);
    }

    assert_eq!(finished, 1);
    assert_eq!(lesson.stage(), Stage::Summary);
    assert!(!lesson.timer_armed(TimerKind::LetterFall));
    assert!(!lesson.timer_armed(TimerKind::LetterSpawn));
    assert!(!lesson.timer_armed(TimerKind::Countdown));

    let summary = lesson.summary().expect("summary computed");
    let game = summary.game;
    assert!(game.caught + game.missed <= game.shown);
    assert_eq!(game.score, game.caught);
}

#[test]
fn one_big_jump_fires_every_due_timer_in_order() {
    let mut lesson = lesson();
    play_to_game(&mut lesson, ms(0));

    let outcome = lesson.apply(ms(60_000), LessonEvent::Tick);
    assert_eq!(outcome.stage, Stage::Summary);
    assert!(outcome.finished.is_some());
    assert_eq!(lesson.game().time_left, 0);
    assert!(lesson.game().stats.shown > 0);
}

#[test]
fn game_catches_count_toward_accuracy() {
    let mut lesson = lesson();
    play_to_game(&mut lesson, ms(0));
    let before = (lesson.correct(), lesson.errors());

    // Let a few letters spawn, then press every live letter's key.
    lesson.apply(ms(3_100), LessonEvent::Tick);
    let live: Vec<char> = lesson
        .game()
        .letters
        .iter()
        .map(|l| l.kind.as_char())
        .collect();
    assert!(!live.is_empty());
    keys(&mut lesson, ms(3_100), &live.iter().collect::<String>());
    assert_eq!(lesson.correct(), before.0 + live.len() as u32);
    assert_eq!(lesson.game().stats.caught, live.len() as u32);

    // Nothing on screen now, so another press is wasted.
    keys(&mut lesson, ms(3_100), "f");
    assert_eq!(lesson.errors(), before.1 + 1);
    assert_eq!(lesson.game().stats.wasted_presses, 1);
}

#[test]
fn difficulty_never_changes_spawn_cadence_mid_tick() {
    let mut lesson = lesson();
    play_to_game(&mut lesson, ms(0));
    assert_eq!(lesson.game().difficulty, Difficulty::Normal);

    // First spawn with nothing caught drops to slow.
    lesson.apply(ms(1_000), LessonEvent::Tick);
    assert_eq!(lesson.game().difficulty, Difficulty::Slow);
    assert_eq!(lesson.game().stats.shown, 1);

    // The slow cadence starts from the change, not from the game start.
    lesson.apply(ms(2_399), LessonEvent::Tick);
    assert_eq!(lesson.game().stats.shown, 1);
    lesson.apply(ms(2_400), LessonEvent::Tick);
    assert_eq!(lesson.game().stats.shown, 2);
    assert!(FALL_INTERVAL < ms(1_400));
}

// ── Recovery paths ──────────────────────────────────────────────────────

#[test]
fn preflight_retry_rearms_timeout() {
    let mut lesson = lesson();
    lesson.apply(ms(5_000), LessonEvent::Tick);
    assert!(lesson.preflight_expired());

    action(&mut lesson, ms(6_000), Action::RetryPreflight);
    assert!(!lesson.preflight_expired());
    assert!(lesson.timer_armed(TimerKind::PreflightTimeout));

    lesson.apply(ms(10_999), LessonEvent::Tick);
    assert!(!lesson.preflight_expired());
    lesson.apply(ms(11_000), LessonEvent::Tick);
    assert!(lesson.preflight_expired());

    keys(&mut lesson, ms(11_500), "x");
    assert_eq!(lesson.stage(), Stage::Intro);
}

#[test]
fn stuck_learner_gets_hint_then_skip() {
    let mut lesson = lesson();
    let t = ms(0);
    keys(&mut lesson, t, "a");
    action(&mut lesson, t, Action::BeginDiscovery);
    keys(&mut lesson, t, "fffjjj");
    action(&mut lesson, t, Action::StartPractice);

    keys(&mut lesson, t, "kk");
    assert!(!lesson.show_hint());
    keys(&mut lesson, t, "k");
    assert!(lesson.show_hint());
    assert!(!lesson.can_skip());
    keys(&mut lesson, t, "kkkk");
    assert!(lesson.can_skip());

    action(&mut lesson, t, Action::SkipPrompt);
    assert_eq!(lesson.drill().index, 1);
    assert!(!lesson.show_hint());
    assert_eq!(lesson.errors(), 8);
}

#[test]
fn restart_from_summary_starts_a_fresh_session() {
    let mut lesson = lesson();
    play_to_game(&mut lesson, ms(0));
    lesson.apply(ms(30_000), LessonEvent::Tick);
    assert_eq!(lesson.stage(), Stage::Summary);

    let outcome = action(&mut lesson, ms(31_000), Action::Restart);
    assert_eq!(outcome.stage, Stage::Preflight);
    assert!(outcome.finished.is_none());
    assert!(lesson.summary().is_none());
    assert_eq!(lesson.correct(), 0);
    assert_eq!(lesson.best_streak(), 0);

    play_to_game(&mut lesson, ms(32_000));
    let outcome = lesson.apply(ms(62_000), LessonEvent::Tick);
    assert!(outcome.finished.is_some());
}
