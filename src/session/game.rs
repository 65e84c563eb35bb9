use std::time::Duration;

use rand::Rng;

pub const GAME_SECONDS: u32 = 30;
pub const FALL_INTERVAL: Duration = Duration::from_millis(120);
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_millis(1000);
/// Vertical units a letter drops per fall tick at normal difficulty.
pub const BASE_SPEED: f64 = 3.0;
/// Letters at or past this position hit the ground.
pub const GROUND: f64 = 100.0;

const ESCALATE_ABOVE: f64 = 0.8;
const DEESCALATE_BELOW: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Slow,
    Normal,
    Fast,
}

impl Difficulty {
    pub fn spawn_interval(self) -> Duration {
        match self {
            Difficulty::Fast => Duration::from_millis(700),
            Difficulty::Normal => Duration::from_millis(1000),
            Difficulty::Slow => Duration::from_millis(1400),
        }
    }

    pub fn speed_multiplier(self) -> f64 {
        match self {
            Difficulty::Fast => 1.2,
            Difficulty::Normal => 1.0,
            Difficulty::Slow => 0.7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Fast => "fast",
            Difficulty::Normal => "normal",
            Difficulty::Slow => "slow",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LetterKind {
    F,
    J,
}

impl LetterKind {
    pub fn as_char(self) -> char {
        match self {
            LetterKind::F => 'F',
            LetterKind::J => 'J',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_uppercase() {
            'F' => Some(LetterKind::F),
            'J' => Some(LetterKind::J),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Letter {
    pub id: u64,
    pub kind: LetterKind,
    pub y: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    pub shown: u32,
    pub caught: u32,
    pub missed: u32,
    pub wasted_presses: u32,
    pub score: u32,
}

impl GameStats {
    /// Share of spawned letters that were caught.
    pub fn catch_rate(&self) -> f64 {
        self.caught as f64 / self.shown.max(1) as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Catch {
    Caught(LetterKind),
    Wasted,
}

/// Falling-letter mini-game. Owns the live letters and running stats; the
/// lesson drives it from its fall, spawn and countdown timers.
#[derive(Clone, Debug)]
pub struct Game {
    pub letters: Vec<Letter>,
    pub stats: GameStats,
    pub difficulty: Difficulty,
    pub time_left: u32,
    next_id: u64,
}

impl Game {
    pub fn new(seconds: u32) -> Self {
        Self {
            letters: Vec::new(),
            stats: GameStats::default(),
            difficulty: Difficulty::Normal,
            time_left: seconds,
            next_id: 0,
        }
    }

    /// Drops every letter by its speed and removes the ones that reached
    /// the ground. Returns the number missed this tick.
    pub fn fall(&mut self) -> u32 {
        let mut missed = 0;
        self.letters.retain_mut(|letter| {
            letter.y += letter.speed;
            if letter.y >= GROUND {
                missed += 1;
                false
            } else {
                true
            }
        });
        self.stats.missed += missed;
        missed
    }

    pub fn spawn<R: Rng>(&mut self, rng: &mut R) -> &Letter {
        let kind = if rng.gen_bool(0.5) {
            LetterKind::F
        } else {
            LetterKind::J
        };
        self.spawn_kind(kind)
    }

    pub fn spawn_kind(&mut self, kind: LetterKind) -> &Letter {
        self.next_id += 1;
        self.stats.shown += 1;
        let speed = BASE_SPEED * self.difficulty.speed_multiplier();
        self.letters.push(Letter {
            id: self.next_id,
            kind,
            y: 0.0,
            speed,
        });
        &self.letters[self.letters.len() - 1]
    }

    /// Catches the oldest live letter matching `key`, if any.
    pub fn press(&mut self, key: char) -> Catch {
        let found = LetterKind::from_key(key)
            .and_then(|kind| self.letters.iter().position(|l| l.kind == kind));
        match found {
            Some(idx) => {
                let letter = self.letters.remove(idx);
                self.stats.caught += 1;
                self.stats.score += 1;
                Catch::Caught(letter.kind)
            }
            None => {
                self.stats.wasted_presses += 1;
                Catch::Wasted
            }
        }
    }

    /// One second off the clock. Returns true when time ran out.
    pub fn count_down(&mut self) -> bool {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }

    /// Re-evaluates difficulty from the running catch rate. At most one
    /// change per call; returns the new difficulty when it changed.
    pub fn adapt_difficulty(&mut self) -> Option<Difficulty> {
        let rate = self.stats.catch_rate();
        let next = if rate > ESCALATE_ABOVE && self.difficulty != Difficulty::Fast {
            Difficulty::Fast
        } else if rate < DEESCALATE_BELOW && self.difficulty != Difficulty::Slow {
            Difficulty::Slow
        } else {
            return None;
        };
        self.difficulty = next;
        Some(next)
    }
}
