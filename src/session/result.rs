use crate::engine::scoring;
use crate::session::game::GameStats;

/// Final metrics of one completed lesson, computed once on summary entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSummary {
    pub accuracy: f64,
    pub stars: u8,
    pub correct: u32,
    pub errors: u32,
    pub best_streak: u32,
    pub game: GameStats,
}

impl SessionSummary {
    pub fn new(correct: u32, errors: u32, best_streak: u32, game: GameStats) -> Self {
        let accuracy = scoring::accuracy(correct, errors);
        Self {
            accuracy,
            stars: scoring::star_count(accuracy),
            correct,
            errors,
            best_streak,
            game,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.correct + self.errors
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy * 100.0
    }

    pub fn is_excellent(&self) -> bool {
        self.accuracy >= 0.9
    }
}
