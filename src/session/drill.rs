pub const DRILL_F: [char; 10] = ['F'; 10];
pub const DRILL_J: [char; 10] = ['J'; 10];
pub const DRILL_MIX: [char; 12] = ['F', 'J', 'F', 'J', 'J', 'F', 'F', 'J', 'F', 'J', 'F', 'J'];

/// Errors on a single prompt before a hint is shown.
pub const HINT_THRESHOLD: u32 = 3;
/// Errors on a single prompt before skipping is offered.
pub const SKIP_THRESHOLD: u32 = 7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrillState {
    pub sequence: Vec<char>,
    pub index: usize,
    pub errors_on_prompt: u32,
}

impl DrillState {
    pub fn new(sequence: &[char]) -> Self {
        Self {
            sequence: sequence.to_vec(),
            index: 0,
            errors_on_prompt: 0,
        }
    }

    pub fn expected(&self) -> Option<char> {
        self.sequence.get(self.index).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.sequence.len()
    }

    /// Moves to the next prompt. Returns true when that finished the sequence.
    pub fn advance(&mut self) -> bool {
        if !self.is_complete() {
            self.index += 1;
        }
        self.errors_on_prompt = 0;
        self.is_complete()
    }

    pub fn record_error(&mut self) {
        self.errors_on_prompt += 1;
    }

    pub fn show_hint(&self) -> bool {
        self.errors_on_prompt >= HINT_THRESHOLD
    }

    pub fn can_skip(&self) -> bool {
        self.errors_on_prompt >= SKIP_THRESHOLD
    }

    pub fn progress(&self) -> f64 {
        if self.sequence.is_empty() {
            return 0.0;
        }
        self.index as f64 / self.sequence.len() as f64
    }
}
