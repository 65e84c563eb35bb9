/// Fraction of correct presses over all attempts. A session with no attempts
/// counts as perfect.
pub fn accuracy(correct: u32, errors: u32) -> f64 {
    let total = correct + errors;
    if total == 0 {
        return 1.0;
    }
    correct as f64 / total as f64
}

/// 1-5 star rating with breakpoints at 70%, 80%, 90% and 95%.
pub fn star_count(accuracy: f64) -> u8 {
    if accuracy >= 0.95 {
        5
    } else if accuracy >= 0.9 {
        4
    } else if accuracy >= 0.8 {
        3
    } else if accuracy >= 0.7 {
        2
    } else {
        1
    }
}

pub fn star_string(stars: u8) -> String {
    let filled = stars.min(5) as usize;
    format!("{}{}", "\u{2605}".repeat(filled), "\u{2606}".repeat(5 - filled))
}
