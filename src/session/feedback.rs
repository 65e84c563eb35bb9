use rand::Rng;
use rand::seq::SliceRandom;

use crate::keyboard::finger;

pub const POSITIVE: &[&str] = &["Nice!", "Great job!", "Yes, that's it!", "Awesome!"];
pub const ERROR: &[&str] = &[
    "Almost! Try again.",
    "Oops, that was another key.",
    "Give it another try.",
];

pub const WELCOME: &str = "Press any key to get started.";
pub const HINT: &str = "Here's a hint: look at the glowing key on the keyboard below.";
pub const SKIPPED: &str = "Skipping this one. Keep trying!";
pub const GAME_WASTED: &str = "Wait for the matching letter, then press it.";

pub fn pick<R: Rng>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// "Press F with your left pointer finger."
pub fn press_with_finger(key: char) -> String {
    format!("Press {key} with your {}.", finger::finger_name(key))
}

pub fn discover_retry(key: char) -> String {
    format!("Oops, try the {key} key with your {}.", finger::finger_name(key))
}

pub fn tutorial_retry(pressed: char, expected: char) -> String {
    format!("That was {pressed}. Wait for the letter on screen and press {expected}.")
}
