//! Example questions offered to the user

use rand::seq::SliceRandom;
use rand::Rng;

pub const SUGGESTIONS: [&str; 3] = [
    "Why do people dream?",
    "How did the internet come about?",
    "How does artificial intelligence work?",
];

/// Pick one suggestion uniformly at random
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SUGGESTIONS.choose(rng).copied().unwrap_or(SUGGESTIONS[0])
}
