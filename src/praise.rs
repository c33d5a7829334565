use rand::seq::SliceRandom;
use rand::Rng;

/// Fixed affirmation set for correct answers; one is chosen uniformly at
/// random on each RESULT entry.
pub const AFFIRMATIONS: &[&str] = &[
    "Nailed it!",
    "Sharp as ever!",
    "Lightning brain!",
    "Sum wizard!",
    "Flawless recall!",
    "Unstoppable!",
];

/// The one fixed message for a miss. Never drawn from the random set.
pub const MISS: &str = "Close, but no.";

pub fn pick<R: Rng>(rng: &mut R) -> &'static str {
    AFFIRMATIONS.choose(rng).copied().unwrap_or(AFFIRMATIONS[0])
}
