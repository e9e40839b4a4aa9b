//! Loading-message rotation.
//!
//! Long generations get a rotating "still working" line instead of a
//! frozen spinner caption. The rotator draws uniformly at random but
//! never repeats a message until the whole pool has been used once.

use std::collections::HashSet;

use rand::Rng;

const FALLBACK: &str = "Loading...";

/// Draws messages from a pool without immediate repetition.
///
/// Once every message has been handed out, the used-set resets and the
/// random draws continue. Not seeded — reproducibility is not a goal.
pub struct MessageRotator {
    messages: &'static [&'static str],
    used: HashSet<usize>,
}

impl MessageRotator {
    pub fn new(messages: &'static [&'static str]) -> Self {
        Self { messages, used: HashSet::with_capacity(messages.len()) }
    }

    /// Returns the next message. An empty pool yields a fixed fallback.
    pub fn next(&mut self) -> &'static str {
        if self.messages.is_empty() {
            return FALLBACK;
        }

        if self.used.len() >= self.messages.len() {
            self.used.clear();
        }

        // Draw uniformly over the indices not handed out yet. The pool
        // is small, so materializing the candidates is fine.
        let unused: Vec<usize> = (0..self.messages.len())
            .filter(|index| !self.used.contains(index))
            .collect();
        let index = unused[rand::rng().random_range(0..unused.len())];
        self.used.insert(index);
        self.messages[index]
    }
}

/// Status lines shown while a review stream is pending.
pub const REVIEW_MESSAGES: &[&str] = &[
    "Brewing the perfect review...",
    "Summoning legendary reviewers...",
    "Sharpening the critique katana...",
    "Calibrating the BS detector...",
    "Searching for sneaky bugs in the shadows...",
    "Untangling your logic pretzels...",
    "Carbon dating your legacy code...",
    "Compiling witty remarks...",
    "Measuring technical debt in story points...",
    "Judging your commit messages silently...",
    "Contemplating your variable names...",
    "Following the trail of code smells...",
    "Gathering evidence of anti-patterns...",
    "Taking deep breaths before reading this...",
    "Rome wasn't debugged in a day...",
];

/// Status lines shown while a commit message is being generated.
pub const COMMIT_MESSAGES: &[&str] = &[
    "Crafting the perfect commit message...",
    "Avoiding 'fix stuff' and 'updated files'...",
    "Resisting the urge to write 'WIP'...",
    "Deciding between fix, feat, or chore...",
    "Analyzing what you actually changed...",
    "Condensing hours of work into 72 characters...",
    "Writing for your future self...",
    "Classifying your chaos...",
    "Staying under 72 characters...",
    "Making it meaningful...",
];

/// Status lines shown while a PR description is being generated.
pub const PR_MESSAGES: &[&str] = &[
    "Writing something better than 'see title'...",
    "Filling out that PR template you always skip...",
    "Adding context future you will thank you for...",
    "Converting your commit history into a coherent narrative...",
    "Justifying that one-line change that took 3 hours...",
    "Pre-emptively addressing reviewer concerns...",
    "Making 2 weeks of work sound simple...",
    "Listing tests you definitely ran...",
    "Making it reviewer-friendly...",
    "Capturing the essence...",
];

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: &[&str] = &["one", "two", "three", "four"];

    #[test]
    fn empty_pool_returns_fallback() {
        let mut rotator = MessageRotator::new(&[]);
        assert_eq!(rotator.next(), FALLBACK);
        assert_eq!(rotator.next(), FALLBACK);
    }

    #[test]
    fn no_repeats_until_pool_exhausted() {
        let mut rotator = MessageRotator::new(POOL);
        // Every cycle must hand out each message exactly once.
        for _ in 0..50 {
            let mut seen = HashSet::new();
            for _ in 0..POOL.len() {
                assert!(seen.insert(rotator.next()), "message repeated before exhaustion");
            }
            assert_eq!(seen.len(), POOL.len());
        }
    }

    #[test]
    fn resets_after_exhaustion_and_keeps_drawing() {
        let mut rotator = MessageRotator::new(POOL);
        for _ in 0..POOL.len() {
            rotator.next();
        }
        // Next draw after exhaustion still yields a pool member.
        let again = rotator.next();
        assert!(POOL.contains(&again));
    }
}
