use std::collections::HashSet;

use rand::seq::{IndexedRandom, SliceRandom};

use crate::commands::giveaway::models::UserRef;
use crate::commands::giveaway::strategies::base::WinnerStrategy;

// Every participant has the same chance to win. Winners are drawn
// without replacement via shuffle-and-take.
#[derive(Debug, Default)]
pub struct UniformDrawStrategy;

impl UniformDrawStrategy {
    pub fn new() -> Self {
        UniformDrawStrategy {}
    }
}

impl WinnerStrategy for UniformDrawStrategy {
    fn draw(&self, participants: &HashSet<UserRef>, count: usize) -> Vec<UserRef> {
        let mut candidates = participants.iter().copied().collect::<Vec<UserRef>>();
        // HashSet iteration order must not leak into the result
        candidates.sort();
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(count);
        candidates
    }

    fn pick(&self, pool: &[UserRef]) -> Option<UserRef> {
        pool.choose(&mut rand::rng()).copied()
    }
}
