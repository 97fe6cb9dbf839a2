use std::collections::HashSet;

use crate::commands::giveaway::models::UserRef;

pub trait WinnerStrategy: Send + Sync {
    // Returns up to `count` distinct users drawn from the participants.
    // Returns an empty list when nobody participated.
    fn draw(&self, participants: &HashSet<UserRef>, count: usize) -> Vec<UserRef>;

    // Picks a single user from the pool, or None for an empty pool.
    fn pick(&self, pool: &[UserRef]) -> Option<UserRef>;
}
