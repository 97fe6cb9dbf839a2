use chrono::{DateTime, Utc};

use crate::commands::giveaway::models::{Giveaway, RerollOutcome, UserRef};

// Textual content of a giveaway display. Rendering it into an embed is
// up to the display implementation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GiveawayCard {
    pub title: String,
    pub description: String,
    // Running giveaways carry the join button, ended ones don't.
    pub joinable: bool,
}

pub trait GiveawayFormatter: Send + Sync {
    // The card shown while the giveaway is running.
    fn running_card(&self, giveaway: &Giveaway, now: DateTime<Utc>) -> GiveawayCard;
    // The card that replaces the running one after the finalization.
    fn ended_card(&self, giveaway: &Giveaway, winners: &[UserRef]) -> GiveawayCard;
    // A message posted in the channel when the giveaway ends.
    fn result_text(&self, giveaway: &Giveaway, winners: &[UserRef]) -> String;
    fn reroll_text(&self, outcome: &RerollOutcome) -> String;
    // One line in the list of running giveaways.
    fn list_entry(&self, giveaway: &Giveaway, now: DateTime<Utc>) -> String;
}
