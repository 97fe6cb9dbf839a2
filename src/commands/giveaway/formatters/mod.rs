pub mod base;
pub mod card;

pub use crate::commands::giveaway::formatters::base::{GiveawayCard, GiveawayFormatter};
pub use crate::commands::giveaway::formatters::card::DefaultGiveawayFormatter;
