use std::result;

use thiserror::Error as ThisError;
use serenity::prelude::SerenityError;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("{0}")]
    SerenityError(String),
    #[error("{0}")]
    Config(String),
    #[error("Invalid duration `{0}`. Use d, h, m. E.g.: 1d2h30m.")]
    InvalidDuration(String),
    #[error("The prize of the giveaway can't be empty.")]
    InvalidPrize,
    #[error("The number of winners must be at least 1.")]
    InvalidWinnerCount,
    #[error("The giveaway #{0} was not found or has already ended.")]
    GiveawayNotFound(u64),
    #[error("I can't find data for the giveaway #{0}.")]
    UnknownGiveaway(u64),
    #[error("No participants available for reroll.")]
    NoEligibleParticipants,
}

impl From<SerenityError> for Error {
    fn from(err: SerenityError) -> Error {
        let description = err.to_string();
        Error::SerenityError(description)
    }
}
