pub mod context;
pub mod giveaway;

// Re-exports for the later usage in main.rs
pub use crate::commands::context::{Context, UserData};

use crate::commands::giveaway::{end_giveaway, list_giveaways, reroll_giveaway, start_giveaway};
use crate::error::Error;

pub fn commands() -> Vec<poise::Command<UserData, Error>> {
    vec![
        start_giveaway(),
        end_giveaway(),
        reroll_giveaway(),
        list_giveaways(),
    ]
}
