pub mod display;
pub mod formatters;
pub mod handlers;
pub mod interactions;
pub mod manager;
pub mod models;
pub mod parser;
pub mod records;
pub mod registry;
pub mod strategies;
pub mod sweeper;

pub use crate::commands::giveaway::handlers::{
    end_giveaway, list_giveaways, reroll_giveaway, start_giveaway,
};
