use std::sync::Arc;

use poise::Context as PoiseContext;

use crate::commands::giveaway::manager::GiveawayManager;

// User data, which is stored and accessible in all command invocations
pub struct UserData {
    pub giveaways: Arc<GiveawayManager>,
}

// Generic context available across Poise commands
pub type Context<'a> = PoiseContext<'a, UserData, crate::error::Error>;
