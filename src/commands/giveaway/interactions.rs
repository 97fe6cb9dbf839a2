use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use tracing::{debug, warn};

use crate::commands::context::UserData;
use crate::commands::giveaway::display::parse_join_button_id;
use crate::commands::giveaway::models::{ToggleOutcome, UserRef};
use crate::error::{Error, Result};

// Listens for presses on the join buttons of the giveaway announcements.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, UserData, Error>,
    data: &UserData,
) -> Result<()> {
    if let serenity::FullEvent::InteractionCreate { interaction } = event {
        if let Some(component) = interaction.as_message_component() {
            handle_join_button(ctx, component, data).await?;
        }
    }

    Ok(())
}

async fn handle_join_button(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    data: &UserData,
) -> Result<()> {
    let id = match parse_join_button_id(&component.data.custom_id) {
        Some(id) => id,
        None => return Ok(()),
    };

    let user = UserRef(component.user.id.get());
    let outcome = data.giveaways.toggle(id, user);
    debug!(
        "User '{}' pressed join on the giveaway #{}: {}",
        component.user.name,
        id,
        outcome.as_str()
    );

    let response = CreateInteractionResponseMessage::new()
        .content(outcome.reply())
        .ephemeral(true);
    component
        .create_response(&ctx.http, CreateInteractionResponse::Message(response))
        .await?;

    if outcome != ToggleOutcome::Inactive {
        if let Err(err) = data.giveaways.refresh(id).await {
            warn!("Can't refresh the giveaway #{}: {}", id, err);
        }
    }

    Ok(())
}
