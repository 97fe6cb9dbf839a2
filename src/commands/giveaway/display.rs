use std::sync::Arc;

use poise::serenity_prelude::{
    ButtonStyle, ChannelId, Colour, CreateActionRow, CreateButton, CreateEmbed, CreateMessage,
    EditMessage, Http, MessageId,
};
use serenity::async_trait;
use tracing::debug;

use crate::commands::giveaway::formatters::GiveawayCard;
use crate::commands::giveaway::models::{ChannelRef, GiveawayId, MessageRef};
use crate::error::Result;

pub const JOIN_BUTTON_PREFIX: &str = "giveaway-join:";

const COLOR_RUNNING: u32 = 0x2B2D31;
const COLOR_ENDED: u32 = 0x00FF9D;

// Builds the custom id of the join button for the giveaway.
pub fn join_button_id(id: GiveawayId) -> String {
    format!("{}{}", JOIN_BUTTON_PREFIX, id)
}

// Extracts the giveaway id from a join button custom id. Returns None for
// buttons that don't belong to giveaways.
pub fn parse_join_button_id(custom_id: &str) -> Option<GiveawayId> {
    custom_id
        .strip_prefix(JOIN_BUTTON_PREFIX)
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(GiveawayId)
}

// The place where giveaways are shown to users.
#[async_trait]
pub trait GiveawayDisplay: Send + Sync {
    // Posts a new announcement and returns a reference to it.
    async fn publish(
        &self,
        channel: ChannelRef,
        id: GiveawayId,
        card: &GiveawayCard,
    ) -> Result<MessageRef>;

    // Replaces the content of an already published announcement.
    async fn update(
        &self,
        channel: ChannelRef,
        message: MessageRef,
        id: GiveawayId,
        card: &GiveawayCard,
    ) -> Result<()>;

    // Sends a text notification to the channel, as a reply to the
    // announcement when it's given.
    async fn announce(
        &self,
        channel: ChannelRef,
        reply_to: Option<MessageRef>,
        text: &str,
    ) -> Result<()>;
}

pub struct DiscordDisplay {
    http: Arc<Http>,
}

impl DiscordDisplay {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordDisplay { http }
    }

    fn embed(card: &GiveawayCard) -> CreateEmbed {
        let colour = match card.joinable {
            true => COLOR_RUNNING,
            false => COLOR_ENDED,
        };

        CreateEmbed::new()
            .title(&card.title)
            .description(&card.description)
            .colour(Colour::new(colour))
    }

    fn components(id: GiveawayId, card: &GiveawayCard) -> Vec<CreateActionRow> {
        match card.joinable {
            true => vec![CreateActionRow::Buttons(vec![
                CreateButton::new(join_button_id(id))
                    .label("Join 🎉")
                    .style(ButtonStyle::Success),
            ])],
            false => vec![],
        }
    }
}

#[async_trait]
impl GiveawayDisplay for DiscordDisplay {
    async fn publish(
        &self,
        channel: ChannelRef,
        id: GiveawayId,
        card: &GiveawayCard,
    ) -> Result<MessageRef> {
        let message = CreateMessage::new()
            .embed(Self::embed(card))
            .components(Self::components(id, card));
        let sent = ChannelId::new(channel.0)
            .send_message(&self.http, message)
            .await?;
        Ok(MessageRef(sent.id.get()))
    }

    async fn update(
        &self,
        channel: ChannelRef,
        message: MessageRef,
        id: GiveawayId,
        card: &GiveawayCard,
    ) -> Result<()> {
        let edit = EditMessage::new()
            .embed(Self::embed(card))
            .components(Self::components(id, card));
        ChannelId::new(channel.0)
            .edit_message(&self.http, MessageId::new(message.0), edit)
            .await?;
        Ok(())
    }

    async fn announce(
        &self,
        channel: ChannelRef,
        reply_to: Option<MessageRef>,
        text: &str,
    ) -> Result<()> {
        let channel_id = ChannelId::new(channel.0);
        if let Some(message) = reply_to {
            let reply = CreateMessage::new()
                .content(text)
                .reference_message((channel_id, MessageId::new(message.0)));
            match channel_id.send_message(&self.http, reply).await {
                Ok(_) => return Ok(()),
                // The announcement could have been deleted
                Err(err) => debug!("Can't reply to the message {}: {}", message.0, err),
            }
        }

        channel_id.say(&self.http, text).await?;
        Ok(())
    }
}
