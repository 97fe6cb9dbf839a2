use chrono::Utc;
use tracing::info;

use crate::commands::context::Context;
use crate::commands::giveaway::models::{ChannelRef, EndOutcome, GiveawayId};
use crate::commands::giveaway::parser::parse_prize;
use crate::error::Result;

const START_USAGE: &str = "Usage: gstart <duration> <prize> [winners]\n\
    Examples:\n\
    gstart 1h Key\n\
    gstart 2d3h VIP 3";

/// Start a giveaway in the current channel
#[poise::command(
    slash_command,
    prefix_command,
    rename = "gstart",
    guild_only,
    required_permissions = "MANAGE_MESSAGES"
)]
pub async fn start_giveaway(
    ctx: Context<'_>,
    #[description = "Duration, e.g. 1d2h30m"] duration: String,
    #[description = "Prize, optionally followed by the number of winners"]
    #[rest]
    prize: String,
) -> Result<()> {
    let started = match parse_prize(&prize) {
        Ok(parsed) => {
            let channel = ChannelRef(ctx.channel_id().get());
            ctx.data()
                .giveaways
                .start(channel, &duration, &parsed.prize, parsed.winner_count)
                .await
        }
        Err(err) => Err(err),
    };

    let reply = match started {
        Ok(id) => {
            info!("Giveaway #{} created by '{}'", id, ctx.author().name);
            format!("Giveaway #{} started.", id)
        }
        Err(err) => format!("{}\n{}", err, START_USAGE),
    };
    ctx.say(reply).await?;

    Ok(())
}

/// End a running giveaway right now
#[poise::command(
    slash_command,
    prefix_command,
    rename = "gend",
    guild_only,
    required_permissions = "MANAGE_MESSAGES"
)]
pub async fn end_giveaway(
    ctx: Context<'_>,
    #[description = "Number of the giveaway"] id: u64,
) -> Result<()> {
    let id = GiveawayId(id);
    let reply = match ctx.data().giveaways.end(id).await {
        EndOutcome::Ended(outcome) => format!(
            "Giveaway #{} ended, {} winner(s) drawn.",
            id,
            outcome.winners.len()
        ),
        EndOutcome::AlreadyEnded => format!("Giveaway #{} has already ended.", id),
        EndOutcome::NotFound => format!("Giveaway #{} is not an active giveaway.", id),
    };
    ctx.say(reply).await?;

    Ok(())
}

/// Draw one more winner for an ended giveaway
#[poise::command(
    slash_command,
    prefix_command,
    rename = "greroll",
    guild_only,
    required_permissions = "MANAGE_MESSAGES"
)]
pub async fn reroll_giveaway(
    ctx: Context<'_>,
    #[description = "Number of the giveaway"] id: u64,
) -> Result<()> {
    let outcome = ctx.data().giveaways.reroll(GiveawayId(id)).await?;
    let reply = format!(
        "New winner of the giveaway #{}: {}",
        outcome.id,
        outcome.winner.mention()
    );
    ctx.say(reply).await?;

    Ok(())
}

/// Get a list of running giveaways
#[poise::command(slash_command, prefix_command, rename = "glist", guild_only)]
pub async fn list_giveaways(ctx: Context<'_>) -> Result<()> {
    let now = Utc::now();
    let manager = &ctx.data().giveaways;
    let formatter = manager.formatter();

    let giveaways = manager
        .running()
        .iter()
        .map(|giveaway| formatter.list_entry(giveaway, now))
        .collect::<Vec<String>>();

    let content = match giveaways.len() {
        0 => "There are no active giveaways.".to_string(),
        _ => giveaways.join("\n"),
    };
    ctx.say(content).await?;

    Ok(())
}
