pub mod commands;
pub mod config;
pub mod error;

use std::sync::Arc;

use poise::serenity_prelude::{Client, GatewayIntents};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::UserData;
use crate::commands::giveaway::display::DiscordDisplay;
use crate::commands::giveaway::interactions::handle_event;
use crate::commands::giveaway::manager::GiveawayManager;
use crate::commands::giveaway::sweeper::Sweeper;
use crate::config::Config;
use crate::error::Error;

async fn on_error(error: poise::FrameworkError<'_, UserData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            warn!(
                "Command '{}' failed: {}",
                ctx.command().qualified_name,
                error
            );
            if let Err(err) = ctx.say(error.to_string()).await {
                error!("Can't send the error reply: {}", err);
            }
        }
        error => {
            if let Err(err) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", err);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Can't load the configuration: {}", err);
            return;
        }
    };
    let sweep_interval = config.sweep_interval;

    let framework = poise::Framework::<UserData, Error>::builder()
        .options(poise::FrameworkOptions {
            commands: commands::commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Got command '{}' by user '{}'",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("{} is connected!", ready.user.name);
                warn!("Giveaways are kept in memory only and will be lost on restart");

                let display = Arc::new(DiscordDisplay::new(ctx.http.clone()));
                let giveaways = Arc::new(GiveawayManager::new(display));
                Sweeper::new(giveaways.clone(), sweep_interval).spawn();

                Ok(UserData { giveaways })
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let mut client = match Client::builder(&config.discord_token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Cannot create a Discord client: {}", err);
            return;
        }
    };

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
