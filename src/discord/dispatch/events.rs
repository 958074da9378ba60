use super::directory::SerenityDirectory;
use super::render::render_reply;
use crate::core::commands::Invocation;
use crate::core::history::StoredMessage;
use crate::core::utilities::info_card::snowflake_created_at;
use crate::discord::{Data, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;

/// Record guild chatter, then run the message as a prefix command if it is one.
pub async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }

    let guild_id = message.guild_id.map(|id| id.get());
    if let Some(guild_id) = guild_id {
        let stored = StoredMessage {
            message_id: message.id.get(),
            author_id: message.author.id.get(),
            channel_id: message.channel_id.get(),
            guild_id,
            content: message.content.clone(),
            timestamp: snowflake_created_at(message.id.get()).unwrap_or_else(Utc::now),
        };
        if let Err(e) = data.utilities.history.record(&stored).await {
            tracing::error!(message_id = stored.message_id, "Failed to record message: {}", e);
        }
    }

    let Some(invocation) = Invocation::parse(
        &message.content,
        &data.prefix,
        message.author.id.get(),
        message.channel_id.get(),
        guild_id,
    ) else {
        return Ok(());
    };

    if data.commands.get(&invocation.command).is_none() {
        return Ok(());
    }

    tracing::info!(
        command = %invocation.command,
        author = invocation.author_id,
        guild = ?invocation.guild_id,
        "Running command"
    );
    let _ = message.channel_id.broadcast_typing(&ctx.http).await;

    let directory = SerenityDirectory::new(ctx);
    if let Some(reply) = data
        .commands
        .dispatch(&data.utilities, &invocation, &directory)
        .await
    {
        message
            .channel_id
            .send_message(ctx, render_reply(reply))
            .await?;
    }

    Ok(())
}
