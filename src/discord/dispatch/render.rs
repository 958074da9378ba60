// Turns core replies into serenity message builders.

use crate::core::commands::{Embed, Reply};
use poise::serenity_prelude as serenity;

/// Discord rejects message content longer than this.
pub const MAX_CONTENT_CHARS: usize = 2000;

pub fn render_reply(reply: Reply) -> serenity::CreateMessage {
    let mut message = serenity::CreateMessage::new();

    if let Some(content) = reply.content {
        message = message.content(truncate_content(&content));
    }
    if let Some(embed) = reply.embed {
        message = message.embed(render_embed(embed));
    }
    if let Some(attachment) = reply.attachment {
        message = message.add_file(serenity::CreateAttachment::bytes(
            attachment.bytes,
            attachment.filename,
        ));
    }

    message
}

pub fn render_embed(embed: Embed) -> serenity::CreateEmbed {
    let mut out = serenity::CreateEmbed::new();
    if let Some(title) = embed.title {
        out = out.title(title);
    }
    if let Some(url) = embed.url {
        out = out.url(url);
    }
    if let Some(description) = embed.description {
        out = out.description(description);
    }
    if let Some(color) = embed.color {
        out = out.color(color);
    }
    if let Some(thumbnail) = embed.thumbnail {
        out = out.thumbnail(thumbnail);
    }
    out.fields(
        embed
            .fields
            .into_iter()
            .map(|field| (field.name, field.value, field.inline)),
    )
}

fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => content[..cut].to_string(),
        None => content.to_string(),
    }
}
