use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// One help line per table entry: usage, description and where it works.
fn command_lines(ctx: &Context<'_>) -> Vec<String> {
    let data = ctx.data();
    data.commands
        .entries()
        .map(|entry| {
            let mut line = format!("• `{}` - {}", entry.usage(&data.prefix), entry.description);
            if !entry.global {
                line.push_str(" (servers only)");
            }
            line
        })
        .collect()
}

/// List the utility commands and their arguments.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let lines = command_lines(&ctx);

    let mut embed = serenity::CreateEmbed::new()
        .title("Utility Commands")
        .description(format!(
            "Type these in any channel I can read, starting with `{}`.",
            ctx.data().prefix
        ))
        .color(serenity::Colour::from_rgb(88, 101, 242));

    for (i, chunk) in chunk_entries(&lines).iter().enumerate() {
        let name = if i == 0 { "Commands" } else { "Commands (cont.)" };
        embed = embed.field(name, chunk.join("\n"), false);
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Group lines so that no embed field goes over Discord's 1024 char limit.
fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut length = 0;

    for entry in entries {
        if !current.is_empty() && length + entry.len() + 1 > 1000 {
            chunks.push(std::mem::take(&mut current));
            length = 0;
        }
        current.push(entry.clone());
        length += entry.len() + 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
