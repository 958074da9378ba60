// The utility command set. Each handler is a thin translation from parsed
// arguments to a service call and back to a reply; the table at the bottom
// is the single place commands are registered.

use super::info_card::{build_info_embed, TIMESTAMP_FORMAT};
use super::Utilities;
use crate::core::commands::{
    ArgKind, ArgSpec, Args, CommandContext, CommandError, CommandTable, Embed, HandlerResult,
    Reply, Table, Target,
};
use crate::core::history::{natural_time, MessageScope};
use crate::core::lookups::PwnedStatus;
use crate::core::media::parse_custom_emoji;
use chrono::Utc;
use rand::Rng;

type Ctx<'a> = CommandContext<'a, Utilities>;

/// Embed colour used when an avatar yields none.
const DEFAULT_ACCENT: u32 = 0x5865F2;

pub fn flip_coin<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    if rng.gen_bool(0.5) {
        "heads"
    } else {
        "tails"
    }
}

fn coin(_: Ctx<'_>, _: Args) -> HandlerResult<'_> {
    Box::pin(async move { Ok(Reply::text(flip_coin(&mut rand::thread_rng()))) })
}

/// File extension for a downloaded picture, guessed from its URL.
fn image_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    match path.rsplit('.').next() {
        Some("png") => "png",
        Some("webp") => "webp",
        Some("jpeg") => "jpeg",
        _ => "jpg",
    }
}

fn cat(ctx: Ctx<'_>, _: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let Some(url) = ctx.state.lookups.random_cat_url().await else {
            return Ok(Reply::text("404 cat not found :("));
        };

        let bytes = ctx.state.media.fetch(&url).await?;
        Ok(Reply::attachment(format!("cat.{}", image_extension(&url)), bytes))
    })
}

fn urban(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        Ok(match ctx.state.lookups.urban(args.text(0)?).await? {
            Some(entry) => Reply::text(format!("{} - {}", entry.word, entry.definition)),
            None => Reply::warning("no matches"),
        })
    })
}

fn pwnd(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        Ok(match ctx.state.lookups.pwnd(args.text(0)?).await? {
            PwnedStatus::Clean => {
                Reply::text(":white_check_mark: you haven't been pwnd yet, awesome!")
            }
            PwnedStatus::Breached(breaches) => {
                let sites: Vec<String> = breaches.iter().map(|b| b.summary()).collect();
                Reply::text(format!(
                    ":warning: You've been pwnd on {} sites:\n{}",
                    sites.len(),
                    sites.join("\n")
                ))
            }
        })
    })
}

fn geoip(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let record = ctx.state.lookups.geoip(args.text(0)?).await?;
        Ok(Reply::text(record.summary()))
    })
}

fn google(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        Ok(match ctx.state.lookups.google(args.text(0)?).await? {
            Some(result) => Reply::embed(Embed {
                title: Some(result.title),
                url: Some(result.url),
                description: Some(result.snippet),
                ..Default::default()
            }),
            None => Reply::text("No results found"),
        })
    })
}

fn emoji(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let token = args.text(0)?;
        let Some(emoji) = parse_custom_emoji(token) else {
            return Ok(Reply::text(format!("Unknown emoji: `{}`", token)));
        };

        let mut lines = vec![
            format!("**ID:** {}", emoji.id),
            format!("**Name:** {}", emoji.name),
        ];
        if let Some(guild) = ctx.directory.emoji_owner(emoji.id).await {
            lines.push(format!("**Guild:** {} ({})", guild.name, guild.id));
        }

        let url = ctx.state.media.cdn().custom_url(emoji.id);
        let bytes = ctx.state.media.fetch(&url).await?;
        Ok(Reply::text(lines.join("\n")).with_attachment("emoji.png", bytes))
    })
}

fn jumbo(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let png = ctx.state.media.jumbo(args.text(0)?).await?;
        Ok(Reply::attachment("emoji.png", png))
    })
}

async fn display_user(ctx: Ctx<'_>, user_id: u64) -> String {
    match ctx.directory.user(user_id).await {
        Some(user) => user.tag,
        None => format!("<@{}>", user_id),
    }
}

fn seen(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let user_id = args.user(0)?;
        let name = display_user(ctx, user_id).await;

        Ok(match ctx.state.history.last_seen(user_id).await? {
            Some(at) => Reply::text(format!(
                "I last saw {} {} ({})",
                name,
                natural_time(Utc::now() - at),
                at.format(TIMESTAMP_FORMAT)
            )),
            None => Reply::text(format!("I've never seen {}", name)),
        })
    })
}

fn jpeg(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let bytes = ctx.state.media.crush_jpeg(args.url(0)?).await?;
        Ok(Reply::attachment("image.jpg", bytes))
    })
}

fn info(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let user_id = args.user(0)?;
        let guild_id = ctx.invocation.guild_id.ok_or(CommandError::GuildOnly)?;

        let user = ctx
            .directory
            .user(user_id)
            .await
            .ok_or_else(|| CommandError::invalid(format!("I don't know <@{}>", user_id)))?;
        let member = ctx.directory.member(guild_id, user_id).await;
        let color = ctx
            .state
            .media
            .accent_color(&user.avatar_url)
            .await
            .unwrap_or(DEFAULT_ACCENT);

        Ok(Reply::embed(build_info_embed(&user, member.as_ref(), color)))
    })
}

fn words(ctx: Ctx<'_>, args: Args) -> HandlerResult<'_> {
    Box::pin(async move {
        let scope = match args.target(0)? {
            Target::User(id) => MessageScope::Author(id),
            Target::Channel(id) => MessageScope::Channel(id),
            Target::Guild(id) => MessageScope::Guild(id),
        };

        let mut table = Table::new(["Word", "Count"]);
        for word in ctx.state.history.top_words(scope).await? {
            table.add([word.word, word.count.to_string()]);
        }
        Ok(Reply::table(&table))
    })
}

/// Every utility command with its grammar and scope. Global commands also
/// answer in direct messages.
pub fn utility_commands() -> CommandTable<Utilities> {
    let mut table = CommandTable::new();
    table
        .register("coin", "Flip a coin.", vec![], true, coin)
        .register("cat", "Post a random cat picture.", vec![], true, cat)
        .register(
            "urban",
            "Look a term up on Urban Dictionary.",
            vec![ArgSpec::new("term", ArgKind::Tail)],
            true,
            urban,
        )
        .register(
            "pwnd",
            "Check whether an email address shows up in known breaches.",
            vec![ArgSpec::new("email", ArgKind::Str)],
            true,
            pwnd,
        )
        .register(
            "geoip",
            "Locate an IP address.",
            vec![ArgSpec::new("ip", ArgKind::Str)],
            true,
            geoip,
        )
        .register(
            "google",
            "Show the top web search result.",
            vec![ArgSpec::new("query", ArgKind::Tail)],
            true,
            google,
        )
        .register(
            "emoji",
            "Show details and the image of a custom emoji.",
            vec![ArgSpec::new("emoji", ArgKind::Str)],
            true,
            emoji,
        )
        .register(
            "jumbo",
            "Combine up to five emojis into one big image.",
            vec![ArgSpec::new("emojis", ArgKind::Tail)],
            true,
            jumbo,
        )
        .register(
            "seen",
            "When did a user last say something?",
            vec![ArgSpec::new("user", ArgKind::User)],
            false,
            seen,
        )
        .register(
            "jpeg",
            "Add more JPEG to an image.",
            vec![ArgSpec::new("image", ArgKind::Url)],
            true,
            jpeg,
        )
        .register(
            "info",
            "Show account details for a member.",
            vec![ArgSpec::new("user", ArgKind::User)],
            false,
            info,
        )
        .register(
            "words",
            "Most used words of a user, channel or server.",
            vec![ArgSpec::new("target", ArgKind::Target)],
            false,
            words,
        );
    table
}
