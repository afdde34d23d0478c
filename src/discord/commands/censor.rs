// Discord commands for the image censor.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

use crate::core::censor::{CensorPlugin, Element, ImageRef};
use crate::core::i18n::StringTable;
use crate::discord::censor::send_hook::{render_content, send_elements};
use crate::infra::censor::{HttpImageFetcher, SafetyCheckerClient};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// The plugin instantiated with the production HTTP adapters.
pub type BotCensorPlugin = CensorPlugin<HttpImageFetcher, SafetyCheckerClient>;

/// Data that's shared across all commands.
/// This is where we store our services and configuration.
pub struct Data {
    pub censor: Arc<BotCensorPlugin>,
    pub i18n: Arc<StringTable>,
}

/// Image moderation controls.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("status", "preview", "say")
)]
pub async fn censor(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the active moderation configuration.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let config = ctx.data().censor.config();

    let embed = serenity::CreateEmbed::default()
        .title("Image Moderation Configuration")
        .color(serenity::Color::BLURPLE)
        .field("Outbound filtering", enabled_label(config.censor_send), true)
        .field("Inbound filtering", enabled_label(config.censor_message), true)
        .field("Watched channels", config.scope.len().to_string(), true)
        .field("Offset", format!("{:+.3}", config.offset), true)
        .field("Debug scores", enabled_label(config.debug), true)
        .field("Warning locale", config.locale.clone(), true)
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Run an image through moderation and post the outcome.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn preview(
    ctx: Context<'_>,
    #[description = "Image URL to check"] url: String,
) -> Result<(), Error> {
    // Classification takes two network round-trips; don't let the
    // interaction token expire while we wait.
    ctx.defer().await?;

    let data = ctx.data();
    let rendered = data.censor.render(Element::Image(ImageRef::new(url))).await;
    let content = render_content(
        &[rendered],
        &data.i18n,
        &data.censor.config().locale,
    );

    ctx.say(content).await?;
    Ok(())
}

/// Post a message as the bot, through the outbound filter.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn say(
    ctx: Context<'_>,
    #[description = "Text to post"] text: Option<String>,
    #[description = "Image URL to include"] image: Option<String>,
) -> Result<(), Error> {
    let mut elements = Vec::new();
    if let Some(text) = text {
        elements.push(Element::Text(text));
    }
    if let Some(url) = image {
        elements.push(Element::Image(ImageRef::new(url)));
    }

    if elements.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("Nothing to post.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    // The outbound filter may call out to the classifier; keep the
    // interaction alive in the meantime.
    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    send_elements(
        &ctx.serenity_context().http,
        ctx.channel_id(),
        elements,
        &data.censor,
        &data.i18n,
    )
    .await?;

    ctx.say("Posted.").await?;
    Ok(())
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}
