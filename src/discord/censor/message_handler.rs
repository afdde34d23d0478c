// Discord-specific inbound censoring - applies the core filter to received
// messages and translates a block into delete + warn.

use crate::core::censor::{Element, ImageRef, UNSAFE_IMAGE_KEY};
use crate::core::i18n::StringTable;
use crate::discord::commands::censor::BotCensorPlugin;
use crate::discord::Error;
use poise::serenity_prelude as serenity;

/// Check an incoming message for images that should be censored.
///
/// Returns `true` if the message contained a blocked image and was handled
/// (deleted, warning sent). Channels outside the configured scope and
/// messages without images pass through untouched.
pub async fn handle_incoming(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    plugin: &BotCensorPlugin,
    i18n: &StringTable,
) -> Result<bool, Error> {
    // Skip bots (including our own warnings)
    if msg.author.bot {
        return Ok(false);
    }

    let elements = collect_elements(msg);
    if !elements.iter().any(|e| matches!(e, Element::Image(_))) {
        return Ok(false);
    }

    let outcome = plugin
        .filter_incoming(msg.channel_id.get(), elements)
        .await;
    if !outcome.changed {
        return Ok(false);
    }

    tracing::info!(
        channel_id = msg.channel_id.get(),
        message_id = msg.id.get(),
        "Deleting a message with a blocked image"
    );

    // Delete the offending message. If Discord refuses (permissions, the
    // author was faster), we still warn - the log line is enough for ops.
    if let Err(e) = msg.delete(&ctx.http).await {
        tracing::warn!("Failed to delete message with blocked image: {}", e);
    }

    let warning = i18n.resolve(&plugin.config().locale, UNSAFE_IMAGE_KEY);
    if let Err(e) = msg.channel_id.say(&ctx.http, warning).await {
        tracing::warn!("Failed to send censor warning: {}", e);
    }

    Ok(true)
}

/// Build the content tree of a Discord message: its text plus every image
/// reference we can see (attachments by filename, embedded images).
fn collect_elements(msg: &serenity::Message) -> Vec<Element> {
    let mut elements = Vec::new();

    if !msg.content.is_empty() {
        elements.push(Element::Text(msg.content.clone()));
    }

    for attachment in &msg.attachments {
        if is_image_filename(&attachment.filename) {
            elements.push(Element::Image(ImageRef::with_summary(
                attachment.url.clone(),
                attachment.filename.clone(),
            )));
        }
    }

    for embed in &msg.embeds {
        if let Some(image) = &embed.image {
            elements.push(Element::Image(ImageRef::new(image.url.clone())));
        }
        if let Some(thumbnail) = &embed.thumbnail {
            elements.push(Element::Image(ImageRef::new(thumbnail.url.clone())));
        }
    }

    elements
}

fn is_image_filename(filename: &str) -> bool {
    let name = filename.to_lowercase();
    name.ends_with(".png")
        || name.ends_with(".jpg")
        || name.ends_with(".jpeg")
        || name.ends_with(".gif")
        || name.ends_with(".webp")
}

// ============================================================================
// TESTS
// ============================================================================
