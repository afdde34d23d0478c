// Discord-specific outbound censoring - every element tree the bot sends
// through here is filtered first when outbound filtering is enabled.

use crate::core::censor::Element;
use crate::core::i18n::StringTable;
use crate::discord::commands::censor::BotCensorPlugin;
use crate::discord::Error;
use poise::serenity_prelude as serenity;

/// Filter a content tree through the outbound hook and send what remains.
pub async fn send_elements(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
    elements: Vec<Element>,
    plugin: &BotCensorPlugin,
    i18n: &StringTable,
) -> Result<(), Error> {
    let outcome = plugin.filter_outgoing(elements).await;

    let content = render_content(&outcome.elements, i18n, &plugin.config().locale);
    if content.is_empty() {
        return Ok(());
    }

    channel_id.say(http, content).await?;
    Ok(())
}

/// Render an element tree to Discord message content. Image references
/// become their URL (Discord unfurls them), localized placeholders are
/// resolved through the string table.
pub fn render_content(elements: &[Element], i18n: &StringTable, locale: &str) -> String {
    let mut lines = Vec::new();

    for element in elements {
        match element {
            Element::Text(text) => lines.push(text.clone()),
            Element::Image(image) => lines.push(image.source.clone()),
            Element::Localized(key) => lines.push(i18n.resolve(locale, key)),
        }
    }

    lines.join("\n")
}

// ============================================================================
// TESTS
// ============================================================================
