//! Send helpers for reply payloads.
//!
//! Picks photo+caption or plain text delivery, attaches the deep-link
//! keyboard and retries transient Telegram failures with exponential
//! backoff.

use crate::config::TELEGRAM_CAPTION_LIMIT;
use crate::relay::{ReplyButton, ReplyPayload};
use crate::utils::{retry_telegram_operation, truncate_str};
use anyhow::{anyhow, Result};
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode, ReplyParameters,
};
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Delivers a rendered payload as a reply to the triggering message.
///
/// A payload with an image becomes a photo with caption; otherwise a
/// plain text message. Both carry the inline keyboard when any button
/// survived permalink validation.
///
/// # Errors
///
/// Returns an error once the retry budget is exhausted; the caller logs
/// it as a terminal send failure.
pub async fn send_payload(bot: &Bot, reply_to: &Message, payload: &ReplyPayload) -> Result<()> {
    let keyboard = build_keyboard(&payload.buttons);

    if let Some(image) = &payload.image {
        let caption = fit_caption(&payload.text);
        retry_telegram_operation(|| async {
            let mut req = bot
                .send_photo(reply_to.chat.id, InputFile::file(image.clone()))
                .caption(caption.clone())
                .parse_mode(ParseMode::Html)
                .reply_parameters(ReplyParameters::new(reply_to.id));
            if let Some(kb) = keyboard.clone() {
                req = req.reply_markup(kb);
            }
            req.await
                .map_err(|e| anyhow!("Telegram photo send error: {e}"))
        })
        .await?;
    } else {
        retry_telegram_operation(|| async {
            let mut req = bot
                .send_message(reply_to.chat.id, payload.text.clone())
                .parse_mode(ParseMode::Html)
                .reply_parameters(ReplyParameters::new(reply_to.id));
            if let Some(kb) = keyboard.clone() {
                req = req.reply_markup(kb);
            }
            req.await.map_err(|e| anyhow!("Telegram send error: {e}"))
        })
        .await?;
    }

    Ok(())
}

/// One button per row, as in the result list. Buttons whose permalink is
/// not a valid URL are dropped here; the hit already appears in the text.
fn build_keyboard(buttons: &[ReplyButton]) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .iter()
        .filter_map(|button| match reqwest::Url::parse(&button.url) {
            Ok(url) => Some(vec![InlineKeyboardButton::url(button.label.clone(), url)]),
            Err(e) => {
                warn!(url = %button.url, error = %e, "dropping button with invalid permalink");
                None
            }
        })
        .collect();

    (!rows.is_empty()).then(|| InlineKeyboardMarkup::new(rows))
}

/// Result blocks end with this separator; truncation cuts only there so
/// the caption's HTML markup stays intact.
const BLOCK_SEPARATOR: &str = "---\n";

/// Trims a caption to the Telegram photo-caption limit.
///
/// Whole result blocks are dropped from the end until the text fits: a
/// cut inside `<b>`/`<code>` markup makes Telegram reject the whole
/// message ("can't parse entities"). When not even one block boundary
/// fits, the text is cut hard and any markup the cut left open is
/// closed.
fn fit_caption(text: &str) -> String {
    if text.graphemes(true).count() <= TELEGRAM_CAPTION_LIMIT {
        return text.to_string();
    }

    let mut cut = 0;
    for (idx, sep) in text.match_indices(BLOCK_SEPARATOR) {
        let end = idx + sep.len();
        if text[..end].graphemes(true).count() > TELEGRAM_CAPTION_LIMIT {
            break;
        }
        cut = end;
    }

    if cut == 0 {
        return format!(
            "{}…",
            close_dangling_markup(truncate_str(text, TELEGRAM_CAPTION_LIMIT))
        );
    }

    format!("{}…", &text[..cut])
}

/// Drops a trailing half-open tag and closes any tag left unclosed.
/// The renderer only emits `<b>` and `<code>`, with `<code>` nested
/// innermost, so closing in that order is sufficient.
fn close_dangling_markup(s: &str) -> String {
    let mut out = match s.rfind('<') {
        Some(idx) if !s[idx..].contains('>') => s[..idx].to_string(),
        _ => s.to_string(),
    };
    for (open, close) in [("<code>", "</code>"), ("<b>", "</b>")] {
        if out.matches(open).count() > out.matches(close).count() {
            out.push_str(close);
        }
    }
    out
}
