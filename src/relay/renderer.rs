//! Reply payload assembly.
//!
//! Pure component: builds the HTML message text, the deep-link button
//! list and the optional image attachment from an accumulated outcome.
//! The only side effect is a filesystem check for the illustrative image;
//! delivery belongs to the send layer.

use crate::relay::types::{ReplyButton, ReplyPayload, SearchOutcome};
use html_escape::encode_text;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Per-query context echoed in the reply header.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Normalized query, as searched
    pub query: String,
    /// First name of the requesting user
    pub requester: String,
    /// Title of the group the query came from
    pub chat_label: String,
    /// Configured illustrative image
    pub image_path: PathBuf,
}

/// Fixed promotional footer appended after the result blocks.
const PROMO_TRAILER: &str =
    "\n🎁 Code promo 1XBET : <code>1KAT</code> (utilisez ce code pour vos paris !)";

/// Renders the outcome into a single outbound payload.
///
/// An empty outcome produces the fixed "no results" text with no buttons
/// and no image — the image path is not even probed. A non-empty outcome
/// gets the header / per-hit blocks / promo trailer layout, buttons for
/// every hit with a permalink, and the image when it exists on disk.
#[must_use]
pub fn render(ctx: &RenderContext, outcome: &SearchOutcome) -> ReplyPayload {
    if outcome.is_empty() {
        return ReplyPayload {
            text: format!(
                "❌ <b>Désolé, aucun fichier trouvé</b> pour la requête : <code>{}</code>.\n\n\
                 Vérifiez l'orthographe ou essayez un autre mot-clé. \
                 Nous ajoutons du nouveau contenu régulièrement !",
                encode_text(&ctx.query)
            ),
            buttons: Vec::new(),
            image: None,
        };
    }

    let mut text = format!(
        "🌿 <b>Résultats de votre recherche pour : <code>{}</code></b>\n\n\
         🙋 Demandé par : <code>{}</code>\n\
         👥 Dans le groupe : <code>{}</code>\n\n\
         ---\n",
        encode_text(&ctx.query),
        encode_text(&ctx.requester),
        encode_text(&ctx.chat_label),
    );

    let mut buttons = Vec::new();
    for hit in outcome.hits() {
        let _ = write!(
            text,
            "📁 <b>{}</b>\n💾 Taille : <code>{} Mo</code>\n🔗 Canal : {}\n---\n",
            encode_text(&hit.file_name),
            hit.size_display(),
            encode_text(&hit.channel_label),
        );

        // Hits without a permalink stay in the text but get no button.
        if let Some(link) = &hit.permalink {
            buttons.push(ReplyButton {
                label: format!("📥 {}", hit.file_name),
                url: link.clone(),
            });
        }
    }

    text.push_str(PROMO_TRAILER);

    let image = ctx.image_path.exists().then(|| ctx.image_path.clone());

    ReplyPayload {
        text,
        buttons,
        image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::{MediaHit, MediaKind};

    fn ctx(image_path: &str) -> RenderContext {
        RenderContext {
            query: "le film".to_string(),
            requester: "Ahmed".to_string(),
            chat_label: "Cinéphiles".to_string(),
            image_path: PathBuf::from(image_path),
        }
    }

    /// A file guaranteed to exist while tests run.
    fn existing_image() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml").to_string()
    }

    fn hit(name: &str, permalink: Option<&str>) -> MediaHit {
        MediaHit {
            file_name: name.to_string(),
            size_mb: Some(1.0),
            kind: MediaKind::Document,
            permalink: permalink.map(str::to_string),
            channel_label: "@canal".to_string(),
        }
    }

    fn outcome_of(hits: Vec<MediaHit>) -> SearchOutcome {
        let mut outcome = SearchOutcome::new(5);
        for h in hits {
            outcome.push(h);
        }
        outcome
    }

    #[test]
    fn test_empty_outcome_renders_no_results() {
        let payload = render(&ctx(&existing_image()), &SearchOutcome::new(5));
        assert!(payload.text.contains("aucun fichier trouvé"));
        assert!(payload.text.contains("<code>le film</code>"));
        assert!(payload.buttons.is_empty());
        // Image omitted even though the configured path exists
        assert!(payload.image.is_none());
    }

    #[test]
    fn test_non_empty_outcome_layout() {
        let payload = render(
            &ctx(&existing_image()),
            &outcome_of(vec![hit("film.mkv", Some("https://t.me/canal/5"))]),
        );
        assert!(payload.text.starts_with("🌿"));
        assert!(payload.text.contains("Demandé par : <code>Ahmed</code>"));
        assert!(payload.text.contains("📁 <b>film.mkv</b>"));
        assert!(payload.text.contains("💾 Taille : <code>1.0 Mo</code>"));
        assert!(payload.text.contains("🔗 Canal : @canal"));
        assert!(payload.text.ends_with("(utilisez ce code pour vos paris !)"));
        assert!(payload.image.is_some());
    }

    #[test]
    fn test_missing_image_falls_back_to_text_only() {
        let payload = render(
            &ctx("definitely/not/here.jpg"),
            &outcome_of(vec![hit("a", None)]),
        );
        assert!(payload.image.is_none());
    }

    #[test]
    fn test_permalink_less_hit_keeps_text_loses_button() {
        let payload = render(
            &ctx("missing.jpg"),
            &outcome_of(vec![
                hit("linked.mkv", Some("https://t.me/canal/1")),
                hit("orphan.mkv", None),
                hit("linked2.mkv", Some("https://t.me/canal/2")),
            ]),
        );
        assert!(payload.text.contains("orphan.mkv"));
        let labels: Vec<&str> = payload.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["📥 linked.mkv", "📥 linked2.mkv"]);
        assert_eq!(payload.buttons[0].url, "https://t.me/canal/1");
    }

    #[test]
    fn test_user_text_is_html_escaped() {
        let mut context = ctx("missing.jpg");
        context.query = "<script>".to_string();
        context.requester = "A & B".to_string();
        let payload = render(
            &context,
            &outcome_of(vec![hit("weird <name>.mkv", None)]),
        );
        assert!(payload.text.contains("&lt;script&gt;"));
        assert!(payload.text.contains("A &amp; B"));
        assert!(payload.text.contains("weird &lt;name&gt;.mkv"));
        assert!(!payload.text.contains("<script>"));
    }
}
