//! Query endpoint: one incoming text message in the target chat drives
//! the whole aggregate → render → send pipeline.

use crate::bot::messaging;
use crate::config::Settings;
use crate::gateway::GatewayClient;
use crate::relay::{aggregate, normalize_query, render, QueryPhase, RenderContext};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{error, info};

/// Handles one search query end to end.
///
/// Every per-query value is built fresh here and dropped when the send
/// attempt finishes; a failed send is logged as terminal and never
/// retried beyond the messaging backoff budget.
///
/// # Errors
///
/// Never propagates pipeline errors — each stage folds its failures into
/// logs so one bad query cannot take the dispatcher down.
pub async fn handle_query(
    bot: Bot,
    msg: Message,
    client: Arc<GatewayClient>,
    settings: Arc<Settings>,
) -> Result<()> {
    let Some(raw) = msg.text() else {
        return Ok(());
    };

    let query = normalize_query(raw);
    let requester = requester_label(&msg);
    let chat_label = chat_label(&msg);

    info!(
        phase = %QueryPhase::Received,
        query = %query,
        requester = %requester,
        chat = %chat_label,
        "search query received"
    );

    let channels = settings.channels();
    let outcome = aggregate(
        client.as_ref(),
        &query,
        &channels,
        settings.result_cap,
        settings.per_channel_limit,
        Duration::from_secs(settings.search_timeout_secs),
    )
    .await;

    info!(
        phase = %QueryPhase::Rendering,
        query = %query,
        results = outcome.len(),
        "rendering reply"
    );
    let ctx = RenderContext {
        query: query.clone(),
        requester,
        chat_label,
        image_path: PathBuf::from(&settings.result_image_path),
    };
    let payload = render(&ctx, &outcome);

    info!(
        phase = %QueryPhase::Sending,
        query = %query,
        buttons = payload.buttons.len(),
        with_image = payload.image.is_some(),
        "sending reply"
    );
    match messaging::send_payload(&bot, &msg, &payload).await {
        Ok(()) => {
            info!(phase = %QueryPhase::Sent, query = %query, "reply delivered");
        }
        Err(e) => {
            // Terminal: the requester gets nothing for this query.
            error!(phase = %QueryPhase::SendFailed, query = %query, error = ?e, "reply delivery failed");
        }
    }

    Ok(())
}

fn requester_label(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_else(|| "Utilisateur inconnu".to_string())
}

fn chat_label(msg: &Message) -> String {
    msg.chat
        .title()
        .map_or_else(|| "Groupe inconnu".to_string(), str::to_string)
}
