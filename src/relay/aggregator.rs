//! Search fan-out across the configured channel list.
//!
//! Channels are visited sequentially in configured order. Each channel is
//! processed in isolation: a resolution or search failure is classified,
//! logged and skipped without touching the other channels. Accumulation
//! stops globally the moment the result cap is reached.

use crate::relay::client::{ChatClient, ClientError, FoundMessage};
use crate::relay::resolver::resolve;
use crate::relay::types::{ChannelRef, MediaHit, MediaKind, QueryPhase, SearchOutcome};
use anyhow::anyhow;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why one channel contributed nothing to the outcome.
#[derive(Debug, Error)]
pub enum ChannelFailure {
    /// The channel itself is unreachable: invalid peer, access denied or
    /// the bot is not a member
    #[error("channel access failed: {0}")]
    Access(ClientError),
    /// Anything else, including timeouts and transport errors
    #[error("unexpected channel error: {0}")]
    Unexpected(anyhow::Error),
}

impl From<ClientError> for ChannelFailure {
    fn from(err: ClientError) -> Self {
        if err.is_access() {
            Self::Access(err)
        } else {
            Self::Unexpected(err.into())
        }
    }
}

/// Normalizes a raw query for searching and for echoing in the reply
/// header: surrounding whitespace is trimmed and the text is lowercased.
/// No other sanitization happens; the backend sees the query as typed.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Runs the query against every configured channel, in order, and
/// accumulates up to `cap` media hits.
///
/// `query` is expected to be pre-normalized with [`normalize_query`] at
/// the pipeline entry; it is dispatched to the backend verbatim.
///
/// Failures are contained per channel: a channel that cannot be resolved
/// or searched is logged and skipped, and an empty channel list or a
/// failure of every channel simply yields an empty outcome.
pub async fn aggregate(
    client: &dyn ChatClient,
    query: &str,
    channels: &[ChannelRef],
    cap: usize,
    per_channel_limit: usize,
    channel_timeout: Duration,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::new(cap);

    for target in channels {
        if outcome.is_full() {
            info!(query = %query, cap, "result cap reached, skipping remaining channels");
            break;
        }

        match search_channel(
            client,
            query,
            target,
            per_channel_limit,
            channel_timeout,
            &mut outcome,
        )
        .await
        {
            Ok(appended) => {
                debug!(channel = %target, appended, total = outcome.len(), "channel searched");
            }
            Err(ChannelFailure::Access(e)) => {
                warn!(
                    query = %query,
                    channel = %target,
                    error = %e,
                    "channel inaccessible, skipping. Is the bot a member?"
                );
            }
            Err(ChannelFailure::Unexpected(e)) => {
                error!(
                    query = %query,
                    channel = %target,
                    error = ?e,
                    "unexpected error while searching channel, skipping"
                );
            }
        }
    }

    outcome
}

/// Resolves one channel, searches it and appends qualifying hits to the
/// outcome, stopping early when the global cap fills up.
///
/// Returns the number of hits appended, or the classified failure.
async fn search_channel(
    client: &dyn ChatClient,
    query: &str,
    target: &ChannelRef,
    per_channel_limit: usize,
    channel_timeout: Duration,
    outcome: &mut SearchOutcome,
) -> Result<usize, ChannelFailure> {
    let round_trip = async {
        debug!(phase = %QueryPhase::ResolvingChannels, channel = %target, "resolving channel");
        let resolved = resolve(client, target).await?;
        debug!(
            phase = %QueryPhase::Searching,
            channel = %resolved.label,
            chat_id = resolved.id,
            "searching channel"
        );
        let messages = client
            .search_messages(resolved.id, query, per_channel_limit)
            .await?;
        Ok::<_, ClientError>((resolved, messages))
    };

    let (resolved, messages) = tokio::time::timeout(channel_timeout, round_trip)
        .await
        .map_err(|_| {
            ChannelFailure::Unexpected(anyhow!(
                "channel search timed out after {}s",
                channel_timeout.as_secs()
            ))
        })??;

    let mut appended = 0;
    for message in &messages {
        if outcome.is_full() {
            break;
        }
        match classify(message, &resolved.label) {
            Some(hit) => {
                debug!(phase = %QueryPhase::Aggregating, file = %hit.file_name, "hit accumulated");
                outcome.push(hit);
                appended += 1;
            }
            None => {
                debug!(
                    channel = %resolved.label,
                    message_id = message.id,
                    "message carries no document, photo or video, ignored"
                );
            }
        }
    }

    Ok(appended)
}

/// Classifies a message's media payload, in fixed priority order:
/// document, then photo, then video. Messages matching none yield `None`
/// and do not count toward the cap.
fn classify(message: &FoundMessage, channel_label: &str) -> Option<MediaHit> {
    let (kind, file_name, file_size) = if let Some(doc) = &message.document {
        (
            MediaKind::Document,
            doc.file_name
                .clone()
                .unwrap_or_else(|| "Fichier sans nom".to_string()),
            doc.file_size,
        )
    } else if let Some(photo) = &message.photo {
        (
            MediaKind::Photo,
            format!("Photo_{}.jpg", message.id),
            photo.file_size,
        )
    } else if let Some(video) = &message.video {
        (
            MediaKind::Video,
            video
                .file_name
                .clone()
                .unwrap_or_else(|| format!("Vidéo_{}.mp4", message.id)),
            video.file_size,
        )
    } else {
        return None;
    };

    Some(MediaHit {
        file_name,
        size_mb: file_size.filter(|&bytes| bytes > 0).map(round_to_mb),
        kind,
        permalink: message.link.clone(),
        channel_label: channel_label.to_string(),
    })
}

/// Bytes to megabytes, rounded to 2 decimal places.
fn round_to_mb(bytes: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let mb = bytes as f64 / 1_048_576.0;
    (mb * 100.0).round() / 100.0
}
