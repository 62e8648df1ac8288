//! Domain types for the search relay.

use std::fmt;
use std::path::PathBuf;

/// A configured source channel, as written in the settings.
///
/// The configured order is significant: earlier channels are searched
/// first and win when the global result cap is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// Public handle, e.g. `@mycanals237`
    Handle(String),
    /// Numeric chat ID, e.g. `-1001234567890`
    Id(i64),
    /// Invite link to a private channel, e.g. `https://t.me/+abc`
    Invite(String),
}

impl ChannelRef {
    /// Parses one configured channel token.
    ///
    /// Numeric IDs are preferred when the token parses as an integer;
    /// anything containing `t.me/+` or `t.me/joinchat` is treated as an
    /// invite link; everything else is a handle.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        if let Ok(id) = token.parse::<i64>() {
            Self::Id(id)
        } else if token.contains("t.me/+") || token.contains("t.me/joinchat") {
            Self::Invite(token.to_string())
        } else {
            Self::Handle(token.to_string())
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(handle) | Self::Invite(handle) => f.write_str(handle),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// A channel that has been resolved for searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    /// Stable platform chat ID used for search requests
    pub id: i64,
    /// Human-readable label shown in replies
    pub label: String,
}

/// Classification of a matched message's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Generic file attachment
    Document,
    /// Photo
    Photo,
    /// Video file
    Video,
}

/// One matching media message found in a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaHit {
    /// File name, or a generated placeholder when the platform gives none
    pub file_name: String,
    /// Size in megabytes rounded to 2 decimals; `None` when unknown
    pub size_mb: Option<f64>,
    /// Media classification
    pub kind: MediaKind,
    /// Deep link to the original message, when the platform can build one
    pub permalink: Option<String>,
    /// Display label of the channel the hit came from
    pub channel_label: String,
}

impl MediaHit {
    /// Size as shown in replies: `1.0` for exactly 1 MiB, `0` when
    /// unknown, minimal decimal form otherwise (`1.5`, `2.25`).
    #[must_use]
    pub fn size_display(&self) -> String {
        match self.size_mb {
            None => "0".to_string(),
            Some(v) if v.fract() == 0.0 => format!("{v:.1}"),
            Some(v) => format!("{v}"),
        }
    }
}

/// Ordered, cap-bounded collection of media hits for one query.
///
/// The cap is enforced during accumulation: [`SearchOutcome::push`]
/// refuses hits once the cap is reached, so the invariant
/// `len() <= cap` holds at all times.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    cap: usize,
    hits: Vec<MediaHit>,
}

impl SearchOutcome {
    /// Creates an empty outcome bounded by `cap`.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            hits: Vec::with_capacity(cap),
        }
    }

    /// Appends a hit unless the cap is already reached.
    ///
    /// Returns `false` when the hit was refused.
    pub fn push(&mut self, hit: MediaHit) -> bool {
        if self.is_full() {
            return false;
        }
        self.hits.push(hit);
        true
    }

    /// Whether the global cap has been reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.hits.len() >= self.cap
    }

    /// Hits in channel order, then in-channel match order.
    #[must_use]
    pub fn hits(&self) -> &[MediaHit] {
        &self.hits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// One inline button pointing at an original message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    /// Button label, `📥 {file_name}`
    pub label: String,
    /// Message permalink
    pub url: String,
}

/// Assembled outbound reply, ready for the send layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyPayload {
    /// HTML-formatted message text or photo caption
    pub text: String,
    /// Deep-link buttons, outcome order, permalink-bearing hits only
    pub buttons: Vec<ReplyButton>,
    /// Illustrative image, attached only when present on disk
    pub image: Option<PathBuf>,
}

/// Lifecycle of one query, logged as it advances. No backward
/// transitions; `SendFailed` is terminal and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Received,
    ResolvingChannels,
    Searching,
    Aggregating,
    Rendering,
    Sending,
    Sent,
    SendFailed,
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::ResolvingChannels => "resolving_channels",
            Self::Searching => "searching",
            Self::Aggregating => "aggregating",
            Self::Rendering => "rendering",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::SendFailed => "send_failed",
        };
        f.write_str(name)
    }
}
