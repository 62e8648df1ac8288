//! Trait seam to the external chat platform.
//!
//! The relay core has no Telegram dependency — metadata lookup and message
//! search go through [`ChatClient`], implemented in production by the
//! MTProto gateway client and in tests by scripted mocks.

use crate::relay::types::ChannelRef;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by a [`ChatClient`] implementation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The peer does not exist or the reference is invalid
    #[error("chat not found: {0}")]
    NotFound(String),
    /// The bot is not allowed to inspect this chat
    #[error("access denied to chat: {0}")]
    AccessDenied(String),
    /// The bot is not a member of this chat
    #[error("bot is not a participant of {0}")]
    NotParticipant(String),
    /// Network-level failure talking to the platform
    #[error("transport error: {0}")]
    Transport(String),
    /// The platform answered with an unclassified error
    #[error("platform error: {0}")]
    Platform(String),
}

impl ClientError {
    /// Whether this error is an access problem with the channel itself,
    /// as opposed to an unexpected transport or platform failure.
    #[must_use]
    pub const fn is_access(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::AccessDenied(_) | Self::NotParticipant(_)
        )
    }
}

/// Chat metadata, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMetadata {
    /// Stable chat ID
    pub id: i64,
    /// Public username, without the leading `@`
    pub username: Option<String>,
    /// Chat title
    pub title: Option<String>,
}

/// File attachment metadata for documents and videos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaInfo {
    /// Original file name, when the uploader provided one
    pub file_name: Option<String>,
    /// Size in bytes
    pub file_size: Option<u64>,
}

/// Photo metadata; photos carry no file name, only the largest size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PhotoInfo {
    /// Size in bytes of the largest rendition
    pub file_size: Option<u64>,
}

/// One message returned by a channel search.
///
/// At most one of `document` / `photo` / `video` is expected to be set;
/// when several are, classification picks them in that priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FoundMessage {
    /// Message ID within the channel
    pub id: i64,
    pub document: Option<MediaInfo>,
    pub photo: Option<PhotoInfo>,
    pub video: Option<MediaInfo>,
    /// Permalink to the message; absent for some private-channel setups
    pub link: Option<String>,
}

/// External chat platform operations consumed by the relay core.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Looks up chat metadata for a configured channel reference.
    async fn chat_metadata(&self, target: &ChannelRef) -> Result<ChatMetadata, ClientError>;

    /// Searches one channel for up to `limit` messages matching `query`,
    /// in platform-native order.
    async fn search_messages(
        &self,
        chat_id: i64,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FoundMessage>, ClientError>;
}
