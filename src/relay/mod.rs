//! Query fan-out and result aggregation core.
//!
//! Everything in this module is independent of Telegram: the external chat
//! platform is reached only through the [`ChatClient`] trait, so the
//! resolver, aggregator and renderer can be exercised with scripted
//! clients in tests.

/// Search fan-out across the configured channel list
pub mod aggregator;
/// Trait seam to the external chat platform
pub mod client;
/// Channel reference resolution
pub mod resolver;
/// Reply payload assembly
pub mod renderer;
/// Domain types shared across the relay
pub mod types;

pub use aggregator::{aggregate, normalize_query, ChannelFailure};
pub use client::{ChatClient, ChatMetadata, ClientError, FoundMessage, MediaInfo, PhotoInfo};
pub use renderer::{render, RenderContext};
pub use resolver::resolve;
pub use types::{
    ChannelRef, MediaHit, MediaKind, QueryPhase, ReplyButton, ReplyPayload, ResolvedChannel,
    SearchOutcome,
};
