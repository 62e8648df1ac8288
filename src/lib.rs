//! Telegram media-search relay.
//!
//! Listens for text queries in one configured group, searches an ordered
//! list of content channels for matching media messages and replies with a
//! formatted summary plus deep-link buttons.

/// Telegram-facing handlers and send helpers
pub mod bot;
/// Settings and process-wide constants
pub mod config;
/// MTProto search gateway client
pub mod gateway;
/// Platform-agnostic query fan-out core
pub mod relay;
/// Retry and text helpers
pub mod utils;
