//! MTProto search gateway client.
//!
//! The Telegram Bot API has no message-search method, so channel metadata
//! lookup and per-channel search go through a small self-hosted gateway
//! sidecar that wraps an MTProto session and speaks JSON over HTTP. This
//! module is the only place that knows about that wire format; the relay
//! core sees it through the [`ChatClient`] trait.

use crate::relay::{ChannelRef, ChatClient, ChatMetadata, ClientError, FoundMessage};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the search gateway sidecar.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

/// Error body returned by the gateway on non-2xx responses.
#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    messages: Vec<FoundMessage>,
}

impl GatewayClient {
    /// Creates a client for the gateway at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
        peer: &str,
    ) -> Result<T, ClientError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Platform(format!("invalid gateway response: {e}")));
        }

        let detail = response
            .json::<GatewayErrorBody>()
            .await
            .unwrap_or_else(|_| GatewayErrorBody {
                error: format!("HTTP {status}"),
                code: None,
            });
        Err(classify_status(status, detail.code.as_deref(), peer, &detail.error))
    }
}

/// Maps a gateway error response onto the client error taxonomy.
fn classify_status(
    status: StatusCode,
    code: Option<&str>,
    peer: &str,
    detail: &str,
) -> ClientError {
    match (status, code) {
        (_, Some("not_participant")) => ClientError::NotParticipant(peer.to_string()),
        (StatusCode::NOT_FOUND, _) | (_, Some("peer_invalid" | "channel_invalid")) => {
            ClientError::NotFound(peer.to_string())
        }
        (StatusCode::FORBIDDEN, _) => ClientError::AccessDenied(peer.to_string()),
        _ => ClientError::Platform(format!("{status}: {detail}")),
    }
}

#[async_trait]
impl ChatClient for GatewayClient {
    async fn chat_metadata(&self, target: &ChannelRef) -> Result<ChatMetadata, ClientError> {
        let peer = target.to_string();
        debug!(peer = %peer, "resolving peer via gateway");
        self.post_json("resolve", json!({ "peer": peer }), &peer)
            .await
    }

    async fn search_messages(
        &self,
        chat_id: i64,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FoundMessage>, ClientError> {
        debug!(chat_id, query = %query, limit, "searching via gateway");
        let response: SearchResponse = self
            .post_json(
                "search",
                json!({ "chat_id": chat_id, "query": query, "limit": limit }),
                &chat_id.to_string(),
            )
            .await?;
        Ok(response.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, None, "@a", "no such peer"),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, None, "@a", "forbidden"),
            ClientError::AccessDenied(_)
        ));
        assert!(matches!(
            classify_status(
                StatusCode::FORBIDDEN,
                Some("not_participant"),
                "@a",
                "join first"
            ),
            ClientError::NotParticipant(_)
        ));
        assert!(matches!(
            classify_status(
                StatusCode::BAD_REQUEST,
                Some("peer_invalid"),
                "@a",
                "bad peer"
            ),
            ClientError::NotFound(_)
        ));
        let err = classify_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            "@a",
            "flood wait",
        );
        assert!(matches!(err, ClientError::Platform(_)));
        assert!(!err.is_access());
    }

    #[test]
    fn test_found_message_wire_format() {
        let raw = r#"{
            "messages": [
                {
                    "id": 120,
                    "document": {"file_name": "film.mkv", "file_size": 734003200},
                    "link": "https://t.me/c/1234/120"
                },
                {"id": 121, "photo": {"file_size": 150000}},
                {"id": 122}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.messages.len(), 3);
        assert_eq!(
            parsed.messages[0]
                .document
                .as_ref()
                .and_then(|d| d.file_name.as_deref()),
            Some("film.mkv")
        );
        assert!(parsed.messages[1].photo.is_some());
        assert!(parsed.messages[2].document.is_none());
        assert_eq!(parsed.messages[2].link, None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GatewayClient::new("http://localhost:8800/").expect("client");
        assert_eq!(client.base_url, "http://localhost:8800");
    }
}
