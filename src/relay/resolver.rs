//! Channel reference resolution.

use crate::relay::client::{ChatClient, ChatMetadata, ClientError};
use crate::relay::types::{ChannelRef, ResolvedChannel};

/// Resolves a configured channel reference into a stable chat ID and a
/// display label.
///
/// The metadata lookup failing is a hard error — without an ID the
/// channel cannot be searched and the caller skips it. The display label
/// never fails: `@username` is preferred, then the chat title, then the
/// configured reference string verbatim.
///
/// # Errors
///
/// Propagates the [`ClientError`] from the metadata lookup.
pub async fn resolve(
    client: &dyn ChatClient,
    target: &ChannelRef,
) -> Result<ResolvedChannel, ClientError> {
    let meta = client.chat_metadata(target).await?;
    Ok(ResolvedChannel {
        id: meta.id,
        label: display_label(&meta, target),
    })
}

fn display_label(meta: &ChatMetadata, target: &ChannelRef) -> String {
    if let Some(username) = &meta.username {
        format!("@{username}")
    } else if let Some(title) = &meta.title {
        title.clone()
    } else {
        target.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct OneChat(Result<ChatMetadata, ClientError>);

    #[async_trait]
    impl ChatClient for OneChat {
        async fn chat_metadata(&self, _: &ChannelRef) -> Result<ChatMetadata, ClientError> {
            self.0.clone()
        }

        async fn search_messages(
            &self,
            _: i64,
            _: &str,
            _: usize,
        ) -> Result<Vec<crate::relay::FoundMessage>, ClientError> {
            Ok(Vec::new())
        }
    }

    fn meta(username: Option<&str>, title: Option<&str>) -> ChatMetadata {
        ChatMetadata {
            id: -100_42,
            username: username.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_label_prefers_username() {
        let client = OneChat(Ok(meta(Some("spartacus_tv"), Some("Spartacus TV"))));
        let resolved = resolve(&client, &ChannelRef::parse("@spartacus_tv"))
            .await
            .expect("resolve");
        assert_eq!(resolved.id, -100_42);
        assert_eq!(resolved.label, "@spartacus_tv");
    }

    #[tokio::test]
    async fn test_label_falls_back_to_title() {
        let client = OneChat(Ok(meta(None, Some("Canal privé"))));
        let resolved = resolve(&client, &ChannelRef::parse("https://t.me/+abc"))
            .await
            .expect("resolve");
        assert_eq!(resolved.label, "Canal privé");
    }

    #[tokio::test]
    async fn test_label_falls_back_to_ref_string() {
        let client = OneChat(Ok(meta(None, None)));
        let resolved = resolve(&client, &ChannelRef::parse("https://t.me/+abc"))
            .await
            .expect("resolve");
        assert_eq!(resolved.label, "https://t.me/+abc");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_hard() {
        let client = OneChat(Err(ClientError::NotParticipant("@x".to_string())));
        let err = resolve(&client, &ChannelRef::parse("@x"))
            .await
            .expect_err("must fail");
        assert!(err.is_access());
    }
}
