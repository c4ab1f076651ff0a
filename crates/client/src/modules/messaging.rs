//! Guest-messaging module.

use std::any::Any;

use rentora_domain::{Message, MessageThread, NewMessage, Page, Result, ThreadFilter};

use super::{ensure_not_blank, to_body, to_params, ModuleContext};
use crate::client::RentoraClient;
use crate::config::ApiVersion;
use crate::registry::ApiModule;

/// Access to `/v2/messaging`.
#[derive(Clone)]
pub struct MessagingApi {
    ctx: ModuleContext,
}

impl MessagingApi {
    pub(crate) fn new(client: &RentoraClient) -> Self {
        Self { ctx: ModuleContext::new(client, "/messaging", ApiVersion::V2) }
    }

    /// List conversation threads.
    pub async fn threads(&self, filter: &ThreadFilter) -> Result<Page<MessageThread>> {
        self.ctx.get("/threads", Some(to_params(filter)?)).await
    }

    /// Fetch one thread by its opaque uid.
    pub async fn thread(&self, thread_uid: &str) -> Result<MessageThread> {
        ensure_not_blank("thread uid", thread_uid)?;
        self.ctx.get(&format!("/threads/{thread_uid}"), None).await
    }

    /// Messages of a thread, oldest first.
    pub async fn messages(&self, thread_uid: &str) -> Result<Vec<Message>> {
        ensure_not_blank("thread uid", thread_uid)?;
        self.ctx.get(&format!("/threads/{thread_uid}/messages"), None).await
    }

    /// Reply to a thread.
    pub async fn reply(&self, thread_uid: &str, message: &NewMessage) -> Result<Message> {
        ensure_not_blank("thread uid", thread_uid)?;
        ensure_not_blank("message body", &message.body)?;
        self.ctx.post(&format!("/threads/{thread_uid}/replies"), to_body(message)?).await
    }
}

impl ApiModule for MessagingApi {
    fn name(&self) -> &'static str {
        "messaging"
    }

    fn version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use rentora_domain::RentoraError;

    use super::*;
    use crate::config::ClientConfig;

    fn client() -> RentoraClient {
        RentoraClient::new(ClientConfig::builder("test-key").build().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn rejects_blank_thread_uid() {
        let api = client().messaging();

        let err = api.thread("").await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_empty_reply_body() {
        let api = client().messaging();

        let err = api.reply("t-1", &NewMessage { body: "  ".into() }).await.unwrap_err();
        assert!(matches!(err, RentoraError::Validation(_)));
    }
}
