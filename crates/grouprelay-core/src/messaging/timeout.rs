use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    domain::{ChatId, MemberRole, MessageRef, Recipient, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ChatAction, InlineKeyboard, Media},
    },
    Result,
};

/// MessagingPort decorator that bounds every call.
///
/// A hung request for one user must not pin that user's relay lock forever.
pub struct TimeoutMessenger {
    inner: Arc<dyn MessagingPort>,
    limit: Duration,
}

impl TimeoutMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout(self.limit)),
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for TimeoutMessenger {
    async fn send_html(&self, to: &Recipient, html: &str) -> Result<MessageRef> {
        self.bounded(self.inner.send_html(to, html)).await
    }

    async fn send_media(
        &self,
        to: &Recipient,
        media: &Media,
        caption_html: &str,
    ) -> Result<MessageRef> {
        self.bounded(self.inner.send_media(to, media, caption_html))
            .await
    }

    async fn copy_message(&self, to: &Recipient, source: MessageRef) -> Result<MessageRef> {
        self.bounded(self.inner.copy_message(to, source)).await
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.bounded(self.inner.delete_message(msg)).await
    }

    async fn get_member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole> {
        self.bounded(self.inner.get_member_role(chat_id, user_id))
            .await
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        self.bounded(self.inner.send_chat_action(chat_id, action))
            .await
    }

    async fn send_inline_keyboard(
        &self,
        to: &Recipient,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.bounded(self.inner.send_inline_keyboard(to, html, keyboard))
            .await
    }

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        self.bounded(self.inner.edit_inline_keyboard(msg, html, keyboard))
            .await
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.bounded(self.inner.answer_callback_query(callback_id, text))
            .await
    }
}
