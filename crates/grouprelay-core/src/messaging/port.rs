use async_trait::async_trait;

use crate::{
    domain::{ChatId, MemberRole, MessageRef, Recipient, UserId},
    messaging::types::{ChatAction, InlineKeyboard, Media},
    Result,
};

/// Messaging gateway port.
///
/// Telegram is the only implementation; the relay core only ever talks through this trait so
/// routing can be exercised against a fake in tests.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, to: &Recipient, html: &str) -> Result<MessageRef>;

    async fn send_media(
        &self,
        to: &Recipient,
        media: &Media,
        caption_html: &str,
    ) -> Result<MessageRef>;

    /// Copy a message without the "forwarded from" header.
    async fn copy_message(&self, to: &Recipient, source: MessageRef) -> Result<MessageRef>;

    /// Delete a message. A message that is already gone counts as deleted.
    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    async fn get_member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole>;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;

    async fn send_inline_keyboard(
        &self,
        to: &Recipient,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
