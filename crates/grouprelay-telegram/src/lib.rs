//! Telegram adapter (teloxide).
//!
//! Implements the `grouprelay-core` MessagingPort over the Telegram Bot API and wires
//! Telegram updates into the relay.

use std::collections::HashMap;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{
        ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode,
        Recipient as TgRecipient,
    },
    ApiError, RequestError,
};

use tokio::{sync::Mutex, time::sleep};
use tracing::warn;

pub mod convert;
pub mod handlers;
pub mod router;

use grouprelay_core::{
    domain::{ChatId, GroupTarget, MemberRole, MessageId, MessageRef, Recipient, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonAction, ChatAction, InlineKeyboard, Media, MediaKind},
    },
    Result,
};

pub struct TelegramMessenger {
    bot: Bot,
    /// `@handle` → numeric chat id, filled on first use.
    handles: Mutex<HashMap<String, ChatId>>,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            handles: Mutex::new(HashMap::new()),
        }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_recipient(to: &Recipient) -> TgRecipient {
        match to {
            Recipient::Chat(id) | Recipient::Group(GroupTarget::Id(id)) => {
                TgRecipient::Id(Self::tg_chat(*id))
            }
            Recipient::Group(GroupTarget::Handle(h)) => TgRecipient::ChannelUsername(h.clone()),
        }
    }

    fn tg_keyboard(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .buttons
            .into_iter()
            .filter_map(|b| match b.action {
                ButtonAction::Callback(data) => Some(InlineKeyboardButton::callback(b.label, data)),
                ButtonAction::Url(raw) => match raw.parse() {
                    Ok(url) => Some(InlineKeyboardButton::url(b.label, url)),
                    Err(e) => {
                        warn!("dropping button with invalid url {raw:?}: {e}");
                        None
                    }
                },
            })
            .map(|button| vec![button])
            .collect();
        InlineKeyboardMarkup::new(rows)
    }

    fn msg_ref(msg: &Message) -> MessageRef {
        MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        }
    }

    fn map_err(e: RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    /// Numeric id of a recipient; `@handle` groups are looked up once and cached.
    async fn resolve_chat(&self, to: &Recipient) -> Result<ChatId> {
        let handle = match to {
            Recipient::Chat(id) | Recipient::Group(GroupTarget::Id(id)) => return Ok(*id),
            Recipient::Group(GroupTarget::Handle(h)) => h,
        };
        if let Some(id) = self.handles.lock().await.get(handle) {
            return Ok(*id);
        }
        let chat = self
            .with_retry(|| self.bot.get_chat(TgRecipient::ChannelUsername(handle.clone())))
            .await?;
        let id = ChatId(chat.id.0);
        self.handles.lock().await.insert(handle.clone(), id);
        Ok(id)
    }
}

fn role_of(kind: &ChatMemberKind) -> MemberRole {
    match kind {
        ChatMemberKind::Owner(_) => MemberRole::Owner,
        ChatMemberKind::Administrator(_) => MemberRole::Administrator,
        ChatMemberKind::Member => MemberRole::Member,
        ChatMemberKind::Restricted(_) => MemberRole::Restricted,
        ChatMemberKind::Left => MemberRole::Left,
        ChatMemberKind::Banned(_) => MemberRole::Banned,
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, to: &Recipient, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_recipient(to), html.to_string())
                    .parse_mode(ParseMode::Html)
            })
            .await?;
        Ok(Self::msg_ref(&msg))
    }

    async fn send_media(
        &self,
        to: &Recipient,
        media: &Media,
        caption_html: &str,
    ) -> Result<MessageRef> {
        let file = || InputFile::file_id(media.file_id.clone());
        let msg = match media.kind {
            MediaKind::Photo => {
                self.with_retry(|| {
                    self.bot
                        .send_photo(Self::tg_recipient(to), file())
                        .caption(caption_html.to_string())
                        .parse_mode(ParseMode::Html)
                })
                .await?
            }
            MediaKind::Video => {
                self.with_retry(|| {
                    self.bot
                        .send_video(Self::tg_recipient(to), file())
                        .caption(caption_html.to_string())
                        .parse_mode(ParseMode::Html)
                })
                .await?
            }
            MediaKind::Document => {
                self.with_retry(|| {
                    self.bot
                        .send_document(Self::tg_recipient(to), file())
                        .caption(caption_html.to_string())
                        .parse_mode(ParseMode::Html)
                })
                .await?
            }
        };
        Ok(Self::msg_ref(&msg))
    }

    async fn copy_message(&self, to: &Recipient, source: MessageRef) -> Result<MessageRef> {
        // copyMessage only returns the new id; the chat id comes from the recipient.
        let chat_id = self.resolve_chat(to).await?;
        let id = self
            .with_retry(|| {
                self.bot.copy_message(
                    Self::tg_chat(chat_id),
                    Self::tg_chat(source.chat_id),
                    Self::tg_msg_id(source.message_id),
                )
            })
            .await?;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id.0),
        })
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        let res = self
            .bot
            .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            .await;
        match res {
            Ok(_) | Err(RequestError::Api(ApiError::MessageToDeleteNotFound)) => Ok(()),
            Err(e) => Err(Self::map_err(e)),
        }
    }

    async fn get_member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole> {
        let user = teloxide::types::UserId(u64::try_from(user_id.0).map_err(|_| {
            Error::External(format!("invalid telegram user id {}", user_id.0))
        })?);
        let member = self
            .with_retry(|| self.bot.get_chat_member(Self::tg_chat(chat_id), user))
            .await?;
        Ok(role_of(&member.kind))
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        let tg_action = match action {
            ChatAction::Typing => teloxide::types::ChatAction::Typing,
        };
        self.with_retry(|| self.bot.send_chat_action(Self::tg_chat(chat_id), tg_action))
            .await?;
        Ok(())
    }

    async fn send_inline_keyboard(
        &self,
        to: &Recipient,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let markup = Self::tg_keyboard(keyboard);
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_recipient(to), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(markup.clone())
            })
            .await?;
        Ok(Self::msg_ref(&msg))
    }

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        let markup = Self::tg_keyboard(keyboard);
        self.with_retry(|| {
            self.bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(markup.clone())
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            req
        })
        .await?;
        Ok(())
    }
}
