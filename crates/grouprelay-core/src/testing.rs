//! In-memory messenger used by the relay tests.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, GroupTarget, MemberRole, MessageId, MessageRef, Recipient, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ChatAction, InlineKeyboard, Media},
    },
    Result,
};

/// Numeric id the fake assigns to a group addressed by `@handle`.
pub const HANDLE_GROUP_ID: ChatId = ChatId(-100_500);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    SendHtml(Recipient, String),
    SendMedia(Recipient, Media, String),
    Copy(Recipient, MessageRef),
    Delete(MessageRef),
    Role(ChatId, UserId),
    Action(ChatId),
    Keyboard(Recipient, String, InlineKeyboard),
    EditKeyboard(MessageRef, String),
    AnswerCallback(String),
}

pub struct FakeMessenger {
    next_id: Mutex<i32>,
    calls: Mutex<Vec<Call>>,
    pub fail_group_sends: AtomicBool,
    pub fail_user_copies: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub role: Mutex<Result<MemberRole>>,
    pub hang: Mutex<Option<Duration>>,
}

impl Default for FakeMessenger {
    fn default() -> Self {
        Self {
            next_id: Mutex::new(100),
            calls: Mutex::new(Vec::new()),
            fail_group_sends: AtomicBool::new(false),
            fail_user_copies: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            role: Mutex::new(Ok(MemberRole::Member)),
            hang: Mutex::new(None),
        }
    }
}

impl FakeMessenger {
    pub fn set_role(&self, role: Result<MemberRole>) {
        *self.role.lock().unwrap() = role;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn deletes(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn chat_of(to: &Recipient) -> ChatId {
        match to {
            Recipient::Chat(id) | Recipient::Group(GroupTarget::Id(id)) => *id,
            Recipient::Group(GroupTarget::Handle(_)) => HANDLE_GROUP_ID,
        }
    }

    fn alloc(&self, to: &Recipient) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        MessageRef {
            chat_id: Self::chat_of(to),
            message_id: MessageId(id),
        }
    }

    async fn maybe_hang(&self) {
        let hang = *self.hang.lock().unwrap();
        if let Some(d) = hang {
            tokio::time::sleep(d).await;
        }
    }

    fn group_send(&self, to: &Recipient) -> Result<MessageRef> {
        if matches!(to, Recipient::Group(_)) && self.fail_group_sends.load(Ordering::SeqCst) {
            return Err(Error::External("telegram error: chat not found".to_string()));
        }
        Ok(self.alloc(to))
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html(&self, to: &Recipient, html: &str) -> Result<MessageRef> {
        self.maybe_hang().await;
        self.record(Call::SendHtml(to.clone(), html.to_string()));
        self.group_send(to)
    }

    async fn send_media(
        &self,
        to: &Recipient,
        media: &Media,
        caption_html: &str,
    ) -> Result<MessageRef> {
        self.maybe_hang().await;
        self.record(Call::SendMedia(
            to.clone(),
            media.clone(),
            caption_html.to_string(),
        ));
        self.group_send(to)
    }

    async fn copy_message(&self, to: &Recipient, source: MessageRef) -> Result<MessageRef> {
        self.maybe_hang().await;
        self.record(Call::Copy(to.clone(), source));
        if matches!(to, Recipient::Chat(_)) && self.fail_user_copies.load(Ordering::SeqCst) {
            return Err(Error::External("telegram error: bot was blocked".to_string()));
        }
        self.group_send(to)
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.record(Call::Delete(msg));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::External(
                "telegram error: message can't be deleted".to_string(),
            ));
        }
        Ok(())
    }

    async fn get_member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole> {
        self.record(Call::Role(chat_id, user_id));
        match &*self.role.lock().unwrap() {
            Ok(role) => Ok(*role),
            Err(e) => Err(Error::External(e.to_string())),
        }
    }

    async fn send_chat_action(&self, chat_id: ChatId, _action: ChatAction) -> Result<()> {
        self.record(Call::Action(chat_id));
        Ok(())
    }

    async fn send_inline_keyboard(
        &self,
        to: &Recipient,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.record(Call::Keyboard(to.clone(), html.to_string(), keyboard));
        Ok(self.alloc(to))
    }

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        _keyboard: InlineKeyboard,
    ) -> Result<()> {
        self.record(Call::EditKeyboard(msg, html.to_string()));
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, _text: Option<&str>) -> Result<()> {
        self.record(Call::AnswerCallback(callback_id.to_string()));
        Ok(())
    }
}
