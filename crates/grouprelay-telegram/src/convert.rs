//! Telegram update → core event conversion.

use teloxide::types::{Chat, Message, User};

use grouprelay_core::{
    domain::{ChatId, ChatInfo, ChatKind, MessageId, MessageRef, Sender, UserId},
    messaging::types::{GroupMessage, Payload, UserMessage},
};

pub fn chat_info(chat: &Chat) -> ChatInfo {
    let kind = if chat.is_private() {
        ChatKind::Private
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_group() {
        ChatKind::Group
    } else {
        ChatKind::Channel
    };
    ChatInfo {
        id: ChatId(chat.id.0),
        kind,
        username: chat.username().map(str::to_string),
    }
}

pub fn sender(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
    }
}

pub fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    }
}

/// The parts of a message that decide its payload kind.
#[derive(Debug, Default)]
struct Content<'a> {
    text: Option<&'a str>,
    caption: Option<&'a str>,
    /// Photo file ids, smallest size first.
    photo: Vec<&'a str>,
    video: Option<&'a str>,
    document: Option<&'a str>,
}

impl<'a> Content<'a> {
    fn of(msg: &'a Message) -> Self {
        Self {
            text: msg.text(),
            caption: msg.caption(),
            photo: msg
                .photo()
                .map(|sizes| sizes.iter().map(|s| s.file.id.as_str()).collect())
                .unwrap_or_default(),
            video: msg.video().map(|v| v.file.id.as_str()),
            document: msg.document().map(|d| d.file.id.as_str()),
        }
    }
}

/// Text wins over media; the largest photo size is relayed; unknown kinds are `Other`.
fn classify(c: &Content<'_>) -> Payload {
    let caption = c.caption.map(str::to_string);
    if let Some(text) = c.text {
        return Payload::Text(text.to_string());
    }
    if let Some(best) = c.photo.last() {
        return Payload::Photo {
            file_id: best.to_string(),
            caption,
        };
    }
    if let Some(id) = c.video {
        return Payload::Video {
            file_id: id.to_string(),
            caption,
        };
    }
    if let Some(id) = c.document {
        return Payload::Document {
            file_id: id.to_string(),
            caption,
        };
    }
    Payload::Other
}

pub fn payload(msg: &Message) -> Payload {
    classify(&Content::of(msg))
}

pub fn user_message(msg: &Message) -> Option<UserMessage> {
    let user = msg.from()?;
    Some(UserMessage {
        sender: sender(user),
        chat: chat_info(&msg.chat),
        message: message_ref(msg),
        payload: payload(msg),
    })
}

pub fn group_message(msg: &Message) -> GroupMessage {
    GroupMessage {
        chat: chat_info(&msg.chat),
        message: message_ref(msg),
        reply_to: msg.reply_to_message().map(message_ref),
    }
}
