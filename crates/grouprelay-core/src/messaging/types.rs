use crate::domain::{ChatInfo, MessageRef, Sender};

/// Outgoing "chat action" (typing indicator, etc).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

/// Media kinds the gateway can re-upload by file id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
}

/// A previously uploaded file, addressable by the messenger's file id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Media {
    pub kind: MediaKind,
    pub file_id: String,
}

/// What a user sent, by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
    /// Anything else (voice, sticker, location, ...). Only ever copied.
    Other,
}

/// A message from a user that may be relayed into the group.
#[derive(Clone, Debug)]
pub struct UserMessage {
    pub sender: Sender,
    pub chat: ChatInfo,
    pub message: MessageRef,
    pub payload: Payload,
}

/// A message posted in a group, possibly replying to a relay message.
#[derive(Clone, Debug)]
pub struct GroupMessage {
    pub chat: ChatInfo,
    pub message: MessageRef,
    pub reply_to: Option<MessageRef>,
}

/// Inline keyboard, one button per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    #[cfg(test)]
    pub fn callback_data(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .filter_map(|b| match &b.action {
                ButtonAction::Callback(data) => Some(data.as_str()),
                ButtonAction::Url(_) => None,
            })
            .collect()
    }
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}
