//! Navigation screens shown to users.
//!
//! Commands (`/start`, `/help`, `/send`) and inline buttons resolve to the same
//! [`NavAction`], so both paths render the same screen and touch state the same way.

use crate::{
    formatting::escape_html,
    messaging::types::{InlineButton, InlineKeyboard},
};

pub const CB_SEND_MESSAGE: &str = "send_message";
pub const CB_HELP: &str = "help";
pub const CB_BACK_TO_START: &str = "back_to_start";

const EMOJI_SENDING: &str = "✈️";
const EMOJI_SUCCESS: &str = "✅";
const EMOJI_ERROR: &str = "❌";
const EMOJI_HOME: &str = "🏠";
const EMOJI_BACK: &str = "🔙";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    /// Main menu. Also cancels a pending "send a message".
    Start,
    Help,
    /// Ask for the next message to relay.
    Send,
}

impl NavAction {
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "start" => Some(NavAction::Start),
            "help" => Some(NavAction::Help),
            "send" => Some(NavAction::Send),
            _ => None,
        }
    }

    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            CB_BACK_TO_START => Some(NavAction::Start),
            CB_HELP => Some(NavAction::Help),
            CB_SEND_MESSAGE => Some(NavAction::Send),
            _ => None,
        }
    }
}

/// A rendered message: HTML body plus its keyboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub html: String,
    pub keyboard: InlineKeyboard,
}

#[derive(Clone, Debug, Default)]
pub struct Menus {
    channel_url: Option<String>,
}

impl Menus {
    pub fn new(channel_url: Option<String>) -> Self {
        Self { channel_url }
    }

    fn keyboard(&self, mut buttons: Vec<InlineButton>) -> InlineKeyboard {
        if let Some(url) = &self.channel_url {
            buttons.push(InlineButton::url("🔗 Bot channel", url.clone()));
        }
        InlineKeyboard::new(buttons)
    }

    pub fn start(&self, first_name: &str) -> Screen {
        let html = format!(
            "👋 Hi, {}!\n\n\
             This bot passes your messages to our team. Write anything: a question, \
             a story, a photo. We read everything and answer right here. 🌙",
            escape_html(first_name)
        );
        Screen {
            html,
            keyboard: self.keyboard(vec![
                InlineButton::callback(format!("{EMOJI_SENDING} Send a message"), CB_SEND_MESSAGE),
                InlineButton::callback("ℹ️ Help", CB_HELP),
            ]),
        }
    }

    pub fn help(&self) -> Screen {
        let html = "📚 <b>Bot help</b>\n\n\
                    This bot forwards messages to the team's group.\n\n\
                    <b>How to use:</b>\n\
                    1. Send me any message (text, photo, video, document, ...)\n\
                    2. I forward it to the group and deliver the reply back here\n\n\
                    <b>Commands:</b>\n\
                    /start - Main menu\n\
                    /help - Show this help\n\
                    /send - Send a new message"
            .to_string();
        Screen {
            html,
            keyboard: self.keyboard(vec![
                InlineButton::callback(format!("{EMOJI_BACK} Back"), CB_BACK_TO_START),
                InlineButton::callback(format!("{EMOJI_SENDING} Send a message"), CB_SEND_MESSAGE),
            ]),
        }
    }

    pub fn send_prompt(&self) -> Screen {
        let html = "📝 <b>Send the message to forward</b>\n\n\
                    You can send:\n\
                    • Text\n\
                    • Photos\n\
                    • Videos\n\
                    • Documents\n\
                    • Voice messages\n\n\
                    I will forward it to the group."
            .to_string();
        Screen {
            html,
            keyboard: InlineKeyboard::new(vec![InlineButton::callback(
                format!("{EMOJI_BACK} Cancel"),
                CB_BACK_TO_START,
            )]),
        }
    }

    pub fn relay_ok(&self) -> Screen {
        Screen {
            html: format!("{EMOJI_SUCCESS} Message delivered to the group!"),
            keyboard: self.keyboard(vec![
                InlineButton::callback(format!("{EMOJI_HOME} Main menu"), CB_BACK_TO_START),
                InlineButton::callback(format!("{EMOJI_SENDING} Send another"), CB_SEND_MESSAGE),
            ]),
        }
    }

    pub fn relay_failed(&self) -> Screen {
        Screen {
            html: format!(
                "{EMOJI_ERROR} Something went wrong while sending your message. Please try again."
            ),
            keyboard: InlineKeyboard::new(vec![InlineButton::callback(
                format!("{EMOJI_BACK} Back"),
                CB_BACK_TO_START,
            )]),
        }
    }
}
