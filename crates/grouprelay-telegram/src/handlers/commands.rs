use std::sync::Arc;

use teloxide::prelude::*;
use tracing::debug;

use grouprelay_core::{
    menu::NavAction,
    relay::{AnonymityMode, Navigation},
};

use crate::{convert, router::AppState};

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let (cmd, _args) = parse_command(text);
    let chat = convert::chat_info(&msg.chat);
    let sender = convert::sender(user);

    match cmd.as_str() {
        "anon_on" => {
            state
                .relay
                .handle_mode_command(&chat, sender.id, AnonymityMode::Anonymous)
                .await;
        }
        "anon_off" => {
            state
                .relay
                .handle_mode_command(&chat, sender.id, AnonymityMode::Attributed)
                .await;
        }
        other => match NavAction::from_command(other) {
            Some(action) => {
                state
                    .relay
                    .navigate(Navigation {
                        action,
                        chat: chat.id,
                        sender,
                        origin: None,
                    })
                    .await;
            }
            None => debug!(command = other, "ignoring unknown command"),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bot_suffixed_commands() {
        assert_eq!(
            parse_command("/anon_on@relay_bot"),
            ("anon_on".to_string(), String::new())
        );
        assert_eq!(
            parse_command("/Start  hello there"),
            ("start".to_string(), "hello there".to_string())
        );
    }
}
