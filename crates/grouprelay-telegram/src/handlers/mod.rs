//! Telegram update handlers.
//!
//! Thin adapters: convert the update, then hand it to the relay core.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use grouprelay_core::domain::{ChatInfo, GroupTarget};

use crate::{convert, router::AppState};

mod callback;
mod commands;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

/// Where an incoming message goes.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Command,
    /// Posted in the target group: candidate staff reply.
    Staff,
    /// Private chat: relayed to the group.
    User,
    Drop,
}

fn route(text: Option<&str>, chat: &ChatInfo, target: &GroupTarget) -> Route {
    if matches!(text, Some(t) if t.starts_with('/')) {
        Route::Command
    } else if target.matches(chat) {
        Route::Staff
    } else if chat.is_private() {
        Route::User
    } else {
        Route::Drop
    }
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let chat = convert::chat_info(&msg.chat);

    match route(msg.text(), &chat, state.relay.target()) {
        Route::Command => return commands::handle_command(bot, msg, state).await,
        Route::Staff => {
            let outcome = state
                .relay
                .handle_group_message(convert::group_message(&msg))
                .await;
            tracing::debug!(?outcome, "group message handled");
        }
        Route::User => {
            if let Some(user_msg) = convert::user_message(&msg) {
                state.relay.handle_user_message(user_msg).await;
            }
        }
        Route::Drop => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grouprelay_core::domain::{ChatId, ChatKind};

    fn chat(id: i64, kind: ChatKind, username: Option<&str>) -> ChatInfo {
        ChatInfo {
            id: ChatId(id),
            kind,
            username: username.map(str::to_string),
        }
    }

    #[test]
    fn commands_are_routed_first_in_any_chat() {
        let target = GroupTarget::Id(ChatId(-1001));
        let staff = chat(-1001, ChatKind::Supergroup, None);
        let user = chat(7, ChatKind::Private, None);
        assert_eq!(route(Some("/anon_on"), &staff, &target), Route::Command);
        assert_eq!(route(Some("/start"), &user, &target), Route::Command);
    }

    #[test]
    fn target_group_messages_take_the_reply_path() {
        let staff = chat(-1001, ChatKind::Supergroup, Some("staff"));
        assert_eq!(
            route(Some("thanks"), &staff, &GroupTarget::Id(ChatId(-1001))),
            Route::Staff
        );
        assert_eq!(
            route(None, &staff, &GroupTarget::Handle("@staff".to_string())),
            Route::Staff
        );
    }

    #[test]
    fn private_chats_are_relayed_and_other_groups_dropped() {
        let target = GroupTarget::Id(ChatId(-1001));
        assert_eq!(
            route(Some("hello"), &chat(7, ChatKind::Private, None), &target),
            Route::User
        );
        assert_eq!(
            route(None, &chat(7, ChatKind::Private, None), &target),
            Route::User
        );
        assert_eq!(
            route(Some("hello"), &chat(-2002, ChatKind::Group, None), &target),
            Route::Drop
        );

        // Handles compare case-sensitively.
        let renamed = chat(-1001, ChatKind::Supergroup, Some("Staff"));
        let by_handle = GroupTarget::Handle("@staff".to_string());
        assert_eq!(route(Some("hello"), &renamed, &by_handle), Route::Drop);
    }
}
