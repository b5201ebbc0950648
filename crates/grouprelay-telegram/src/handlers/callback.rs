use std::sync::Arc;

use teloxide::prelude::*;
use tracing::debug;

use grouprelay_core::{menu::NavAction, messaging::port::MessagingPort, relay::Navigation};

use crate::{convert, router::AppState};

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    // Always answer so the client stops its spinner.
    if let Err(e) = state.messenger.answer_callback_query(&q.id, None).await {
        debug!("failed to answer callback query: {e}");
    }

    let Some(origin) = q.message.as_ref().map(convert::message_ref) else {
        return Ok(());
    };
    let Some(action) = q.data.as_deref().and_then(NavAction::from_callback) else {
        return Ok(());
    };

    state
        .relay
        .navigate(Navigation {
            action,
            chat: origin.chat_id,
            sender: convert::sender(&q.from),
            origin: Some(origin),
        })
        .await;

    Ok(())
}
