use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use grouprelay_core::{
    config::Config,
    messaging::{self, port::MessagingPort},
    relay::Relay,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Gateway stack: Telegram, bounded in time, then throttled.
pub fn build_messenger(bot: Bot, cfg: &Config) -> Arc<dyn MessagingPort> {
    messaging::stack(Arc::new(TelegramMessenger::new(bot)), cfg)
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!("grouprelay started: @{}", me.username()),
        Err(e) => warn!("get_me failed: {e}"),
    }
    info!(
        target_group = ?cfg.target_group,
        anonymous = cfg.anonymous_by_default,
        "relay configured"
    );

    let messenger = build_messenger(bot.clone(), &cfg);
    let relay = Arc::new(Relay::new(&cfg, messenger.clone()));

    let state = Arc::new(AppState { relay, messenger });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
