use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    config::Config,
    domain::{ChatId, GroupTarget, MemberRole, MessageRef, Recipient, UserId},
    messaging::{
        port::MessagingPort,
        types::{ChatAction, InlineKeyboard, Media},
    },
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between *any* Telegram API calls (global flood control).
    pub global_min_interval: Duration,
    /// Minimum spacing between calls per chat (Telegram 1 msg/sec style limits).
    pub per_chat_min_interval: Duration,
}

impl From<&Config> for ThrottleConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            global_min_interval: cfg.throttle_global,
            per_chat_min_interval: cfg.throttle_per_chat,
        }
    }
}

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before executing.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = if now >= self.next { now } else { self.next };
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// Per-chat limiter key. A group addressed by `@handle` is keyed by its handle until a send
/// reveals its numeric id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ChatKey {
    Id(ChatId),
    Handle(String),
}

/// MessagingPort decorator that rate-limits outbound calls.
///
/// Best-effort defense against Telegram 429s when many users write at once: the target group
/// receives every relay, so its per-chat limiter is the one that usually bites.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<ChatKey, Arc<Mutex<IntervalLimiter>>>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    fn key_of(to: &Recipient) -> ChatKey {
        match to {
            Recipient::Chat(id) | Recipient::Group(GroupTarget::Id(id)) => ChatKey::Id(*id),
            Recipient::Group(GroupTarget::Handle(h)) => ChatKey::Handle(h.clone()),
        }
    }

    async fn limiter_for(&self, key: ChatKey) -> Arc<Mutex<IntervalLimiter>> {
        let mut map = self.per_chat.lock().await;
        map.entry(key)
            .or_insert_with(|| {
                Arc::new(Mutex::new(IntervalLimiter::new(
                    self.cfg.per_chat_min_interval,
                )))
            })
            .clone()
    }

    /// Once a handle-addressed send returns, the handle and its numeric id share one limiter.
    async fn learn(&self, to: &Recipient, sent: &Result<MessageRef>) {
        let (Recipient::Group(GroupTarget::Handle(h)), Ok(msg)) = (to, sent) else {
            return;
        };
        let mut map = self.per_chat.lock().await;
        let handle_key = ChatKey::Handle(h.clone());
        let id_key = ChatKey::Id(msg.chat_id);
        let by_handle = map.get(&handle_key).cloned();
        let by_id = map.get(&id_key).cloned();
        match (by_handle, by_id) {
            (Some(a), Some(b)) if Arc::ptr_eq(&a, &b) => {}
            (_, Some(b)) => {
                map.insert(handle_key, b);
            }
            (Some(a), None) => {
                map.insert(id_key, a);
            }
            (None, None) => {}
        }
    }

    async fn throttle_chat(&self, to: &Recipient) {
        let global_wait = { self.global.lock().await.reserve() };
        let chat_wait = {
            let lim = self.limiter_for(Self::key_of(to)).await;
            let mut guard = lim.lock().await;
            guard.reserve()
        };

        let wait = global_wait.max(chat_wait);
        if wait > Duration::ZERO {
            sleep(wait).await;
        }
    }

    async fn throttle_global(&self) {
        let wait = { self.global.lock().await.reserve() };
        if wait > Duration::ZERO {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_html(&self, to: &Recipient, html: &str) -> Result<MessageRef> {
        self.throttle_chat(to).await;
        let sent = self.inner.send_html(to, html).await;
        self.learn(to, &sent).await;
        sent
    }

    async fn send_media(
        &self,
        to: &Recipient,
        media: &Media,
        caption_html: &str,
    ) -> Result<MessageRef> {
        self.throttle_chat(to).await;
        let sent = self.inner.send_media(to, media, caption_html).await;
        self.learn(to, &sent).await;
        sent
    }

    async fn copy_message(&self, to: &Recipient, source: MessageRef) -> Result<MessageRef> {
        self.throttle_chat(to).await;
        let sent = self.inner.copy_message(to, source).await;
        self.learn(to, &sent).await;
        sent
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.throttle_chat(&msg.chat_id.into()).await;
        self.inner.delete_message(msg).await
    }

    async fn get_member_role(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole> {
        // Reads do not count against the per-chat send budget.
        self.throttle_global().await;
        self.inner.get_member_role(chat_id, user_id).await
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        self.throttle_chat(&chat_id.into()).await;
        self.inner.send_chat_action(chat_id, action).await
    }

    async fn send_inline_keyboard(
        &self,
        to: &Recipient,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.throttle_chat(to).await;
        self.inner.send_inline_keyboard(to, html, keyboard).await
    }

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<()> {
        self.throttle_chat(&msg.chat_id.into()).await;
        self.inner.edit_inline_keyboard(msg, html, keyboard).await
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        // No chat_id available here; apply global throttling only.
        self.throttle_global().await;
        self.inner.answer_callback_query(callback_id, text).await
    }
}
