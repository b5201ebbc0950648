use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    domain::{ChatId, ChatInfo, GroupTarget, MessageId, MessageRef, Recipient, Sender, UserId},
    errors::Error,
    formatting::{media_caption, text_envelope},
    menu::{Menus, NavAction, Screen},
    messaging::{
        port::MessagingPort,
        types::{ChatAction, GroupMessage, Media, MediaKind, Payload, UserMessage},
    },
    relay::{
        locks::ChatLocks,
        mode::{authorize_toggle, AnonymityMode},
        state::RelayState,
    },
    Result,
};

/// Result of handling a user message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Posted into the group; `evicted` is the superseded thread, if any.
    Relayed {
        thread: MessageRef,
        evicted: Option<MessageId>,
    },
    /// Not a private chat and no pending "send a message": the start menu was shown instead.
    NotEligible,
    /// The group send failed; nothing was recorded.
    Failed,
}

/// Result of handling a message posted in a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    NotTargetGroup,
    NotAReply,
    /// The replied-to message is not a tracked relay message.
    Unmapped,
    Delivered { user_chat: ChatId, copy: MessageRef },
    Failed { user_chat: ChatId },
}

/// A navigation request, from a command or an inline button.
#[derive(Clone, Debug)]
pub struct Navigation {
    pub action: NavAction,
    pub chat: ChatId,
    pub sender: Sender,
    /// The menu message the pressed button belongs to. `None` for commands.
    pub origin: Option<MessageRef>,
}

/// Routing policy between private chats and the staff group.
pub struct Relay {
    target: GroupTarget,
    menus: Menus,
    messenger: Arc<dyn MessagingPort>,
    state: RelayState,
    chat_locks: ChatLocks,
}

impl Relay {
    pub fn new(cfg: &Config, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            target: cfg.target_group.clone(),
            menus: Menus::new(cfg.channel_url.clone()),
            messenger,
            state: RelayState::new(AnonymityMode::from_anonymous(cfg.anonymous_by_default)),
            chat_locks: ChatLocks::default(),
        }
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    pub fn target(&self) -> &GroupTarget {
        &self.target
    }

    fn group(&self) -> Recipient {
        Recipient::Group(self.target.clone())
    }

    // ============== User -> group ==============

    pub async fn handle_user_message(&self, msg: UserMessage) -> RelayOutcome {
        if !self.state.is_eligible(&msg.chat, msg.sender.id).await {
            self.show_start(msg.chat.id, &msg.sender, None).await;
            return RelayOutcome::NotEligible;
        }

        // Send, evict and record for one user must not interleave.
        let _guard = self.chat_locks.lock_chat(msg.chat.id).await;

        if let Err(e) = self
            .messenger
            .send_chat_action(msg.chat.id, ChatAction::Typing)
            .await
        {
            debug!(chat = msg.chat.id.0, "typing indicator failed: {e}");
        }

        let mode = self.state.mode().await;
        let thread = match self.transfer(&msg, mode).await {
            Ok(thread) => thread,
            Err(e) => {
                error!(
                    user = msg.sender.id.0,
                    chat = msg.chat.id.0,
                    "error forwarding message: {e}"
                );
                self.show(msg.chat.id, self.menus.relay_failed()).await;
                return RelayOutcome::Failed;
            }
        };

        let evicted = match self
            .state
            .commit_thread(msg.chat.id, msg.sender.id, thread.message_id)
            .await
        {
            Ok(old) => old,
            Err(e) => {
                error!(chat = msg.chat.id.0, "relay delivered but not recorded: {e}");
                None
            }
        };

        if let Some(old) = evicted {
            self.evict(thread.chat_id, old).await;
        }

        info!(
            user = msg.sender.id.0,
            thread = thread.message_id.0,
            anonymous = mode.is_anonymous(),
            "relayed message to group"
        );

        self.show(msg.chat.id, self.menus.relay_ok()).await;
        RelayOutcome::Relayed { thread, evicted }
    }

    async fn transfer(&self, msg: &UserMessage, mode: AnonymityMode) -> Result<MessageRef> {
        let to = self.group();
        let author = match mode {
            AnonymityMode::Anonymous => None,
            AnonymityMode::Attributed => Some(msg.sender.display_handle()),
        };
        let author = author.as_deref();

        let (kind, file_id, caption) = match &msg.payload {
            // Text always goes out as a labelled envelope, in either mode.
            Payload::Text(text) => {
                return self
                    .messenger
                    .send_html(&to, &text_envelope(text, author))
                    .await;
            }
            Payload::Other => return self.messenger.copy_message(&to, msg.message).await,
            Payload::Photo { file_id, caption } => (MediaKind::Photo, file_id, caption),
            Payload::Video { file_id, caption } => (MediaKind::Video, file_id, caption),
            Payload::Document { file_id, caption } => (MediaKind::Document, file_id, caption),
        };

        match mode {
            AnonymityMode::Anonymous => self.messenger.copy_message(&to, msg.message).await,
            AnonymityMode::Attributed => {
                let media = Media {
                    kind,
                    file_id: file_id.clone(),
                };
                let caption = media_caption(kind, caption.as_deref(), author);
                self.messenger.send_media(&to, &media, &caption).await
            }
        }
    }

    /// Remove a superseded thread. The remote delete is best-effort; the mapping goes either way.
    async fn evict(&self, group_chat: ChatId, old: MessageId) {
        let msg = MessageRef {
            chat_id: group_chat,
            message_id: old,
        };
        if let Err(e) = self.messenger.delete_message(msg).await {
            warn!(thread = old.0, "failed to delete superseded thread: {e}");
        }
        self.state.forget(old).await;
    }

    // ============== Group -> user ==============

    pub async fn handle_group_message(&self, msg: GroupMessage) -> ReplyOutcome {
        if !self.target.matches(&msg.chat) {
            return ReplyOutcome::NotTargetGroup;
        }
        let Some(replied_to) = msg.reply_to else {
            return ReplyOutcome::NotAReply;
        };
        let Some(user_chat) = self.state.lookup_sender(replied_to.message_id).await else {
            debug!(message = replied_to.message_id.0, "reply to untracked message");
            return ReplyOutcome::Unmapped;
        };

        match self
            .messenger
            .copy_message(&Recipient::Chat(user_chat), msg.message)
            .await
        {
            Ok(copy) => ReplyOutcome::Delivered { user_chat, copy },
            Err(e) => {
                error!(user_chat = user_chat.0, "error sending group reply back to user: {e}");
                ReplyOutcome::Failed { user_chat }
            }
        }
    }

    // ============== Mode ==============

    /// Switch anonymity. Only admins inside the target group may do this.
    pub async fn set_anonymity(
        &self,
        chat: &ChatInfo,
        user: UserId,
        mode: AnonymityMode,
    ) -> Result<AnonymityMode> {
        authorize_toggle(self.messenger.as_ref(), &self.target, chat, user).await?;
        let previous = self.state.set_mode(mode).await;
        info!(user = user.0, ?previous, ?mode, "anonymity mode changed");
        Ok(mode)
    }

    pub async fn enable_anonymous(&self, chat: &ChatInfo, user: UserId) -> Result<AnonymityMode> {
        self.set_anonymity(chat, user, AnonymityMode::Anonymous)
            .await
    }

    pub async fn disable_anonymous(&self, chat: &ChatInfo, user: UserId) -> Result<AnonymityMode> {
        self.set_anonymity(chat, user, AnonymityMode::Attributed)
            .await
    }

    /// `/anon_on` and `/anon_off`: apply and answer in the issuing chat.
    pub async fn handle_mode_command(&self, chat: &ChatInfo, user: UserId, mode: AnonymityMode) {
        let reply = match self.set_anonymity(chat, user, mode).await {
            Ok(AnonymityMode::Anonymous) => {
                "Anonymous mode is on. Senders are hidden.".to_string()
            }
            Ok(AnonymityMode::Attributed) => {
                "Anonymous mode is off. Senders will be named.".to_string()
            }
            Err(Error::Unauthorized(reason)) => format!("⛔ Not allowed: {reason}."),
            Err(e) => format!("❌ Error: {e}"),
        };
        if let Err(e) = self.messenger.send_html(&chat.id.into(), &reply).await {
            warn!(chat = chat.id.0, "failed to answer mode command: {e}");
        }
    }

    // ============== Navigation ==============

    pub async fn navigate(&self, nav: Navigation) {
        match nav.action {
            NavAction::Start => {
                self.state.clear_conversation(nav.sender.id).await;
                self.show_start(nav.chat, &nav.sender, nav.origin).await;
            }
            NavAction::Help => {
                self.show_in_place(nav.chat, nav.origin, self.menus.help())
                    .await;
            }
            NavAction::Send => {
                self.state.begin_awaiting(nav.sender.id).await;
                self.show_in_place(nav.chat, nav.origin, self.menus.send_prompt())
                    .await;
            }
        }
    }

    /// Post a fresh start menu, removing the button's message and the previous menu.
    async fn show_start(&self, chat: ChatId, sender: &Sender, origin: Option<MessageRef>) {
        let previous = self.state.take_menu(chat).await.map(|message_id| MessageRef {
            chat_id: chat,
            message_id,
        });
        let mut stale: Vec<MessageRef> = origin.into_iter().collect();
        if let Some(prev) = previous.filter(|p| Some(*p) != origin) {
            stale.push(prev);
        }
        for msg in stale {
            if let Err(e) = self.messenger.delete_message(msg).await {
                debug!(chat = chat.0, "failed to delete old menu: {e}");
            }
        }

        if let Some(menu) = self.show(chat, self.menus.start(&sender.first_name)).await {
            self.state.replace_menu(chat, menu.message_id).await;
        }
    }

    /// Edit the button's message when there is one; otherwise (or if editing fails) send anew.
    async fn show_in_place(&self, chat: ChatId, origin: Option<MessageRef>, screen: Screen) {
        if let Some(msg) = origin {
            match self
                .messenger
                .edit_inline_keyboard(msg, &screen.html, screen.keyboard.clone())
                .await
            {
                Ok(()) => return,
                Err(e) => debug!(chat = chat.0, "menu edit failed, sending new: {e}"),
            }
        }
        self.show(chat, screen).await;
    }

    async fn show(&self, chat: ChatId, screen: Screen) -> Option<MessageRef> {
        match self
            .messenger
            .send_inline_keyboard(&chat.into(), &screen.html, screen.keyboard)
            .await
        {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!(chat = chat.0, "failed to send menu: {e}");
                None
            }
        }
    }
}
