use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, ChatInfo, MessageId, UserId},
    errors::Error,
    relay::{
        conversation::{ConversationState, ConversationTracker},
        mode::AnonymityMode,
        store::ThreadStore,
    },
    Result,
};

#[derive(Debug)]
struct Inner {
    threads: ThreadStore,
    conversations: ConversationTracker,
    mode: AnonymityMode,
    menus: HashMap<ChatId, MessageId>,
}

/// All mutable relay state behind one lock.
///
/// Critical sections are short and never span a gateway call.
#[derive(Debug)]
pub struct RelayState {
    inner: Mutex<Inner>,
}

impl RelayState {
    pub fn new(mode: AnonymityMode) -> Self {
        Self {
            inner: Mutex::new(Inner {
                threads: ThreadStore::new(),
                conversations: ConversationTracker::default(),
                mode,
                menus: HashMap::new(),
            }),
        }
    }

    // ---- mode ----

    pub async fn mode(&self) -> AnonymityMode {
        self.inner.lock().await.mode
    }

    /// Returns the previous mode.
    pub async fn set_mode(&self, mode: AnonymityMode) -> AnonymityMode {
        let mut st = self.inner.lock().await;
        std::mem::replace(&mut st.mode, mode)
    }

    // ---- conversation ----

    pub async fn conversation(&self, user: UserId) -> ConversationState {
        self.inner.lock().await.conversations.get(user)
    }

    pub async fn begin_awaiting(&self, user: UserId) {
        self.inner.lock().await.conversations.begin_awaiting(user);
    }

    pub async fn clear_conversation(&self, user: UserId) {
        self.inner.lock().await.conversations.clear(user);
    }

    /// Private chats always relay; elsewhere only after an explicit "send a message".
    pub async fn is_eligible(&self, chat: &ChatInfo, user: UserId) -> bool {
        chat.is_private()
            || self.inner.lock().await.conversations.get(user) == ConversationState::AwaitingMessage
    }

    // ---- threads ----

    /// Commit a delivered relay message as the user's live thread.
    ///
    /// Swaps the thread pointer, records the reverse mapping and ends the user's
    /// "awaiting" state in one step. Returns the superseded thread for remote deletion.
    pub async fn commit_thread(
        &self,
        user_chat: ChatId,
        user: UserId,
        new_thread: MessageId,
    ) -> Result<Option<MessageId>> {
        let mut st = self.inner.lock().await;
        if st.threads.lookup_sender(new_thread).is_some() {
            return Err(Error::DuplicateMapping(new_thread.0));
        }
        let old = st.threads.replace_last_thread(user_chat, new_thread);
        st.threads.record(new_thread, user_chat)?;
        st.conversations.clear(user);
        Ok(old)
    }

    pub async fn lookup_sender(&self, group_message: MessageId) -> Option<ChatId> {
        self.inner.lock().await.threads.lookup_sender(group_message)
    }

    pub async fn forget(&self, group_message: MessageId) {
        self.inner.lock().await.threads.forget(group_message);
    }

    #[cfg(test)]
    pub async fn last_thread(&self, user_chat: ChatId) -> Option<MessageId> {
        self.inner.lock().await.threads.last_thread(user_chat)
    }

    #[cfg(test)]
    pub async fn threads_of(&self, user_chat: ChatId) -> Vec<MessageId> {
        self.inner.lock().await.threads.threads_of(user_chat)
    }

    #[cfg(test)]
    pub async fn thread_count(&self) -> usize {
        self.inner.lock().await.threads.len()
    }

    // ---- menus ----

    /// Remember the start menu just posted in `chat`; returns the one it replaces.
    pub async fn replace_menu(&self, chat: ChatId, menu: MessageId) -> Option<MessageId> {
        self.inner
            .lock()
            .await
            .menus
            .insert(chat, menu)
            .filter(|old| *old != menu)
    }

    pub async fn take_menu(&self, chat: ChatId) -> Option<MessageId> {
        self.inner.lock().await.menus.remove(&chat)
    }
}
