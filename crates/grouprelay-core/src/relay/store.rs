use std::collections::HashMap;

use crate::{
    domain::{ChatId, MessageId},
    errors::Error,
    Result,
};

/// Which relay message belongs to which user, in both directions.
///
/// `senders` answers "who wrote this group message" when staff reply; `last_thread` holds the
/// single live relay message per user so a new one can evict it.
#[derive(Debug, Default)]
pub struct ThreadStore {
    senders: HashMap<MessageId, ChatId>,
    last_thread: HashMap<ChatId, MessageId>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a freshly created relay message to its author's chat.
    ///
    /// Relay message ids are unique per creation; a repeat keeps the existing mapping.
    pub fn record(&mut self, group_message: MessageId, user_chat: ChatId) -> Result<()> {
        if self.senders.contains_key(&group_message) {
            return Err(Error::DuplicateMapping(group_message.0));
        }
        self.senders.insert(group_message, user_chat);
        Ok(())
    }

    pub fn lookup_sender(&self, group_message: MessageId) -> Option<ChatId> {
        self.senders.get(&group_message).copied()
    }

    /// Install `new_thread` as the user's live thread and hand back the one it supersedes.
    ///
    /// The caller deletes the old remote message and then calls [`ThreadStore::forget`].
    pub fn replace_last_thread(
        &mut self,
        user_chat: ChatId,
        new_thread: MessageId,
    ) -> Option<MessageId> {
        self.last_thread
            .insert(user_chat, new_thread)
            .filter(|old| *old != new_thread)
    }

    #[cfg(test)]
    pub fn last_thread(&self, user_chat: ChatId) -> Option<MessageId> {
        self.last_thread.get(&user_chat).copied()
    }

    /// Drop a relay message. Unknown ids are a no-op.
    pub fn forget(&mut self, group_message: MessageId) {
        if let Some(chat) = self.senders.remove(&group_message) {
            if self.last_thread.get(&chat) == Some(&group_message) {
                self.last_thread.remove(&chat);
            }
        }
    }

    #[cfg(test)]
    /// Number of relay messages still resolvable to a user.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    #[cfg(test)]
    /// Relay messages currently attributed to `user_chat`.
    pub fn threads_of(&self, user_chat: ChatId) -> Vec<MessageId> {
        let mut out: Vec<MessageId> = self
            .senders
            .iter()
            .filter(|(_, chat)| **chat == user_chat)
            .map(|(id, _)| *id)
            .collect();
        out.sort_by_key(|id| id.0);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_lookup() {
        let mut s = ThreadStore::new();
        s.record(MessageId(10), ChatId(1)).unwrap();
        assert_eq!(s.lookup_sender(MessageId(10)), Some(ChatId(1)));
        assert_eq!(s.lookup_sender(MessageId(11)), None);
    }

    #[test]
    fn duplicate_record_keeps_first_mapping() {
        let mut s = ThreadStore::new();
        s.record(MessageId(10), ChatId(1)).unwrap();
        let err = s.record(MessageId(10), ChatId(2)).unwrap_err();
        assert!(matches!(err, Error::DuplicateMapping(10)));
        assert_eq!(s.lookup_sender(MessageId(10)), Some(ChatId(1)));
    }

    #[test]
    fn replace_returns_previous_thread_once() {
        let mut s = ThreadStore::new();
        assert_eq!(s.replace_last_thread(ChatId(1), MessageId(10)), None);
        assert_eq!(
            s.replace_last_thread(ChatId(1), MessageId(11)),
            Some(MessageId(10))
        );
        assert_eq!(s.last_thread(ChatId(1)), Some(MessageId(11)));
        assert_eq!(s.replace_last_thread(ChatId(2), MessageId(12)), None);
    }

    #[test]
    fn forget_is_idempotent_and_keeps_newer_pointer() {
        let mut s = ThreadStore::new();
        s.replace_last_thread(ChatId(1), MessageId(10));
        s.record(MessageId(10), ChatId(1)).unwrap();
        s.replace_last_thread(ChatId(1), MessageId(11));
        s.record(MessageId(11), ChatId(1)).unwrap();

        s.forget(MessageId(10));
        s.forget(MessageId(10));
        s.forget(MessageId(99));

        assert_eq!(s.lookup_sender(MessageId(10)), None);
        assert_eq!(s.last_thread(ChatId(1)), Some(MessageId(11)));
        assert_eq!(s.threads_of(ChatId(1)), vec![MessageId(11)]);
    }

    #[test]
    fn forgetting_live_thread_clears_pointer() {
        let mut s = ThreadStore::new();
        s.replace_last_thread(ChatId(1), MessageId(10));
        s.record(MessageId(10), ChatId(1)).unwrap();
        s.forget(MessageId(10));
        assert_eq!(s.last_thread(ChatId(1)), None);
        assert!(s.is_empty());
    }
}
