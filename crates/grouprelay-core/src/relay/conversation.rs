use std::collections::HashMap;

use crate::domain::UserId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    None,
    /// The user pressed "send a message"; their next message is relayed from any chat.
    AwaitingMessage,
}

/// Per-user interaction state. Absent users are in [`ConversationState::None`].
#[derive(Debug, Default)]
pub struct ConversationTracker {
    states: HashMap<UserId, ConversationState>,
}

impl ConversationTracker {
    pub fn get(&self, user: UserId) -> ConversationState {
        self.states.get(&user).copied().unwrap_or_default()
    }

    pub fn begin_awaiting(&mut self, user: UserId) {
        self.states.insert(user, ConversationState::AwaitingMessage);
    }

    pub fn clear(&mut self, user: UserId) {
        self.states.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        let mut t = ConversationTracker::default();
        let u = UserId(7);
        assert_eq!(t.get(u), ConversationState::None);
        t.begin_awaiting(u);
        assert_eq!(t.get(u), ConversationState::AwaitingMessage);
        t.begin_awaiting(u);
        assert_eq!(t.get(u), ConversationState::AwaitingMessage);
        t.clear(u);
        assert_eq!(t.get(u), ConversationState::None);
        t.clear(u);
        assert_eq!(t.get(u), ConversationState::None);
    }
}
