/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Where the relay posts: the configured staff group, by numeric id or public `@handle`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupTarget {
    Id(ChatId),
    Handle(String),
}

impl GroupTarget {
    /// Parse `TARGET_GROUP_ID`: `@name` is a handle, anything else must be an integer.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with('@') {
            return (raw.len() > 1).then(|| GroupTarget::Handle(raw.to_string()));
        }
        raw.parse::<i64>().ok().map(|id| GroupTarget::Id(ChatId(id)))
    }

    /// Whether `chat` is the target group.
    ///
    /// Ids compare as integers; handles compare case-sensitively with the leading `@`.
    pub fn matches(&self, chat: &ChatInfo) -> bool {
        match self {
            GroupTarget::Id(id) => *id == chat.id,
            GroupTarget::Handle(handle) => chat
                .username
                .as_deref()
                .is_some_and(|u| format!("@{u}") == *handle),
        }
    }
}

/// Destination of an outbound call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Recipient {
    Chat(ChatId),
    Group(GroupTarget),
}

impl From<ChatId> for Recipient {
    fn from(id: ChatId) -> Self {
        Recipient::Chat(id)
    }
}

impl From<GroupTarget> for Recipient {
    fn from(target: GroupTarget) -> Self {
        Recipient::Group(target)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// The chat an event arrived in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: ChatId,
    pub kind: ChatKind,
    pub username: Option<String>,
}

impl ChatInfo {
    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }
}

/// The human behind an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
}

impl Sender {
    /// `@username` when set, otherwise the first name.
    pub fn display_handle(&self) -> String {
        match self.username.as_deref() {
            Some(u) if !u.is_empty() => format!("@{u}"),
            _ => self.first_name.clone(),
        }
    }
}

/// Membership status of a user inside a chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberRole {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberRole {
    pub fn is_admin(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: i64, username: Option<&str>) -> ChatInfo {
        ChatInfo {
            id: ChatId(id),
            kind: ChatKind::Supergroup,
            username: username.map(str::to_string),
        }
    }

    #[test]
    fn parses_numeric_and_handle_targets() {
        assert_eq!(
            GroupTarget::parse(" -1001234 "),
            Some(GroupTarget::Id(ChatId(-1001234)))
        );
        assert_eq!(
            GroupTarget::parse("@support"),
            Some(GroupTarget::Handle("@support".to_string()))
        );
        assert_eq!(GroupTarget::parse("@"), None);
        assert_eq!(GroupTarget::parse("support"), None);
    }

    #[test]
    fn handle_match_is_case_sensitive() {
        let target = GroupTarget::Handle("@Support".to_string());
        assert!(target.matches(&group(1, Some("Support"))));
        assert!(!target.matches(&group(1, Some("support"))));
        assert!(!target.matches(&group(1, None)));
    }

    #[test]
    fn id_match_ignores_username() {
        let target = GroupTarget::Id(ChatId(-42));
        assert!(target.matches(&group(-42, Some("whatever"))));
        assert!(!target.matches(&group(42, None)));
    }

    #[test]
    fn display_handle_prefers_username() {
        let mut s = Sender {
            id: UserId(1),
            username: Some("alice".to_string()),
            first_name: "Alice".to_string(),
        };
        assert_eq!(s.display_handle(), "@alice");
        s.username = None;
        assert_eq!(s.display_handle(), "Alice");
    }
}
