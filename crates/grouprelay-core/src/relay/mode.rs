use tracing::warn;

use crate::{
    domain::{ChatInfo, GroupTarget, UserId},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// Whether relayed content names its sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnonymityMode {
    Anonymous,
    Attributed,
}

impl AnonymityMode {
    pub fn from_anonymous(anonymous: bool) -> Self {
        if anonymous {
            AnonymityMode::Anonymous
        } else {
            AnonymityMode::Attributed
        }
    }

    pub fn is_anonymous(self) -> bool {
        self == AnonymityMode::Anonymous
    }
}

/// Gate for `/anon_on` and `/anon_off`.
///
/// The command must be issued inside the target group by an administrator or the owner.
/// A failed role lookup denies.
pub async fn authorize_toggle(
    messenger: &dyn MessagingPort,
    target: &GroupTarget,
    chat: &ChatInfo,
    user: UserId,
) -> Result<()> {
    if !target.matches(chat) {
        return Err(Error::Unauthorized(
            "this command only works inside the target group".to_string(),
        ));
    }

    match messenger.get_member_role(chat.id, user).await {
        Ok(role) if role.is_admin() => Ok(()),
        Ok(_) => Err(Error::Unauthorized(
            "only group admins can change anonymity settings".to_string(),
        )),
        Err(e) => {
            warn!(user = user.0, chat = chat.id.0, "role lookup failed: {e}");
            Err(Error::Unauthorized(
                "only group admins can change anonymity settings".to_string(),
            ))
        }
    }
}
