//! Relay core: identity mapping, routing policy, anonymity mode and conversation state.

pub mod conversation;
pub mod locks;
pub mod mode;
pub mod routing;
pub mod state;
pub mod store;

pub use mode::AnonymityMode;
pub use routing::{Navigation, Relay, RelayOutcome, ReplyOutcome};
pub use state::RelayState;
