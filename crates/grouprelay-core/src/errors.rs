use std::time::Duration;

/// Core error type for the relay.
///
/// Adapter crates map their transport errors into `External` so the routing layer can
/// decide uniformly what is surfaced to the user and what is only logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),

    #[error("gateway call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("group message {0} is already mapped")]
    DuplicateMapping(i32),
}

pub type Result<T> = std::result::Result<T, Error>;
