//! Messaging gateway: the port the relay talks through, plus decorators.

use std::sync::Arc;

use crate::config::Config;

pub mod port;
pub mod throttled;
pub mod timeout;
pub mod types;

use port::MessagingPort;
use throttled::{ThrottleConfig, ThrottledMessenger};
use timeout::TimeoutMessenger;

/// Wrap a transport in the decorators the relay runs with.
///
/// The timeout sits directly on the transport and the throttle outside it, so time spent
/// queued behind the rate limiter never counts against a call's deadline.
pub fn stack(transport: Arc<dyn MessagingPort>, cfg: &Config) -> Arc<dyn MessagingPort> {
    let bounded: Arc<dyn MessagingPort> =
        Arc::new(TimeoutMessenger::new(transport, cfg.gateway_timeout));
    Arc::new(ThrottledMessenger::new(bounded, ThrottleConfig::from(cfg)))
}
