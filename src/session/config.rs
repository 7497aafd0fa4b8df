//! Session registry configuration.

use std::time::Duration;

/// How long a session accepts player actions, measured from creation.
/// An expired session resolves as an implicit stand.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(120);

/// Registry configuration.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Fixed session lifetime from creation.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}
