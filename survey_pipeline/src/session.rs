// Explicit session context for the pipeline entry point.
//
// The hosting shell owns authentication; the pipeline only needs to know who
// is running it and when they were last active. Expiry is a pure function of
// (now, last_active, timeout) so callers control the clock.

use std::time::{Duration, SystemTime};

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionContext {
    pub username: String,
    pub last_active: SystemTime,
}

impl SessionContext {
    pub fn new(username: &str, now: SystemTime) -> SessionContext {
        SessionContext {
            username: username.to_string(),
            last_active: now,
        }
    }

    /// Records activity, resetting the inactivity window.
    pub fn touch(&mut self, now: SystemTime) {
        self.last_active = now;
    }
}

/// True when more than `timeout` has elapsed since the last activity.
/// A clock that moved backwards counts as still active.
pub fn is_expired(now: SystemTime, last_active: SystemTime, timeout: Duration) -> bool {
    match now.duration_since(last_active) {
        Ok(elapsed) => elapsed > timeout,
        Err(_) => false,
    }
}
