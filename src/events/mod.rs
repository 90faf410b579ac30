//! Change notifications published by sessions.
//!
//! A session with a subscriber emits one [`SessionEvent`] per key it sets or
//! unsets. The engine does not rely on them; invalidation is invoked
//! explicitly by the code that saves answers.

use serde_json::Value;

use crate::session::SessionId;

/// One key of one session changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Session that changed.
    pub sid: SessionId,
    /// Key that changed.
    pub key: String,
    /// Value before the change.
    pub previous: Option<Value>,
    /// Value after the change, `None` when the key was unset.
    pub current: Option<Value>,
    /// Timestamp in milliseconds of the change.
    pub timestamp: i64,
}

impl SessionEvent {
    pub fn is_unset(&self) -> bool {
        self.current.is_none()
    }

    pub fn str(&self) -> &str {
        match (&self.previous, &self.current) {
            (None, Some(_)) => "Created",
            (Some(_), Some(_)) => "Updated",
            (_, None) => "Removed",
        }
    }
}
