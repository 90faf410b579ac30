use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::{
    ShareLock,
    common::MemCache,
    session::{MemSession, SessionId},
    utils,
};

/// Live sessions by id, bounded by capacity with LRU eviction.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: MemCache<SessionId, ShareLock<MemSession>>,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: MemCache::new(capacity),
        }
    }

    /// Returns the session for `sid`, creating it when `sid` is `None` or unknown.
    pub fn open(
        &self,
        sid: Option<&str>,
    ) -> (SessionId, ShareLock<MemSession>) {
        if let Some(sid) = sid {
            if let Some(session) = self.sessions.get(&sid.to_string()) {
                return (sid.to_string(), session);
            }
        }
        let sid = sid.map(str::to_string).unwrap_or_else(utils::longid);
        debug!("session {} created", sid);
        let session = Arc::new(RwLock::new(MemSession::new(&sid)));
        self.sessions.set(sid.clone(), session.clone());
        (sid, session)
    }

    pub fn get(
        &self,
        sid: &str,
    ) -> Option<ShareLock<MemSession>> {
        self.sessions.get(&sid.to_string())
    }

    pub fn remove(
        &self,
        sid: &str,
    ) -> Option<ShareLock<MemSession>> {
        self.sessions.remove(&sid.to_string())
    }

    pub fn len(&self) -> u64 {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{SessionRegistry, SessionStore};

    #[test]
    fn test_open_reuses_known_sessions() {
        let registry = SessionRegistry::new(8);
        let (sid, session) = registry.open(None);
        assert_eq!(sid.len(), 21);
        session.write().unwrap().set("name", json!("Ada"));

        let (same, again) = registry.open(Some(&sid));
        assert_eq!(same, sid);
        assert_eq!(again.read().unwrap().get("name"), Some(json!("Ada")));

        let (named, fresh) = registry.open(Some("custom"));
        assert_eq!(named, "custom");
        assert!(fresh.read().unwrap().keys().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new(8);
        let (sid, _) = registry.open(None);
        assert!(registry.remove(&sid).is_some());
        assert!(registry.get(&sid).is_none());
    }
}
