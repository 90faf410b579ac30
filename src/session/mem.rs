use std::{collections::BTreeMap, sync::Arc};

use serde_json::Value;
use tracing::warn;

use crate::{
    common::Queue,
    events::SessionEvent,
    session::{SessionId, SessionStore},
    utils,
};

/// In-memory session with optional change notifications.
#[derive(Clone)]
pub struct MemSession {
    id: SessionId,
    values: BTreeMap<String, Value>,
    subscriber: Option<Arc<Queue<SessionEvent>>>,
    update_time: i64,
}

impl MemSession {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            values: BTreeMap::new(),
            subscriber: None,
            update_time: utils::time::time_millis(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last modification time in milliseconds.
    pub fn update_time(&self) -> i64 {
        self.update_time
    }

    /// Starts publishing changes on a new queue of capacity `cap`.
    ///
    /// Replaces any earlier subscriber. Events that do not fit are dropped.
    pub fn subscribe(
        &mut self,
        cap: usize,
    ) -> Arc<Queue<SessionEvent>> {
        let queue = Queue::new(cap);
        self.subscriber = Some(queue.clone());
        queue
    }

    /// Snapshot of every stored key.
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn notify(
        &mut self,
        key: &str,
        previous: Option<Value>,
        current: Option<Value>,
    ) {
        self.update_time = utils::time::time_millis();
        let Some(queue) = &self.subscriber else {
            return;
        };
        let event = SessionEvent {
            sid: self.id.clone(),
            key: key.to_string(),
            previous,
            current,
            timestamp: self.update_time,
        };
        if let Err(e) = queue.send(event) {
            warn!("session {}: dropped change event for '{}': {}", self.id, key, e);
        }
    }
}

impl SessionStore for MemSession {
    fn get(
        &self,
        key: &str,
    ) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(
        &mut self,
        key: &str,
        value: Value,
    ) -> Option<Value> {
        let previous = self.values.insert(key.to_string(), value.clone());
        if previous.as_ref() != Some(&value) {
            self.notify(key, previous.clone(), Some(value));
        }
        previous
    }

    fn unset(
        &mut self,
        key: &str,
    ) -> Option<Value> {
        let previous = self.values.remove(key);
        if previous.is_some() {
            self.notify(key, previous.clone(), None);
        }
        previous
    }

    fn reset(&mut self) {
        let keys: Vec<String> = self.values.keys().cloned().collect();
        self.unset_many(&keys);
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
