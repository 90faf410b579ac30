//! Per-user session state.
//!
//! The engine only needs a key/value view of a session ([`SessionStore`]).
//! [`MemSession`] is the in-memory implementation and [`SessionRegistry`]
//! keeps live sessions by id.
//!
//! Keys used by the engine:
//! - `steps`: ordered list of completed routes
//! - `stepData`: the journey, see [`crate::StepData`]
//! - one key per field id holding its answer

mod mem;
mod registry;

use serde_json::Value;

use crate::{FormflowError, Result, graph::Route};

pub use mem::MemSession;
pub use registry::SessionRegistry;

/// Session identifier.
pub type SessionId = String;

/// Key holding the completed steps.
pub const STEPS_KEY: &str = "steps";
/// Key holding the journey log.
pub const STEP_DATA_KEY: &str = "stepData";

/// Key/value view of one user's session.
pub trait SessionStore {
    /// Value stored under `key`.
    fn get(
        &self,
        key: &str,
    ) -> Option<Value>;

    /// Stores `value` under `key`, returning the previous value.
    fn set(
        &mut self,
        key: &str,
        value: Value,
    ) -> Option<Value>;

    /// Removes `key`, returning the previous value.
    fn unset(
        &mut self,
        key: &str,
    ) -> Option<Value>;

    /// Removes every key.
    fn reset(&mut self);

    /// Every key currently stored.
    fn keys(&self) -> Vec<String>;

    fn unset_many(
        &mut self,
        keys: &[String],
    ) {
        for key in keys {
            self.unset(key);
        }
    }
}

/// Completed routes, in completion order.
pub fn completed_steps(session: &dyn SessionStore) -> Result<Vec<Route>> {
    match session.get(STEPS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value).map_err(|e| FormflowError::Session(format!("invalid '{}' in session: {}", STEPS_KEY, e))),
    }
}

pub fn set_completed_steps(
    session: &mut dyn SessionStore,
    steps: &[Route],
) {
    session.set(STEPS_KEY, Value::from(steps.to_vec()));
}

/// Appends `route` to the completed steps unless it is already there.
pub fn mark_completed(
    session: &mut dyn SessionStore,
    route: &str,
) -> Result<()> {
    let mut steps = completed_steps(session)?;
    if !steps.iter().any(|s| s == route) {
        steps.push(route.to_string());
        set_completed_steps(session, &steps);
    }
    Ok(())
}
