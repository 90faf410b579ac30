//! Forgetting answers that an earlier change made unreliable.
//!
//! Two rules produce an [`Invalidation`] delta:
//! - field invalidation: a field lists the fields that depend on it. When it
//!   changes, every step whose answers would be wiped out entirely by
//!   clearing those dependents is forgotten.
//! - path invalidation: when a step's fork decision changes, the steps that
//!   were only reachable through the abandoned branch are forgotten.
//!
//! Both only ever remove steps and answers, and running either twice on the
//! same session changes nothing the second time.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    Result,
    common::is_empty_value,
    flow::StepData,
    graph::{Route, StepDefinition, StepGraph, reachable_from, reaching},
    model::FieldModel,
    session::{SessionStore, completed_steps, set_completed_steps},
};

/// Which fields each field invalidates.
#[derive(Debug, Clone, Default)]
pub struct InvalidationTable {
    rules: HashMap<String, Vec<String>>,
}

impl InvalidationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(
        mut self,
        field: &str,
        invalidates: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.insert(field.to_string(), invalidates.into_iter().map(Into::into).collect());
        self
    }

    /// Fields depending on `field`, empty when it declares none.
    pub fn invalidates(
        &self,
        field: &str,
    ) -> &[String] {
        self.rules.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.values().all(Vec::is_empty)
    }

    /// Referenced field ids, owners and dependents alike.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().flat_map(|(owner, deps)| std::iter::once(owner.as_str()).chain(deps.iter().map(String::as_str)))
    }
}

impl From<&HashMap<String, FieldModel>> for InvalidationTable {
    fn from(fields: &HashMap<String, FieldModel>) -> Self {
        Self {
            rules: fields.iter().filter(|(_, f)| !f.invalidates.is_empty()).map(|(id, f)| (id.clone(), f.invalidates.clone())).collect(),
        }
    }
}

/// Steps and answers to forget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invalidation {
    /// routes to drop from the completed steps and the journey
    pub forgotten_steps: Vec<Route>,
    /// fields to unset
    pub unset_fields: Vec<String>,
}

impl Invalidation {
    pub fn is_empty(&self) -> bool {
        self.forgotten_steps.is_empty() && self.unset_fields.is_empty()
    }

    pub fn merge(
        &mut self,
        other: Invalidation,
    ) {
        for route in other.forgotten_steps {
            if !self.forgotten_steps.contains(&route) {
                self.forgotten_steps.push(route);
            }
        }
        for field in other.unset_fields {
            if !self.unset_fields.contains(&field) {
                self.unset_fields.push(field);
            }
        }
    }

    /// Writes the delta to `session`.
    pub fn apply(
        &self,
        session: &mut dyn SessionStore,
    ) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        debug!("forgetting steps {:?}, fields {:?}", self.forgotten_steps, self.unset_fields);
        session.unset_many(&self.unset_fields);

        if !self.forgotten_steps.is_empty() {
            let completed = completed_steps(session)?;
            let kept: Vec<Route> = completed.iter().filter(|r| !self.forgotten_steps.contains(*r)).cloned().collect();
            if kept.len() != completed.len() {
                set_completed_steps(session, &kept);
            }

            let step_data = StepData::load(session)?;
            let pruned = step_data.forget(&self.forgotten_steps);
            if pruned != step_data {
                pruned.save(session)?;
            }
        }
        Ok(())
    }

    /// Adds `step` and its answered fields.
    fn forget_step(
        &mut self,
        step: &StepDefinition,
        session: &dyn SessionStore,
        completed: &[Route],
    ) {
        if completed.contains(&step.route) && !self.forgotten_steps.contains(&step.route) {
            self.forgotten_steps.push(step.route.clone());
        }
        for field in step.fields.iter() {
            if !is_empty_value(session.get(field).as_ref()) && !self.unset_fields.contains(field) {
                self.unset_fields.push(field.clone());
            }
        }
    }
}

/// Reaction to `field` having changed.
///
/// A step is forgotten when it collects at least one field that depends on
/// `field` and each of its fields either depends on `field` or is already
/// unanswered. Steps that keep at least one independent answer are left
/// alone, answers included.
pub fn on_field_changed(
    field: &str,
    graph: &StepGraph,
    table: &InvalidationTable,
    session: &dyn SessionStore,
    completed: &[Route],
) -> Invalidation {
    let dependents = table.invalidates(field);
    let mut delta = Invalidation::default();
    if dependents.is_empty() {
        return delta;
    }

    for step in graph.steps() {
        if !step.fields.iter().any(|f| dependents.contains(f)) {
            continue;
        }
        let wiped = step.fields.iter().all(|f| dependents.contains(f) || is_empty_value(session.get(f).as_ref()));
        if wiped {
            delta.forget_step(step, session, completed);
        }
    }

    if !delta.is_empty() {
        debug!("field {} changed, invalidates steps {:?}", field, delta.forgotten_steps);
    }
    delta
}

/// Reaction to the fork decision of step `from` changing from `old_target` to `new_target`.
///
/// Completed steps reachable from the old branch but not from the new one
/// are forgotten. Steps both branches lead to are kept, and so is every step
/// that leads to `from`, which covers forks looping back to an earlier step.
pub fn on_branch_changed(
    from: &str,
    old_target: &str,
    new_target: &str,
    graph: &StepGraph,
    session: &dyn SessionStore,
    completed: &[Route],
) -> Invalidation {
    let mut delta = Invalidation::default();
    if old_target == new_target {
        return delta;
    }

    let still_reachable = reachable_from(new_target, graph);
    let upstream = reaching(from, graph);
    let stale: Vec<Route> = reachable_from(old_target, graph).into_iter().filter(|r| !upstream.contains(r) && !still_reachable.contains(r)).collect();

    for route in completed.iter().filter(|r| stale.contains(*r)) {
        if let Some(step) = graph.step(route) {
            delta.forget_step(step, session, completed);
        }
    }

    if !delta.is_empty() {
        debug!("step {} now leads to {} instead of {}, forgetting {:?}", from, new_target, old_target, delta.forgotten_steps);
    }
    delta
}
