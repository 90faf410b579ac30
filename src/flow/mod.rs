//! Navigation logic: where the user goes next, what counts as progress, and
//! what must be forgotten when an answer changes.
//!
//! Every function here works on explicit inputs and returns values or
//! deltas; only [`Invalidation::apply`] and [`StepData::save`] write to a
//! session.

mod invalidation;
mod journey;
mod prereq;
mod progress;
mod resolver;

pub use invalidation::{Invalidation, InvalidationTable, on_branch_changed, on_field_changed};
pub use journey::{JourneyRecord, StepData};
pub use prereq::{is_accessible, missing_prereq_redirect};
pub use progress::estimate_total;
pub use resolver::{NextStepResolver, branch_target, join_url};
