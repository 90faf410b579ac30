//! The step graph: steps, default transitions and conditional forks.

mod fork;
mod graph;
mod reachability;
mod step;

pub use fork::{ForkCondition, ForkContext, ForkRule, Predicate};
pub use graph::{StepGraph, Transition};
pub use reachability::{reachable_from, reaching};
pub use step::{Route, StepDefinition};
