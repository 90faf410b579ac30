use tracing::debug;

use crate::graph::{Route, StepGraph};

/// Whether `route` may be entered given the completed steps.
///
/// The first step is always open. Otherwise the route must have been
/// completed already or follow a completed step through `next` or any fork.
pub fn is_accessible(
    route: &str,
    completed: &[Route],
    graph: &StepGraph,
) -> bool {
    if route == graph.first_step() || completed.iter().any(|r| r == route) {
        return true;
    }
    completed.iter().filter_map(|r| graph.step(r)).any(|step| step.successors().any(|s| s == route))
}

/// Where to send a user who asked for a step they cannot enter yet.
///
/// The step after the most recently completed one, that step itself when it
/// is terminal, or the first step when nothing usable was completed.
pub fn missing_prereq_redirect(
    completed: &[Route],
    graph: &StepGraph,
) -> Route {
    let redirect = completed
        .last()
        .and_then(|last| graph.step(last))
        .map(|step| step.next.clone().unwrap_or_else(|| step.route.clone()))
        .unwrap_or_else(|| graph.first_step().to_string());
    debug!("missing prerequisite, redirecting to {}", redirect);
    redirect
}
