use tracing::trace;

use crate::graph::{Route, StepGraph};

/// Estimated number of steps in the user's whole journey.
///
/// The baseline is the `next`-only path from `first_step`. Journey entries
/// that break the positional match with the baseline are fork detours. With
/// no detours the baseline length is the total; otherwise the total is the
/// journey up to and including the last detour plus the `next`-only path
/// after it.
pub fn estimate_total(
    journey: &[Route],
    graph: &StepGraph,
    first_step: &str,
) -> usize {
    trace!("progress::estimate_total({} visited)", journey.len());
    let linear = graph.linear_path(first_step);

    let mut remaining: Vec<&str> = journey.iter().map(String::as_str).collect();
    let mut forks = Vec::new();
    let mut index = 0;
    while index < remaining.len() {
        if linear.get(index).copied() == Some(remaining[index]) {
            index += 1;
        } else {
            forks.push(remaining.remove(index));
        }
    }

    // earlier detours are already part of the journey before the last one
    let Some(last_fork) = forks.last() else {
        return linear.len();
    };
    let steps_before = journey.iter().position(|r| r == last_fork).unwrap_or_default();
    let after_fork = graph.linear_path(last_fork).len().saturating_sub(1);

    steps_before + 1 + after_fork
}
