use std::collections::BTreeSet;

use petgraph::visit::{Dfs, Reversed};

use crate::graph::{Route, StepGraph};

/// Every route that can follow `start`, `start` included.
///
/// Follows `next` and every fork target transitively. Routes are marked as
/// visited during the walk, so fork loops terminate. An unknown `start`
/// reaches nothing.
pub fn reachable_from(
    start: &str,
    graph: &StepGraph,
) -> BTreeSet<Route> {
    let Some(start_idx) = graph.node(start) else {
        return BTreeSet::new();
    };
    let inner = graph.inner();
    let mut dfs = Dfs::new(inner, start_idx);
    let mut reached = BTreeSet::new();
    while let Some(idx) = dfs.next(inner) {
        reached.insert(inner[idx].clone());
    }
    reached
}

/// Every route that can lead to `target`, `target` included.
///
/// The same walk as [`reachable_from`] against reversed edges.
pub fn reaching(
    target: &str,
    graph: &StepGraph,
) -> BTreeSet<Route> {
    let Some(target_idx) = graph.node(target) else {
        return BTreeSet::new();
    };
    let reversed = Reversed(graph.inner());
    let mut dfs = Dfs::new(reversed, target_idx);
    let mut reached = BTreeSet::new();
    while let Some(idx) = dfs.next(reversed) {
        reached.insert(graph.inner()[idx].clone());
    }
    reached
}
