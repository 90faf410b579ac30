//! Validated step graph backed by a directed graph.
//!
//! Every step is a node; its default `next` and each fork target become
//! outgoing edges tagged with a [`Transition`]. All structural checks happen
//! once in [`StepGraph::new`], so traversals never meet a dangling route or
//! an endless `next` chain.

use std::{
    collections::HashMap,
    sync::LazyLock,
};

use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    FormflowError, Result,
    graph::{Route, StepDefinition},
};

static ROUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[A-Za-z0-9._~/-]*$").expect("valid route pattern"));

/// Kind of edge between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Transition {
    /// The step's unconditional `next`.
    Next,
    /// The fork at this position in the step's fork list.
    Fork(usize),
}

#[derive(Debug, Clone)]
pub struct StepGraph {
    graph: DiGraph<Route, Transition>,
    /// step definitions, `steps[i]` belongs to node `i`
    steps: Vec<StepDefinition>,
    index: HashMap<Route, NodeIndex>,
    first_step: Route,
}

impl StepGraph {
    /// Builds and validates a graph.
    ///
    /// `first_step` defaults to the first declared step. Fails on an empty
    /// step list, malformed or duplicate routes, `next`/fork targets that do
    /// not exist, an unknown first step, and cyclic `next` chains.
    pub fn new(
        steps: Vec<StepDefinition>,
        first_step: Option<&str>,
    ) -> Result<Self> {
        trace!("graph::new({} steps)", steps.len());
        let Some(first_declared) = steps.first() else {
            return Err(FormflowError::Graph("wizard has no steps".to_string()));
        };
        let first_step = first_step.unwrap_or(&first_declared.route).to_string();

        let mut graph: DiGraph<Route, Transition> = DiGraph::new();
        let mut index = HashMap::new();

        for step in steps.iter() {
            if !ROUTE_PATTERN.is_match(&step.route) {
                return Err(FormflowError::Graph(format!("invalid route '{}'", step.route)));
            }
            if index.contains_key(&step.route) {
                return Err(FormflowError::Graph(format!("duplicate route {}", step.route)));
            }
            let idx = graph.add_node(step.route.clone());
            index.insert(step.route.clone(), idx);
        }

        for step in steps.iter() {
            let source = index[&step.route];
            if let Some(next) = &step.next {
                let target = index.get(next).ok_or(FormflowError::Graph(format!("step {} has unknown next step {}", step.route, next)))?;
                graph.add_edge(source, *target, Transition::Next);
            }
            for (i, fork) in step.forks.iter().enumerate() {
                let target = index
                    .get(&fork.target)
                    .ok_or(FormflowError::Graph(format!("step {} has fork to unknown step {}", step.route, fork.target)))?;
                graph.add_edge(source, *target, Transition::Fork(i));
            }
        }

        if !index.contains_key(&first_step) {
            return Err(FormflowError::Graph(format!("first step {} not found", first_step)));
        }

        // forks may loop back, `next` chains may not
        let next_only = graph.filter_map(|_, route| Some(route.clone()), |_, t| (*t == Transition::Next).then_some(()));
        if let Err(cycle) = toposort(&next_only, None) {
            return Err(FormflowError::Graph(format!("cyclic next chain through step {}", next_only[cycle.node_id()])));
        }

        debug!("step graph built: {} steps, {} transitions", graph.node_count(), graph.edge_count());

        Ok(Self {
            graph,
            steps,
            index,
            first_step,
        })
    }

    pub fn step(
        &self,
        route: &str,
    ) -> Option<&StepDefinition> {
        self.index.get(route).map(|idx| &self.steps[idx.index()])
    }

    pub fn contains(
        &self,
        route: &str,
    ) -> bool {
        self.index.contains_key(route)
    }

    pub fn first_step(&self) -> &str {
        &self.first_step
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step that collects `field`, if any.
    pub fn step_for_field(
        &self,
        field: &str,
    ) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.has_field(field))
    }

    /// Routes visited by following only `next` from `start`, both ends included.
    ///
    /// Empty when `start` is unknown.
    pub fn linear_path(
        &self,
        start: &str,
    ) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self.step(start);
        while let Some(step) = current {
            path.push(step.route.as_str());
            current = step.next.as_deref().and_then(|next| self.step(next));
        }
        path
    }

    /// Routes of the steps that lead directly to `route`.
    pub fn predecessors(
        &self,
        route: &str,
    ) -> Vec<&str> {
        let Some(idx) = self.index.get(route) else {
            return Vec::new();
        };
        let mut routes: Vec<&str> = self.graph.neighbors_directed(*idx, Direction::Incoming).map(|n| self.graph[n].as_str()).collect();
        routes.sort_unstable();
        routes.dedup();
        routes
    }

    pub(crate) fn node(
        &self,
        route: &str,
    ) -> Option<NodeIndex> {
        self.index.get(route).copied()
    }

    pub(crate) fn inner(&self) -> &DiGraph<Route, Transition> {
        &self.graph
    }

    /// Output a human-readable representation of the step graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Step Graph ===".to_string());
        lines.push(format!("Steps: {}, Transitions: {}, First: {}", self.graph.node_count(), self.graph.edge_count(), self.first_step));
        lines.push(String::new());

        lines.push("--- Steps ---".to_string());
        for step in self.steps.iter() {
            if step.fields.is_empty() {
                lines.push(step.route.clone());
            } else {
                lines.push(format!("{} [{}]", step.route, step.fields.join(", ")));
            }
        }
        lines.push(String::new());

        lines.push("--- Transitions ---".to_string());
        for idx in self.graph.node_indices() {
            let outgoing: Vec<String> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| match e.weight() {
                    Transition::Next => format!("{}({})", self.graph[e.target()], e.weight().as_ref()),
                    Transition::Fork(i) => format!("{}({} {})", self.graph[e.target()], e.weight().as_ref(), i),
                })
                .collect();

            if outgoing.is_empty() {
                lines.push(format!("{} -> (end)", self.graph[idx]));
            } else {
                lines.push(format!("{} -> {}", self.graph[idx], outgoing.join(", ")));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::{FormflowError, StepDefinition, StepGraph, fixtures};

    #[test]
    fn test_linear_path_includes_terminal_step() {
        let graph = fixtures::linear_graph();
        assert_eq!(graph.linear_path("/a"), vec!["/a", "/b", "/c"]);
        assert_eq!(graph.linear_path("/c"), vec!["/c"]);
        assert!(graph.linear_path("/nope").is_empty());
        assert_eq!(graph.first_step(), "/a");
    }

    #[test]
    fn test_linear_path_ignores_forks() {
        let graph = fixtures::forked_graph();
        assert_eq!(graph.linear_path("/a"), vec!["/a", "/b", "/c"]);
        assert_eq!(graph.linear_path("/fork"), vec!["/fork", "/c"]);
        assert_eq!(graph.predecessors("/c"), vec!["/b", "/fork"]);
    }

    #[test]
    fn test_rejects_duplicate_routes() {
        let err = StepGraph::new(vec![StepDefinition::new("/a"), StepDefinition::new("/a")], None).unwrap_err();
        assert!(matches!(err, FormflowError::Graph(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_rejects_unknown_targets() {
        let err = StepGraph::new(vec![StepDefinition::new("/a").next("/missing")], None).unwrap_err();
        assert!(matches!(err, FormflowError::Graph(msg) if msg.contains("/missing")));

        let err = StepGraph::new(vec![StepDefinition::new("/a").fork(fixtures::fork_on("x", "y", "/gone"))], None).unwrap_err();
        assert!(matches!(err, FormflowError::Graph(msg) if msg.contains("/gone")));

        let err = StepGraph::new(vec![StepDefinition::new("/a")], Some("/start")).unwrap_err();
        assert!(matches!(err, FormflowError::Graph(msg) if msg.contains("/start")));
    }

    #[test]
    fn test_rejects_cyclic_next_chain() {
        let steps = vec![StepDefinition::new("/a").next("/b"), StepDefinition::new("/b").next("/c"), StepDefinition::new("/c").next("/a")];
        let err = StepGraph::new(steps, None).unwrap_err();
        assert!(matches!(err, FormflowError::Graph(msg) if msg.contains("cyclic")));

        let self_loop = vec![StepDefinition::new("/a").next("/a")];
        assert!(StepGraph::new(self_loop, None).is_err());
    }

    #[test]
    fn test_allows_fork_back_edges() {
        let steps = vec![
            StepDefinition::new("/add").fields(["item"]).next("/more"),
            StepDefinition::new("/more").fields(["another"]).next("/done").fork(fixtures::fork_on("another", "yes", "/add")),
            StepDefinition::new("/done"),
        ];
        assert!(StepGraph::new(steps, None).is_ok());
    }

    #[test]
    fn test_rejects_bad_routes_and_empty_graphs() {
        assert!(StepGraph::new(vec![StepDefinition::new("about")], None).is_err());
        assert!(StepGraph::new(vec![StepDefinition::new("/a b")], None).is_err());
        assert!(StepGraph::new(Vec::new(), None).is_err());
    }

    #[test]
    fn test_schema_lists_transitions() {
        let schema = fixtures::forked_graph().schema();
        assert!(schema.contains("/a -> "));
        assert!(schema.contains("/b(next)"));
        assert!(schema.contains("/fork(fork 0)"));
        assert!(schema.contains("/c -> (end)"));
    }

    #[test]
    fn test_step_for_field() {
        let graph = fixtures::forked_graph();
        assert_eq!(graph.step_for_field("x").map(|s| s.route.as_str()), Some("/a"));
        assert!(graph.step_for_field("nope").is_none());
    }
}
