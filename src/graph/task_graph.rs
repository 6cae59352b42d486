//! The dependency graph between passes, derived from their declared reads and writes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use anyhow::Result;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::{Incoming, Outgoing};

use crate::graph::builder::PassEdges;
use crate::graph::pass::PassId;
use crate::graph::virtual_resource::ResourceHandle;
use crate::Error;

/// Directed graph with one node per pass and an edge `A -> B` when `B` must run after `A`.
///
/// Edges are derived per resource:
/// - Writers of a resource are chained in registration order.
/// - Every writer of a resource precedes each pass that only reads it.
#[derive(Debug, Default)]
pub struct PassDependencyGraph {
    graph: DiGraph<String, String>,
}

impl PassDependencyGraph {
    /// Build the graph from pass names given in registration order. `resource_name` labels the edges.
    pub fn new<'a>(
        passes: impl IntoIterator<Item = &'a str>,
        edges: &PassEdges,
        resource_name: impl Fn(ResourceHandle) -> String,
    ) -> Self {
        let mut graph = DiGraph::new();
        for name in passes {
            graph.add_node(name.to_owned());
        }

        let pass_count = graph.node_count();
        let node = |pass: &PassId| (pass.index() < pass_count).then(|| NodeIndex::new(pass.index()));

        for resource in edges.written_resources() {
            let mut writers = edges.writers_of(resource).iter().filter_map(node).collect::<Vec<_>>();
            writers.sort();
            for pair in writers.windows(2) {
                graph.update_edge(pair[0], pair[1], resource_name(resource));
            }

            for reader in edges.readers_of(resource).iter().filter_map(node) {
                if writers.contains(&reader) {
                    continue;
                }
                for &writer in &writers {
                    graph.update_edge(writer, reader, resource_name(resource));
                }
            }
        }

        Self {
            graph,
        }
    }

    /// Returns the total amount of passes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the total amount of dependencies in the graph.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `pass` directly depends on `dependency`.
    pub fn depends_on(&self, pass: PassId, dependency: PassId) -> bool {
        self.graph
            .find_edge(NodeIndex::new(dependency.index()), NodeIndex::new(pass.index()))
            .is_some()
    }

    /// Compute an execution order that respects every dependency. Among passes that are ready to run, the one
    /// registered first is picked, so a graph without dependencies keeps its registration order.
    /// # Errors
    /// * Fails with [`Error::GraphHasCycle`] if the dependencies contain a cycle.
    pub fn schedule(&self) -> Result<Vec<usize>> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(anyhow::Error::from(Error::GraphHasCycle));
        }

        let mut in_degree = self
            .graph
            .node_indices()
            .map(|node| self.graph.neighbors_directed(node, Incoming).count())
            .collect::<Vec<_>>();
        let mut ready = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| Reverse(index))
            .collect::<BinaryHeap<_>>();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(index)) = ready.pop() {
            order.push(index);
            for child in self.graph.neighbors_directed(NodeIndex::new(index), Outgoing) {
                let degree = &mut in_degree[child.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(child.index()));
                }
            }
        }

        Ok(order)
    }
}

/// Trait that is implemented for pass graphs to help with debugging and visualizing them.
pub trait GraphViz {
    /// Get the string representation of this graph in `dot` format.
    fn dot(&self) -> Result<String>;
}

impl GraphViz for PassDependencyGraph {
    fn dot(&self) -> Result<String> {
        Ok(format!("{}", Dot::with_config(&self.graph, &[])))
    }
}
