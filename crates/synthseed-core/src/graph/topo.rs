use petgraph::algo::toposort;
use thiserror::Error;

use crate::graph::dag::DependencyGraph;

/// The foreign keys form a cycle, so no valid generation order exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("foreign keys form a cycle through '{table}'")]
pub struct CycleDetected {
    pub table: String,
}

/// Compute a generation order for the dependency graph.
/// Returns tables parents-first, so every table follows the tables it
/// references. Self-references are ignored.
pub fn topological_sort(graph: &DependencyGraph) -> Result<Vec<String>, CycleDetected> {
    // Edges go child → parent, so petgraph yields children first; reverse it.
    match toposort(&graph.graph, None) {
        Ok(sorted_indices) => Ok(sorted_indices
            .iter()
            .rev()
            .map(|&idx| graph.table_name(idx).to_string())
            .collect()),
        Err(cycle_node) => Err(CycleDetected {
            table: graph.table_name(cycle_node.node_id()).to_string(),
        }),
    }
}

impl DependencyGraph {
    /// A generation order that satisfies every foreign key, for use in
    /// diagnostics. `None` when the references are cyclic.
    pub fn suggested_order(&self) -> Option<Vec<String>> {
        topological_sort(self).ok()
    }
}
